//! Idle clicker: economy core plus the game screen built on top of it.

pub mod actions;
pub mod catalog;
pub mod clock;
pub mod economy;
pub mod engine;
pub mod format;
pub mod render;
pub mod save;
pub mod state;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::error::EconomyError;
use crate::input::{ClickState, InputEvent};

use actions::*;
use engine::{Engine, ProgressStore};
use format::format_number;

/// Ticks a click or purchase highlight stays visible.
const FLASH_TICKS: u32 = 3;
const MAX_LOG: usize = 50;

#[derive(Clone, Debug)]
pub struct LogEntry {
    pub text: String,
    pub is_important: bool,
}

/// What the app should do after the game handled an input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameCommand {
    Ignored,
    Handled,
    Logout,
}

/// The game screen: one running [`Engine`] plus presentation state.
pub struct IdleGame {
    pub engine: Engine,
    pub log: Vec<LogEntry>,
    /// Advances once per production tick.
    pub anim_frame: u32,
    pub click_flash: u32,
    pub purchase_flash: u32,
    /// Set when the most recent autosave failed; cleared by the next success.
    pub autosave_failed: bool,
}

impl IdleGame {
    /// Load progress for the engine's user and start its clock.
    pub fn start_session(mut engine: Engine, store: &mut impl ProgressStore, now_ms: f64) -> Self {
        let loaded = engine.load(store);
        engine.start(now_ms);
        let mut game = Self {
            engine,
            log: Vec::new(),
            anim_frame: 0,
            click_flash: 0,
            purchase_flash: 0,
            autosave_failed: false,
        };
        let welcome = format!("Welcome, {}!", game.engine.username());
        game.add_log(&welcome, true);
        if loaded.is_err() {
            game.add_log("Could not load saved progress; starting fresh.", true);
        }
        game
    }

    pub fn add_log(&mut self, text: &str, is_important: bool) {
        self.log.push(LogEntry {
            text: text.to_string(),
            is_important,
        });
        if self.log.len() > MAX_LOG {
            self.log.remove(0);
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent, store: &mut impl ProgressStore) -> GameCommand {
        match event {
            InputEvent::Key('c' | 'C' | ' ') | InputEvent::Click(CLICK_COOKIE) => {
                self.engine.click();
                self.click_flash = FLASH_TICKS;
            }
            InputEvent::Key('s' | 'S') | InputEvent::Click(SAVE_GAME) => self.save(store),
            InputEvent::Key('q' | 'Q') | InputEvent::Click(LOGOUT) => return GameCommand::Logout,
            InputEvent::Key(c @ '1'..='9') => {
                let index = (*c as u8 - b'1') as usize;
                self.buy(index, store);
            }
            InputEvent::Click(id) if *id >= BUY_GENERATOR_BASE => {
                self.buy((id - BUY_GENERATOR_BASE) as usize, store);
            }
            _ => return GameCommand::Ignored,
        }
        GameCommand::Handled
    }

    fn buy(&mut self, index: usize, store: &mut impl ProgressStore) {
        let Some(def) = self.engine.catalog().definitions().get(index) else {
            return;
        };
        let (id, name) = (def.id.clone(), def.name.clone());
        match self.engine.purchase(&id, store) {
            Ok(outcome) => {
                self.purchase_flash = FLASH_TICKS;
                self.add_log(
                    &format!(
                        "Bought {} #{} for {}",
                        name,
                        outcome.receipt.owned,
                        format_number(outcome.receipt.cost)
                    ),
                    false,
                );
                self.note_save_result(outcome.saved);
            }
            Err(EconomyError::InsufficientFunds { cost, .. }) => {
                self.add_log(
                    &format!("Not enough cookies for {} (need {})", name, format_number(cost)),
                    false,
                );
            }
            Err(e) => self.add_log(&e.to_string(), true),
        }
    }

    fn save(&mut self, store: &mut impl ProgressStore) {
        match self.engine.save(store) {
            Ok(_) => {
                self.autosave_failed = false;
                self.add_log("Game saved.", false);
            }
            Err(e) => {
                self.autosave_failed = true;
                self.add_log(&format!("Save failed: {e}"), true);
            }
        }
    }

    /// Track background save results; only the first failure in a row is logged.
    fn note_save_result(&mut self, saved: Option<bool>) {
        match saved {
            Some(false) if !self.autosave_failed => {
                self.autosave_failed = true;
                self.add_log("Autosave failed; progress is kept in memory.", true);
            }
            Some(true) => self.autosave_failed = false,
            _ => {}
        }
    }

    /// Per-frame update: run due ticks and autosaves, age the highlights.
    pub fn frame(&mut self, now_ms: f64, store: &mut impl ProgressStore) {
        let report = self.engine.pump(now_ms, store);
        self.anim_frame = self.anim_frame.wrapping_add(report.ticks);
        self.click_flash = self.click_flash.saturating_sub(report.ticks);
        self.purchase_flash = self.purchase_flash.saturating_sub(report.ticks);
        self.note_save_result(report.autosaved);
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }
}
