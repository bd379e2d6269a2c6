mod accounts;
mod app;
mod auth;
mod config;
mod error;
mod game;
mod gateway;
mod input;
mod logger;
mod widgets;

use std::{cell::RefCell, io, rc::Rc};

use log::LevelFilter;
use ratzilla::event::{KeyCode, MouseButton, MouseEventKind};
use ratzilla::ratatui::Terminal;
use ratzilla::{DomBackend, WebRenderer};

use accounts::storage::{BrowserStorage, KeyValueStorage, MemoryStorage};
use app::App;
use config::GameConfig;
use game::catalog::Catalog;
use input::{pixel_x_to_col, pixel_y_to_row, ClickState, InputEvent};

/// High-resolution page clock in milliseconds.
fn now_ms() -> f64 {
    web_sys::window()
        .and_then(|w| w.performance())
        .map(|p| p.now())
        .unwrap_or_else(js_sys::Date::now)
}

/// Convert a mouse position in page pixels to a terminal cell.
fn dom_pixel_to_cell(mouse_x: u32, mouse_y: u32, cs: &ClickState) -> Option<(u16, u16)> {
    let document = web_sys::window()?.document()?;
    // DomBackend renders its grid into a <div> directly under <body>.
    let grid = document.query_selector("body > div").ok()??;
    let rect = grid.get_bounding_client_rect();

    let col = pixel_x_to_col(f64::from(mouse_x) - rect.left(), rect.width(), cs.terminal_cols)?;
    let row = pixel_y_to_row(f64::from(mouse_y) - rect.top(), rect.height(), cs.terminal_rows)?;
    Some((col, row))
}

fn main() -> io::Result<()> {
    console_error_panic_hook::set_once();
    logger::init(LevelFilter::Info);

    match BrowserStorage::open() {
        Some(storage) => run(storage),
        None => {
            log::warn!("localStorage unavailable; progress will not survive a reload");
            run(MemoryStorage::new())
        }
    }
}

fn run<K: KeyValueStorage + Clone + 'static>(storage: K) -> io::Result<()> {
    let config = GameConfig::load(&storage);
    logger::init(config.log_level);

    let catalog = Catalog::standard().map_err(io::Error::other)?;
    let app = Rc::new(RefCell::new(App::new(storage, catalog, config, now_ms())));
    let click_state = Rc::new(RefCell::new(ClickState::new()));
    let backend = DomBackend::new()?;
    let terminal = Terminal::new(backend)?;

    terminal.on_mouse_event({
        let app = app.clone();
        let click_state = click_state.clone();
        move |mouse_event| {
            if mouse_event.event != MouseEventKind::Pressed
                || mouse_event.button != MouseButton::Left
            {
                return;
            }
            let action = {
                let cs = click_state.borrow();
                dom_pixel_to_cell(mouse_event.x, mouse_event.y, &cs)
                    .and_then(|(col, row)| cs.hit_test(col, row))
            };
            if let Some(action_id) = action {
                log::trace!("click action {action_id}");
                app.borrow_mut()
                    .handle_input(&InputEvent::Click(action_id), now_ms());
            }
        }
    });

    terminal.on_key_event({
        let app = app.clone();
        move |key_event| {
            let event = match key_event.code {
                KeyCode::Char(c) => InputEvent::Key(c),
                KeyCode::Backspace => InputEvent::Backspace,
                KeyCode::Enter => InputEvent::Enter,
                KeyCode::Tab => InputEvent::Tab,
                KeyCode::Esc => InputEvent::Escape,
                _ => return,
            };
            app.borrow_mut().handle_input(&event, now_ms());
        }
    });

    terminal.draw_web(move |f| {
        let area = f.area();
        let mut app = app.borrow_mut();
        app.frame(now_ms());
        app.render(f, area, &click_state);
    });

    Ok(())
}
