//! Top-level application state: which screen is showing and the services
//! shared across sessions.

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;
use serde_json::json;

use crate::accounts::storage::KeyValueStorage;
use crate::accounts::KvAccountStore;
use crate::auth::{AuthRequest, AuthScreen};
use crate::config::GameConfig;
use crate::game::catalog::Catalog;
use crate::game::engine::Engine;
use crate::game::{GameCommand, IdleGame};
use crate::gateway::{ApiGateway, Method, Response};
use crate::input::{ClickState, InputEvent};

/// Storage key remembering who is logged in across page reloads.
pub const CURRENT_USER_KEY: &str = "idle_clicker.current_user";

pub enum Screen {
    Auth(AuthScreen),
    Playing(Box<IdleGame>),
}

pub struct App<K> {
    config: GameConfig,
    catalog: Rc<Catalog>,
    gateway: ApiGateway<KvAccountStore<K>>,
    /// Same backend as the account store, used for the remembered user.
    session: K,
    pub screen: Screen,
}

impl<K: KeyValueStorage + Clone> App<K> {
    /// Build the app and resume the remembered session, if any.
    pub fn new(storage: K, catalog: Catalog, config: GameConfig, now_ms: f64) -> Self {
        let store = KvAccountStore::new(storage.clone(), config.accounts.hash_iterations);
        let gateway = ApiGateway::new(store, config.accounts.clone());
        let mut app = Self {
            config,
            catalog: Rc::new(catalog),
            gateway,
            session: storage,
            screen: Screen::Auth(AuthScreen::new()),
        };
        app.resume_session(now_ms);
        app
    }

    fn resume_session(&mut self, now_ms: f64) {
        let username = match self.session.get(CURRENT_USER_KEY) {
            Ok(Some(u)) => u,
            Ok(None) => return,
            Err(e) => {
                log::warn!("could not read remembered user: {e}");
                return;
            }
        };
        let path = format!("/api/gamedata/{username}");
        if self.gateway.route(Method::Get, &path, None).is_success() {
            log::info!("resuming session for {username}");
            self.enter_game(&username, now_ms);
        } else {
            log::warn!("remembered user {username} no longer exists");
            self.forget_user();
        }
    }

    pub fn current_user(&self) -> Option<&str> {
        match &self.screen {
            Screen::Playing(game) => Some(game.engine.username()),
            Screen::Auth(_) => None,
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent, now_ms: f64) {
        match &mut self.screen {
            Screen::Auth(auth) => {
                if let Some(request) = auth.handle_input(event) {
                    self.submit(request, now_ms);
                }
            }
            Screen::Playing(game) => {
                if game.handle_input(event, &mut self.gateway) == GameCommand::Logout {
                    self.logout();
                }
            }
        }
    }

    fn submit(&mut self, request: AuthRequest, now_ms: f64) {
        let response = match request {
            AuthRequest::Login { username, password } => {
                self.post_credentials("/api/login", &username, &password)
            }
            AuthRequest::Signup { username, password } => {
                let created = self.post_credentials("/api/signup", &username, &password);
                if created.is_success() {
                    // Sign-up logs straight in.
                    self.post_credentials("/api/login", &username, &password)
                } else {
                    created
                }
            }
        };

        match response.body["username"].as_str() {
            Some(username) if response.is_success() => {
                let username = username.to_string();
                self.enter_game(&username, now_ms);
            }
            _ => {
                if let Screen::Auth(auth) = &mut self.screen {
                    auth.clear_passwords();
                    auth.show_error(response.message());
                }
            }
        }
    }

    fn post_credentials(&mut self, path: &str, username: &str, password: &str) -> Response {
        let body = json!({ "username": username, "password": password }).to_string();
        self.gateway.route(Method::Post, path, Some(&body))
    }

    fn enter_game(&mut self, username: &str, now_ms: f64) {
        if let Err(e) = self.session.set(CURRENT_USER_KEY, username) {
            log::warn!("could not remember user: {e}");
        }
        let engine = Engine::new(self.catalog.clone(), &self.config, username);
        let game = IdleGame::start_session(engine, &mut self.gateway, now_ms);
        self.screen = Screen::Playing(Box::new(game));
    }

    /// Stop the session, write a final save and return to the auth screen.
    pub fn logout(&mut self) {
        let previous = std::mem::replace(&mut self.screen, Screen::Auth(AuthScreen::new()));
        let Screen::Playing(game) = previous else {
            return;
        };
        let username = game.engine.username().to_string();
        let saved = game.engine.shutdown(&mut self.gateway);
        self.forget_user();

        if let Screen::Auth(auth) = &mut self.screen {
            auth.username = username;
            match saved {
                Ok(()) => auth.show_info("Logged out. Progress saved."),
                Err(e) => auth.show_error(format!("Logged out, but the final save failed: {e}")),
            }
        }
    }

    fn forget_user(&mut self) {
        if let Err(e) = self.session.remove(CURRENT_USER_KEY) {
            log::warn!("could not clear remembered user: {e}");
        }
    }

    /// Per-frame update.
    pub fn frame(&mut self, now_ms: f64) {
        if let Screen::Playing(game) = &mut self.screen {
            game.frame(now_ms, &mut self.gateway);
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        click_state.borrow_mut().reset(area);
        match &self.screen {
            Screen::Auth(auth) => auth.render(f, area, click_state),
            Screen::Playing(game) => game.render(f, area, click_state),
        }
    }
}
