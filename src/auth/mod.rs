/// Login / sign-up screen: form state and input handling.

pub mod actions;
pub mod render;

use std::cell::RefCell;
use std::rc::Rc;

use ratzilla::ratatui::layout::Rect;
use ratzilla::ratatui::Frame;

use crate::input::{ClickState, InputEvent};

use actions::*;

const MAX_FIELD_LEN: usize = 32;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AuthMode {
    Login,
    Signup,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    Username,
    Password,
    Confirm,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StatusMessage {
    pub text: String,
    pub is_error: bool,
}

/// A submitted form, ready to be sent to the gateway.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthRequest {
    Login { username: String, password: String },
    Signup { username: String, password: String },
}

pub struct AuthScreen {
    pub mode: AuthMode,
    pub username: String,
    pub password: String,
    pub confirm: String,
    pub focus: Field,
    pub status: Option<StatusMessage>,
}

impl AuthScreen {
    pub fn new() -> Self {
        Self {
            mode: AuthMode::Login,
            username: String::new(),
            password: String::new(),
            confirm: String::new(),
            focus: Field::Username,
            status: None,
        }
    }

    /// Switch between login and sign-up. Keeps the username, drops passwords.
    pub fn set_mode(&mut self, mode: AuthMode) {
        self.mode = mode;
        self.clear_passwords();
        self.focus = Field::Username;
        self.status = None;
    }

    pub fn clear_passwords(&mut self) {
        self.password.clear();
        self.confirm.clear();
    }

    pub fn show_error(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: true,
        });
    }

    pub fn show_info(&mut self, text: impl Into<String>) {
        self.status = Some(StatusMessage {
            text: text.into(),
            is_error: false,
        });
    }

    fn fields(&self) -> &'static [Field] {
        match self.mode {
            AuthMode::Login => &[Field::Username, Field::Password],
            AuthMode::Signup => &[Field::Username, Field::Password, Field::Confirm],
        }
    }

    fn focused_mut(&mut self) -> &mut String {
        match self.focus {
            Field::Username => &mut self.username,
            Field::Password => &mut self.password,
            Field::Confirm => &mut self.confirm,
        }
    }

    fn focus_next(&mut self) {
        let fields = self.fields();
        let pos = fields.iter().position(|f| *f == self.focus).unwrap_or(0);
        self.focus = fields[(pos + 1) % fields.len()];
    }

    fn focus(&mut self, field: Field) {
        if self.fields().contains(&field) {
            self.focus = field;
        }
    }

    pub fn handle_input(&mut self, event: &InputEvent) -> Option<AuthRequest> {
        match event {
            InputEvent::Key(c) if !c.is_control() => {
                let field = self.focused_mut();
                if field.chars().count() < MAX_FIELD_LEN {
                    field.push(*c);
                }
            }
            InputEvent::Backspace => {
                self.focused_mut().pop();
            }
            InputEvent::Tab => self.focus_next(),
            InputEvent::Enter | InputEvent::Click(SUBMIT) => return self.submit(),
            InputEvent::Escape => {
                let other = match self.mode {
                    AuthMode::Login => AuthMode::Signup,
                    AuthMode::Signup => AuthMode::Login,
                };
                self.set_mode(other);
            }
            InputEvent::Click(MODE_LOGIN) => self.set_mode(AuthMode::Login),
            InputEvent::Click(MODE_SIGNUP) => self.set_mode(AuthMode::Signup),
            InputEvent::Click(FOCUS_USERNAME) => self.focus(Field::Username),
            InputEvent::Click(FOCUS_PASSWORD) => self.focus(Field::Password),
            InputEvent::Click(FOCUS_CONFIRM) => self.focus(Field::Confirm),
            _ => {}
        }
        None
    }

    /// Validate locally and build a request. Server-side rules (length,
    /// uniqueness) are left to the gateway.
    pub fn submit(&mut self) -> Option<AuthRequest> {
        let username = self.username.trim().to_string();
        if username.is_empty() || self.password.is_empty() {
            self.show_error("Please enter username and password");
            return None;
        }
        match self.mode {
            AuthMode::Login => Some(AuthRequest::Login {
                username,
                password: self.password.clone(),
            }),
            AuthMode::Signup if self.password != self.confirm => {
                self.show_error("Passwords do not match");
                self.confirm.clear();
                self.focus = Field::Confirm;
                None
            }
            AuthMode::Signup => Some(AuthRequest::Signup {
                username,
                password: self.password.clone(),
            }),
        }
    }

    pub fn render(&self, f: &mut Frame, area: Rect, click_state: &Rc<RefCell<ClickState>>) {
        render::render(self, f, area, click_state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_str(screen: &mut AuthScreen, s: &str) {
        for c in s.chars() {
            screen.handle_input(&InputEvent::Key(c));
        }
    }

    #[test]
    fn typing_fills_focused_field() {
        let mut s = AuthScreen::new();
        type_str(&mut s, "alice");
        s.handle_input(&InputEvent::Tab);
        type_str(&mut s, "secret1");
        assert_eq!(s.username, "alice");
        assert_eq!(s.password, "secret1");
        s.handle_input(&InputEvent::Backspace);
        assert_eq!(s.password, "secret");
    }

    #[test]
    fn tab_cycles_through_visible_fields() {
        let mut s = AuthScreen::new();
        s.handle_input(&InputEvent::Tab);
        assert_eq!(s.focus, Field::Password);
        s.handle_input(&InputEvent::Tab);
        assert_eq!(s.focus, Field::Username);

        s.set_mode(AuthMode::Signup);
        s.handle_input(&InputEvent::Tab);
        s.handle_input(&InputEvent::Tab);
        assert_eq!(s.focus, Field::Confirm);
    }

    #[test]
    fn confirm_field_not_focusable_in_login() {
        let mut s = AuthScreen::new();
        s.handle_input(&InputEvent::Click(FOCUS_CONFIRM));
        assert_eq!(s.focus, Field::Username);
    }

    #[test]
    fn enter_submits_login() {
        let mut s = AuthScreen::new();
        type_str(&mut s, "  alice ");
        s.handle_input(&InputEvent::Click(FOCUS_PASSWORD));
        type_str(&mut s, "secret1");
        assert_eq!(
            s.handle_input(&InputEvent::Enter),
            Some(AuthRequest::Login {
                username: "alice".into(),
                password: "secret1".into()
            })
        );
    }

    #[test]
    fn empty_fields_are_rejected_locally() {
        let mut s = AuthScreen::new();
        assert_eq!(s.handle_input(&InputEvent::Click(SUBMIT)), None);
        assert!(s.status.as_ref().unwrap().is_error);
    }

    #[test]
    fn signup_requires_matching_confirmation() {
        let mut s = AuthScreen::new();
        s.handle_input(&InputEvent::Click(MODE_SIGNUP));
        type_str(&mut s, "bob");
        s.handle_input(&InputEvent::Tab);
        type_str(&mut s, "secret1");
        s.handle_input(&InputEvent::Tab);
        type_str(&mut s, "secret2");
        assert_eq!(s.submit(), None);
        assert_eq!(s.status.as_ref().unwrap().text, "Passwords do not match");
        assert_eq!(s.focus, Field::Confirm);

        type_str(&mut s, "secret1");
        assert_eq!(
            s.submit(),
            Some(AuthRequest::Signup {
                username: "bob".into(),
                password: "secret1".into()
            })
        );
    }

    #[test]
    fn escape_toggles_mode_and_clears_passwords() {
        let mut s = AuthScreen::new();
        type_str(&mut s, "carol");
        s.handle_input(&InputEvent::Tab);
        type_str(&mut s, "pw");
        s.handle_input(&InputEvent::Escape);
        assert_eq!(s.mode, AuthMode::Signup);
        assert_eq!(s.username, "carol");
        assert!(s.password.is_empty());
        s.handle_input(&InputEvent::Escape);
        assert_eq!(s.mode, AuthMode::Login);
    }

    #[test]
    fn field_length_is_capped() {
        let mut s = AuthScreen::new();
        type_str(&mut s, &"x".repeat(50));
        assert_eq!(s.username.len(), MAX_FIELD_LEN);
    }
}
