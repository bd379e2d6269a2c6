//! In-process API gateway.
//!
//! Requests are routed by method and path and answered with a status code
//! and a JSON body, using the same resource layout and status codes as the
//! hosted version of the game. The engine saves and loads through the
//! [`ProgressStore`] impl at the bottom of this file.

use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::accounts::AccountStore;
use crate::config::AccountPolicy;
use crate::error::{AccountError, StoreError};
use crate::game::engine::ProgressStore;
use crate::game::save::Snapshot;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Response {
    pub status: u16,
    pub body: Value,
}

impl Response {
    fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    fn failure(status: u16, message: impl Into<String>) -> Self {
        Self::new(status, json!({ "success": false, "message": message.into() }))
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// The `message` field, if any.
    pub fn message(&self) -> &str {
        self.body["message"].as_str().unwrap_or("")
    }
}

#[derive(Deserialize, Default)]
#[serde(default)]
struct Credentials {
    username: String,
    password: String,
}

pub struct ApiGateway<S> {
    store: S,
    policy: AccountPolicy,
}

impl<S: AccountStore> ApiGateway<S> {
    pub fn new(store: S, policy: AccountPolicy) -> Self {
        Self { store, policy }
    }

    /// Dispatch a request. Bodies are JSON text.
    pub fn route(&mut self, method: Method, path: &str, body: Option<&str>) -> Response {
        let Some(resource) = path.strip_prefix("/api/") else {
            return Response::failure(404, "Not found");
        };

        match (resource, method) {
            ("signup", Method::Post) => match parse_credentials(body) {
                Ok(c) => self.signup(&c.username, &c.password),
                Err(r) => r,
            },
            ("login", Method::Post) => match parse_credentials(body) {
                Ok(c) => self.login(&c.username, &c.password),
                Err(r) => r,
            },
            ("health", Method::Get) => self.health(),
            ("signup" | "login" | "health", _) => Response::failure(405, "Method not allowed"),
            _ => match resource.strip_prefix("gamedata/") {
                Some(user) if !user.is_empty() && !user.contains('/') => match method {
                    Method::Get => self.fetch_game_data(user),
                    Method::Post => match body.map(serde_json::from_str::<Value>) {
                        Some(Ok(snapshot)) => self.persist_game_data(user, snapshot),
                        _ => Response::failure(400, "Request body must be a JSON snapshot"),
                    },
                },
                _ => Response::failure(404, "Not found"),
            },
        }
    }

    fn signup(&mut self, username: &str, password: &str) -> Response {
        if username.is_empty() || password.is_empty() {
            return Response::failure(400, "Username and password are required");
        }
        if username.chars().count() < self.policy.min_username_len {
            return Response::failure(
                400,
                format!(
                    "Username must be at least {} characters",
                    self.policy.min_username_len
                ),
            );
        }
        if username.contains('/') {
            return Response::failure(400, "Username may not contain '/'");
        }
        if password.chars().count() < self.policy.min_password_len {
            return Response::failure(
                400,
                format!(
                    "Password must be at least {} characters",
                    self.policy.min_password_len
                ),
            );
        }

        match self.store.create_account(username, password) {
            Ok(()) => Response::new(
                201,
                json!({
                    "success": true,
                    "message": "Account created successfully",
                    "username": username,
                }),
            ),
            Err(AccountError::UsernameTaken { .. }) => {
                Response::failure(409, "Username already exists")
            }
            Err(AccountError::InvalidCredential) => {
                Response::failure(400, "Username and password are required")
            }
            Err(e) => internal_error(&e),
        }
    }

    fn login(&mut self, username: &str, password: &str) -> Response {
        if username.is_empty() || password.is_empty() {
            return Response::failure(400, "Username and password are required");
        }
        let token = match self.store.verify_credential(username, password) {
            Ok(token) => token,
            Err(AccountError::InvalidCredential | AccountError::NotFound { .. }) => {
                return Response::failure(401, "Invalid username or password");
            }
            Err(e) => return internal_error(&e),
        };
        match self.store.load_snapshot(username) {
            Ok(game_data) => {
                log::info!("login: {username}");
                Response::new(
                    200,
                    json!({
                        "success": true,
                        "message": "Login successful",
                        "username": username,
                        "token": token.0,
                        "gameData": game_data,
                    }),
                )
            }
            Err(e) => internal_error(&e),
        }
    }

    fn fetch_game_data(&self, username: &str) -> Response {
        match self.store.load_snapshot(username) {
            Ok(game_data) => Response::new(200, json!({ "success": true, "gameData": game_data })),
            Err(AccountError::NotFound { .. }) => Response::failure(404, "User not found"),
            Err(e) => internal_error(&e),
        }
    }

    /// Store `snapshot`, stamping `lastSavedTimestamp` with the current time.
    fn persist_game_data(&mut self, username: &str, mut snapshot: Value) -> Response {
        let Some(fields) = snapshot.as_object_mut() else {
            return Response::failure(400, "Game data must be an object");
        };
        fields.insert("lastSavedTimestamp".into(), json!(Utc::now()));

        match self.store.store_snapshot(username, snapshot) {
            Ok(()) => Response::new(
                200,
                json!({ "success": true, "message": "Game data saved successfully" }),
            ),
            Err(AccountError::NotFound { .. }) => Response::failure(404, "User not found"),
            Err(e) => internal_error(&e),
        }
    }

    fn health(&self) -> Response {
        Response::new(200, json!({ "status": "ok", "timestamp": Utc::now() }))
    }
}

fn parse_credentials(body: Option<&str>) -> Result<Credentials, Response> {
    match body {
        None => Ok(Credentials::default()),
        Some(raw) => serde_json::from_str(raw)
            .map(|c: Credentials| Credentials {
                username: c.username.trim().to_string(),
                password: c.password,
            })
            .map_err(|_| Response::failure(400, "Malformed request body")),
    }
}

fn internal_error(e: &AccountError) -> Response {
    log::error!("account store failure: {e}");
    Response::failure(500, "Internal server error")
}

fn rejection(username: &str, response: &Response) -> StoreError {
    match response.status {
        404 => StoreError::NotFound {
            username: username.to_string(),
        },
        status => StoreError::Rejected {
            status,
            message: response.message().to_string(),
        },
    }
}

impl<S: AccountStore> ProgressStore for ApiGateway<S> {
    fn fetch_progress(&mut self, username: &str) -> Result<String, StoreError> {
        let response = self.route(Method::Get, &format!("/api/gamedata/{username}"), None);
        if !response.is_success() {
            return Err(rejection(username, &response));
        }
        Ok(response.body["gameData"].to_string())
    }

    fn persist_progress(&mut self, username: &str, snapshot: &Snapshot) -> Result<(), StoreError> {
        let body = snapshot.to_json()?;
        let response = self.route(
            Method::Post,
            &format!("/api/gamedata/{username}"),
            Some(&body),
        );
        if response.is_success() {
            Ok(())
        } else {
            Err(rejection(username, &response))
        }
    }
}
