//! Action IDs for game-screen click targets, dispatched via `InputEvent::Click`.

pub const CLICK_COOKIE: u16 = 0;
pub const SAVE_GAME: u16 = 1;
pub const LOGOUT: u16 = 2;

// ── Shop (base + catalog index) ─────────────────────────────────
pub const BUY_GENERATOR_BASE: u16 = 100;
