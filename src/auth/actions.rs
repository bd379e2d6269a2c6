//! Action IDs for auth-screen click targets.

pub const FOCUS_USERNAME: u16 = 10;
pub const FOCUS_PASSWORD: u16 = 11;
pub const FOCUS_CONFIRM: u16 = 12;

pub const SUBMIT: u16 = 20;
pub const MODE_LOGIN: u16 = 21;
pub const MODE_SIGNUP: u16 = 22;
