//! Middleware for Migration Sentinel
//!
//! Request logging and optional webhook authorization

mod request_log;
mod webhook_auth;

pub use request_log::*;
pub use webhook_auth::*;
