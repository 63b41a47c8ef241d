//! Data models for webhook events and token enrichment

mod event;
mod token;

pub use event::*;
pub use token::*;
