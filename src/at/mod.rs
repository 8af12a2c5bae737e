//! # AT Command Module
//!
//! Text request/response exchange with the modem.
//!
//! This module handles:
//! - Command line framing (`<command>\r`)
//! - Splitting the byte stream into response lines
//! - Final result codes (`OK`, `ERROR`, `+CME ERROR`)
//! - Per-command response timeouts

pub mod protocol;
pub mod session;

pub use session::AtSession;
