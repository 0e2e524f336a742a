//! # relay-channels
//!
//! Messaging transport for Relay.

pub mod telegram;
pub mod utils;
