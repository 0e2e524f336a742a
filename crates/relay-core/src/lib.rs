//! # relay-core
//!
//! Core types, collaborator traits, configuration, and error handling for Relay.

pub mod config;
pub mod error;
pub mod message;
pub mod traits;
