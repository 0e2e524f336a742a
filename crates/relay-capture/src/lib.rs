//! # relay-capture
//!
//! Screenshot pipeline: HTML target discovery, an ephemeral static server,
//! and headless browser capture.

pub mod browser;
pub mod server;
pub mod shot;
pub mod targets;

pub use browser::{Capturer, ChromeCapturer};
pub use server::{EphemeralServer, ServerConfig, ServerHandle};
pub use shot::Screenshotter;
pub use targets::{TargetMap, TargetResolver};
