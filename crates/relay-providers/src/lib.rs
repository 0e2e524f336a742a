//! # relay-providers
//!
//! External collaborators driven as subprocesses: the coding agent and the
//! pull-request creator.

pub mod claude_code;
pub mod git_pr;
