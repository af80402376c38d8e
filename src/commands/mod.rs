//! # CLI Command Implementations
//!
//! The tool has a single command, deploying templates into a target
//! directory. It lives in its own module following the usual layout:
//! - An `Args` struct that defines the command's arguments and options,
//!   derived using `clap`.
//! - An `execute` function that takes the parsed `Args` and calls into the
//!   `cursor_rules_deploy` library to do the work.

pub mod deploy;
