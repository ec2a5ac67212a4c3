//! Codeflare CLI library interface
//!
//! The binary is a thin shell over these modules; they are public so the
//! integration tests can assemble the same application.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::panic))]

pub mod app;
pub mod cli;
pub mod features;
pub mod render;

pub use app::{interactive, settle, App, Outcome};
pub use cli::{build_cli, log_level, CliOptions};
