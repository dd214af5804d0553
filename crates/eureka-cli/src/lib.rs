//! Eureka Moment tracker CLI library.
//!
//! This crate provides the terminal interface for the tracker.

mod cli;
pub mod commands;
mod config;
mod session;

pub use cli::{Cli, Commands};
pub use config::{Config, DisplayConfig};
pub use session::Session;
