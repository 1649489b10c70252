//! Calendar report CLI library.
//!
//! This crate provides the CLI interface for calrep.

mod cli;
pub mod commands;
mod config;

pub use cli::{Cli, Commands, EventsArgs};
pub use config::Config;
