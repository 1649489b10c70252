//! CLI subcommand implementations.

pub mod events;
