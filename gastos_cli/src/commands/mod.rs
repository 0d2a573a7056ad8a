//! CLI subcommand implementations.

pub mod refresh;
pub mod show;
