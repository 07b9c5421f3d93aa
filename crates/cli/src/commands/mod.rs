//! CLI subcommand implementations.

pub mod description;
pub mod migrate;
