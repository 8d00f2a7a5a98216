//! Subcommand implementations.

pub mod replay;
