//! Command implementations
//!
//! Each module corresponds to a subcommand in the CLI.

pub mod chart;
pub mod overview;
pub mod settings;
pub mod tables;

pub use tables::Collection;
