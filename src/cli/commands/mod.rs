//! Subcommands of the `smartcab` binary

pub mod run;
pub mod states;
