//! actline CLI library module.
//!
//! A thin harness over `actline_core`: it loads a command tree from a TOML
//! file and exposes completion, validation, execution and an outline of the
//! tree as subcommands.
//!
//! # Module Organization
//!
//! - `cli/` - CLI argument parsing and command dispatch

pub mod cli;
