//! Command implementations for Podgen CLI

pub mod completions;
pub mod install;
