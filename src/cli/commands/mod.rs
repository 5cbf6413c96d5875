//! CLI command implementations

pub mod completions;
pub mod config;
pub mod emp;
pub mod import;
pub mod qual;
pub mod seed;
