//! CLI command implementations

pub mod compose;
