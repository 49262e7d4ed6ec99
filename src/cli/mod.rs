//! Command-line interface for composing passports

pub mod commands;
pub mod error;
