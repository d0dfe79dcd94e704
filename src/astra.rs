//! Main module for the astra parsing engine

pub mod config;
pub mod diagnostics;
pub mod formats;
pub mod parsing;
pub mod testing;
pub mod tokens;
