//! Command-line structure, argument parsing and command routing.
//!
//! Individual command implementations live in `commands`.

pub mod commands;
pub mod output;
pub mod parser;
pub mod utils;
