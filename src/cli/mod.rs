//! CLI layer: argument grammar, command implementations, and output
//! formatting for `index | query | research | eval` (`spec.md` §6).

pub mod commands;
pub mod output;
pub mod parser;

pub use commands::execute;
pub use parser::{Cli, Commands, QueryArgs};
