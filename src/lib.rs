//! Evaluate CEL expressions against a JSON context, either once or in a REPL.
//!
//! Parsing and evaluation of the expressions is done by `rscel`; this crate
//! handles arguments, context loading and the prompt loop.

pub mod args;
pub mod config;
pub mod context;
pub mod driver;
pub mod engine;
pub mod errors;
pub mod functions;

pub use context::Context;
pub use engine::{compile, Evaluator};
pub use errors::{CliError, Result};
