//! One-shot and interactive evaluation.
//!
//! The mode is chosen once at startup: an expression from `--eval` or
//! `CEL_EXPRESSION` runs once, otherwise a prompt loop reads one expression per line.

use std::io::{BufRead, Write};

use tracing::debug;

use crate::args::ParsedArgs;
use crate::config::Config;
use crate::context::Context;
use crate::engine;
use crate::errors::Result;

const BANNER: &str = "CEL REPL. Enter expressions. Type '.exit' or press Ctrl+D to quit.";
const PROMPT: &str = "> ";
const EXIT_COMMAND: &str = ".exit";

/// How the process should terminate.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    Success,
    Failure,
}

impl Exit {
    pub fn code(self) -> i32 {
        match self {
            Exit::Success => 0,
            Exit::Failure => 1,
        }
    }
}

/// Which of the two modes a run uses.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mode {
    OneShot(String),
    Repl,
}

impl Mode {
    /// `--eval` wins over `CEL_EXPRESSION`; either one selects one-shot mode even when empty.
    pub fn select(args: &ParsedArgs, config: &Config) -> Self {
        match args.eval.as_ref().or(config.expression.as_ref()) {
            Some(expr) => Mode::OneShot(expr.clone()),
            None => Mode::Repl,
        }
    }
}

/// Evaluate one expression into a rendered result.
fn eval_line(expression: &str, context: &Context, enable_string_ext: bool) -> Result<String> {
    let mut evaluator = engine::compile(expression, enable_string_ext)?;
    let value = evaluator.evaluate(context)?;
    Ok(engine::render(&value))
}

/// Compile and evaluate `expression` once.
///
/// Any failure is reported on `err` and yields [`Exit::Failure`].
pub fn run_once<O: Write, E: Write>(
    expression: &str,
    context: &Context,
    enable_string_ext: bool,
    out: &mut O,
    err: &mut E,
) -> Result<Exit> {
    debug!(expression, "one-shot");
    match eval_line(expression, context, enable_string_ext) {
        Ok(rendered) => {
            writeln!(out, "{rendered}")?;
            Ok(Exit::Success)
        }
        Err(e) => {
            writeln!(err, "Error evaluating CEL expression: {e}")?;
            Ok(Exit::Failure)
        }
    }
}

/// Read-eval-print loop until `.exit` or end of input.
///
/// Expression errors are reported on `err` and the loop continues; only I/O
/// failures on the streams themselves end it with an error. Input that is not
/// valid UTF-8 is decoded lossily.
pub fn run_repl<I: BufRead, O: Write, E: Write>(
    mut input: I,
    context: &Context,
    enable_string_ext: bool,
    out: &mut O,
    err: &mut E,
) -> Result<Exit> {
    writeln!(out, "{BANNER}")?;
    let mut buf = Vec::new();
    loop {
        write!(out, "{PROMPT}")?;
        out.flush()?;

        buf.clear();
        if input.read_until(b'\n', &mut buf)? == 0 {
            break;
        }
        let decoded = String::from_utf8_lossy(&buf);
        let line = decoded.trim_end_matches(&['\n', '\r'][..]);
        let trimmed = line.trim();
        if trimmed == EXIT_COMMAND {
            break;
        }
        if trimmed.is_empty() {
            continue;
        }

        match eval_line(line, context, enable_string_ext) {
            Ok(rendered) => writeln!(out, "{rendered}")?,
            Err(e) => writeln!(err, "Error: {e}")?,
        }
    }
    writeln!(out, "Exiting REPL.")?;
    Ok(Exit::Success)
}

/// Run the selected mode against an already resolved context.
pub fn run<I: BufRead, O: Write, E: Write>(
    mode: &Mode,
    context: &Context,
    enable_string_ext: bool,
    input: I,
    out: &mut O,
    err: &mut E,
) -> Result<Exit> {
    match mode {
        Mode::OneShot(expression) => run_once(expression, context, enable_string_ext, out, err),
        Mode::Repl => run_repl(input, context, enable_string_ext, out, err),
    }
}
