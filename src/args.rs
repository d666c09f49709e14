use std::ffi::OsString;
use std::io::{self, Write};

use clap::{CommandFactory, Parser};

const HELP_MESSAGE: &str = "
Usage: cel-repl [options]

CEL REPL CLI

Options:
  -h, --help                Show this help message and exit.
  --json <json_string>      Provide JSON context directly as a string.
  --jsonFile <file_path>    Provide JSON context from a file.
  --eval <cel_expression>   Evaluate a single CEL expression and exit.
  --enableStringExt         Enable extended string functions.

If no --eval is provided, the CLI will start in REPL mode.
";

/// Command-line options. Every field is optional and parsing never fails:
/// unknown flags and stray positionals are ignored, and a repeated option keeps
/// its last value.
#[derive(Parser, Debug, Default, Clone, PartialEq)]
#[command(
    author,
    about,
    disable_help_flag = true,
    ignore_errors = true,
    args_override_self = true
)]
pub struct ParsedArgs {
    /// Show the usage text and exit
    #[arg(short = 'h', long = "help")]
    pub help: bool,
    /// JSON context as an inline string
    #[arg(long = "json")]
    pub json: Option<String>,
    /// Path to a file holding the JSON context
    #[arg(long = "jsonFile")]
    pub json_file: Option<String>,
    /// Expression to evaluate once before exiting
    #[arg(long = "eval", allow_hyphen_values = true)]
    pub eval: Option<String>,
    /// Register the string extension functions
    #[arg(long = "enableStringExt")]
    pub enable_string_ext: bool,
    /// Stray positional arguments, accepted and ignored
    #[arg(hide = true)]
    pub positionals: Vec<String>,
}

impl ParsedArgs {
    /// Parse the process arguments.
    pub fn parse_env() -> Self {
        Self::parse_from_iter(std::env::args_os())
    }

    /// Parse an explicit argument list; the first item is the program name.
    pub fn parse_from_iter<I, T>(args: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let known = Self::command();
        Self::try_parse_from(retain_known(&known, args)).unwrap_or_default()
    }
}

/// Drop flag tokens `cmd` does not declare, so clap never stops on them.
///
/// A value-taking option with no value after it is dropped too, unless it
/// accepts values that start with a dash.
fn retain_known<I, T>(cmd: &clap::Command, args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    let tokens: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let mut kept = Vec::with_capacity(tokens.len());
    let mut iter = tokens.into_iter().peekable();

    // Program name.
    if let Some(bin) = iter.next() {
        kept.push(bin);
    }

    while let Some(token) = iter.next() {
        let Some(text) = token.to_str() else {
            kept.push(token);
            continue;
        };

        if text == "--" {
            kept.push(token);
            kept.extend(iter);
            break;
        }

        let arg = if let Some(long) = text.strip_prefix("--") {
            let (name, inline) = match long.split_once('=') {
                Some((name, _)) => (name, true),
                None => (long, false),
            };
            cmd.get_arguments()
                .find(|a| a.get_long() == Some(name))
                .map(|a| (a, inline))
        } else if text.len() > 1 && text.starts_with('-') {
            let shorts: Vec<char> = text[1..].chars().collect();
            let declared = shorts
                .iter()
                .all(|c| cmd.get_arguments().any(|a| a.get_short() == Some(*c)));
            if !declared {
                continue;
            }
            let last = shorts.last().copied();
            cmd.get_arguments()
                .find(|a| a.get_short() == last)
                .map(|a| (a, shorts.len() > 1))
        } else {
            // Positional.
            kept.push(token);
            continue;
        };

        let Some((arg, inline)) = arg else {
            continue;
        };
        if inline || !arg.get_action().takes_values() {
            kept.push(token);
            continue;
        }

        let value_follows = match iter.peek().and_then(|next| next.to_str()) {
            Some(next) => !next.starts_with('-') || arg.is_allow_hyphen_values_set(),
            None => iter.peek().is_some(),
        };
        if value_follows {
            kept.push(token);
            kept.extend(iter.next());
        }
    }
    kept
}

/// Write the fixed usage text.
pub fn write_help<W: Write>(out: &mut W) -> io::Result<()> {
    writeln!(out, "{HELP_MESSAGE}")
}

/// Print the fixed usage text to standard output.
pub fn display_help() -> io::Result<()> {
    write_help(&mut io::stdout().lock())
}
