use std::io;
use std::process;

use cel_repl::args::{display_help, ParsedArgs};
use cel_repl::config::Config;
use cel_repl::context::resolve_context;
use cel_repl::driver::{self, Mode};
use tracing_subscriber::EnvFilter;

fn main() {
    // Diagnostics go to stderr; RUST_LOG raises the level.
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    // Parse CLI arguments.
    let args = ParsedArgs::parse_env();
    if args.help {
        if let Err(e) = display_help() {
            eprintln!("{e}");
            process::exit(1);
        }
        process::exit(0);
    }

    // Environment is read once, here.
    let config = Config::from_env();

    let context = match resolve_context(&args, &config, &mut io::stderr()) {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    };

    let mode = Mode::select(&args, &config);
    let outcome = driver::run(
        &mode,
        &context,
        args.enable_string_ext,
        io::stdin().lock(),
        &mut io::stdout(),
        &mut io::stderr(),
    );
    match outcome {
        Ok(exit) => process::exit(exit.code()),
        Err(e) => {
            eprintln!("{e}");
            process::exit(1);
        }
    }
}
