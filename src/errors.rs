use thiserror::Error; // Import the `Error` derive macro from the `thiserror` crate

// Everything that can go wrong between reading arguments and printing a result
#[derive(Debug, Error)]
pub enum CliError {
    // `--json` text that is not a JSON object
    #[error("Error parsing --json argument: {0}")]
    InlineJson(#[source] serde_json::Error),

    // `--jsonFile` could not be read
    #[error("Error reading or parsing --jsonFile '{path}': {source}")]
    JsonFileRead {
        path: String,
        #[source]
        source: std::io::Error,
    },

    // `--jsonFile` was read but is not a JSON object
    #[error("Error reading or parsing --jsonFile '{path}': {source}")]
    JsonFileParse {
        path: String,
        #[source]
        source: serde_json::Error,
    },

    // Syntax errors reported by the CEL engine
    #[error("compile error: {0}")]
    Compile(String),

    // Errors raised while running a compiled expression
    #[error("evaluation error: {0}")]
    Evaluate(String),

    // Failures writing to the terminal or reading input lines
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

// Type alias for results that use `CliError` as the error type
pub type Result<T> = std::result::Result<T, CliError>;
