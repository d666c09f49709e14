use std::io::Write;

use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use crate::args::ParsedArgs;
use crate::config::{Config, JSON_CONTEXT_VAR};
use crate::errors::{CliError, Result};

/// Variable bindings visible to an expression: a JSON object.
#[derive(Clone, Debug, Default, PartialEq, Deserialize)]
#[serde(transparent)]
pub struct Context(Map<String, Value>);

impl Context {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse JSON text; anything other than a top-level object is rejected.
    pub fn from_json_str(text: &str) -> serde_json::Result<Self> {
        serde_json::from_str(text)
    }

    #[cfg(test)]
    pub(crate) fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[cfg(test)]
    pub(crate) fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl From<Map<String, Value>> for Context {
    fn from(map: Map<String, Value>) -> Self {
        Self(map)
    }
}

/// Resolve the evaluation context from `--json`, then `--jsonFile`, then
/// `CEL_JSON_CONTEXT`.
///
/// Problems with the command-line sources are returned as errors. Problems with
/// the environment variable are reported on `diag` and degrade to an empty context.
pub fn resolve_context<W: Write>(
    args: &ParsedArgs,
    config: &Config,
    diag: &mut W,
) -> Result<Context> {
    if let Some(text) = args.json.as_deref() {
        debug!("context from --json");
        return Context::from_json_str(text).map_err(CliError::InlineJson);
    }

    if let Some(path) = args.json_file.as_deref() {
        debug!(path = %path, "context from --jsonFile");
        let text = std::fs::read_to_string(path).map_err(|source| CliError::JsonFileRead {
            path: path.to_string(),
            source,
        })?;
        return Context::from_json_str(&text).map_err(|source| CliError::JsonFileParse {
            path: path.to_string(),
            source,
        });
    }

    from_env(config.json_context.as_deref(), diag)
}

fn from_env<W: Write>(raw: Option<&str>, diag: &mut W) -> Result<Context> {
    let text = match raw {
        Some(text) if !text.is_empty() => text,
        _ => {
            writeln!(
                diag,
                "Warning: Environment variable '{JSON_CONTEXT_VAR}' not set. Using empty context."
            )?;
            return Ok(Context::empty());
        }
    };

    debug!("context from {JSON_CONTEXT_VAR}");
    match Context::from_json_str(text) {
        Ok(ctx) => Ok(ctx),
        Err(e) => {
            writeln!(
                diag,
                "Error parsing JSON from environment variable '{JSON_CONTEXT_VAR}': {e}"
            )?;
            writeln!(diag, "Using empty context due to JSON parsing error.")?;
            Ok(Context::empty())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn args_with_json(json: &str) -> ParsedArgs {
        ParsedArgs {
            json: Some(json.to_string()),
            ..ParsedArgs::default()
        }
    }

    fn env_config(raw: &str) -> Config {
        Config {
            json_context: Some(raw.to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn inline_json_is_parsed() {
        let mut diag = Vec::new();
        let args = args_with_json(r#"{"a":1,"b":[true,null]}"#);
        let ctx = resolve_context(&args, &Config::default(), &mut diag).unwrap();
        assert_eq!(ctx.get("a"), Some(&json!(1)));
        assert_eq!(ctx.get("b"), Some(&json!([true, null])));
        assert!(diag.is_empty());
    }

    #[test]
    fn malformed_inline_json_is_an_error() {
        let args = args_with_json("{not json");
        let err = resolve_context(&args, &Config::default(), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::InlineJson(_)));
        assert!(err.to_string().starts_with("Error parsing --json argument:"));
    }

    #[test]
    fn non_object_inline_json_is_an_error() {
        let args = args_with_json("[1, 2]");
        let err = resolve_context(&args, &Config::default(), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::InlineJson(_)));
    }

    #[test]
    fn inline_json_wins_over_file_and_env() {
        let args = ParsedArgs {
            json: Some(r#"{"from":"inline"}"#.to_string()),
            json_file: Some("/definitely/not/here.json".to_string()),
            ..ParsedArgs::default()
        };
        let config = env_config(r#"{"from":"env"}"#);
        let ctx = resolve_context(&args, &config, &mut Vec::new()).unwrap();
        assert_eq!(ctx.get("from"), Some(&json!("inline")));
    }

    #[test]
    fn missing_file_is_an_error() {
        let args = ParsedArgs {
            json_file: Some("/definitely/not/here.json".to_string()),
            ..ParsedArgs::default()
        };
        let err = resolve_context(&args, &Config::default(), &mut Vec::new()).unwrap_err();
        assert!(matches!(err, CliError::JsonFileRead { .. }));
        assert!(err.to_string().contains("'/definitely/not/here.json'"));
    }

    #[test]
    fn env_context_is_used_without_flags() {
        let mut diag = Vec::new();
        let config = env_config(r#"{"x":"y"}"#);
        let ctx = resolve_context(&ParsedArgs::default(), &config, &mut diag).unwrap();
        assert_eq!(ctx.get("x"), Some(&json!("y")));
        assert!(diag.is_empty());
    }

    #[test]
    fn unset_env_warns_and_yields_empty() {
        let mut diag = Vec::new();
        let ctx = resolve_context(&ParsedArgs::default(), &Config::default(), &mut diag).unwrap();
        assert!(ctx.is_empty());
        let text = String::from_utf8(diag).unwrap();
        assert!(text.contains("CEL_JSON_CONTEXT"));
        assert!(text.starts_with("Warning:"));
    }

    #[test]
    fn empty_env_counts_as_unset() {
        let mut diag = Vec::new();
        let ctx = resolve_context(&ParsedArgs::default(), &env_config(""), &mut diag).unwrap();
        assert!(ctx.is_empty());
        assert!(String::from_utf8(diag).unwrap().starts_with("Warning:"));
    }

    #[test]
    fn invalid_env_json_degrades_to_empty() {
        let mut diag = Vec::new();
        let ctx = resolve_context(&ParsedArgs::default(), &env_config("{oops"), &mut diag).unwrap();
        assert!(ctx.is_empty());
        let text = String::from_utf8(diag).unwrap();
        assert!(text.contains("Error parsing JSON from environment variable 'CEL_JSON_CONTEXT'"));
        assert!(text.contains("Using empty context due to JSON parsing error."));
    }
}
