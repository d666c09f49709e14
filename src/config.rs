/// Environment variable holding the fallback JSON context.
pub const JSON_CONTEXT_VAR: &str = "CEL_JSON_CONTEXT";
/// Environment variable holding the fallback one-shot expression.
pub const EXPRESSION_VAR: &str = "CEL_EXPRESSION";

/// Ambient settings read from the process environment once at startup.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Config {
    /// Raw value of `CEL_JSON_CONTEXT`, if set.
    pub json_context: Option<String>,
    /// Raw value of `CEL_EXPRESSION`, if set. An empty value still counts as set.
    pub expression: Option<String>,
}

impl Config {
    pub fn from_env() -> Self {
        Self {
            json_context: std::env::var(JSON_CONTEXT_VAR).ok(),
            expression: std::env::var(EXPRESSION_VAR).ok(),
        }
    }
}
