use cel_repl::args::ParsedArgs;
use cel_repl::config::Config;
use cel_repl::context::resolve_context;
use cel_repl::{CliError, Context};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use serde_json::{json, Map, Value};
use std::path::PathBuf;

fn temp_file(name: &str, contents: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("cel-repl-{}-{name}", std::process::id()));
    std::fs::write(&path, contents).unwrap();
    path
}

fn context(value: Value) -> Context {
    Context::from(value.as_object().cloned().unwrap())
}

fn file_args(path: &PathBuf) -> ParsedArgs {
    ParsedArgs {
        json_file: Some(path.to_string_lossy().into_owned()),
        ..ParsedArgs::default()
    }
}

#[test]
fn test_json_file_context() {
    let path = temp_file("ok.json", r#"{"service":{"name":"api","replicas":3}}"#);
    let ctx = resolve_context(&file_args(&path), &Config::default(), &mut Vec::new()).unwrap();
    assert_eq!(ctx, context(json!({"service": {"name": "api", "replicas": 3}})));
    std::fs::remove_file(path).ok();
}

#[test]
fn test_malformed_json_file() {
    let path = temp_file("bad.json", "{\"service\":");
    let err = resolve_context(&file_args(&path), &Config::default(), &mut Vec::new()).unwrap_err();
    assert!(matches!(err, CliError::JsonFileParse { .. }));
    std::fs::remove_file(path).ok();
}

#[test]
fn test_file_wins_over_environment() {
    let path = temp_file("env.json", r#"{"from":"file"}"#);
    let config = Config {
        json_context: Some(r#"{"from":"env"}"#.to_string()),
        ..Config::default()
    };
    let mut diag = Vec::new();
    let ctx = resolve_context(&file_args(&path), &config, &mut diag).unwrap();
    assert_eq!(ctx, context(json!({"from": "file"})));
    assert!(diag.is_empty());
    std::fs::remove_file(path).ok();
}

#[test]
fn test_context_feeds_evaluation() {
    let args = ParsedArgs {
        json: Some(r#"{"items":[{"price":2},{"price":5}]}"#.to_string()),
        ..ParsedArgs::default()
    };
    let ctx = resolve_context(&args, &Config::default(), &mut Vec::new()).unwrap();
    let mut ev = cel_repl::compile("items[0].price + items[1].price", false).unwrap();
    assert_eq!(cel_repl::engine::render(&ev.evaluate(&ctx).unwrap()), "7");
}

fn json_leaf() -> impl Strategy<Value = Value> {
    prop_oneof![
        Just(Value::Null),
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(|n| json!(n)),
        "[a-zA-Z0-9 ]{0,12}".prop_map(Value::String),
    ]
}

fn json_value() -> impl Strategy<Value = Value> {
    json_leaf().prop_recursive(3, 24, 4, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..4).prop_map(Value::Array),
            prop::collection::btree_map("[a-z]{1,6}", inner, 0..4)
                .prop_map(|m| Value::Object(m.into_iter().collect())),
        ]
    })
}

proptest! {
    #[test]
    fn inline_json_round_trips(
        entries in prop::collection::btree_map("[a-z_]{1,8}", json_value(), 0..6)
    ) {
        let map: Map<String, Value> = entries.into_iter().collect();
        let text = Value::Object(map.clone()).to_string();
        let args = ParsedArgs { json: Some(text), ..ParsedArgs::default() };
        let mut diag = Vec::new();
        let ctx = resolve_context(&args, &Config::default(), &mut diag).unwrap();
        prop_assert_eq!(ctx, Context::from(map));
        prop_assert!(diag.is_empty());
    }
}
