use rscel::{BindContext, CelContext, CelValue};
use serde_json::{json, Map, Number, Value};
use tracing::debug;

use crate::context::Context;
use crate::errors::{CliError, Result};
use crate::functions::{invoke, Registry};

const PROGRAM: &str = "main";

type BoundFunction = Box<dyn Fn(CelValue, Vec<CelValue>) -> CelValue>;

/// A compiled expression, ready to be applied to any number of contexts.
pub struct Evaluator {
    cel: CelContext,
    functions: Registry,
}

/// Compile `expression`, registering the string extension set when `enable_string_ext` is set.
///
/// Syntax errors are reported here; everything else surfaces from [`Evaluator::evaluate`].
pub fn compile(expression: &str, enable_string_ext: bool) -> Result<Evaluator> {
    let functions = if enable_string_ext {
        Registry::with_string_ext()
    } else {
        Registry::new()
    };

    let mut cel = CelContext::new();
    cel.add_program_str(PROGRAM, expression)
        .map_err(|e| CliError::Compile(e.to_string()))?;
    debug!(expression, enable_string_ext, "compiled");

    Ok(Evaluator { cel, functions })
}

impl Evaluator {
    /// Run the expression with every top-level context key bound as a variable.
    pub fn evaluate(&mut self, context: &Context) -> Result<CelValue> {
        let adapters: Vec<(&'static str, BoundFunction)> = self
            .functions
            .iter()
            .map(|(name, f)| {
                let f = f.clone();
                let adapter: BoundFunction = Box::new(move |this: CelValue, args: Vec<CelValue>| {
                    invoke(f.as_ref(), this, &args)
                });
                (name, adapter)
            })
            .collect();

        let mut bindings = BindContext::new();
        for (key, value) in context.iter() {
            bindings.bind_param(key, CelValue::from(value));
        }
        for (name, adapter) in adapters.iter() {
            bindings.bind_func(name, &**adapter);
        }

        let value = self
            .cel
            .exec(PROGRAM, &bindings)
            .map_err(|e| CliError::Evaluate(e.to_string()))?;
        match value {
            CelValue::Err(e) => Err(CliError::Evaluate(e.to_string())),
            value => {
                debug!(%value, "evaluated");
                Ok(value)
            }
        }
    }
}

/// JSON rendering of an engine value, used for printing results.
pub fn to_json(value: &CelValue) -> Value {
    match value {
        CelValue::Int(i) => json!(i),
        CelValue::UInt(u) => json!(u),
        CelValue::Float(f) => Number::from_f64(*f)
            .map(Value::Number)
            .unwrap_or_else(|| Value::String(f.to_string())),
        CelValue::Bool(b) => Value::Bool(*b),
        CelValue::String(s) => Value::String(s.clone()),
        CelValue::Bytes(b) => {
            Value::Array(b.as_slice().iter().map(|byte| json!(byte)).collect())
        }
        CelValue::List(items) => Value::Array(items.iter().map(to_json).collect()),
        CelValue::Map(entries) => Value::Object(
            entries
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect::<Map<String, Value>>(),
        ),
        CelValue::Null => Value::Null,
        CelValue::TimeStamp(ts) => Value::String(ts.to_rfc3339()),
        CelValue::Duration(d) => Value::String(format_duration(d.num_milliseconds())),
        other => Value::String(other.to_string()),
    }
}

/// Render a result for printing. A top-level string prints as-is; every
/// other value prints as one line of compact JSON.
pub fn render(value: &CelValue) -> String {
    match value {
        CelValue::String(s) => s.clone(),
        value => to_json(value).to_string(),
    }
}

fn format_duration(millis: i64) -> String {
    if millis % 1000 == 0 {
        format!("{}s", millis / 1000)
    } else {
        format!("{}s", millis as f64 / 1000.0)
    }
}
