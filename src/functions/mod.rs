use rscel::{CelError, CelResult, CelValue};
use std::collections::HashMap;
use std::ops::RangeInclusive;
use std::sync::Arc;

pub mod strings;

/// Trait for functions bound into the CEL environment on top of the engine's defaults.
///
/// `this` is the receiver of a method-style call (`"abc".reverse()`) and
/// `CelValue::Null` for a plain call.
pub trait Function: Send + Sync {
    fn name(&self) -> &'static str;
    /// Accepted number of arguments, receiver excluded.
    fn arity(&self) -> RangeInclusive<usize>;
    fn call(&self, this: CelValue, args: &[CelValue]) -> CelResult<CelValue>;
}

/// Check arity, then dispatch. Errors come back as CEL error values.
pub fn invoke(f: &dyn Function, this: CelValue, args: &[CelValue]) -> CelValue {
    if !f.arity().contains(&args.len()) {
        return CelValue::from_err(CelError::argument(&format!(
            "{}() expects {} argument(s), got {}",
            f.name(),
            describe_arity(&f.arity()),
            args.len()
        )));
    }
    match f.call(this, args) {
        Ok(value) => value,
        Err(err) => CelValue::from_err(err),
    }
}

fn describe_arity(range: &RangeInclusive<usize>) -> String {
    if range.start() == range.end() {
        range.start().to_string()
    } else {
        format!("{}..={}", range.start(), range.end())
    }
}

/// Thread-safe function registry.
#[derive(Clone, Default)]
pub struct Registry {
    inner: Arc<HashMap<&'static str, Arc<dyn Function>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// The string extension set enabled by `--enableStringExt`.
    pub fn with_string_ext() -> Self {
        let mut registry = Self::new();
        registry.register(strings::LowerAscii);
        registry.register(strings::UpperAscii);
        registry.register(strings::CharAt);
        registry.register(strings::IndexOf);
        registry.register(strings::LastIndexOf);
        registry.register(strings::Substring);
        registry.register(strings::Reverse);
        registry.register(strings::Join);
        registry
    }

    pub fn register<F: Function + 'static>(&mut self, f: F) {
        let mut_map = Arc::make_mut(&mut self.inner);
        mut_map.insert(f.name(), Arc::new(f));
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &Arc<dyn Function>)> {
        self.inner.iter().map(|(name, f)| (*name, f))
    }
}
