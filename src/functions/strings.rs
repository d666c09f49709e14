//! String extension functions.
//!
//! All indexes are code point indexes, not byte offsets.

use itertools::Itertools;
use rscel::{CelError, CelResult, CelValue};
use std::ops::RangeInclusive;

use super::Function;

fn receiver<'a>(name: &str, this: &'a CelValue) -> CelResult<&'a str> {
    match this {
        CelValue::String(s) => Ok(s.as_str()),
        _ => Err(CelError::value(&format!("{name}() can only operate on string"))),
    }
}

fn string_arg<'a>(name: &str, args: &'a [CelValue], idx: usize) -> CelResult<&'a str> {
    match args.get(idx) {
        Some(CelValue::String(s)) => Ok(s.as_str()),
        _ => Err(CelError::argument(&format!(
            "{name}() argument {} must be string",
            idx + 1
        ))),
    }
}

fn int_arg(name: &str, args: &[CelValue], idx: usize) -> CelResult<i64> {
    match args.get(idx) {
        Some(CelValue::Int(i)) => Ok(*i),
        _ => Err(CelError::argument(&format!(
            "{name}() argument {} must be int",
            idx + 1
        ))),
    }
}

fn codepoint_len(s: &str) -> usize {
    s.chars().count()
}

/// Byte offset of code point `cp`; `cp == len` maps to the end of the string.
fn byte_offset(s: &str, cp: usize) -> usize {
    s.char_indices()
        .map(|(b, _)| b)
        .nth(cp)
        .unwrap_or(s.len())
}

fn cp_index(s: &str, byte: usize) -> i64 {
    s[..byte].chars().count() as i64
}

/// Validate an index against `0..=len`.
fn index_arg(name: &str, args: &[CelValue], idx: usize, len: usize) -> CelResult<usize> {
    let value = int_arg(name, args, idx)?;
    if value < 0 || value as usize > len {
        return Err(CelError::value(&format!("{name}(): index out of range: {value}")));
    }
    Ok(value as usize)
}

pub struct LowerAscii;
impl Function for LowerAscii {
    fn name(&self) -> &'static str { "lowerAscii" }
    fn arity(&self) -> RangeInclusive<usize> { 0..=0 }
    fn call(&self, this: CelValue, _args: &[CelValue]) -> CelResult<CelValue> {
        Ok(receiver(self.name(), &this)?.to_ascii_lowercase().into())
    }
}

pub struct UpperAscii;
impl Function for UpperAscii {
    fn name(&self) -> &'static str { "upperAscii" }
    fn arity(&self) -> RangeInclusive<usize> { 0..=0 }
    fn call(&self, this: CelValue, _args: &[CelValue]) -> CelResult<CelValue> {
        Ok(receiver(self.name(), &this)?.to_ascii_uppercase().into())
    }
}

pub struct CharAt;
impl Function for CharAt {
    fn name(&self) -> &'static str { "charAt" }
    fn arity(&self) -> RangeInclusive<usize> { 1..=1 }
    fn call(&self, this: CelValue, args: &[CelValue]) -> CelResult<CelValue> {
        let s = receiver(self.name(), &this)?;
        let idx = index_arg(self.name(), args, 0, codepoint_len(s))?;
        // idx == len yields the empty string
        Ok(s.chars().nth(idx).map(String::from).unwrap_or_default().into())
    }
}

pub struct IndexOf;
impl Function for IndexOf {
    fn name(&self) -> &'static str { "indexOf" }
    fn arity(&self) -> RangeInclusive<usize> { 1..=2 }
    fn call(&self, this: CelValue, args: &[CelValue]) -> CelResult<CelValue> {
        let s = receiver(self.name(), &this)?;
        let needle = string_arg(self.name(), args, 0)?;
        let offset = if args.len() > 1 {
            index_arg(self.name(), args, 1, codepoint_len(s))?
        } else {
            0
        };
        let start = byte_offset(s, offset);
        let found = match s[start..].find(needle) {
            Some(at) => cp_index(s, start + at),
            None => -1,
        };
        Ok(found.into())
    }
}

pub struct LastIndexOf;
impl Function for LastIndexOf {
    fn name(&self) -> &'static str { "lastIndexOf" }
    fn arity(&self) -> RangeInclusive<usize> { 1..=2 }
    fn call(&self, this: CelValue, args: &[CelValue]) -> CelResult<CelValue> {
        let s = receiver(self.name(), &this)?;
        let needle = string_arg(self.name(), args, 0)?;
        let len = codepoint_len(s);
        let offset = if args.len() > 1 {
            index_arg(self.name(), args, 1, len)?
        } else {
            len
        };
        if needle.is_empty() {
            return Ok((offset as i64).into());
        }
        // A match may start at `offset` at the latest.
        let end = byte_offset(s, (offset + codepoint_len(needle)).min(len));
        let found = match s[..end].rfind(needle) {
            Some(at) => cp_index(s, at),
            None => -1,
        };
        Ok(found.into())
    }
}

pub struct Substring;
impl Function for Substring {
    fn name(&self) -> &'static str { "substring" }
    fn arity(&self) -> RangeInclusive<usize> { 1..=2 }
    fn call(&self, this: CelValue, args: &[CelValue]) -> CelResult<CelValue> {
        let s = receiver(self.name(), &this)?;
        let len = codepoint_len(s);
        let start = index_arg(self.name(), args, 0, len)?;
        let end = if args.len() > 1 {
            index_arg(self.name(), args, 1, len)?
        } else {
            len
        };
        if start > end {
            return Err(CelError::value(&format!(
                "substring(): invalid range: start {start} > end {end}"
            )));
        }
        Ok(s[byte_offset(s, start)..byte_offset(s, end)].to_string().into())
    }
}

pub struct Reverse;
impl Function for Reverse {
    fn name(&self) -> &'static str { "reverse" }
    fn arity(&self) -> RangeInclusive<usize> { 0..=0 }
    fn call(&self, this: CelValue, _args: &[CelValue]) -> CelResult<CelValue> {
        Ok(receiver(self.name(), &this)?.chars().rev().collect::<String>().into())
    }
}

pub struct Join;
impl Function for Join {
    fn name(&self) -> &'static str { "join" }
    fn arity(&self) -> RangeInclusive<usize> { 0..=1 }
    fn call(&self, this: CelValue, args: &[CelValue]) -> CelResult<CelValue> {
        let CelValue::List(items) = &this else {
            return Err(CelError::value("join() can only operate on list"));
        };
        let sep = if args.is_empty() { "" } else { string_arg(self.name(), args, 0)? };
        let parts = items
            .iter()
            .map(|item| match item {
                CelValue::String(s) => Ok(s.as_str()),
                _ => Err(CelError::value("join() list elements must be strings")),
            })
            .collect::<CelResult<Vec<_>>>()?;
        Ok(parts.iter().join(sep).into())
    }
}
