//! Built-in field filters
//!
//! These filters transform request input values before validation. String
//! filters leave non-string values untouched.

use super::registry::FilterRegistry;
use super::{Filterable, Options};
use anyhow::{Context, Result, bail};
use regex::Regex;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::OnceLock;

/// Filter: trim whitespace, or the characters in `charlist`, from both ends
pub fn trim(charlist: Option<String>) -> impl Fn(Value) -> Result<Value> + Send + Sync + Clone {
    move |value: Value| {
        let Some(s) = value.as_str() else {
            return Ok(value);
        };
        let trimmed = match &charlist {
            Some(chars) => s.trim_matches(|c: char| chars.contains(c)),
            None => s.trim(),
        };
        Ok(Value::String(trimmed.to_string()))
    }
}

/// Filter: convert string to uppercase
pub fn uppercase() -> impl Fn(Value) -> Result<Value> + Send + Sync + Clone {
    |value: Value| {
        if let Some(s) = value.as_str() {
            Ok(Value::String(s.to_uppercase()))
        } else {
            Ok(value)
        }
    }
}

/// Filter: convert string to lowercase
pub fn lowercase() -> impl Fn(Value) -> Result<Value> + Send + Sync + Clone {
    |value: Value| {
        if let Some(s) = value.as_str() {
            Ok(Value::String(s.to_lowercase()))
        } else {
            Ok(value)
        }
    }
}

/// Filter: remove markup tags
pub fn strip_tags() -> impl Fn(Value) -> Result<Value> + Send + Sync + Clone {
    |value: Value| {
        static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
        let regex = TAG_REGEX.get_or_init(|| Regex::new(r"(?s)<!--.*?-->|<[^>]*>").unwrap());
        match value.as_str() {
            Some(s) => Ok(Value::String(regex.replace_all(s, "").into_owned())),
            None => Ok(value),
        }
    }
}

/// Filter: remove carriage returns and line feeds
pub fn strip_newlines() -> impl Fn(Value) -> Result<Value> + Send + Sync + Clone {
    |value: Value| match value.as_str() {
        Some(s) => Ok(Value::String(s.replace(['\r', '\n'], ""))),
        None => Ok(value),
    }
}

/// Filter: keep only decimal digits
///
/// Numbers are rendered first, so `-12.5` becomes `"125"`.
pub fn digits() -> impl Fn(Value) -> Result<Value> + Send + Sync + Clone {
    |value: Value| {
        let text = match &value {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            _ => return Ok(value),
        };
        Ok(Value::String(
            text.chars().filter(char::is_ascii_digit).collect(),
        ))
    }
}

/// Filter: keep only alphanumeric characters, optionally whitespace too
pub fn alnum(allow_white_space: bool) -> impl Fn(Value) -> Result<Value> + Send + Sync + Clone {
    move |value: Value| match value.as_str() {
        Some(s) => Ok(Value::String(
            s.chars()
                .filter(|c| c.is_alphanumeric() || (allow_white_space && c.is_whitespace()))
                .collect(),
        )),
        None => Ok(value),
    }
}

/// Filter: regex replacement (`$1` style group references)
pub fn preg_replace(
    pattern: Regex,
    replacement: String,
) -> impl Fn(Value) -> Result<Value> + Send + Sync + Clone {
    move |value: Value| match value.as_str() {
        Some(s) => Ok(Value::String(
            pattern.replace_all(s, replacement.as_str()).into_owned(),
        )),
        None => Ok(value),
    }
}

/// Filter: cast to an integer
///
/// Strings yield their leading integer, or 0. Null and nested values pass through.
pub fn to_int() -> impl Fn(Value) -> Result<Value> + Send + Sync + Clone {
    |value: Value| match &value {
        Value::String(s) => Ok(json!(leading_int(s))),
        Value::Number(n) if n.is_f64() => Ok(json!(n.as_f64().map_or(0, |f| f.trunc() as i64))),
        Value::Bool(b) => Ok(json!(i64::from(*b))),
        _ => Ok(value),
    }
}

/// Filter: cast to a float
///
/// Strings yield their leading number, or 0.0. Null and nested values pass through.
pub fn to_float() -> impl Fn(Value) -> Result<Value> + Send + Sync + Clone {
    |value: Value| match &value {
        Value::String(s) => Ok(json!(leading_float(s))),
        Value::Number(n) => Ok(json!(n.as_f64().unwrap_or(0.0))),
        Value::Bool(b) => Ok(json!(if *b { 1.0 } else { 0.0 })),
        _ => Ok(value),
    }
}

/// Filter: replace empty-ish values with null
///
/// `""`, `"0"`, `0`, `0.0`, `false` and empty arrays become null.
pub fn to_null() -> impl Fn(Value) -> Result<Value> + Send + Sync + Clone {
    |value: Value| {
        if is_falsy(&value) {
            Ok(Value::Null)
        } else {
            Ok(value)
        }
    }
}

/// Filter: cast to a boolean using loose truthiness
pub fn boolean() -> impl Fn(Value) -> Result<Value> + Send + Sync + Clone {
    |value: Value| Ok(Value::Bool(!is_falsy(&value)))
}

/// Filter: round number to specified decimal places
///
/// Values that cannot be rounded at this precision are returned unchanged.
pub fn round_decimals(decimals: u32) -> impl Fn(Value) -> Result<Value> + Send + Sync + Clone {
    let factor = 10_f64.powi(i32::try_from(decimals).unwrap_or(i32::MAX));
    move |value: Value| {
        let Some(num) = value.as_f64() else {
            return Ok(value);
        };
        let rounded = (num * factor).round() / factor;
        if !factor.is_finite() || !rounded.is_finite() {
            return Ok(value);
        }
        Ok(json!(rounded))
    }
}

/// Filter: keep at most `length` characters
pub fn truncate(length: usize) -> impl Fn(Value) -> Result<Value> + Send + Sync + Clone {
    move |value: Value| match value.as_str() {
        Some(s) => Ok(Value::String(s.chars().take(length).collect())),
        None => Ok(value),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty() || s == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(_) => false,
    }
}

fn leading_int(s: &str) -> i64 {
    static INT_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = INT_REGEX.get_or_init(|| Regex::new(r"^\s*[+-]?\d+").unwrap());
    let Some(m) = regex.find(s) else {
        return 0;
    };
    let digits = m.as_str().trim();
    digits.parse().unwrap_or_else(|_| {
        if digits.starts_with('-') {
            i64::MIN
        } else {
            i64::MAX
        }
    })
}

fn leading_float(s: &str) -> f64 {
    static FLOAT_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = FLOAT_REGEX.get_or_init(|| {
        Regex::new(r"^\s*[+-]?(\d+\.?\d*|\.\d+)([eE][+-]?\d+)?").unwrap()
    });
    regex
        .find(s)
        .and_then(|m| m.as_str().trim().parse().ok())
        .unwrap_or(0.0)
}

/// Compile a pattern, accepting `/body/flags` delimited syntax
fn compile_pattern(pattern: &str) -> Result<Regex> {
    let delimited = pattern
        .chars()
        .next()
        .filter(|c| "/#~@!%|".contains(*c))
        .and_then(|delim| {
            let end = pattern.rfind(delim)?;
            (end > 0).then(|| (&pattern[1..end], &pattern[end + 1..]))
        });

    let source = match delimited {
        Some((body, flags)) => {
            let flags: String = flags.chars().filter(|c| "imsx".contains(*c)).collect();
            if flags.is_empty() {
                body.to_string()
            } else {
                format!("(?{}){}", flags, body)
            }
        }
        None => pattern.to_string(),
    };

    Regex::new(&source).with_context(|| format!("invalid pattern '{}'", pattern))
}

// =============================================================================
// Registration
// =============================================================================

#[derive(Debug, Default, Deserialize)]
struct TrimOptions {
    charlist: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AlnumOptions {
    #[serde(default)]
    allow_white_space: bool,
}

#[derive(Debug, Deserialize)]
struct PregReplaceOptions {
    pattern: String,
    #[serde(default)]
    replacement: String,
}

/// Beyond this an f64 has no decimal digits left to round
const MAX_DECIMALS: u32 = 17;

#[derive(Debug, Default, Deserialize)]
struct RoundOptions {
    #[serde(default)]
    decimals: u32,
}

#[derive(Debug, Deserialize)]
struct TruncateOptions {
    length: usize,
}

fn parse_options<T: DeserializeOwned>(options: &Options) -> Result<T> {
    serde_json::from_value(Value::Object(options.clone())).context("invalid options")
}

fn boxed<F: Filterable + 'static>(filter: F) -> Box<dyn Filterable> {
    Box::new(filter)
}

/// Register every built-in filter, with its short aliases
pub fn register_builtins(registry: &mut FilterRegistry) {
    registry.register("StringTrim", |options| {
        let opts: TrimOptions = parse_options(options)?;
        Ok(boxed(trim(opts.charlist)))
    });
    registry.register_fn("StringToLower", lowercase());
    registry.register_fn("StringToUpper", uppercase());
    registry.register_fn("StripTags", strip_tags());
    registry.register_fn("StripNewlines", strip_newlines());
    registry.register_fn("Digits", digits());
    registry.register("Alnum", |options| {
        let opts: AlnumOptions = parse_options(options)?;
        Ok(boxed(alnum(opts.allow_white_space)))
    });
    registry.register("PregReplace", |options| {
        let opts: PregReplaceOptions = parse_options(options)?;
        if opts.pattern.is_empty() {
            bail!("'pattern' must not be empty");
        }
        let pattern = compile_pattern(&opts.pattern)?;
        Ok(boxed(preg_replace(pattern, opts.replacement)))
    });
    registry.register_fn("ToInt", to_int());
    registry.register_fn("ToFloat", to_float());
    registry.register_fn("ToNull", to_null());
    registry.register_fn("Boolean", boolean());
    registry.register("RoundDecimals", |options| {
        let opts: RoundOptions = parse_options(options)?;
        if opts.decimals > MAX_DECIMALS {
            bail!(
                "'decimals' must be at most {}, got {}",
                MAX_DECIMALS,
                opts.decimals
            );
        }
        Ok(boxed(round_decimals(opts.decimals)))
    });
    registry.register("Truncate", |options| {
        let opts: TruncateOptions = parse_options(options)?;
        Ok(boxed(truncate(opts.length)))
    });

    registry.alias("Trim", "StringTrim");
    registry.alias("Lowercase", "StringToLower");
    registry.alias("Uppercase", "StringToUpper");
}
