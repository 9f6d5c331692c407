//! Predicate library backing the filter operators.
//!
//! Every predicate is a pure, total function of the extracted attribute
//! value and the operands given to `filter_by`. A missing operand makes the
//! predicate false; it never panics.

use std::cmp::Ordering;

use regex::Regex;

use crate::value::Value;

/// Size of `actual` lies within `[min, max]`.
pub fn between(actual: &Value, min: &Value, max: &Value) -> bool {
    self::min(actual, min) && self::max(actual, max)
}

/// Strictly below the bound.
pub fn less(actual: &Value, bound: &Value) -> bool {
    compare_to_bound(actual, bound) == Some(Ordering::Less)
}

/// At most the bound.
pub fn max(actual: &Value, bound: &Value) -> bool {
    matches!(
        compare_to_bound(actual, bound),
        Some(Ordering::Less | Ordering::Equal)
    )
}

/// Strictly above the bound.
pub fn more(actual: &Value, bound: &Value) -> bool {
    compare_to_bound(actual, bound) == Some(Ordering::Greater)
}

/// At least the bound.
pub fn min(actual: &Value, bound: &Value) -> bool {
    matches!(
        compare_to_bound(actual, bound),
        Some(Ordering::Greater | Ordering::Equal)
    )
}

/// Loose equality.
pub fn equals(actual: &Value, expected: &Value) -> bool {
    actual.loose_eq(expected)
}

/// Loose inequality.
pub fn different(actual: &Value, expected: &Value) -> bool {
    !actual.loose_eq(expected)
}

/// Substring test for scalars, membership test for arrays and maps.
pub fn contains(actual: &Value, needle: &Value) -> bool {
    match actual {
        Value::Null => false,
        Value::Array(items) => items.iter().any(|item| item.loose_eq(needle)),
        Value::Map(map) => map.values().any(|item| item.loose_eq(needle)),
        scalar => scalar.to_string().contains(&needle.to_string()),
    }
}

/// Negation of [`contains`].
pub fn not_contains(actual: &Value, needle: &Value) -> bool {
    !contains(actual, needle)
}

/// String prefix test.
pub fn starts_with(actual: &Value, prefix: &Value) -> bool {
    !actual.is_null() && actual.to_string().starts_with(&prefix.to_string())
}

/// String suffix test.
pub fn ends_with(actual: &Value, suffix: &Value) -> bool {
    !actual.is_null() && actual.to_string().ends_with(&suffix.to_string())
}

/// Loose membership in a candidate list.
///
/// A single array operand is treated as the candidate list; otherwise the
/// operands themselves are the candidates.
pub fn in_list(actual: &Value, candidates: &[Value]) -> bool {
    candidate_list(candidates)
        .iter()
        .any(|candidate| actual.loose_eq(candidate))
}

/// Negation of [`in_list`].
pub fn not_in_list(actual: &Value, candidates: &[Value]) -> bool {
    !in_list(actual, candidates)
}

/// Regular expression test against the string form of the value.
pub fn matches(actual: &Value, pattern: &Regex) -> bool {
    !actual.is_null() && pattern.is_match(&actual.to_string())
}

/// Trimmed character count is at most the bound.
pub fn max_length(actual: &Value, bound: &Value) -> bool {
    within(text_length(actual), bound, Ordering::Greater)
}

/// Trimmed character count is at least the bound.
pub fn min_length(actual: &Value, bound: &Value) -> bool {
    within(text_length(actual), bound, Ordering::Less)
}

/// Whitespace-separated word count is at most the bound.
pub fn max_words(actual: &Value, bound: &Value) -> bool {
    within(word_count(actual), bound, Ordering::Greater)
}

/// Whitespace-separated word count is at least the bound.
pub fn min_words(actual: &Value, bound: &Value) -> bool {
    within(word_count(actual), bound, Ordering::Less)
}

/// Compiles a `match` operand.
///
/// Delimited patterns such as `/^home/i` are accepted: the delimiters are
/// stripped and trailing `i`, `m`, `s`, `x` flags become inline flags.
/// The `u` flag is accepted and ignored. Anything else is compiled as-is.
pub fn compile_pattern(pattern: &str) -> Result<Regex, regex::Error> {
    Regex::new(&translate_delimited(pattern).unwrap_or_else(|| pattern.to_string()))
}

fn translate_delimited(pattern: &str) -> Option<String> {
    let delimiter = pattern.chars().next()?;
    if !matches!(delimiter, '/' | '#' | '~' | '!' | '@' | '%' | '|') {
        return None;
    }
    let close = pattern.rfind(delimiter).filter(|&i| i > 0)?;
    let body = &pattern[delimiter.len_utf8()..close];
    let flags = &pattern[close + delimiter.len_utf8()..];
    if !flags.chars().all(|c| matches!(c, 'i' | 'm' | 's' | 'x' | 'u')) {
        return None;
    }
    let inline: String = flags.chars().filter(|c| *c != 'u').collect();
    if inline.is_empty() {
        Some(body.to_string())
    } else {
        Some(format!("(?{}){}", inline, body))
    }
}

fn candidate_list(candidates: &[Value]) -> &[Value] {
    match candidates {
        [Value::Array(items)] => items.as_slice(),
        other => other,
    }
}

/// Orders `actual` against a range bound.
///
/// Two non-numeric strings compare lexicographically; everything else
/// compares the size of `actual` with the numeric bound.
fn compare_to_bound(actual: &Value, bound: &Value) -> Option<Ordering> {
    if let (Value::String(a), Value::String(b)) = (actual, bound) {
        if actual.to_number().is_none() && bound.to_number().is_none() {
            return Some(a.as_str().cmp(b.as_str()));
        }
    }
    let bound = bound.to_number()?.to_f64();
    actual.size().partial_cmp(&bound)
}

fn within(measure: usize, bound: &Value, forbidden: Ordering) -> bool {
    match bound.to_number() {
        Some(n) => (measure as f64)
            .partial_cmp(&n.to_f64())
            .is_some_and(|ordering| ordering != forbidden),
        None => false,
    }
}

fn text_length(actual: &Value) -> usize {
    actual.to_string().trim().chars().count()
}

fn word_count(actual: &Value) -> usize {
    actual.to_string().split_whitespace().count()
}
