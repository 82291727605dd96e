//! Parser for Java-style `.properties` text.
//!
//! Produces an ordered [`PropertyMap`]. Comments (`#`, `!`), blank lines,
//! backslash line continuations and the standard escapes are supported; a
//! duplicate key keeps its first position but takes the last value.

use indexmap::IndexMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::error::{CompareError, Result};

/// A property value with the line its logical line started on.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct PropertyEntry {
    pub value: String,
    /// 1-based line number in the source text.
    pub line: usize,
}

/// Ordered mapping from property key to value, in file order.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PropertyMap {
    entries: IndexMap<String, PropertyEntry>,
}

impl PropertyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite a key. An existing key keeps its position.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>, line: usize) {
        self.entries.insert(
            key.into(),
            PropertyEntry {
                value: value.into(),
                line,
            },
        );
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(|e| e.value.as_str())
    }

    pub fn line_of(&self, key: &str) -> Option<usize> {
        self.entries.get(key).map(|e| e.line)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &PropertyEntry)> {
        self.entries.iter().map(|(k, e)| (k.as_str(), e))
    }

    /// Convert to a flat JSON object of string values, preserving order.
    pub fn to_value(&self) -> Value {
        let map: Map<String, Value> = self
            .entries
            .iter()
            .map(|(k, e)| (k.clone(), Value::String(e.value.clone())))
            .collect();
        Value::Object(map)
    }
}

/// Parse property-file text into a [`PropertyMap`].
pub fn parse_properties(text: &str) -> Result<PropertyMap> {
    let mut map = PropertyMap::new();
    let mut lines = text.lines().enumerate();

    while let Some((idx, raw)) = lines.next() {
        let start_line = idx + 1;
        let first = raw.trim_start();
        if first.is_empty() || first.starts_with('#') || first.starts_with('!') {
            continue;
        }

        let mut logical = first.to_string();
        while ends_with_continuation(&logical) {
            logical.pop();
            match lines.next() {
                Some((_, next)) => logical.push_str(next.trim_start()),
                None => break,
            }
        }

        let (key, value) = split_entry(&logical, start_line)?;
        map.insert(key, value, start_line);
    }

    Ok(map)
}

/// A line continues when it ends with an odd number of backslashes.
fn ends_with_continuation(line: &str) -> bool {
    line.chars().rev().take_while(|&c| c == '\\').count() % 2 == 1
}

fn split_entry(line: &str, line_no: usize) -> Result<(String, String)> {
    let chars: Vec<char> = line.chars().collect();
    let mut i = 0;
    while i < chars.len() {
        match chars[i] {
            '\\' => i += 2,
            '=' | ':' => break,
            c if c.is_whitespace() => break,
            _ => i += 1,
        }
    }
    let key_end = i.min(chars.len());

    let mut j = key_end;
    while j < chars.len() && chars[j].is_whitespace() {
        j += 1;
    }
    if j < chars.len() && (chars[j] == '=' || chars[j] == ':') {
        j += 1;
        while j < chars.len() && chars[j].is_whitespace() {
            j += 1;
        }
    }

    let key = unescape(&chars[..key_end], line_no)?;
    let value = unescape(&chars[j..], line_no)?;
    Ok((key, value))
}

/// Resolve escapes and drop trailing whitespace that was not escaped.
fn unescape(chars: &[char], line_no: usize) -> Result<String> {
    let mut out = String::with_capacity(chars.len());
    let mut keep = 0;
    let mut pending_high: Option<u32> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        i += 1;
        if c != '\\' {
            if pending_high.is_some() {
                return Err(CompareError::parse(line_no, "unpaired surrogate in \\u escape"));
            }
            out.push(c);
            if !c.is_whitespace() {
                keep = out.len();
            }
            continue;
        }

        let Some(&escaped) = chars.get(i) else {
            // A lone trailing backslash at end of input.
            break;
        };
        i += 1;
        let resolved = match escaped {
            't' => '\t',
            'n' => '\n',
            'r' => '\r',
            'f' => '\u{c}',
            'u' => {
                let code = read_hex4(chars, i, line_no)?;
                i += 4;
                match (pending_high.take(), code) {
                    (None, 0xD800..=0xDBFF) => {
                        pending_high = Some(code);
                        continue;
                    }
                    (Some(high), 0xDC00..=0xDFFF) => {
                        let combined = 0x10000 + ((high - 0xD800) << 10) + (code - 0xDC00);
                        char::from_u32(combined).ok_or_else(|| {
                            CompareError::parse(line_no, "invalid surrogate pair in \\u escape")
                        })?
                    }
                    (None, _) => char::from_u32(code).ok_or_else(|| {
                        CompareError::parse(line_no, "unpaired surrogate in \\u escape")
                    })?,
                    (Some(_), _) => {
                        return Err(CompareError::parse(
                            line_no,
                            "unpaired surrogate in \\u escape",
                        ))
                    }
                }
            }
            other => other,
        };
        if pending_high.is_some() {
            return Err(CompareError::parse(line_no, "unpaired surrogate in \\u escape"));
        }
        out.push(resolved);
        keep = out.len();
    }

    if pending_high.is_some() {
        return Err(CompareError::parse(line_no, "unpaired surrogate in \\u escape"));
    }
    out.truncate(keep);
    Ok(out)
}

fn read_hex4(chars: &[char], at: usize, line_no: usize) -> Result<u32> {
    let digits = chars.get(at..at + 4).ok_or_else(|| {
        CompareError::parse(line_no, "malformed \\uxxxx escape: expected four hex digits")
    })?;
    digits.iter().try_fold(0u32, |acc, c| {
        c.to_digit(16).map(|d| acc * 16 + d).ok_or_else(|| {
            CompareError::parse(
                line_no,
                format!("malformed \\uxxxx escape: '{c}' is not a hex digit"),
            )
        })
    })
}
