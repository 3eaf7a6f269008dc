//! Placeholder substitution for translated strings.
//!
//! A placeholder is `{identifier}` where the identifier is one or more ASCII
//! word characters (`[A-Za-z0-9_]`). Substitution is a single left-to-right
//! pass:
//! - a placeholder with a matching entry is replaced by the value verbatim,
//!   and the inserted value is never scanned again;
//! - a placeholder without a matching entry is left exactly as written;
//! - any other brace is ordinary text. There is no escape syntax.

use std::collections::BTreeMap;
use std::fmt;

/// Named replacement values for [`interpolate`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Vars(BTreeMap<String, String>);

impl Vars {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style insert.
    pub fn with(mut self, name: impl Into<String>, value: impl fmt::Display) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl fmt::Display) {
        self.0.insert(name.into(), value.to_string());
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0.get(name).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Parse `name=value` pairs. Items without `=` are skipped.
    pub fn from_pairs<I, S>(pairs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        pairs
            .into_iter()
            .filter_map(|pair| {
                let (name, value) = pair.as_ref().split_once('=')?;
                Some((name.trim().to_string(), value.to_string()))
            })
            .collect()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Vars {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

impl<K: Into<String>, V: Into<String>, const N: usize> From<[(K, V); N]> for Vars {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}

/// Substitute `{name}` placeholders in `template` from `vars`.
pub fn interpolate(template: &str, vars: &Vars) -> String {
    if vars.is_empty() || !template.contains('{') {
        return template.to_string();
    }

    let bytes = template.as_bytes();
    let mut out = String::with_capacity(template.len());
    let mut copied = 0;
    let mut i = 0;

    while i < bytes.len() {
        if bytes[i] != b'{' {
            i += 1;
            continue;
        }
        let start = i + 1;
        let mut end = start;
        while end < bytes.len() && is_word_byte(bytes[end]) {
            end += 1;
        }
        if end > start && end < bytes.len() && bytes[end] == b'}' {
            // Only ASCII bytes were consumed, so both indices sit on char boundaries.
            if let Some(value) = vars.get(&template[start..end]) {
                out.push_str(&template[copied..i]);
                out.push_str(value);
                copied = end + 1;
            }
            i = end + 1;
        } else {
            i += 1;
        }
    }

    out.push_str(&template[copied..]);
    out
}

fn is_word_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}
