//! Glob-style search patterns for object basenames
//!
//! `*` matches any run of characters, `?` exactly one character, everything
//! else (including `.`) is literal. Matching is case-sensitive and covers the
//! whole basename.

use regex::Regex;

use crate::error::{Error, Result};

#[derive(Debug, Clone)]
pub struct SearchPattern {
    pattern: String,
    compiled: Regex,
}

impl SearchPattern {
    pub fn new(pattern: &str) -> Result<Self> {
        let source = if pattern.is_empty() { "*" } else { pattern };
        let compiled =
            Regex::new(&glob_to_regex(source)).map_err(|source| Error::InvalidPattern {
                pattern: pattern.to_string(),
                source,
            })?;

        Ok(Self {
            pattern: pattern.to_string(),
            compiled,
        })
    }

    pub fn matches(&self, basename: &str) -> bool {
        self.compiled.is_match(basename)
    }

    pub fn as_str(&self) -> &str {
        &self.pattern
    }
}

fn glob_to_regex(pattern: &str) -> String {
    let mut regex = String::with_capacity(pattern.len() * 2 + 2);
    regex.push('^');
    for ch in pattern.chars() {
        match ch {
            '*' => regex.push_str(".*"),
            '?' => regex.push('.'),
            other => {
                let mut buf = [0u8; 4];
                regex.push_str(&regex::escape(other.encode_utf8(&mut buf)));
            }
        }
    }
    regex.push('$');
    regex
}
