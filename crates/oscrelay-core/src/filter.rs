//! Address filter for the relay's forwarding decision.
//!
//! Pattern syntax:
//! - `*` matches zero or more characters within one path segment (no `/`)
//! - a trailing `/**` matches the bare prefix or the prefix followed by `/`
//!   and anything
//! - everything else is literal (regex metacharacters are escaped)
//!
//! Matching is case-sensitive and anchored at both ends.

use regex::Regex;

use crate::error::{OscRelayError, Result};

/// Translate one glob pattern into an anchored regex source string.
pub fn pattern_to_regex(pattern: &str) -> String {
    let (body, tail) = match pattern.strip_suffix("/**") {
        Some(body) => (body, "(?:/.*)?"),
        None => (pattern, ""),
    };

    let mut out = String::with_capacity(pattern.len() * 2 + 2);
    out.push('^');
    for (i, literal) in body.split('*').enumerate() {
        if i > 0 {
            out.push_str("[^/]*");
        }
        out.push_str(&regex::escape(literal));
    }
    out.push_str(tail);
    out.push('$');
    out
}

/// Compiled forwarding filter. Build once per configuration, reuse per message.
#[derive(Debug, Clone)]
pub struct AddressFilter {
    enabled: bool,
    patterns: Vec<Regex>,
}

impl AddressFilter {
    /// Compile `patterns`. With `enabled == false` patterns are still
    /// compiled so a bad pattern is reported regardless of the flag.
    pub fn compile(enabled: bool, patterns: &[String]) -> Result<Self> {
        let patterns = patterns
            .iter()
            .map(|p| {
                Regex::new(&pattern_to_regex(p)).map_err(|e| {
                    OscRelayError::BadRequest(format!("invalid filter pattern {p:?}: {e}"))
                })
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Self { enabled, patterns })
    }

    /// Filter that forwards everything.
    pub fn pass_all() -> Self {
        Self {
            enabled: false,
            patterns: Vec::new(),
        }
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    /// Forwarding decision for one address.
    pub fn allows(&self, address: &str) -> bool {
        if !self.enabled {
            return true;
        }
        self.patterns.iter().any(|re| re.is_match(address))
    }
}

/// One-shot forwarding decision. Patterns that fail to compile never match.
pub fn should_forward(address: &str, patterns: &[String], enabled: bool) -> bool {
    if !enabled {
        return true;
    }
    patterns.iter().any(|p| {
        Regex::new(&pattern_to_regex(p))
            .map(|re| re.is_match(address))
            .unwrap_or(false)
    })
}
