//! The placeholder bijection and the `[[CATEGORY_N]]` wire grammar.
//!
//! The literal framing `[[` ... `]]` is a hard part of the wire contract:
//! downstream unmasking and the stream transformer rely on it being exactly
//! this shape. Any future format change is a breaking change.

use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashMap;

/// Matches a complete placeholder token and captures (category, sequence
/// number). `CATEGORY` is `[A-Z][A-Z0-9_]*`; `N` is decimal, no padding.
pub static PLACEHOLDER_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\[\[([A-Z][A-Z0-9_]*)_([0-9]+)\]\]").expect("valid regex"));

/// Format a placeholder token for `category` and sequence number `n`.
pub fn format_placeholder(category: &str, n: u64) -> String {
    format!("[[{category}_{n}]]")
}

/// A mutable bookkeeping record scoped to a single request.
///
/// Invariants upheld by this type:
///   - forward and reverse mappings are exact inverses
///   - `allocate(category, original)` returns the same token on every call
///     with the same arguments within the same context (stability)
///   - counters are monotonically non-decreasing, one per category, with no
///     gaps and no repeats (1, 2, 3, ...)
#[derive(Debug, Clone, Default)]
pub struct PlaceholderContext {
    forward: HashMap<String, String>,
    reverse: HashMap<String, String>,
    counters: HashMap<String, u64>,
}

impl PlaceholderContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate (or recall) a placeholder for `original` in `category`.
    ///
    /// Idempotent: if `original` already has a token in this context, that
    /// same token is returned and no counter advances.
    pub fn allocate(&mut self, category: &str, original: &str) -> String {
        if let Some(existing) = self.reverse.get(original) {
            return existing.clone();
        }
        let counter = self.counters.entry(category.to_string()).or_insert(0);
        *counter += 1;
        let token = format_placeholder(category, *counter);
        self.forward.insert(token.clone(), original.to_string());
        self.reverse.insert(original.to_string(), token.clone());
        token
    }

    /// Look up the original substring a token stands for, if this context
    /// issued it.
    pub fn lookup(&self, token: &str) -> Option<&str> {
        self.forward.get(token).map(String::as_str)
    }

    /// The next sequence number that would be assigned for `category`,
    /// mainly useful in tests asserting counter monotonicity.
    pub fn next_sequence(&self, category: &str) -> u64 {
        self.counters.get(category).copied().unwrap_or(0) + 1
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    /// Union `other` into `self`. On a forward-key conflict the existing
    /// mapping in `self` wins; per-category counters advance to the maximum
    /// of the two contexts.
    pub fn merge(&mut self, other: PlaceholderContext) {
        for (token, original) in other.forward {
            self.forward.entry(token).or_insert(original);
        }
        for (original, token) in other.reverse {
            self.reverse.entry(original).or_insert(token);
        }
        for (category, count) in other.counters {
            let entry = self.counters.entry(category).or_insert(0);
            *entry = (*entry).max(count);
        }
    }

    /// Replace every complete placeholder token in `text` using `resolve`.
    /// Tokens `resolve` returns `None` for (placeholders this context never
    /// issued) are left unchanged.
    pub fn replace_placeholders(
        text: &str,
        resolve: impl Fn(&str, &str) -> Option<String>,
    ) -> String {
        PLACEHOLDER_RE
            .replace_all(text, |caps: &regex::Captures| {
                let token = &caps[0];
                let category = &caps[1];
                resolve(token, category).unwrap_or_else(|| token.to_string())
            })
            .into_owned()
    }
}
