//! Text spans and their structural addresses within a provider request.

use serde::{Deserialize, Serialize};
use std::fmt;

/// One element of a structural address: a JSON object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum AddressKey {
    Field(String),
    Index(usize),
}

impl fmt::Display for AddressKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressKey::Field(name) => write!(f, ".{name}"),
            AddressKey::Index(i) => write!(f, "[{i}]"),
        }
    }
}

/// An ordered path identifying where a span of text lives inside a request
/// value, e.g. `messages[2].content[0].text` becomes
/// `[Field("messages"), Index(2), Field("content"), Index(0), Field("text")]`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Address(pub Vec<AddressKey>);

impl Address {
    pub fn new(keys: impl IntoIterator<Item = AddressKey>) -> Self {
        Self(keys.into_iter().collect())
    }

    pub fn field(name: impl Into<String>) -> Self {
        Self(vec![AddressKey::Field(name.into())])
    }

    pub fn push_field(mut self, name: impl Into<String>) -> Self {
        self.0.push(AddressKey::Field(name.into()));
        self
    }

    pub fn push_index(mut self, index: usize) -> Self {
        self.0.push(AddressKey::Index(index));
        self
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for key in &self.0 {
            write!(f, "{key}")?;
        }
        Ok(())
    }
}

/// A piece of original text extracted from a request, plus the address it
/// must be reinserted at.
///
/// Invariant: for a given request, the multiset of (address, text) pairs is
/// round-trippable — the extractor that produced a `TextSpan` can reinsert a
/// transformed text at the same address via `apply`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct TextSpan {
    pub address: Address,
    pub text: String,
}

impl TextSpan {
    pub fn new(address: Address, text: impl Into<String>) -> Self {
        Self {
            address,
            text: text.into(),
        }
    }
}

/// A `TextSpan` whose text has been rewritten, carrying the same address.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct MaskedSpan {
    pub address: Address,
    pub text: String,
}

impl MaskedSpan {
    pub fn new(address: Address, text: impl Into<String>) -> Self {
        Self {
            address,
            text: text.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_display_matches_dotted_path() {
        let addr = Address::field("messages").push_index(2).push_field("content");
        assert_eq!(addr.to_string(), ".messages[2].content");
    }

    #[test]
    fn text_span_round_trips_through_masked_span() {
        let addr = Address::field("prompt");
        let span = TextSpan::new(addr.clone(), "hello");
        let masked = MaskedSpan::new(span.address.clone(), "[[PERSON_1]]");
        assert_eq!(masked.address, addr);
    }
}
