//! proxy-extract - Provider-specific request extractors.
//!
//! Each extractor implements the three-operation contract: pull `TextSpan`s
//! out of a request body, reinsert `MaskedSpan`s back by address, and
//! unmask the text-bearing fields of a non-streaming response. The set of
//! providers is closed and small, so this is a plain trait with one
//! implementation per shape rather than a registry.

mod chat;
mod completions;
mod dispatch;

pub use chat::ChatCompletionsExtractor;
pub use completions::CompletionsExtractor;
pub use dispatch::{detect_shape, RequestExtractorDyn, RequestShape};

use proxy_core::{ExtractError, MaskedSpan, PlaceholderContext, TextSpan};
use proxy_mask::ResponseUnmasker;
use serde_json::Value;

/// Shared contract every provider-specific extractor implements.
pub trait RequestExtractor {
    /// Pull an ordered, deterministic list of text spans out of `request`.
    fn extract(&self, request: &Value) -> Result<Vec<TextSpan>, ExtractError>;

    /// Reinsert `masked` spans into a copy of `request` by address.
    fn apply(&self, request: &Value, masked: &[MaskedSpan]) -> Result<Value, ExtractError>;

    /// Unmask every text-bearing field of a non-streaming `response`, per
    /// `unmasker`'s display mode.
    fn unmask_response(
        &self,
        response: &Value,
        unmasker: &ResponseUnmasker,
        context: &PlaceholderContext,
    ) -> Value;
}

/// Navigate `value` to the position named by `address`, returning a mutable
/// reference to the leaf if every segment resolves.
pub(crate) fn navigate_mut<'a>(
    value: &'a mut Value,
    address: &proxy_core::Address,
) -> Option<&'a mut Value> {
    let mut current = value;
    for key in &address.0 {
        current = match key {
            proxy_core::AddressKey::Field(name) => current.get_mut(name)?,
            proxy_core::AddressKey::Index(index) => current.get_mut(*index)?,
        };
    }
    Some(current)
}
