//! Shape dispatch: inspect a request body's JSON shape and pick the
//! matching extractor, so the orchestrator does not need to know the
//! provider ahead of time (the route already implies it in most setups,
//! but batch/proxy entry points may not).

use crate::RequestExtractor;
use proxy_core::ExtractError;
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestShape {
    ChatCompletions,
    Completions,
}

/// Inspect `request` and decide which extractor shape applies.
/// `messages` implies chat completions; `prompt` implies legacy
/// completions. Neither (or both) is an extraction failure.
pub fn detect_shape(request: &Value) -> Result<RequestShape, ExtractError> {
    let has_messages = request.get("messages").is_some();
    let has_prompt = request.get("prompt").is_some();
    match (has_messages, has_prompt) {
        (true, false) => Ok(RequestShape::ChatCompletions),
        (false, true) => Ok(RequestShape::Completions),
        (false, false) => Err(ExtractError::UnknownShape {
            reason: "request has neither `messages` nor `prompt`".to_string(),
        }),
        (true, true) => Err(ExtractError::UnknownShape {
            reason: "request has both `messages` and `prompt`".to_string(),
        }),
    }
}

/// A `RequestExtractor` that resolves its concrete shape once, at
/// construction, via [`detect_shape`].
pub enum RequestExtractorDyn {
    ChatCompletions(crate::ChatCompletionsExtractor),
    Completions(crate::CompletionsExtractor),
}

impl RequestExtractorDyn {
    pub fn for_request(request: &Value) -> Result<Self, ExtractError> {
        match detect_shape(request)? {
            RequestShape::ChatCompletions => {
                Ok(Self::ChatCompletions(crate::ChatCompletionsExtractor::new()))
            }
            RequestShape::Completions => Ok(Self::Completions(crate::CompletionsExtractor::new())),
        }
    }
}

impl RequestExtractor for RequestExtractorDyn {
    fn extract(&self, request: &Value) -> Result<Vec<proxy_core::TextSpan>, ExtractError> {
        match self {
            Self::ChatCompletions(e) => e.extract(request),
            Self::Completions(e) => e.extract(request),
        }
    }

    fn apply(
        &self,
        request: &Value,
        masked: &[proxy_core::MaskedSpan],
    ) -> Result<Value, ExtractError> {
        match self {
            Self::ChatCompletions(e) => e.apply(request, masked),
            Self::Completions(e) => e.apply(request, masked),
        }
    }

    fn unmask_response(
        &self,
        response: &Value,
        unmasker: &proxy_mask::ResponseUnmasker,
        context: &proxy_core::PlaceholderContext,
    ) -> Value {
        match self {
            Self::ChatCompletions(e) => e.unmask_response(response, unmasker, context),
            Self::Completions(e) => e.unmask_response(response, unmasker, context),
        }
    }
}
