//! Chat-completions request extractor: `messages[i].content`, both the
//! plain-string shape and the multimodal parts-array shape. Only `"text"`
//! parts are extracted; everything else (image_url, input_audio, …) passes
//! through untouched.

use crate::{navigate_mut, RequestExtractor};
use proxy_core::{Address, ExtractError, MaskedSpan, PlaceholderContext, TextSpan};
use proxy_mask::ResponseUnmasker;
use serde_json::Value;

#[derive(Debug, Default, Clone, Copy)]
pub struct ChatCompletionsExtractor;

impl ChatCompletionsExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl RequestExtractor for ChatCompletionsExtractor {
    fn extract(&self, request: &Value) -> Result<Vec<TextSpan>, ExtractError> {
        let messages = request
            .get("messages")
            .and_then(Value::as_array)
            .ok_or_else(|| ExtractError::MalformedField {
                field: "messages".to_string(),
                reason: "missing or not an array".to_string(),
            })?;

        let mut spans = Vec::new();
        for (i, message) in messages.iter().enumerate() {
            let Some(content) = message.get("content") else {
                continue;
            };
            let base = Address::field("messages").push_index(i).push_field("content");
            match content {
                Value::String(text) => spans.push(TextSpan::new(base, text.clone())),
                Value::Array(parts) => {
                    for (j, part) in parts.iter().enumerate() {
                        if part.get("type").and_then(Value::as_str) != Some("text") {
                            continue;
                        }
                        let Some(text) = part.get("text").and_then(Value::as_str) else {
                            continue;
                        };
                        let addr = base.clone().push_index(j).push_field("text");
                        spans.push(TextSpan::new(addr, text.to_string()));
                    }
                }
                Value::Null => {}
                other => {
                    return Err(ExtractError::MalformedField {
                        field: format!("messages[{i}].content"),
                        reason: format!("unsupported shape: {other}"),
                    });
                }
            }
        }
        Ok(spans)
    }

    fn apply(&self, request: &Value, masked: &[MaskedSpan]) -> Result<Value, ExtractError> {
        let mut out = request.clone();
        for span in masked {
            let slot = navigate_mut(&mut out, &span.address).ok_or_else(|| {
                ExtractError::MalformedField {
                    field: span.address.to_string(),
                    reason: "address no longer resolves during reassembly".to_string(),
                }
            })?;
            *slot = Value::String(span.text.clone());
        }
        Ok(out)
    }

    fn unmask_response(
        &self,
        response: &Value,
        unmasker: &ResponseUnmasker,
        context: &PlaceholderContext,
    ) -> Value {
        let mut out = response.clone();
        if let Some(choices) = out.get_mut("choices").and_then(Value::as_array_mut) {
            for choice in choices {
                let Some(content) = choice
                    .get_mut("message")
                    .and_then(|m| m.get_mut("content"))
                else {
                    continue;
                };
                match content {
                    Value::String(text) => {
                        *text = unmasker.unmask(text, context);
                    }
                    Value::Array(parts) => {
                        for part in parts {
                            if part.get("type").and_then(Value::as_str) != Some("text") {
                                continue;
                            }
                            if let Some(Value::String(text)) = part.get_mut("text") {
                                *text = unmasker.unmask(text, context);
                            }
                        }
                    }
                    _ => {}
                }
            }
        }
        out
    }
}
