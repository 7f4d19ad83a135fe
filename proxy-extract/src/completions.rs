//! Legacy completions request extractor: the `prompt` field, either a
//! single string or an array of strings.

use crate::{navigate_mut, RequestExtractor};
use proxy_core::{Address, ExtractError, MaskedSpan, PlaceholderContext, TextSpan};
use proxy_mask::ResponseUnmasker;
use serde_json::Value;

#[derive(Debug, Default, Clone, Copy)]
pub struct CompletionsExtractor;

impl CompletionsExtractor {
    pub fn new() -> Self {
        Self
    }
}

impl RequestExtractor for CompletionsExtractor {
    fn extract(&self, request: &Value) -> Result<Vec<TextSpan>, ExtractError> {
        let prompt = request
            .get("prompt")
            .ok_or_else(|| ExtractError::MalformedField {
                field: "prompt".to_string(),
                reason: "missing".to_string(),
            })?;

        let mut spans = Vec::new();
        match prompt {
            Value::String(text) => spans.push(TextSpan::new(Address::field("prompt"), text.clone())),
            Value::Array(items) => {
                for (i, item) in items.iter().enumerate() {
                    let Value::String(text) = item else {
                        return Err(ExtractError::MalformedField {
                            field: format!("prompt[{i}]"),
                            reason: "expected a string".to_string(),
                        });
                    };
                    let addr = Address::field("prompt").push_index(i);
                    spans.push(TextSpan::new(addr, text.clone()));
                }
            }
            other => {
                return Err(ExtractError::MalformedField {
                    field: "prompt".to_string(),
                    reason: format!("unsupported shape: {other}"),
                });
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
                if let Some(Value::String(text)) = choice.get_mut("text") {
                    *text = unmasker.unmask(text, context);
                }
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn extracts_single_string_prompt() {
        let request = json!({"prompt": "My API key is sk_live_12345"});
        let spans = CompletionsExtractor::new().extract(&request).unwrap();
        assert_eq!(spans.len(), 1);
        assert_eq!(spans[0].address, Address::field("prompt"));
    }

    #[test]
    fn extracts_array_of_prompts_in_order() {
        let request = json!({"prompt": ["first", "second"]});
        let spans = CompletionsExtractor::new().extract(&request).unwrap();
        assert_eq!(spans.len(), 2);
        assert_eq!(spans[0].text, "first");
        assert_eq!(spans[1].text, "second");
    }

    #[test]
    fn unmask_response_restores_choice_text() {
        let mut ctx = PlaceholderContext::new();
        ctx.allocate("API_KEY", "sk_live_12345");
        let response = json!({"choices": [{"text": "key is [[API_KEY_1]]"}]});
        let unmasker = ResponseUnmasker::restoring();
        let out = CompletionsExtractor::new().unmask_response(&response, &unmasker, &ctx);
        assert_eq!(out["choices"][0]["text"], "key is sk_live_12345");
    }
}
