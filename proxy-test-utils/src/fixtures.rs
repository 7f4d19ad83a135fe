//! Sample provider request/response bodies for integration tests.

use serde_json::{json, Value};

pub fn chat_request_with_pii() -> Value {
    json!({
        "model": "gpt-4",
        "messages": [
            {"role": "system", "content": "Be concise."},
            {"role": "user", "content": "Email Dr. Sarah Chen at sarah@hospital.org"}
        ],
        "stream": false
    })
}

pub fn chat_request_multimodal() -> Value {
    json!({
        "model": "gpt-4-vision",
        "messages": [
            {"role": "user", "content": [
                {"type": "text", "text": "Who is this? Contact john@example.com"},
                {"type": "image_url", "image_url": {"url": "https://example.com/a.png"}}
            ]}
        ],
        "stream": false
    })
}

pub fn completions_request_with_secret() -> Value {
    json!({
        "model": "text-davinci-003",
        "prompt": "My API key is sk_live_12345 and email is john@example.com",
        "stream": false
    })
}

pub fn chat_completion_response(content: &str) -> Value {
    json!({
        "id": "chatcmpl-test",
        "object": "chat.completion",
        "choices": [
            {"index": 0, "message": {"role": "assistant", "content": content}, "finish_reason": "stop"}
        ]
    })
}

pub fn completions_response(text: &str) -> Value {
    json!({
        "id": "cmpl-test",
        "object": "text_completion",
        "choices": [{"index": 0, "text": text, "finish_reason": "stop"}]
    })
}
