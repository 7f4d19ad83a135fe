//! SSE stream transformer: re-frames the upstream byte stream and unmasks
//! placeholder tokens without ever cutting one across an emit boundary,
//! even when a token is split across arbitrarily many upstream chunks.

use proxy_core::PlaceholderContext;
use serde_json::Value;
use std::collections::HashMap;

const DONE_SENTINEL: &str = "[DONE]";

/// Layer 1: turns an arbitrarily-chunked byte stream into complete SSE
/// frames. A frame is a run of lines terminated by a blank line; frames are
/// emitted only once their terminator has been observed.
#[derive(Debug, Default)]
pub struct SseReframer {
    buffer: String,
}

impl SseReframer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed a chunk of upstream bytes (assumed valid UTF-8, as SSE bodies
    /// are). Returns every complete frame terminated so far, each including
    /// its trailing blank line. Any trailing partial frame is retained.
    pub fn push(&mut self, chunk: &str) -> Vec<String> {
        self.buffer.push_str(chunk);
        let mut frames = Vec::new();
        loop {
            match self.buffer.find("\n\n") {
                Some(idx) => {
                    let frame = self.buffer.drain(..idx + 2).collect::<String>();
                    frames.push(frame);
                }
                None => break,
            }
        }
        frames
    }

    /// Called on upstream EOF: returns whatever partial frame remains,
    /// unterminated, to be emitted as-is.
    pub fn finish(&mut self) -> Option<String> {
        if self.buffer.is_empty() {
            None
        } else {
            Some(std::mem::take(&mut self.buffer))
        }
    }
}

/// Layer 2: per-address rolling carry-over buffers implementing the
/// safe-prefix lookahead rule.
#[derive(Debug, Default)]
struct LookaheadUnmasker {
    carry: HashMap<String, String>,
}

impl LookaheadUnmasker {
    fn new() -> Self {
        Self::default()
    }

    /// Feed new text arriving for `address`. Returns the portion safe to
    /// unmask and emit now; retains the rest as carry-over for next time.
    fn push(&mut self, address: &str, new_text: &str, context: &PlaceholderContext) -> String {
        let mut combined = self.carry.remove(address).unwrap_or_default();
        combined.push_str(new_text);

        let boundary = safe_prefix_boundary(&combined);
        let (safe, rest) = combined.split_at(boundary);
        let rest = rest.to_string();

        let emitted = PlaceholderContext::replace_placeholders(safe, |token, _category| {
            context.lookup(token).map(str::to_string)
        });

        if !rest.is_empty() {
            self.carry.insert(address.to_string(), rest);
        }
        emitted
    }

    /// Flush every remaining carry-over unchanged (a still-partial
    /// placeholder cannot be resolved) and clear state.
    fn finish(&mut self) -> String {
        let mut out = String::new();
        let mut keys: Vec<String> = self.carry.keys().cloned().collect();
        keys.sort();
        for key in keys {
            if let Some(text) = self.carry.remove(&key) {
                out.push_str(&text);
            }
        }
        out
    }
}

/// Scan right-to-left for the last "[[". No occurrence: the whole string is
/// safe. An occurrence with a "]]" somewhere after it: the whole string is
/// safe (the token, and anything following, is complete). An occurrence with
/// no following "]]": everything from that "[[" onward is unsafe.
fn safe_prefix_boundary(s: &str) -> usize {
    match s.rfind("[[") {
        None => s.len(),
        Some(idx) => {
            if s[idx + 2..].contains("]]") {
                s.len()
            } else {
                idx
            }
        }
    }
}

/// Which JSON shape a frame's `data:` payload carries text in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreamShape {
    /// Chat completions: `choices[].delta.content`.
    ChatDelta,
    /// Legacy completions: `choices[].text`.
    CompletionText,
}

/// Drives both layers over one upstream SSE response body, emitting a
/// client-facing byte stream with placeholders unmasked in place.
pub struct StreamTransformer {
    shape: StreamShape,
    reframer: SseReframer,
    lookahead: LookaheadUnmasker,
}

impl StreamTransformer {
    pub fn new(shape: StreamShape) -> Self {
        Self {
            shape,
            reframer: SseReframer::new(),
            lookahead: LookaheadUnmasker::new(),
        }
    }

    /// Feed one chunk of upstream bytes; returns the client-facing bytes
    /// produced so far (possibly empty, if no frame terminator arrived yet).
    pub fn push(&mut self, chunk: &str, context: &PlaceholderContext) -> String {
        let mut out = String::new();
        for frame in self.reframer.push(chunk) {
            out.push_str(&self.transform_frame(&frame, context));
        }
        out
    }

    /// Called once on upstream EOF. Flushes any residual re-framer buffer
    /// (as a final partial frame, transformed as best-effort) and any
    /// residual lookahead carry-over (emitted unchanged).
    pub fn finish(&mut self, context: &PlaceholderContext) -> String {
        let mut out = String::new();
        if let Some(tail) = self.reframer.finish() {
            out.push_str(&self.transform_frame(&tail, context));
        }
        out.push_str(&self.lookahead.finish());
        out
    }

    fn transform_frame(&mut self, frame: &str, context: &PlaceholderContext) -> String {
        let mut out = String::new();
        for line in split_keep_terminator(frame) {
            let (content, terminator) = line;
            if let Some(payload) = content.strip_prefix("data: ").or_else(|| content.strip_prefix("data:")) {
                let payload = payload.trim_start();
                if payload == DONE_SENTINEL {
                    out.push_str(&self.lookahead.finish());
                    out.push_str(content);
                    out.push_str(terminator);
                    continue;
                }
                match serde_json::from_str::<Value>(payload) {
                    Ok(mut value) => {
                        self.unmask_value_in_place(&mut value, context);
                        out.push_str("data: ");
                        out.push_str(&serde_json::to_string(&value).unwrap_or_default());
                        out.push_str(terminator);
                    }
                    Err(_) => {
                        // Not JSON (or not yet fully buffered) - pass through
                        // untouched rather than corrupt an opaque payload.
                        out.push_str(content);
                        out.push_str(terminator);
                    }
                }
            } else {
                out.push_str(content);
                out.push_str(terminator);
            }
        }
        out
    }

    fn unmask_value_in_place(&mut self, value: &mut Value, context: &PlaceholderContext) {
        let field = match self.shape {
            StreamShape::ChatDelta => "delta",
            StreamShape::CompletionText => "text",
        };
        let Some(choices) = value.get_mut("choices").and_then(Value::as_array_mut) else {
            return;
        };
        for (index, choice) in choices.iter_mut().enumerate() {
            let address = format!("choices.{index}.{field}");
            let text_slot = match self.shape {
                StreamShape::ChatDelta => choice
                    .get_mut("delta")
                    .and_then(|d| d.get_mut("content")),
                StreamShape::CompletionText => choice.get_mut("text"),
            };
            let Some(Value::String(text)) = text_slot else {
                continue;
            };
            let emitted = self.lookahead.push(&address, text, context);
            *text = emitted;
        }
    }
}

/// Split `frame` into (line-content-without-terminator, terminator) pairs,
/// where terminator is `"\n"` for every line except none are dropped: this
/// preserves every byte of the original frame when the pieces are
/// concatenated back together.
fn split_keep_terminator(frame: &str) -> Vec<(&str, &str)> {
    let mut out = Vec::new();
    let mut rest = frame;
    while let Some(idx) = rest.find('\n') {
        out.push((&rest[..idx], "\n"));
        rest = &rest[idx + 1..];
    }
    if !rest.is_empty() {
        out.push((rest, ""));
    }
    out
}
