//! Fuzz test for `StreamTransformer`'s chunk-boundary safety.
//!
//! Feeds the same SSE byte stream through the transformer two ways: as one
//! big push, and split into arbitrary-sized pieces (the split points come
//! from the fuzz input itself). The two runs must produce byte-identical
//! output - chunking is an artifact of the transport, not something that
//! should change what the reader sees.

#![no_main]

use libfuzzer_sys::fuzz_target;
use proxy_core::PlaceholderContext;
use proxy_mask::{StreamShape, StreamTransformer};

/// Split `data` into pieces using every other byte of `data` as a length
/// hint, so the same fuzz input both supplies the stream content and
/// chooses how it gets chopped up.
fn chunk(data: &[u8]) -> Vec<&[u8]> {
    let mut pieces = Vec::new();
    let mut rest = data;
    while !rest.is_empty() {
        let hint = rest[0] as usize % 8 + 1;
        let take = hint.min(rest.len());
        let (piece, remainder) = rest.split_at(take);
        pieces.push(piece);
        rest = remainder;
    }
    pieces
}

fn run(pieces: &[&str], context: &PlaceholderContext) -> String {
    let mut transformer = StreamTransformer::new(StreamShape::ChatDelta);
    let mut out = String::new();
    for piece in pieces {
        out.push_str(&transformer.push(piece, context));
    }
    out.push_str(&transformer.finish(context));
    out
}

fuzz_target!(|data: &[u8]| {
    let Ok(text) = std::str::from_utf8(data) else {
        return;
    };

    let mut context = PlaceholderContext::new();
    context.allocate("PERSON", "Sarah Chen");
    context.allocate("EMAIL_ADDRESS", "sarah@hospital.org");

    let whole = run(&[text], &context);

    let byte_pieces = chunk(data);
    let mut str_pieces = Vec::with_capacity(byte_pieces.len());
    let mut valid = true;
    for piece in &byte_pieces {
        match std::str::from_utf8(piece) {
            Ok(s) => str_pieces.push(s),
            Err(_) => {
                valid = false;
                break;
            }
        }
    }
    if !valid {
        return;
    }

    let chunked = run(&str_pieces, &context);
    assert_eq!(whole, chunked, "chunk boundaries changed stream output");
});
