//! Span masker: text + disjoint entities + context → masked text.

use proxy_core::{Entity, MaskedSpan, PlaceholderContext, TextSpan};
use std::collections::HashSet;

/// Pre-built whitelist for O(1) "never mask this substring" lookups.
#[derive(Debug, Clone, Default)]
pub struct Whitelist(HashSet<String>);

impl Whitelist {
    pub fn new(entries: impl IntoIterator<Item = impl Into<String>>) -> Self {
        Self(entries.into_iter().map(Into::into).collect())
    }

    /// Whole-match, case-sensitive containment check.
    pub fn contains(&self, text: &str) -> bool {
        self.0.contains(text)
    }
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SpanMasker;

impl SpanMasker {
    pub fn new() -> Self {
        Self
    }

    /// Walk `entities` (must already be disjoint and sorted by start, per
    /// the conflict resolver's contract) left to right, allocating a
    /// placeholder for each non-whitelisted original substring and splicing
    /// it into the output in place of the original text.
    pub fn mask(
        &self,
        span: &TextSpan,
        entities: &[Entity],
        whitelist: &Whitelist,
        context: &mut PlaceholderContext,
    ) -> MaskedSpan {
        let text = span.text.as_str();
        let mut output = String::with_capacity(text.len());
        let mut cursor = 0usize;

        for entity in entities {
            let original = &text[entity.start..entity.end];
            output.push_str(&text[cursor..entity.start]);
            if whitelist.contains(original) {
                output.push_str(original);
            } else {
                let token = context.allocate(&entity.category, original);
                output.push_str(&token);
            }
            cursor = entity.end;
        }
        output.push_str(&text[cursor..]);

        MaskedSpan::new(span.address.clone(), output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxy_core::{Address, EntitySource};

    fn entity(category: &str, start: usize, end: usize) -> Entity {
        Entity::new(category, start, end, 1.0, EntitySource::PiiDetector, 100).unwrap()
    }

    #[test]
    fn masks_person_and_email_in_order() {
        let span = TextSpan::new(
            Address::field("content"),
            "Email Dr. Sarah Chen at sarah@hospital.org",
        );
        let entities = vec![entity("PERSON", 6, 20), entity("EMAIL_ADDRESS", 24, 43)];
        let whitelist = Whitelist::default();
        let mut ctx = PlaceholderContext::new();
        let masked = SpanMasker::new().mask(&span, &entities, &whitelist, &mut ctx);
        assert_eq!(masked.text, "Email [[PERSON_1]] at [[EMAIL_ADDRESS_1]]");
    }

    #[test]
    fn whitelisted_substring_is_emitted_verbatim() {
        let span = TextSpan::new(Address::field("content"), "Claude Code rocks");
        let entities = vec![entity("PERSON", 0, 11)];
        let whitelist = Whitelist::new(["Claude Code"]);
        let mut ctx = PlaceholderContext::new();
        let masked = SpanMasker::new().mask(&span, &entities, &whitelist, &mut ctx);
        assert_eq!(masked.text, "Claude Code rocks");
        assert!(ctx.is_empty());
    }

    #[test]
    fn repeated_original_reuses_same_token() {
        let span = TextSpan::new(Address::field("content"), "Bob and Bob");
        let entities = vec![entity("PERSON", 0, 3), entity("PERSON", 8, 11)];
        let whitelist = Whitelist::default();
        let mut ctx = PlaceholderContext::new();
        let masked = SpanMasker::new().mask(&span, &entities, &whitelist, &mut ctx);
        assert_eq!(masked.text, "[[PERSON_1]] and [[PERSON_1]]");
        assert_eq!(ctx.next_sequence("PERSON"), 2);
    }

    #[test]
    fn no_entities_leaves_text_untouched() {
        let span = TextSpan::new(Address::field("content"), "nothing to mask here");
        let whitelist = Whitelist::default();
        let mut ctx = PlaceholderContext::new();
        let masked = SpanMasker::new().mask(&span, &[], &whitelist, &mut ctx);
        assert_eq!(masked.text, span.text);
    }
}
