//! Proptest strategies for generating `Entity` values and interval sets,
//! shared between the conflict resolver's and span masker's property tests.

use proxy_core::{Entity, EntitySource};
use proptest::prelude::*;

/// A category drawn from a small fixed vocabulary, to make same-category
/// merges exercise-able without an unbounded alphabet.
pub fn category_strategy() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("PERSON"),
        Just("EMAIL_ADDRESS"),
        Just("API_KEY"),
        Just("LOCATION"),
    ]
}

/// A valid entity over a text of length `text_len`: start/end satisfy
/// `0 <= start < end <= text_len`.
pub fn entity_strategy(text_len: usize) -> impl Strategy<Value = Entity> {
    (0..text_len, 1..=text_len, category_strategy(), 0.0f32..1.0f32).prop_map(
        move |(start, width, category, score)| {
            let start = start.min(text_len.saturating_sub(1));
            let end = (start + width).min(text_len).max(start + 1);
            Entity::new(category, start, end, score, EntitySource::PiiDetector, text_len)
                .expect("constructed within bounds")
        },
    )
}

/// A small set of (possibly overlapping) entities over one text of length
/// `text_len`.
pub fn entity_set_strategy(text_len: usize, max_len: usize) -> impl Strategy<Value = Vec<Entity>> {
    prop::collection::vec(entity_strategy(text_len), 0..max_len)
}

#[cfg(test)]
mod tests {
    use super::*;

    proptest::proptest! {
        #[test]
        fn generated_entities_satisfy_the_span_invariant(entities in entity_set_strategy(60, 15)) {
            for e in entities {
                proptest::prop_assert!(e.start < e.end);
                proptest::prop_assert!(e.end <= 60);
            }
        }
    }
}
