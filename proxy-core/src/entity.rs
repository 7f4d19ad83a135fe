//! Labelled intervals detected over a `TextSpan`.

use crate::MaskError;
use serde::{Deserialize, Serialize};

/// Where an `Entity` came from. The masker never branches on this; it exists
/// purely for diagnostics (logging, test assertions).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub enum EntitySource {
    PiiDetector,
    SecretScanner,
}

/// A labelled half-open interval `[start, end)` over a specific `TextSpan`,
/// with a category name and a confidence score in `[0, 1]`.
///
/// Invariant: `0 <= start < end <= len(span.text)` (enforced by `Entity::new`,
/// a zero-length or out-of-bounds interval is a programmer error upstream
/// and rejected rather than silently accepted).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Entity {
    pub category: String,
    pub start: usize,
    pub end: usize,
    pub score: f32,
    pub source: EntitySource,
}

impl Entity {
    /// Construct an entity, validating the interval against the span length
    /// it was detected over.
    pub fn new(
        category: impl Into<String>,
        start: usize,
        end: usize,
        score: f32,
        source: EntitySource,
        span_len: usize,
    ) -> Result<Self, MaskError> {
        if start >= end || end > span_len {
            return Err(MaskError::InvalidSpan {
                start,
                end,
                len: span_len,
            });
        }
        Ok(Self {
            category: category.into(),
            start,
            end,
            score: score.clamp(0.0, 1.0),
            source,
        })
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        false
    }

    /// True if `self` and `other` overlap or touch at a single point
    /// (`self.end == other.start` or vice versa). Used by the conflict
    /// resolver's same-category merge step.
    pub fn touches_or_overlaps(&self, other: &Entity) -> bool {
        self.start <= other.end && other.start <= self.end
    }

    /// True if `self` and `other` overlap on a non-empty range. Used by the
    /// conflict resolver's cross-category tie-break step, which does *not*
    /// treat single-point contact as a conflict.
    pub fn overlaps(&self, other: &Entity) -> bool {
        self.start < other.end && other.start < self.end
    }

    pub fn text<'a>(&self, span_text: &'a str) -> &'a str {
        &span_text[self.start..self.end]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_zero_length_interval() {
        assert!(Entity::new("PERSON", 3, 3, 0.9, EntitySource::PiiDetector, 10).is_err());
    }

    #[test]
    fn rejects_out_of_bounds_interval() {
        assert!(Entity::new("PERSON", 3, 11, 0.9, EntitySource::PiiDetector, 10).is_err());
    }

    #[test]
    fn touching_intervals_touch_but_do_not_overlap() {
        let a = Entity::new("PERSON", 0, 4, 1.0, EntitySource::PiiDetector, 10).unwrap();
        let b = Entity::new("PERSON", 4, 8, 1.0, EntitySource::PiiDetector, 10).unwrap();
        assert!(a.touches_or_overlaps(&b));
        assert!(!a.overlaps(&b));
    }

    #[test]
    fn score_is_clamped_into_unit_interval() {
        let e = Entity::new("PERSON", 0, 4, 1.5, EntitySource::PiiDetector, 10).unwrap();
        assert_eq!(e.score, 1.0);
    }
}
