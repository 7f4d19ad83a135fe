//! Conflict resolver: reduces possibly-overlapping entities to a disjoint,
//! deterministic set, Presidio-compatible.

use proxy_core::Entity;
use std::collections::HashMap;

/// Reduces a list of entities detected over one text to a disjoint list,
/// sorted by start.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConflictResolver;

impl ConflictResolver {
    pub fn new() -> Self {
        Self
    }

    pub fn resolve(&self, entities: Vec<Entity>) -> Vec<Entity> {
        let merged = merge_within_categories(entities);
        let mut retained = resolve_across_categories(merged);
        retained.sort_by_key(|e| e.start);
        retained
    }
}

/// Step 1-2: group by category, then merge intervals that overlap or touch
/// within a category into a single interval whose score is the max of the
/// merged set.
fn merge_within_categories(entities: Vec<Entity>) -> Vec<Entity> {
    let mut by_category: HashMap<String, Vec<Entity>> = HashMap::new();
    for entity in entities {
        by_category.entry(entity.category.clone()).or_default().push(entity);
    }

    let mut merged = Vec::new();
    for (_category, mut group) in by_category {
        group.sort_by_key(|e| e.start);
        let mut current: Option<Entity> = None;
        for entity in group {
            current = Some(match current.take() {
                None => entity,
                Some(mut acc) => {
                    if acc.touches_or_overlaps(&entity) {
                        acc.start = acc.start.min(entity.start);
                        acc.end = acc.end.max(entity.end);
                        if entity.score > acc.score {
                            acc.score = entity.score;
                            acc.source = entity.source;
                        }
                        acc
                    } else {
                        merged.push(acc);
                        entity
                    }
                }
            });
        }
        if let Some(last) = current {
            merged.push(last);
        }
    }
    merged
}

/// Step 3: across categories, greedily retain intervals in priority order
/// (score desc, length desc, start asc, category asc) skipping any interval
/// that overlaps one already retained. This implements the pairwise "keep
/// the higher-scored of any overlapping pair" rule transitively: once the
/// highest-priority interval in an overlapping cluster is retained, every
/// lower-priority interval overlapping it is rejected in turn.
fn resolve_across_categories(mut candidates: Vec<Entity>) -> Vec<Entity> {
    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| b.len().cmp(&a.len()))
            .then_with(|| a.start.cmp(&b.start))
            .then_with(|| a.category.cmp(&b.category))
    });

    let mut retained: Vec<Entity> = Vec::new();
    for candidate in candidates {
        if retained.iter().any(|kept| kept.overlaps(&candidate)) {
            continue;
        }
        retained.push(candidate);
    }
    retained
}

#[cfg(test)]
mod tests {
    use super::*;
    use proxy_core::EntitySource;

    fn entity(category: &str, start: usize, end: usize, score: f32, len: usize) -> Entity {
        Entity::new(category, start, end, score, EntitySource::PiiDetector, len).unwrap()
    }

    #[test]
    fn disjoint_input_passes_through_sorted() {
        let resolver = ConflictResolver::new();
        let entities = vec![
            entity("EMAIL_ADDRESS", 22, 40, 0.95, 40),
            entity("PERSON", 4, 18, 0.85, 40),
        ];
        let resolved = resolver.resolve(entities);
        assert_eq!(resolved.len(), 2);
        assert_eq!(resolved[0].category, "PERSON");
        assert_eq!(resolved[1].category, "EMAIL_ADDRESS");
    }

    /// "john@john.com" — PERSON[0,4] score 0.7 and EMAIL_ADDRESS[0,13] score
    /// 0.9 overlap; only the higher-scored survives.
    #[test]
    fn higher_score_wins_on_overlap() {
        let resolver = ConflictResolver::new();
        let entities = vec![
            entity("PERSON", 0, 4, 0.7, 13),
            entity("EMAIL_ADDRESS", 0, 13, 0.9, 13),
        ];
        let resolved = resolver.resolve(entities);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].category, "EMAIL_ADDRESS");
    }

    #[test]
    fn touching_same_category_intervals_merge() {
        let resolver = ConflictResolver::new();
        let entities = vec![
            entity("PERSON", 0, 4, 0.6, 10),
            entity("PERSON", 4, 8, 0.9, 10),
        ];
        let resolved = resolver.resolve(entities);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].start, 0);
        assert_eq!(resolved[0].end, 8);
        assert_eq!(resolved[0].score, 0.9);
    }

    #[test]
    fn equal_score_ties_break_by_length_then_start_then_category() {
        let resolver = ConflictResolver::new();
        let entities = vec![
            entity("ZEBRA", 0, 10, 0.9, 20),
            entity("ALPHA", 0, 5, 0.9, 20),
        ];
        let resolved = resolver.resolve(entities);
        // ZEBRA is longer (10 vs 5), so it wins despite losing on category order.
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].category, "ZEBRA");
    }

    #[test]
    fn output_is_disjoint_and_sorted_by_start() {
        let resolver = ConflictResolver::new();
        let entities = vec![
            entity("A", 10, 20, 0.5, 30),
            entity("B", 0, 5, 0.9, 30),
            entity("C", 22, 28, 0.6, 30),
        ];
        let resolved = resolver.resolve(entities);
        assert_eq!(resolved.len(), 3);
        for pair in resolved.windows(2) {
            assert!(pair[0].start < pair[1].start);
            assert!(pair[0].end <= pair[1].start);
        }
    }

    #[test]
    fn equal_score_equal_length_ties_break_by_start_then_category() {
        let resolver = ConflictResolver::new();
        // Same score, same length, overlapping; earlier start should win
        // regardless of category ordering.
        let entities = vec![
            entity("ZEBRA", 0, 5, 0.9, 20),
            entity("ALPHA", 2, 7, 0.9, 20),
        ];
        let resolved = resolver.resolve(entities);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].category, "ZEBRA");
    }

    proptest::proptest! {
        #[test]
        fn resolved_output_is_always_pairwise_disjoint_and_sorted(
            raw in proptest::collection::vec(
                (0usize..40, 1usize..10, 0.0f32..1.0f32, 0usize..3),
                0..20,
            )
        ) {
            let categories = ["PERSON", "EMAIL_ADDRESS", "API_KEY"];
            let len = 60usize;
            let entities: Vec<Entity> = raw
                .into_iter()
                .filter_map(|(start, width, score, cat_idx)| {
                    let start = start.min(len - 1);
                    let end = (start + width.max(1)).min(len);
                    if start >= end {
                        return None;
                    }
                    Some(entity(categories[cat_idx], start, end, score, len))
                })
                .collect();

            let resolved = ConflictResolver::new().resolve(entities);

            for pair in resolved.windows(2) {
                proptest::prop_assert!(pair[0].start <= pair[1].start);
                proptest::prop_assert!(pair[0].end <= pair[1].start);
            }
        }
    }
}
