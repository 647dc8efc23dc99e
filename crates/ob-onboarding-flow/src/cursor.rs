//! Cursor Advancer
//!
//! The cursor is a question id plus its index in the step's visible list.
//! The index always matches the id's position in the list it was computed
//! from. A stored id that an earlier answer has since hidden is clamped to
//! the nearest still-visible question instead of being treated as an error.

use ob_onboarding_types::QuestionId;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    pub question_id: QuestionId,
    pub index: usize,
}

impl Cursor {
    fn at(visible: &[QuestionId], index: usize) -> Option<Cursor> {
        visible.get(index).map(|id| Cursor {
            question_id: id.clone(),
            index,
        })
    }
}

/// Cursor after a write to `current`.
///
/// On success move to the next visible question, staying on the last one
/// (the review position). On failure the cursor does not move.
pub fn advance(
    visible: &[QuestionId],
    catalog: &[QuestionId],
    current: &QuestionId,
    succeeded: bool,
) -> Option<Cursor> {
    let Some(index) = visible.iter().position(|id| id == current) else {
        return clamp(visible, catalog, Some(current));
    };
    if !succeeded {
        return Cursor::at(visible, index);
    }
    Cursor::at(visible, (index + 1).min(visible.len() - 1))
}

/// Resolve a stored cursor against the current visible list.
///
/// `catalog` is every question of the step in canonical order, visible or
/// not. A hidden stored id moves to the first visible question that follows
/// it in the catalog, or to the last visible question when none follows.
/// Returns `None` only when nothing is visible.
pub fn clamp(
    visible: &[QuestionId],
    catalog: &[QuestionId],
    stored: Option<&QuestionId>,
) -> Option<Cursor> {
    if visible.is_empty() {
        return None;
    }
    let Some(stored) = stored else {
        return Cursor::at(visible, 0);
    };
    if let Some(index) = visible.iter().position(|id| id == stored) {
        return Cursor::at(visible, index);
    }

    let Some(anchor) = catalog.iter().position(|id| id == stored) else {
        tracing::warn!(question_id = %stored, "cursor not in step catalog, resetting");
        return Cursor::at(visible, 0);
    };
    let rank = |id: &QuestionId| catalog.iter().position(|c| c == id);
    let index = visible
        .iter()
        .position(|id| rank(id).is_some_and(|r| r >= anchor))
        .unwrap_or(visible.len() - 1);
    tracing::warn!(
        question_id = %stored,
        clamped_to = %visible[index],
        "cursor question no longer visible, clamped"
    );
    Cursor::at(visible, index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn ids(raw: &[&str]) -> Vec<QuestionId> {
        raw.iter().map(|s| QuestionId::new(*s)).collect()
    }

    #[test]
    fn test_advance_moves_forward_and_stops_at_last() {
        let visible = ids(&["step1.a", "step1.b", "step1.c"]);
        let next = advance(&visible, &visible, &QuestionId::new("step1.a"), true).unwrap();
        assert_eq!(next.question_id.as_str(), "step1.b");
        assert_eq!(next.index, 1);

        let last = advance(&visible, &visible, &QuestionId::new("step1.c"), true).unwrap();
        assert_eq!(last.question_id.as_str(), "step1.c");
        assert_eq!(last.index, 2);
    }

    #[test]
    fn test_failed_validation_never_advances() {
        let visible = ids(&["step1.a", "step1.b"]);
        let same = advance(&visible, &visible, &QuestionId::new("step1.a"), false).unwrap();
        assert_eq!(same.question_id.as_str(), "step1.a");
    }

    #[test]
    fn test_clamp_hidden_cursor_to_next_visible() {
        let catalog = ids(&["step1.a", "step1.b", "step1.c", "step1.d"]);
        let visible = ids(&["step1.a", "step1.d"]);
        let clamped = clamp(&visible, &catalog, Some(&QuestionId::new("step1.b"))).unwrap();
        assert_eq!(clamped.question_id.as_str(), "step1.d");
        assert_eq!(clamped.index, 1);

        let visible = ids(&["step1.a"]);
        let clamped = clamp(&visible, &catalog, Some(&QuestionId::new("step1.c"))).unwrap();
        assert_eq!(clamped.index, 0);
    }

    #[test]
    fn test_clamp_defaults_and_empty() {
        let visible = ids(&["step1.a", "step1.b"]);
        assert_eq!(clamp(&visible, &visible, None).unwrap().index, 0);
        assert!(clamp(&[], &visible, Some(&QuestionId::new("step1.a"))).is_none());
        assert_eq!(
            clamp(&visible, &visible, Some(&QuestionId::new("step9.zzz")))
                .unwrap()
                .index,
            0
        );
    }

    proptest! {
        /// A clamped cursor is always a visible question at its own index.
        #[test]
        fn clamped_cursor_is_in_bounds(
            mask in prop::collection::vec(any::<bool>(), 1..12),
            stored in prop::option::of(0usize..12),
        ) {
            let catalog: Vec<QuestionId> = (0..mask.len())
                .map(|i| QuestionId::new(format!("step1.q{i}")))
                .collect();
            let visible: Vec<QuestionId> = catalog
                .iter()
                .zip(&mask)
                .filter(|(_, shown)| **shown)
                .map(|(id, _)| id.clone())
                .collect();
            let stored = stored.and_then(|i| catalog.get(i));

            match clamp(&visible, &catalog, stored) {
                None => prop_assert!(visible.is_empty()),
                Some(c) => {
                    prop_assert!(c.index < visible.len());
                    prop_assert_eq!(&visible[c.index], &c.question_id);
                    if let Some(stored) = stored {
                        if visible.contains(stored) {
                            prop_assert_eq!(&c.question_id, stored);
                        }
                    }
                }
            }
        }
    }
}
