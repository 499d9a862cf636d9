//! Reference matching: scores catalog entries against request-derived
//! metadata and picks the best exemplar.
//!
//! The similarity score is a weighted agreement over six descriptor
//! dimensions. A dimension enters the denominator whenever the request
//! metadata supplies it; it enters the numerator when the reference
//! agrees. The result is always in `[0, 1]`.

use serde::{Deserialize, Serialize};

use crate::metadata::{ThumbnailDescriptors, UserMetadata};
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Dimension weights
// ---------------------------------------------------------------------------

pub const WEIGHT_SUBJECT_POSITION: f64 = 15.0;
pub const WEIGHT_MOOD: f64 = 20.0;
pub const WEIGHT_LIGHTING: f64 = 15.0;
pub const WEIGHT_EMOTIONAL_EXPRESSION: f64 = 15.0;
pub const WEIGHT_TEXT_POSITION: f64 = 10.0;
pub const WEIGHT_CONTRAST: f64 = 10.0;

// ---------------------------------------------------------------------------
// Catalog entry
// ---------------------------------------------------------------------------

/// One matchable catalog reference: identity, ranking signal, and the
/// extracted descriptors. Built by the catalog cache from active rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub id: DbId,
    pub title: String,
    pub category: Option<String>,
    pub style: Option<String>,
    /// Historical click-through strength in `[0, 1]`.
    pub viral_score: f64,
    pub descriptors: ThumbnailDescriptors,
}

/// The outcome of matching: which reference won and how strongly it
/// agreed with the request metadata.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MatchResult {
    pub reference_id: DbId,
    /// Weighted agreement in `[0, 1]`. `0.0` for a weak match (no
    /// comparable fields).
    pub match_score: f64,
}

// ---------------------------------------------------------------------------
// Similarity
// ---------------------------------------------------------------------------

/// Compute the weighted similarity between request metadata and one
/// reference's descriptors.
///
/// Returns `None` when the request metadata supplies no comparable
/// field at all — the caller then falls back to viral-score ordering.
pub fn similarity(user: &UserMetadata, reference: &ThumbnailDescriptors) -> Option<f64> {
    let pairs: [(Option<&str>, Option<&str>, f64); 6] = [
        (
            user.subject_position.as_deref(),
            reference.subject_position.as_deref(),
            WEIGHT_SUBJECT_POSITION,
        ),
        (user.mood.as_deref(), reference.mood.as_deref(), WEIGHT_MOOD),
        (
            user.lighting.as_deref(),
            reference.lighting.as_deref(),
            WEIGHT_LIGHTING,
        ),
        (
            user.emotional_expression.as_deref(),
            reference.emotional_expression.as_deref(),
            WEIGHT_EMOTIONAL_EXPRESSION,
        ),
        (
            user.text_position.as_deref(),
            reference.text_position.as_deref(),
            WEIGHT_TEXT_POSITION,
        ),
        (
            user.contrast.as_deref(),
            reference.contrast.as_deref(),
            WEIGHT_CONTRAST,
        ),
    ];

    let mut matched = 0.0;
    let mut considered = 0.0;
    for (requested, actual, weight) in pairs {
        let Some(requested) = requested else { continue };
        considered += weight;
        if actual.is_some_and(|a| fields_agree(requested, a)) {
            matched += weight;
        }
    }

    if considered == 0.0 {
        None
    } else {
        Some(matched / considered)
    }
}

fn fields_agree(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Pick the best match for a request from the catalog.
///
/// Candidate restriction, in order of precedence:
/// 1. `topic_candidates` — a precomputed preference list of reference
///    ids for the request topic, when available.
/// 2. `style` — all entries whose style equals the requested style.
/// 3. Otherwise every entry.
///
/// Returns `None` only when the candidate set itself is empty; a set
/// with no comparable metadata still yields the top-viral candidate as
/// a weak match with score `0.0`. Ties break by score descending, then
/// viral score descending, then id ascending.
pub fn select_best_match<'a>(
    user: &UserMetadata,
    entries: &'a [CatalogEntry],
    topic_candidates: Option<&[DbId]>,
    style: Option<&str>,
) -> Option<(&'a CatalogEntry, MatchResult)> {
    let candidates: Vec<&CatalogEntry> = match topic_candidates {
        Some(ids) if !ids.is_empty() => entries.iter().filter(|e| ids.contains(&e.id)).collect(),
        _ => match style {
            Some(style) => entries
                .iter()
                .filter(|e| e.style.as_deref().is_some_and(|s| fields_agree(s, style)))
                .collect(),
            None => entries.iter().collect(),
        },
    };

    let mut best: Option<(&CatalogEntry, f64)> = None;
    for entry in candidates {
        let score = similarity(user, &entry.descriptors).unwrap_or(0.0);
        let replace = match best {
            None => true,
            Some((current, best_score)) => {
                score > best_score
                    || (score == best_score && entry.viral_score > current.viral_score)
                    || (score == best_score
                        && entry.viral_score == current.viral_score
                        && entry.id < current.id)
            }
        };
        if replace {
            best = Some((entry, score));
        }
    }

    best.map(|(entry, score)| {
        (
            entry,
            MatchResult {
                reference_id: entry.id,
                match_score: score,
            },
        )
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn full_metadata() -> UserMetadata {
        UserMetadata {
            mood: Some("shocked".into()),
            lighting: Some("dramatic".into()),
            subject_position: Some("center".into()),
            emotional_expression: Some("shocked".into()),
            text_position: Some("top".into()),
            contrast: Some("high".into()),
        }
    }

    fn matching_descriptors() -> ThumbnailDescriptors {
        ThumbnailDescriptors {
            mood: Some("shocked".into()),
            lighting: Some("dramatic".into()),
            subject_position: Some("center".into()),
            emotional_expression: Some("shocked".into()),
            text_position: Some("top".into()),
            contrast: Some("high".into()),
            ..Default::default()
        }
    }

    fn entry(id: DbId, viral: f64, descriptors: ThumbnailDescriptors) -> CatalogEntry {
        CatalogEntry {
            id,
            title: format!("reference {id}"),
            category: Some("gaming".into()),
            style: Some("gaming".into()),
            viral_score: viral,
            descriptors,
        }
    }

    // -- similarity --

    #[test]
    fn identical_metadata_scores_one() {
        assert_eq!(similarity(&full_metadata(), &matching_descriptors()), Some(1.0));
    }

    #[test]
    fn fully_disjoint_metadata_scores_zero() {
        let reference = ThumbnailDescriptors {
            mood: Some("happy".into()),
            lighting: Some("studio".into()),
            subject_position: Some("left".into()),
            emotional_expression: Some("happy".into()),
            text_position: Some("bottom".into()),
            contrast: Some("low".into()),
            ..Default::default()
        };
        assert_eq!(similarity(&full_metadata(), &reference), Some(0.0));
    }

    #[test]
    fn no_comparable_fields_returns_none() {
        assert_eq!(similarity(&UserMetadata::default(), &matching_descriptors()), None);
    }

    #[test]
    fn partial_agreement_is_weight_ratio() {
        // Only mood (20) and lighting (15) supplied; only mood agrees.
        let user = UserMetadata {
            mood: Some("shocked".into()),
            lighting: Some("studio".into()),
            ..Default::default()
        };
        let score = similarity(&user, &matching_descriptors()).unwrap();
        assert!((score - 20.0 / 35.0).abs() < 1e-9);
    }

    #[test]
    fn missing_reference_field_counts_against_score() {
        // User supplies mood + contrast; reference only has mood.
        let user = UserMetadata {
            mood: Some("shocked".into()),
            contrast: Some("high".into()),
            ..Default::default()
        };
        let reference = ThumbnailDescriptors {
            mood: Some("shocked".into()),
            ..Default::default()
        };
        let score = similarity(&user, &reference).unwrap();
        assert!((score - 20.0 / 30.0).abs() < 1e-9);
    }

    #[test]
    fn comparison_ignores_case_and_padding() {
        let user = UserMetadata {
            mood: Some(" Shocked ".into()),
            ..Default::default()
        };
        assert_eq!(similarity(&user, &matching_descriptors()), Some(1.0));
    }

    #[test]
    fn score_always_in_unit_interval() {
        let score = similarity(&full_metadata(), &ThumbnailDescriptors::default()).unwrap();
        assert!((0.0..=1.0).contains(&score));
    }

    // -- select_best_match --

    #[test]
    fn best_scoring_entry_wins() {
        let entries = vec![
            entry(1, 0.9, ThumbnailDescriptors::default()),
            entry(2, 0.1, matching_descriptors()),
        ];
        let (chosen, result) = select_best_match(&full_metadata(), &entries, None, None).unwrap();
        assert_eq!(chosen.id, 2);
        assert_eq!(result.match_score, 1.0);
    }

    #[test]
    fn tie_breaks_by_viral_score_then_id() {
        let entries = vec![
            entry(3, 0.5, matching_descriptors()),
            entry(1, 0.8, matching_descriptors()),
            entry(2, 0.8, matching_descriptors()),
        ];
        let (chosen, _) = select_best_match(&full_metadata(), &entries, None, None).unwrap();
        assert_eq!(chosen.id, 1);
    }

    #[test]
    fn empty_metadata_returns_top_viral_weak_match() {
        let entries = vec![
            entry(1, 0.4, matching_descriptors()),
            entry(2, 0.95, ThumbnailDescriptors::default()),
        ];
        let (chosen, result) =
            select_best_match(&UserMetadata::default(), &entries, None, None).unwrap();
        assert_eq!(chosen.id, 2);
        assert_eq!(result.match_score, 0.0);
    }

    #[test]
    fn topic_candidates_restrict_the_search() {
        let entries = vec![
            entry(1, 0.99, matching_descriptors()),
            entry(2, 0.2, matching_descriptors()),
        ];
        let (chosen, _) =
            select_best_match(&full_metadata(), &entries, Some(&[2]), None).unwrap();
        assert_eq!(chosen.id, 2);
    }

    #[test]
    fn style_filter_applies_without_topic_candidates() {
        let mut other = entry(1, 0.99, matching_descriptors());
        other.style = Some("minimalist".into());
        let entries = vec![other, entry(2, 0.2, matching_descriptors())];
        let (chosen, _) =
            select_best_match(&full_metadata(), &entries, None, Some("gaming")).unwrap();
        assert_eq!(chosen.id, 2);
    }

    #[test]
    fn empty_candidate_set_returns_none() {
        let entries = vec![entry(1, 0.9, matching_descriptors())];
        assert!(select_best_match(&full_metadata(), &entries, None, Some("cooking")).is_none());
        assert!(select_best_match(&full_metadata(), &[], None, None).is_none());
    }
}
