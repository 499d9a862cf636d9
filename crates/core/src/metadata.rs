//! Structural descriptors for requests and catalog references.
//!
//! [`UserMetadata`] is derived from the caller's prompt (and uploaded
//! images) by the vision adapter; every field is optional and partial
//! results are normal. [`ThumbnailDescriptors`] is the curated,
//! pre-extracted counterpart stored with each catalog reference.
//!
//! The keyword hint tables below deliberately stay small, fixed
//! string-matching heuristics. They back-fill whatever the analysis
//! service could not supply.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// User metadata
// ---------------------------------------------------------------------------

/// Descriptors derived from a generation request. Partial by design:
/// any field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserMetadata {
    pub mood: Option<String>,
    pub lighting: Option<String>,
    pub subject_position: Option<String>,
    pub emotional_expression: Option<String>,
    pub text_position: Option<String>,
    pub contrast: Option<String>,
}

impl UserMetadata {
    /// `true` when no descriptor was derived at all.
    pub fn is_empty(&self) -> bool {
        self.mood.is_none()
            && self.lighting.is_none()
            && self.subject_position.is_none()
            && self.emotional_expression.is_none()
            && self.text_position.is_none()
            && self.contrast.is_none()
    }

    /// Fill every absent field from `fallback`, keeping present values.
    pub fn merge_missing(mut self, fallback: &UserMetadata) -> Self {
        self.mood = self.mood.or_else(|| fallback.mood.clone());
        self.lighting = self.lighting.or_else(|| fallback.lighting.clone());
        self.subject_position = self
            .subject_position
            .or_else(|| fallback.subject_position.clone());
        self.emotional_expression = self
            .emotional_expression
            .or_else(|| fallback.emotional_expression.clone());
        self.text_position = self.text_position.or_else(|| fallback.text_position.clone());
        self.contrast = self.contrast.or_else(|| fallback.contrast.clone());
        self
    }
}

// ---------------------------------------------------------------------------
// Reference descriptors
// ---------------------------------------------------------------------------

/// Compositional descriptors extracted from one catalog thumbnail.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ThumbnailDescriptors {
    pub subject_position: Option<String>,
    pub text_position: Option<String>,
    pub text_alignment: Option<String>,
    pub color_palette: Vec<String>,
    pub lighting: Option<String>,
    pub contrast: Option<String>,
    pub mood: Option<String>,
    pub emotional_expression: Option<String>,
    pub has_text: bool,
    pub text_style: Option<String>,
    pub has_face: bool,
    pub face_expression: Option<String>,
    pub has_product: bool,
    pub layer_count: Option<i32>,
    pub symmetry: Option<String>,
    pub depth_of_field: Option<String>,
    pub extracted_prompt: Option<String>,
    /// Extraction confidence in `[0, 1]`.
    pub confidence: f64,
}

// ---------------------------------------------------------------------------
// Keyword hint tables
// ---------------------------------------------------------------------------

/// Prompt substrings that imply a mood descriptor.
pub const MOOD_HINTS: &[(&str, &str)] = &[
    ("shocked", "shocked"),
    ("surprised", "shocked"),
    ("mind-blown", "shocked"),
    ("excited", "excited"),
    ("hype", "excited"),
    ("happy", "happy"),
    ("smiling", "happy"),
    ("angry", "angry"),
    ("furious", "angry"),
    ("serious", "serious"),
    ("scared", "fearful"),
    ("terrified", "fearful"),
    ("curious", "curious"),
];

/// Prompt substrings that imply a lighting descriptor.
pub const LIGHTING_HINTS: &[(&str, &str)] = &[
    ("neon", "neon"),
    ("sunset", "golden hour"),
    ("golden hour", "golden hour"),
    ("studio", "studio"),
    ("dramatic", "dramatic"),
    ("dark", "dramatic"),
    ("moody", "dramatic"),
    ("bright", "bright"),
];

/// Prompt substrings that imply a contrast descriptor.
pub const CONTRAST_HINTS: &[(&str, &str)] = &[
    ("high contrast", "high"),
    ("bold", "high"),
    ("punchy", "high"),
    ("soft", "low"),
    ("muted", "low"),
];

/// Prompt substrings that imply subject placement.
pub const SUBJECT_POSITION_HINTS: &[(&str, &str)] = &[
    ("centered", "center"),
    ("center", "center"),
    ("left side", "left"),
    ("right side", "right"),
    ("close-up", "center"),
];

/// Derive best-effort metadata hints from the literal prompt text.
///
/// Used to back-fill fields the vision/LLM analysis left absent, and as
/// the sole source when that service is unavailable. First matching
/// table entry wins per field, so the tables above are ordered by
/// specificity.
pub fn derive_metadata_hints(prompt: &str) -> UserMetadata {
    let lower = prompt.to_lowercase();
    let mood = first_hint(&lower, MOOD_HINTS);

    // A mood cue next to a face cue doubles as the expected facial
    // expression ("shocked face", "smiling person").
    let emotional_expression = if lower.contains("face")
        || lower.contains("expression")
        || lower.contains("person")
    {
        mood.clone()
    } else {
        None
    };

    UserMetadata {
        mood,
        lighting: first_hint(&lower, LIGHTING_HINTS),
        subject_position: first_hint(&lower, SUBJECT_POSITION_HINTS),
        emotional_expression,
        text_position: None,
        contrast: first_hint(&lower, CONTRAST_HINTS),
    }
}

fn first_hint(lower_prompt: &str, table: &[(&str, &str)]) -> Option<String> {
    table
        .iter()
        .find(|(needle, _)| lower_prompt.contains(needle))
        .map(|(_, value)| (*value).to_string())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
