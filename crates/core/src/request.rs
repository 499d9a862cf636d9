//! Generation request types and validation.
//!
//! A [`NewGeneration`] is immutable once accepted: validation happens
//! up front, before a record is created and long before any credits
//! are touched.

use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::DbId;

// ---------------------------------------------------------------------------
// Prompt length bounds
// ---------------------------------------------------------------------------

/// Minimum accepted prompt length after trimming.
pub const MIN_PROMPT_CHARS: usize = 3;
/// Maximum accepted prompt length after trimming.
pub const MAX_PROMPT_CHARS: usize = 2000;

// ---------------------------------------------------------------------------
// Image model
// ---------------------------------------------------------------------------

/// The external image-generation model to invoke.
///
/// Unrecognized slugs normalize silently to [`ImageModel::default`] —
/// a bad `model` field is never a request error.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImageModel {
    FluxDev,
    FluxPro,
    Sdxl,
}

impl Default for ImageModel {
    fn default() -> Self {
        Self::FluxDev
    }
}

impl ImageModel {
    /// Stable slug used on the wire and in the `generations` table.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::FluxDev => "flux-dev",
            Self::FluxPro => "flux-pro",
            Self::Sdxl => "sdxl",
        }
    }

    /// Parse a slug, returning `None` for unknown values.
    pub fn from_slug(slug: &str) -> Option<Self> {
        match slug.trim().to_ascii_lowercase().as_str() {
            "flux-dev" => Some(Self::FluxDev),
            "flux-pro" => Some(Self::FluxPro),
            "sdxl" => Some(Self::Sdxl),
            _ => None,
        }
    }

    /// Resolve an optional caller-supplied slug to a model.
    ///
    /// Missing or unrecognized values fall back to the default model.
    pub fn normalize(slug: Option<&str>) -> Self {
        slug.and_then(Self::from_slug).unwrap_or_default()
    }
}

// ---------------------------------------------------------------------------
// Request
// ---------------------------------------------------------------------------

/// An accepted generation request. Constructed only via
/// [`NewGeneration::accept`], so every instance carries a trimmed,
/// length-checked prompt and a normalized model.
#[derive(Debug, Clone, Serialize)]
pub struct NewGeneration {
    pub user_id: DbId,
    pub user_prompt: String,
    pub uploaded_image_refs: Vec<String>,
    pub preferred_style: Option<String>,
    pub preferred_mood: Option<String>,
    pub topic: Option<String>,
    pub model: ImageModel,
}

impl NewGeneration {
    /// Validate raw caller input and produce an immutable request.
    ///
    /// The prompt is trimmed and must land in
    /// [`MIN_PROMPT_CHARS`]..=[`MAX_PROMPT_CHARS`]; the model slug is
    /// normalized (never rejected).
    #[allow(clippy::too_many_arguments)]
    pub fn accept(
        user_id: DbId,
        user_prompt: &str,
        uploaded_image_refs: Vec<String>,
        preferred_style: Option<String>,
        preferred_mood: Option<String>,
        topic: Option<String>,
        model: Option<&str>,
    ) -> Result<Self, CoreError> {
        let user_prompt = validate_prompt(user_prompt)?;
        Ok(Self {
            user_id,
            user_prompt,
            uploaded_image_refs,
            preferred_style: non_empty(preferred_style),
            preferred_mood: non_empty(preferred_mood),
            topic: non_empty(topic),
            model: ImageModel::normalize(model),
        })
    }
}

/// Trim and length-check a user prompt, returning the trimmed value.
pub fn validate_prompt(raw: &str) -> Result<String, CoreError> {
    let trimmed = raw.trim();
    let len = trimmed.chars().count();
    if len < MIN_PROMPT_CHARS {
        return Err(CoreError::Validation(format!(
            "Prompt must be at least {MIN_PROMPT_CHARS} characters after trimming, got {len}"
        )));
    }
    if len > MAX_PROMPT_CHARS {
        return Err(CoreError::Validation(format!(
            "Prompt must be at most {MAX_PROMPT_CHARS} characters after trimming, got {len}"
        )));
    }
    Ok(trimmed.to_string())
}

/// Collapse `Some("")` / whitespace-only strings to `None`.
fn non_empty(value: Option<String>) -> Option<String> {
    value.and_then(|s| {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        }
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    // -- Prompt validation --

    #[test]
    fn prompt_within_bounds_accepted() {
        assert_eq!(validate_prompt("  a gaming thumbnail  ").unwrap(), "a gaming thumbnail");
    }

    #[test]
    fn prompt_exactly_three_chars_accepted() {
        assert_eq!(validate_prompt(" cat ").unwrap(), "cat");
    }

    #[test]
    fn prompt_too_short_rejected() {
        assert_matches!(validate_prompt("  ab  "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn prompt_whitespace_only_rejected() {
        assert_matches!(validate_prompt("   "), Err(CoreError::Validation(_)));
    }

    #[test]
    fn prompt_at_max_accepted() {
        let prompt = "x".repeat(MAX_PROMPT_CHARS);
        assert!(validate_prompt(&prompt).is_ok());
    }

    #[test]
    fn prompt_over_max_rejected() {
        let prompt = "x".repeat(MAX_PROMPT_CHARS + 1);
        assert_matches!(validate_prompt(&prompt), Err(CoreError::Validation(_)));
    }

    // -- Model normalization --

    #[test]
    fn known_model_slug_parsed() {
        assert_eq!(ImageModel::normalize(Some("flux-pro")), ImageModel::FluxPro);
        assert_eq!(ImageModel::normalize(Some(" SDXL ")), ImageModel::Sdxl);
    }

    #[test]
    fn unknown_model_slug_defaults_silently() {
        assert_eq!(ImageModel::normalize(Some("dall-e-9000")), ImageModel::default());
    }

    #[test]
    fn missing_model_defaults() {
        assert_eq!(ImageModel::normalize(None), ImageModel::FluxDev);
    }

    #[test]
    fn slug_round_trips() {
        for model in [ImageModel::FluxDev, ImageModel::FluxPro, ImageModel::Sdxl] {
            assert_eq!(ImageModel::from_slug(model.as_str()), Some(model));
        }
    }

    // -- Request acceptance --

    #[test]
    fn accept_normalizes_optional_fields() {
        let req = NewGeneration::accept(
            1,
            "Create a gaming thumbnail",
            vec![],
            Some("  ".to_string()),
            Some("shocked".to_string()),
            None,
            Some("bogus-model"),
        )
        .unwrap();
        assert_eq!(req.preferred_style, None);
        assert_eq!(req.preferred_mood.as_deref(), Some("shocked"));
        assert_eq!(req.model, ImageModel::FluxDev);
    }

    #[test]
    fn accept_rejects_short_prompt() {
        let result = NewGeneration::accept(1, "ab", vec![], None, None, None, None);
        assert_matches!(result, Err(CoreError::Validation(_)));
    }
}
