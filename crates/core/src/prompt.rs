//! Prompt engineering: deterministic composition, scoring, and
//! feedback-driven refinement of the instruction sent to the image
//! model.
//!
//! Everything here is table-driven string work. The libraries are
//! named constants so tests can enumerate every default, and the same
//! inputs always render byte-identical text. None of these functions
//! fail on missing optional inputs; they degrade to the documented
//! defaults.

use serde::{Deserialize, Serialize};

use crate::metadata::{ThumbnailDescriptors, UserMetadata};
use crate::request::ImageModel;

// ---------------------------------------------------------------------------
// Default resolution tables
// ---------------------------------------------------------------------------

/// Style applied when the request names none.
pub const DEFAULT_STYLE: &str = "professional";
/// Composition instruction used when the reference supplies no
/// placement or symmetry descriptors.
pub const DEFAULT_COMPOSITION: &str =
    "rule of thirds composition with the subject prominently framed";
/// Lighting applied when neither request nor reference supplies one.
pub const DEFAULT_LIGHTING: &str = "dramatic";
/// Mood applied when neither request nor reference supplies one.
pub const DEFAULT_MOOD: &str = "excited";
/// Contrast level applied when neither request nor reference supplies one.
pub const DEFAULT_CONTRAST: &str = "high";
/// Palette line used when the reference has no extracted palette.
pub const DEFAULT_COLOR_PALETTE: &str = "bold complementary colors";

// ---------------------------------------------------------------------------
// Phrase libraries
// ---------------------------------------------------------------------------

/// Style keyword library, keyed by style slug. Order matters:
/// [`generate_prompt_variations`] walks it front to back.
pub const STYLE_KEYWORDS: &[(&str, &str)] = &[
    (
        "professional",
        "clean professional design, polished studio aesthetic",
    ),
    (
        "gaming",
        "bold gaming aesthetic, saturated neon accents, energetic framing",
    ),
    (
        "vibrant",
        "vivid saturated colors, punchy tones, maximum visual pop",
    ),
    (
        "minimalist",
        "minimalist layout, generous negative space, restrained palette",
    ),
    (
        "cinematic",
        "cinematic color grading, film-still framing, moody atmosphere",
    ),
    (
        "dramatic",
        "dramatic staging, deep shadows, heightened emotion",
    ),
];

/// Mood-to-expression phrase library.
pub const MOOD_EXPRESSIONS: &[(&str, &str)] = &[
    (
        "shocked",
        "a shocked, wide-eyed expression with raised eyebrows and an open mouth",
    ),
    (
        "excited",
        "an excited, high-energy expression radiating enthusiasm",
    ),
    ("happy", "a happy, warm, smiling expression"),
    ("serious", "a serious, focused, determined expression"),
    ("curious", "a curious, intrigued, raised-eyebrow expression"),
    ("angry", "an angry, intense, glaring expression"),
    ("fearful", "a fearful, wide-eyed, anxious expression"),
];

/// Fixed quality-keyword block appended to every composed prompt.
pub const QUALITY_KEYWORD_BLOCK: &str =
    "High resolution, 4k quality, sharp focus, highly detailed, professional photography, vivid colors.";

/// Closing call-to-action line.
pub const CALL_TO_ACTION: &str = "Composition should make viewers want to click immediately.";

/// Fixed phrase appended by [`enhance_for_viral_potential`].
pub const VIRAL_PHRASE: &str =
    "Eye-catching, click-worthy, attention-grabbing, engineered for maximum viewer curiosity.";

/// Topic-specific viral keyword lookup. Unknown topics fall back
/// silently to the fixed phrase alone.
pub const TOPIC_VIRAL_KEYWORDS: &[(&str, &str)] = &[
    ("gaming", "epic gameplay moment, esports energy, victory royale intensity"),
    ("tech", "cutting-edge gadget reveal, futuristic glow, unboxing tension"),
    ("cooking", "mouth-watering close-up, steam rising, irresistible texture"),
    ("fitness", "explosive transformation energy, peak athletic form"),
    ("music", "stage-light euphoria, crowd energy, bass-drop moment"),
    ("education", "aha-moment clarity, big bold takeaway, curiosity gap"),
    ("travel", "wanderlust vista, golden-hour landscape, hidden-gem reveal"),
    ("finance", "high-stakes decision moment, rising chart energy"),
];

/// Per-model optimization suffixes (positive guidance plus negative
/// instructions, for models that honor them).
pub const MODEL_SUFFIXES: &[(ImageModel, &str)] = &[
    (
        ImageModel::FluxDev,
        "Render crisp edges and legible text. Avoid: blurry output, distorted faces, watermark artifacts.",
    ),
    (
        ImageModel::FluxPro,
        "Maximize photorealistic detail and dynamic range. Avoid: flat lighting, banding, oversmoothed skin.",
    ),
    (
        ImageModel::Sdxl,
        "Emphasize strong subject separation and clean typography. Avoid: extra limbs, garbled text, low detail.",
    ),
];

// ---------------------------------------------------------------------------
// Scoring term tables
// ---------------------------------------------------------------------------

/// Quality keywords counted by [`score_prompt_quality`].
pub const QUALITY_KEYWORDS: &[&str] = &[
    "high resolution",
    "4k",
    "8k",
    "sharp",
    "detailed",
    "professional",
    "crisp",
    "high quality",
    "vivid",
];

pub const COMPOSITION_TERMS: &[&str] = &[
    "composition",
    "rule of thirds",
    "framing",
    "framed",
    "centered",
    "layout",
    "balance",
];

pub const LIGHTING_TERMS: &[&str] =
    &["lighting", "backlit", "studio light", "golden hour", "neon glow"];

pub const MOOD_TERMS: &[&str] = &[
    "expression", "mood", "shocked", "excited", "happy", "serious", "curious", "angry",
    "fearful", "emotion",
];

pub const COLOR_TERMS: &[&str] = &["color", "palette", "vibrant", "saturated", "tones"];

pub const VIRAL_TERMS: &[&str] = &["eye-catching", "click", "attention", "viral", "curiosity"];

/// Prompt length window that earns the length bonus.
pub const OPTIMAL_LENGTH_RANGE: std::ops::RangeInclusive<usize> = 100..=1000;

// ---------------------------------------------------------------------------
// Composition
// ---------------------------------------------------------------------------

/// Everything the composer consumes. `reference` is the matched
/// catalog entry's descriptors, absent on a null match.
#[derive(Debug, Clone, Copy)]
pub struct PromptInputs<'a> {
    pub user_prompt: &'a str,
    pub user: &'a UserMetadata,
    pub reference: Option<&'a ThumbnailDescriptors>,
    pub preferred_style: Option<&'a str>,
    pub preferred_mood: Option<&'a str>,
}

/// Render the engineered prompt. Composition order is fixed: subject,
/// composition, lighting, mood, style, palette, text (reference-gated),
/// contrast, quality block, call to action.
pub fn compose(inputs: &PromptInputs) -> String {
    let reference = inputs.reference;
    let mut lines: Vec<String> = Vec::with_capacity(10);

    lines.push(format!(
        "Create a YouTube thumbnail: {}.",
        inputs.user_prompt.trim_end_matches('.')
    ));

    lines.push(format!("Composition: {}.", composition_instruction(reference)));

    let lighting = inputs
        .user
        .lighting
        .as_deref()
        .or_else(|| reference.and_then(|r| r.lighting.as_deref()))
        .unwrap_or(DEFAULT_LIGHTING);
    lines.push(format!("Lighting: {lighting} lighting."));

    let mood = resolve_mood(inputs);
    lines.push(format!(
        "The focal subject shows {}.",
        mood_expression(mood)
    ));

    let style = inputs.preferred_style.unwrap_or(DEFAULT_STYLE);
    lines.push(format!("Style: {}.", style_keywords(style)));

    let palette = reference
        .map(|r| r.color_palette.as_slice())
        .filter(|p| !p.is_empty())
        .map(|p| p.join(", "))
        .unwrap_or_else(|| DEFAULT_COLOR_PALETTE.to_string());
    lines.push(format!("Color palette: {palette}."));

    if let Some(r) = reference.filter(|r| r.has_text) {
        let text_style = r.text_style.as_deref().unwrap_or("bold uppercase");
        let text_position = r.text_position.as_deref().unwrap_or("top");
        lines.push(format!(
            "Overlay text in a {text_style} treatment, positioned {text_position}."
        ));
    }

    let contrast = inputs
        .user
        .contrast
        .as_deref()
        .or_else(|| reference.and_then(|r| r.contrast.as_deref()))
        .unwrap_or(DEFAULT_CONTRAST);
    lines.push(format!(
        "Contrast: {contrast} contrast between subject and background."
    ));

    lines.push(QUALITY_KEYWORD_BLOCK.to_string());
    lines.push(CALL_TO_ACTION.to_string());

    lines.join(" ")
}

/// Render the same inputs under the first `n` styles from
/// [`STYLE_KEYWORDS`], for A/B generation.
pub fn generate_prompt_variations(inputs: &PromptInputs, n: usize) -> Vec<String> {
    STYLE_KEYWORDS
        .iter()
        .take(n)
        .map(|&(style, _)| {
            let varied = PromptInputs {
                preferred_style: Some(style),
                ..*inputs
            };
            compose(&varied)
        })
        .collect()
}

/// Append the fixed viral phrase plus topic-specific keywords.
/// Unknown topics fall back silently to the fixed phrase alone.
pub fn enhance_for_viral_potential(prompt: &str, topic: Option<&str>) -> String {
    let mut enhanced = format!("{prompt} {VIRAL_PHRASE}");
    if let Some(keywords) = topic.and_then(topic_viral_keywords) {
        enhanced.push_str(&format!(" Lean into {keywords}."));
    }
    enhanced
}

/// Append the model-specific positive/negative instruction suffix.
pub fn optimize_for_model(prompt: &str, model: ImageModel) -> String {
    let suffix = MODEL_SUFFIXES
        .iter()
        .find(|(m, _)| *m == model)
        .map(|(_, s)| *s)
        .unwrap_or(MODEL_SUFFIXES[0].1);
    format!("{prompt} {suffix}")
}

fn composition_instruction(reference: Option<&ThumbnailDescriptors>) -> String {
    let Some(r) = reference else {
        return DEFAULT_COMPOSITION.to_string();
    };
    match (r.subject_position.as_deref(), r.symmetry.as_deref()) {
        (Some(position), Some(symmetry)) => {
            format!("{position} subject placement with {symmetry} balance")
        }
        (Some(position), None) => format!("{position} subject placement"),
        (None, Some(symmetry)) => format!("{symmetry} balance"),
        (None, None) => DEFAULT_COMPOSITION.to_string(),
    }
}

fn resolve_mood<'a>(inputs: &PromptInputs<'a>) -> &'a str {
    inputs
        .preferred_mood
        .or(inputs.user.mood.as_deref())
        .or_else(|| inputs.reference.and_then(|r| r.mood.as_deref()))
        .unwrap_or(DEFAULT_MOOD)
}

/// Look up the expression phrase for a mood, degrading to a generic
/// phrase that still carries the mood word.
pub fn mood_expression(mood: &str) -> String {
    let lower = mood.to_lowercase();
    MOOD_EXPRESSIONS
        .iter()
        .find(|(key, _)| *key == lower)
        .map(|(_, phrase)| (*phrase).to_string())
        .unwrap_or_else(|| format!("a {lower} expression"))
}

/// Look up the keyword phrase for a style, defaulting to the
/// professional entry for unknown styles.
pub fn style_keywords(style: &str) -> &'static str {
    let lower = style.to_lowercase();
    STYLE_KEYWORDS
        .iter()
        .find(|(key, _)| *key == lower)
        .map(|(_, keywords)| *keywords)
        .unwrap_or(STYLE_KEYWORDS[0].1)
}

fn topic_viral_keywords(topic: &str) -> Option<&'static str> {
    let lower = topic.to_lowercase();
    TOPIC_VIRAL_KEYWORDS
        .iter()
        .find(|(key, _)| *key == lower)
        .map(|(_, keywords)| *keywords)
}

// ---------------------------------------------------------------------------
// Quality scoring
// ---------------------------------------------------------------------------

/// Base score every prompt starts from.
pub const BASE_PROMPT_SCORE: u8 = 50;
/// Quality keyword matches required for the quality bonus.
pub const QUALITY_KEYWORD_BONUS_THRESHOLD: usize = 3;

/// Heuristic quality report for an engineered prompt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PromptQualityReport {
    /// Heuristic score in `[0, 100]`.
    pub score: u8,
    pub strengths: Vec<String>,
    pub weaknesses: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Score a prompt with the fixed keyword heuristics.
///
/// Starts at [`BASE_PROMPT_SCORE`] and awards: +15 for more than
/// [`QUALITY_KEYWORD_BONUS_THRESHOLD`] quality keywords, +10 each for
/// composition, lighting, and mood terms, +5 for color terms, +10 for
/// viral terms, and +5 for landing in [`OPTIMAL_LENGTH_RANGE`]. Absent
/// categories deduct nothing but emit weaknesses and recommendations.
pub fn score_prompt_quality(prompt: &str) -> PromptQualityReport {
    let lower = prompt.to_lowercase();
    let mut score = BASE_PROMPT_SCORE as u32;
    let mut strengths = Vec::new();
    let mut weaknesses = Vec::new();
    let mut recommendations = Vec::new();

    let quality_matches = QUALITY_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .count();
    if quality_matches > QUALITY_KEYWORD_BONUS_THRESHOLD {
        score += 15;
        strengths.push("strong quality keyword coverage".to_string());
    } else {
        weaknesses.push("few quality keywords".to_string());
        recommendations
            .push("add quality keywords such as \"high resolution\" or \"sharp focus\"".to_string());
    }

    let mut category = |terms: &[&str], bonus: u32, name: &str, hint: &str| {
        if terms.iter().any(|t| lower.contains(t)) {
            score += bonus;
            strengths.push(format!("includes {name} direction"));
        } else {
            weaknesses.push(format!("no {name} direction"));
            recommendations.push(hint.to_string());
        }
    };

    category(
        COMPOSITION_TERMS,
        10,
        "composition",
        "describe the composition, e.g. \"rule of thirds\"",
    );
    category(
        LIGHTING_TERMS,
        10,
        "lighting",
        "specify a lighting technique, e.g. \"dramatic lighting\"",
    );
    category(
        MOOD_TERMS,
        10,
        "mood",
        "name the mood or facial expression you want",
    );
    category(
        COLOR_TERMS,
        5,
        "color",
        "call out a color palette or color treatment",
    );
    category(
        VIRAL_TERMS,
        10,
        "viral",
        "add click-appeal language, e.g. \"eye-catching\"",
    );

    if OPTIMAL_LENGTH_RANGE.contains(&prompt.chars().count()) {
        score += 5;
        strengths.push("prompt length in the optimal window".to_string());
    } else if prompt.chars().count() < *OPTIMAL_LENGTH_RANGE.start() {
        weaknesses.push("prompt is very short".to_string());
        recommendations.push("expand the prompt with concrete visual detail".to_string());
    } else {
        weaknesses.push("prompt is very long".to_string());
        recommendations.push("trim the prompt below 1000 characters".to_string());
    }

    PromptQualityReport {
        score: score.min(100) as u8,
        strengths,
        weaknesses,
        recommendations,
    }
}

// ---------------------------------------------------------------------------
// Refinement
// ---------------------------------------------------------------------------

/// Textual feedback driving [`refine_prompt`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PromptFeedback {
    /// Subject to emphasize; the refined prompt always contains it.
    pub needs_more_focus: Option<String>,
    /// Phrase to de-emphasize; repeat occurrences are dropped.
    pub overused_phrase: Option<String>,
    pub adjust_colors: Option<String>,
    pub adjust_lighting: Option<String>,
    pub adjust_composition: Option<String>,
}

/// Rewrite a prompt according to feedback. Purely textual: keeps the
/// first occurrence of an overused phrase, then appends targeted
/// adjustment lines.
pub fn refine_prompt(original: &str, feedback: &PromptFeedback) -> String {
    let mut refined = match feedback.overused_phrase.as_deref() {
        Some(phrase) if !phrase.is_empty() => deemphasize(original, phrase),
        _ => original.to_string(),
    };

    if let Some(focus) = feedback.needs_more_focus.as_deref() {
        refined.push_str(&format!(" Increase focus on {focus}."));
    }
    if let Some(colors) = feedback.adjust_colors.as_deref() {
        refined.push_str(&format!(" Shift the color palette toward {colors}."));
    }
    if let Some(lighting) = feedback.adjust_lighting.as_deref() {
        refined.push_str(&format!(" Relight the scene with {lighting} lighting."));
    }
    if let Some(composition) = feedback.adjust_composition.as_deref() {
        refined.push_str(&format!(" Recompose using {composition}."));
    }
    refined
}

/// Keep the first occurrence of `phrase`, removing the rest.
fn deemphasize(text: &str, phrase: &str) -> String {
    match text.find(phrase) {
        None => text.to_string(),
        Some(idx) => {
            let keep_until = idx + phrase.len();
            let (head, tail) = text.split_at(keep_until);
            let cleaned = tail.replace(phrase, "");
            // Collapse doubled spaces left behind by removal.
            let mut result = String::with_capacity(head.len() + cleaned.len());
            result.push_str(head);
            result.push_str(&cleaned);
            while result.contains("  ") {
                result = result.replace("  ", " ");
            }
            result
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
