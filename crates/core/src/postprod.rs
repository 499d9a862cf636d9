//! Post-production planning: a deterministic mapping from a quality
//! assessment to named corrective operations.
//!
//! No pixels are touched here — the plan is handed to the external
//! renderer. Corrective magnitudes are proportional to how far each
//! metric fell below its threshold; the vignette/grain polish pass is
//! always enabled.

use serde::{Deserialize, Serialize};

use crate::quality::{QualityAssessment, METRIC_THRESHOLDS};

// ---------------------------------------------------------------------------
// Effect strength bounds
// ---------------------------------------------------------------------------

/// Smallest corrective strength worth sending to the renderer.
pub const MIN_EFFECT_STRENGTH: f64 = 0.05;
/// Largest corrective strength the renderer accepts.
pub const MAX_EFFECT_STRENGTH: f64 = 0.6;

// ---------------------------------------------------------------------------
// Plan
// ---------------------------------------------------------------------------

/// Named corrective operations for the external renderer. Optional
/// magnitudes are normalized strengths in
/// `[MIN_EFFECT_STRENGTH, MAX_EFFECT_STRENGTH]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostProductionPlan {
    pub vignette: bool,
    pub grain: bool,
    pub brightness_lift: Option<f64>,
    pub contrast_boost: Option<f64>,
    pub saturation_boost: Option<f64>,
    pub sharpen: Option<f64>,
}

impl PostProductionPlan {
    /// Names of the operations this plan enables, in a fixed order.
    pub fn applied_effects(&self) -> Vec<String> {
        let mut effects = Vec::new();
        if self.vignette {
            effects.push("vignette".to_string());
        }
        if self.grain {
            effects.push("grain".to_string());
        }
        if self.brightness_lift.is_some() {
            effects.push("brightness_lift".to_string());
        }
        if self.contrast_boost.is_some() {
            effects.push("contrast_boost".to_string());
        }
        if self.saturation_boost.is_some() {
            effects.push("saturation_boost".to_string());
        }
        if self.sharpen.is_some() {
            effects.push("sharpen".to_string());
        }
        effects
    }
}

// ---------------------------------------------------------------------------
// Planning
// ---------------------------------------------------------------------------

/// Derive a plan from an assessment.
///
/// Each metric below its low threshold enables the matching corrective
/// with a strength proportional to the deficit. The polish pass
/// (vignette + grain) is always on, issues or not.
pub fn plan_post_production(assessment: &QualityAssessment) -> PostProductionPlan {
    let metrics = &assessment.metrics;
    PostProductionPlan {
        vignette: true,
        grain: true,
        brightness_lift: corrective("brightness", metrics.brightness),
        contrast_boost: corrective("contrast", metrics.contrast),
        saturation_boost: corrective("saturation", metrics.saturation),
        sharpen: corrective("sharpness", metrics.sharpness),
    }
}

/// Strength for one metric: `None` when the metric is absent or at or
/// above its threshold, otherwise the clamped deficit fraction.
fn corrective(metric: &str, value: Option<f64>) -> Option<f64> {
    let value = value?;
    let threshold = METRIC_THRESHOLDS.iter().find(|t| t.metric == metric)?;
    if value >= threshold.low {
        return None;
    }
    Some(((threshold.low - value) / 100.0).clamp(MIN_EFFECT_STRENGTH, MAX_EFFECT_STRENGTH))
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::{assess, ImageMetrics};

    #[test]
    fn polish_pass_always_enabled() {
        let plan = plan_post_production(&assess(&ImageMetrics::default()));
        assert!(plan.vignette);
        assert!(plan.grain);
        assert_eq!(plan.applied_effects(), vec!["vignette", "grain"]);
    }

    #[test]
    fn low_contrast_enables_proportional_boost() {
        let metrics = ImageMetrics {
            contrast: Some(15.0),
            ..Default::default()
        };
        let plan = plan_post_production(&assess(&metrics));
        // Deficit of 20 points below the 35 threshold -> 0.2 strength.
        assert_eq!(plan.contrast_boost, Some(0.2));
    }

    #[test]
    fn larger_deficit_yields_stronger_correction() {
        let mild = plan_post_production(&assess(&ImageMetrics {
            brightness: Some(35.0),
            ..Default::default()
        }));
        let severe = plan_post_production(&assess(&ImageMetrics {
            brightness: Some(5.0),
            ..Default::default()
        }));
        assert!(severe.brightness_lift.unwrap() > mild.brightness_lift.unwrap());
    }

    #[test]
    fn strength_is_clamped_to_bounds() {
        let plan = plan_post_production(&assess(&ImageMetrics {
            brightness: Some(39.9),
            ..Default::default()
        }));
        assert_eq!(plan.brightness_lift, Some(MIN_EFFECT_STRENGTH));
    }

    #[test]
    fn healthy_metrics_get_polish_only() {
        let metrics = ImageMetrics {
            brightness: Some(80.0),
            contrast: Some(75.0),
            saturation: Some(70.0),
            sharpness: Some(90.0),
            composition: Some(85.0),
        };
        let plan = plan_post_production(&assess(&metrics));
        assert_eq!(plan.applied_effects(), vec!["vignette", "grain"]);
    }

    #[test]
    fn planning_is_deterministic() {
        let metrics = ImageMetrics {
            brightness: Some(20.0),
            contrast: Some(20.0),
            ..Default::default()
        };
        let assessment = assess(&metrics);
        assert_eq!(plan_post_production(&assessment), plan_post_production(&assessment));
    }
}
