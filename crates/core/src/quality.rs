//! Post-synthesis quality assessment.
//!
//! Metrics arrive from the renderer boundary and may be partial or
//! entirely absent; assessment never fails on missing input. The
//! overall score is the unweighted mean over whatever subset is
//! present — absent metrics are excluded, never defaulted to zero.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Metrics
// ---------------------------------------------------------------------------

/// Observed image metrics, each conceptually `0..=100`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageMetrics {
    pub brightness: Option<f64>,
    pub contrast: Option<f64>,
    pub saturation: Option<f64>,
    pub sharpness: Option<f64>,
    pub composition: Option<f64>,
}

impl ImageMetrics {
    /// Iterate `(name, value)` over the metrics that were supplied.
    pub fn present(&self) -> impl Iterator<Item = (&'static str, f64)> {
        [
            ("brightness", self.brightness),
            ("contrast", self.contrast),
            ("saturation", self.saturation),
            ("sharpness", self.sharpness),
            ("composition", self.composition),
        ]
        .into_iter()
        .filter_map(|(name, value)| value.map(|v| (name, v)))
    }
}

// ---------------------------------------------------------------------------
// Thresholds
// ---------------------------------------------------------------------------

/// Overall score at or above which an image is considered valid.
pub const MIN_VALID_OVERALL: f64 = 60.0;

/// A per-metric low-quality threshold with its issue wording.
pub struct MetricThreshold {
    pub metric: &'static str,
    pub low: f64,
    pub issue: &'static str,
    pub recommendation: &'static str,
}

/// Low-quality thresholds, one per metric. A metric below its `low`
/// line flags the issue and recommendation verbatim.
pub const METRIC_THRESHOLDS: &[MetricThreshold] = &[
    MetricThreshold {
        metric: "brightness",
        low: 40.0,
        issue: "image too dark",
        recommendation: "apply a brightness lift in post-production",
    },
    MetricThreshold {
        metric: "contrast",
        low: 35.0,
        issue: "low contrast",
        recommendation: "apply a contrast boost in post-production",
    },
    MetricThreshold {
        metric: "saturation",
        low: 30.0,
        issue: "washed-out colors",
        recommendation: "apply a saturation boost in post-production",
    },
    MetricThreshold {
        metric: "sharpness",
        low: 45.0,
        issue: "image too soft",
        recommendation: "apply sharpening in post-production",
    },
    MetricThreshold {
        metric: "composition",
        low: 40.0,
        issue: "weak composition",
        recommendation: "regenerate with a stronger composition instruction",
    },
];

// ---------------------------------------------------------------------------
// Assessment
// ---------------------------------------------------------------------------

/// The quality verdict for one synthesized image.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityAssessment {
    pub metrics: ImageMetrics,
    /// Unweighted mean of the supplied metrics, `0.0` when none were.
    pub overall_score: f64,
    /// `overall_score >= MIN_VALID_OVERALL`, and at least one metric
    /// was observed.
    pub is_valid: bool,
    pub issues: Vec<String>,
    pub recommendations: Vec<String>,
}

/// Assess observed metrics. Defensive: usable even with zero metrics
/// supplied.
pub fn assess(metrics: &ImageMetrics) -> QualityAssessment {
    let observed: Vec<(&str, f64)> = metrics.present().collect();

    let mut issues = Vec::new();
    let mut recommendations = Vec::new();

    let overall_score = if observed.is_empty() {
        issues.push("no quality metrics observed".to_string());
        0.0
    } else {
        observed.iter().map(|(_, v)| *v).sum::<f64>() / observed.len() as f64
    };

    for threshold in METRIC_THRESHOLDS {
        let below = observed
            .iter()
            .any(|(name, value)| *name == threshold.metric && *value < threshold.low);
        if below {
            issues.push(threshold.issue.to_string());
            recommendations.push(threshold.recommendation.to_string());
        }
    }

    QualityAssessment {
        metrics: *metrics,
        overall_score,
        is_valid: !observed.is_empty() && overall_score >= MIN_VALID_OVERALL,
        issues,
        recommendations,
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
