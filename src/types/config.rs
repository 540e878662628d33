//! Tracking configuration
//!
//! A [`TrackingConfig`] is supplied once per run and never mutated by the
//! tracker. Field names serialize in camelCase so settings files use the
//! familiar `maxLinkingDistance`, `maxFrameGap`, ... keys.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::errors::TrackingError;

use super::LinkKind;

/// Feature name → penalty weight
pub type FeaturePenalties = BTreeMap<String, f64>;

/// Default frame-to-frame alternative cost factor
pub const DEFAULT_ALTERNATIVE_COST_FACTOR: f64 = 1.05;

/// Default percentile of segment-stage costs used for the alternative cost
pub const DEFAULT_CUTOFF_PERCENTILE: f64 = 0.9;

/// How feature differences are folded into a link cost
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PenaltyForm {
    /// `d² + Σ w·|fa − fb|`
    #[default]
    Additive,
    /// `d² + Σ w·(fa − fb)²`
    Squared,
    /// `d²·(1 + Σ 1.5·w·|fa − fb| / (|fa| + |fb|))²`
    Relative,
}

/// Cost charged for leaving a row or column unmatched
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AlternativeCostPolicy {
    /// `factor × max(costs)`
    MaxFactor { factor: f64 },
    /// `factor × percentile(costs)`, percentile in (0, 1]
    Percentile { percentile: f64, factor: f64 },
    /// A fixed value
    Fixed(f64),
}

impl AlternativeCostPolicy {
    /// Default policy for the frame-to-frame stage
    pub fn linking_default() -> Self {
        AlternativeCostPolicy::MaxFactor {
            factor: DEFAULT_ALTERNATIVE_COST_FACTOR,
        }
    }

    /// Default policy for the segment stage
    pub fn segment_default() -> Self {
        AlternativeCostPolicy::Percentile {
            percentile: DEFAULT_CUTOFF_PERCENTILE,
            factor: DEFAULT_ALTERNATIVE_COST_FACTOR,
        }
    }

    fn validate(&self, name: &str) -> Result<(), TrackingError> {
        let valid = match *self {
            AlternativeCostPolicy::MaxFactor { factor } => factor.is_finite() && factor > 0.0,
            AlternativeCostPolicy::Percentile { percentile, factor } => {
                percentile > 0.0 && percentile <= 1.0 && factor.is_finite() && factor > 0.0
            }
            AlternativeCostPolicy::Fixed(value) => value.is_finite() && value > 0.0,
        };
        if valid {
            Ok(())
        } else {
            Err(TrackingError::configuration(format!(
                "{} alternative cost policy is invalid: {:?}",
                name, self
            )))
        }
    }
}

/// Parameters of one tracking run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TrackingConfig {
    /// Frame-to-frame candidate cutoff
    pub max_linking_distance: f64,
    /// Gap-closing candidate cutoff (also the split/merge default)
    pub max_gap_closing_distance: f64,
    /// Largest frame difference bridged by gap closing; below 2 disables it
    pub max_frame_gap: usize,
    pub allow_gap_closing: bool,
    pub allow_splitting: bool,
    pub allow_merging: bool,
    /// Penalty weights for frame-to-frame linking
    pub feature_penalties: FeaturePenalties,
    /// Splitting cutoff; `None` uses `max_gap_closing_distance`
    pub max_splitting_distance: Option<f64>,
    /// Merging cutoff; `None` uses `max_gap_closing_distance`
    pub max_merging_distance: Option<f64>,
    /// Per-category penalty overrides; `None` uses `feature_penalties`
    pub gap_closing_feature_penalties: Option<FeaturePenalties>,
    pub splitting_feature_penalties: Option<FeaturePenalties>,
    pub merging_feature_penalties: Option<FeaturePenalties>,
    pub penalty_form: PenaltyForm,
    pub linking_alternative: AlternativeCostPolicy,
    pub segment_alternative: AlternativeCostPolicy,
}

impl Default for TrackingConfig {
    fn default() -> Self {
        Self {
            max_linking_distance: 15.0,
            max_gap_closing_distance: 15.0,
            max_frame_gap: 2,
            allow_gap_closing: true,
            allow_splitting: false,
            allow_merging: false,
            feature_penalties: FeaturePenalties::new(),
            max_splitting_distance: None,
            max_merging_distance: None,
            gap_closing_feature_penalties: None,
            splitting_feature_penalties: None,
            merging_feature_penalties: None,
            penalty_form: PenaltyForm::default(),
            linking_alternative: AlternativeCostPolicy::linking_default(),
            segment_alternative: AlternativeCostPolicy::segment_default(),
        }
    }
}

impl TrackingConfig {
    /// Create a new config builder
    pub fn builder() -> TrackingConfigBuilder {
        TrackingConfigBuilder::new()
    }

    /// True if the gap-closing category can produce candidates
    #[inline]
    pub fn gap_closing_enabled(&self) -> bool {
        self.allow_gap_closing && self.max_frame_gap >= 2
    }

    /// True if the segment stage has any enabled category
    #[inline]
    pub fn segment_stage_enabled(&self) -> bool {
        self.gap_closing_enabled() || self.allow_splitting || self.allow_merging
    }

    #[inline]
    pub fn splitting_distance(&self) -> f64 {
        self.max_splitting_distance
            .unwrap_or(self.max_gap_closing_distance)
    }

    #[inline]
    pub fn merging_distance(&self) -> f64 {
        self.max_merging_distance.unwrap_or(self.max_gap_closing_distance)
    }

    /// Distance cutoff for one link category
    pub fn max_distance(&self, kind: LinkKind) -> f64 {
        match kind {
            LinkKind::FrameToFrame => self.max_linking_distance,
            LinkKind::GapClosing => self.max_gap_closing_distance,
            LinkKind::Splitting => self.splitting_distance(),
            LinkKind::Merging => self.merging_distance(),
        }
    }

    /// Feature penalty weights for one link category
    pub fn penalties(&self, kind: LinkKind) -> &FeaturePenalties {
        let specific = match kind {
            LinkKind::FrameToFrame => None,
            LinkKind::GapClosing => self.gap_closing_feature_penalties.as_ref(),
            LinkKind::Splitting => self.splitting_feature_penalties.as_ref(),
            LinkKind::Merging => self.merging_feature_penalties.as_ref(),
        };
        specific.unwrap_or(&self.feature_penalties)
    }

    /// Check all thresholds, weights and policies
    pub fn validate(&self) -> Result<(), TrackingError> {
        check_distance("max linking distance", self.max_linking_distance)?;
        check_distance("max gap-closing distance", self.max_gap_closing_distance)?;
        if let Some(d) = self.max_splitting_distance {
            check_distance("max splitting distance", d)?;
        }
        if let Some(d) = self.max_merging_distance {
            check_distance("max merging distance", d)?;
        }

        check_penalties("linking", &self.feature_penalties)?;
        for (name, penalties) in [
            ("gap-closing", &self.gap_closing_feature_penalties),
            ("splitting", &self.splitting_feature_penalties),
            ("merging", &self.merging_feature_penalties),
        ] {
            if let Some(p) = penalties {
                check_penalties(name, p)?;
            }
        }

        self.linking_alternative.validate("linking")?;
        self.segment_alternative.validate("segment")?;
        Ok(())
    }

    /// Parse and validate a JSON settings document
    pub fn from_json(json: &str) -> Result<Self, TrackingError> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| TrackingError::configuration(format!("malformed settings: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to JSON string.
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }

    /// Serialize to pretty-printed JSON string.
    pub fn to_json_pretty(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}

fn check_distance(name: &str, value: f64) -> Result<(), TrackingError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TrackingError::configuration(format!(
            "{} must be positive and finite, got {}",
            name, value
        )))
    }
}

fn check_penalties(name: &str, penalties: &FeaturePenalties) -> Result<(), TrackingError> {
    match penalties
        .iter()
        .find(|(_, w)| !(w.is_finite() && **w >= 0.0))
    {
        Some((feature, w)) => Err(TrackingError::configuration(format!(
            "{} penalty weight for '{}' must be non-negative, got {}",
            name, feature, w
        ))),
        None => Ok(()),
    }
}

/// Builder for TrackingConfig
#[derive(Debug, Default)]
pub struct TrackingConfigBuilder {
    config: TrackingConfig,
}

impl TrackingConfigBuilder {
    /// Create a new builder starting from the defaults
    pub fn new() -> Self {
        Self::default()
    }

    pub fn max_linking_distance(mut self, distance: f64) -> Self {
        self.config.max_linking_distance = distance;
        self
    }

    pub fn max_gap_closing_distance(mut self, distance: f64) -> Self {
        self.config.max_gap_closing_distance = distance;
        self
    }

    pub fn max_frame_gap(mut self, frames: usize) -> Self {
        self.config.max_frame_gap = frames;
        self
    }

    pub fn allow_gap_closing(mut self, allow: bool) -> Self {
        self.config.allow_gap_closing = allow;
        self
    }

    pub fn allow_splitting(mut self, allow: bool) -> Self {
        self.config.allow_splitting = allow;
        self
    }

    pub fn allow_merging(mut self, allow: bool) -> Self {
        self.config.allow_merging = allow;
        self
    }

    pub fn max_splitting_distance(mut self, distance: f64) -> Self {
        self.config.max_splitting_distance = Some(distance);
        self
    }

    pub fn max_merging_distance(mut self, distance: f64) -> Self {
        self.config.max_merging_distance = Some(distance);
        self
    }

    /// Add a frame-to-frame feature penalty
    pub fn feature_penalty(mut self, feature: impl Into<String>, weight: f64) -> Self {
        self.config.feature_penalties.insert(feature.into(), weight);
        self
    }

    /// Override penalties for one segment-stage category
    pub fn category_penalties(mut self, kind: LinkKind, penalties: FeaturePenalties) -> Self {
        match kind {
            LinkKind::FrameToFrame => self.config.feature_penalties = penalties,
            LinkKind::GapClosing => self.config.gap_closing_feature_penalties = Some(penalties),
            LinkKind::Splitting => self.config.splitting_feature_penalties = Some(penalties),
            LinkKind::Merging => self.config.merging_feature_penalties = Some(penalties),
        }
        self
    }

    pub fn penalty_form(mut self, form: PenaltyForm) -> Self {
        self.config.penalty_form = form;
        self
    }

    pub fn linking_alternative(mut self, policy: AlternativeCostPolicy) -> Self {
        self.config.linking_alternative = policy;
        self
    }

    pub fn segment_alternative(mut self, policy: AlternativeCostPolicy) -> Self {
        self.config.segment_alternative = policy;
        self
    }

    /// Validate and build the config
    pub fn build(self) -> Result<TrackingConfig, TrackingError> {
        self.config.validate()?;
        Ok(self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = TrackingConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.gap_closing_enabled());
        assert!(!config.allow_splitting);
    }

    #[test]
    fn test_builder_rejects_non_positive_distance() {
        let err = TrackingConfig::builder()
            .max_linking_distance(0.0)
            .build()
            .unwrap_err();
        assert!(matches!(err, TrackingError::Configuration { .. }));

        let err = TrackingConfig::builder()
            .max_gap_closing_distance(f64::INFINITY)
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("gap-closing"));
    }

    #[test]
    fn test_builder_rejects_negative_penalty() {
        let result = TrackingConfig::builder()
            .feature_penalty("QUALITY", -1.0)
            .build();
        assert!(result.is_err());
    }

    #[test]
    fn test_small_frame_gap_disables_gap_closing() {
        for gap in [0, 1] {
            let config = TrackingConfig::builder().max_frame_gap(gap).build().unwrap();
            assert!(!config.gap_closing_enabled());
        }
    }

    #[test]
    fn test_category_fallbacks() {
        let config = TrackingConfig::builder()
            .max_gap_closing_distance(8.0)
            .max_merging_distance(3.0)
            .feature_penalty("MEAN_INTENSITY", 1.0)
            .build()
            .unwrap();

        assert_eq!(config.max_distance(LinkKind::Splitting), 8.0);
        assert_eq!(config.max_distance(LinkKind::Merging), 3.0);
        assert_eq!(config.penalties(LinkKind::GapClosing).len(), 1);
    }

    #[test]
    fn test_json_uses_option_names() {
        let json = TrackingConfig::default().to_json();
        assert!(json.contains("\"maxLinkingDistance\""));
        assert!(json.contains("\"maxFrameGap\""));
        assert!(json.contains("\"allowGapClosing\""));
    }

    #[test]
    fn test_from_json_partial() {
        let config =
            TrackingConfig::from_json(r#"{"maxLinkingDistance": 5.0, "allowMerging": true}"#)
                .unwrap();
        assert_eq!(config.max_linking_distance, 5.0);
        assert!(config.allow_merging);
        assert_eq!(config.max_frame_gap, 2);
    }

    #[test]
    fn test_from_json_validates() {
        let err = TrackingConfig::from_json(r#"{"maxLinkingDistance": -2.0}"#).unwrap_err();
        assert!(matches!(err, TrackingError::Configuration { .. }));

        let err = TrackingConfig::from_json("not json").unwrap_err();
        assert!(err.to_string().contains("malformed"));
    }

    #[test]
    fn test_invalid_percentile() {
        let result = TrackingConfig::builder()
            .segment_alternative(AlternativeCostPolicy::Percentile {
                percentile: 1.5,
                factor: 1.05,
            })
            .build();
        assert!(result.is_err());
    }
}
