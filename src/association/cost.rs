//! Link cost functions.
//!
//! The cost of linking two spots is the squared distance between them, biased
//! by how different their features are. Candidate gating (the distance
//! cutoff) is done by the matrix builder; a [`CostFunction`] only scores
//! pairs that already passed the gate.
//!
//! Three penalty forms are available (see [`PenaltyForm`]):
//!
//! - **Additive**: `d² + Σ w·|fa − fb|`
//! - **Squared**: `d² + Σ w·(fa − fb)²`
//! - **Relative**: `d²·(1 + Σ 1.5·w·|fa − fb| / (|fa| + |fb|))²`, which makes
//!   the penalty independent of each feature's scale
//!
//! A feature missing on either spot contributes nothing.

use crate::types::{FeaturePenalties, LinkKind, PenaltyForm, Spot, TrackingConfig};

/// Scores a candidate link between two spots
///
/// Implementations must return a finite, non-negative cost.
pub trait CostFunction: Send + Sync {
    /// Cost of linking `source` to `target` as a link of the given kind
    fn link_cost(&self, kind: LinkKind, source: &Spot, target: &Spot) -> f64;
}

/// Plain squared Euclidean distance
#[derive(Debug, Clone, Copy, Default)]
pub struct SquareDistanceCost;

impl CostFunction for SquareDistanceCost {
    #[inline]
    fn link_cost(&self, _kind: LinkKind, source: &Spot, target: &Spot) -> f64 {
        source.square_distance_to(target)
    }
}

/// Squared distance with per-category feature penalties
#[derive(Debug, Clone, Default)]
pub struct FeaturePenaltyCost {
    form: PenaltyForm,
    linking: FeaturePenalties,
    gap_closing: FeaturePenalties,
    splitting: FeaturePenalties,
    merging: FeaturePenalties,
}

impl FeaturePenaltyCost {
    /// Use the same penalties for all categories
    pub fn new(form: PenaltyForm, penalties: FeaturePenalties) -> Self {
        Self {
            form,
            linking: penalties.clone(),
            gap_closing: penalties.clone(),
            splitting: penalties.clone(),
            merging: penalties,
        }
    }

    /// Take penalties and form from a tracking configuration
    pub fn from_config(config: &TrackingConfig) -> Self {
        Self {
            form: config.penalty_form,
            linking: config.penalties(LinkKind::FrameToFrame).clone(),
            gap_closing: config.penalties(LinkKind::GapClosing).clone(),
            splitting: config.penalties(LinkKind::Splitting).clone(),
            merging: config.penalties(LinkKind::Merging).clone(),
        }
    }

    fn penalties(&self, kind: LinkKind) -> &FeaturePenalties {
        match kind {
            LinkKind::FrameToFrame => &self.linking,
            LinkKind::GapClosing => &self.gap_closing,
            LinkKind::Splitting => &self.splitting,
            LinkKind::Merging => &self.merging,
        }
    }
}

impl CostFunction for FeaturePenaltyCost {
    fn link_cost(&self, kind: LinkKind, source: &Spot, target: &Spot) -> f64 {
        let d2 = source.square_distance_to(target);
        let penalties = self.penalties(kind);
        if penalties.is_empty() {
            return d2;
        }

        let diffs = penalties.iter().filter_map(|(feature, &weight)| {
            let a = source.feature(feature)?;
            let b = target.feature(feature)?;
            Some((weight, a, b))
        });

        match self.form {
            PenaltyForm::Additive => d2 + diffs.map(|(w, a, b)| w * (a - b).abs()).sum::<f64>(),
            PenaltyForm::Squared => {
                d2 + diffs
                    .map(|(w, a, b)| w * (a - b) * (a - b))
                    .sum::<f64>()
            }
            PenaltyForm::Relative => {
                let penalty = 1.0
                    + diffs
                        .map(|(w, a, b)| 1.5 * w * relative_difference(a, b))
                        .sum::<f64>();
                d2 * penalty * penalty
            }
        }
    }
}

/// `|a − b| / (|a| + |b|)`, zero when both are zero
#[inline]
fn relative_difference(a: f64, b: f64) -> f64 {
    let denom = a.abs() + b.abs();
    if denom > 0.0 {
        (a - b).abs() / denom
    } else {
        0.0
    }
}
