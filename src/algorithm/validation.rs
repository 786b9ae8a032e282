use serde::{Deserialize, Serialize};

use crate::algorithm::line_tracker::{Extent, TrackedExtents};
use crate::models::config::TargetPattern;
use crate::models::pose::Band;
use crate::session::state::Outcome;

/// Absolute deviation of each tracked field from its target.
/// Unset fields deviate by `f64::INFINITY`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    pub upper_top: f64,
    pub upper_bottom: f64,
    pub lower_top: f64,
    pub lower_bottom: f64,
    pub tolerance: f64,
}

impl ValidationReport {
    pub fn deviations(&self) -> [f64; 4] {
        [
            self.upper_top,
            self.upper_bottom,
            self.lower_top,
            self.lower_bottom,
        ]
    }

    pub fn outcome(&self) -> Outcome {
        if self.deviations().iter().all(|d| *d < self.tolerance) {
            Outcome::Success
        } else {
            Outcome::Failure
        }
    }
}

pub fn report(extents: &TrackedExtents, target: &TargetPattern) -> ValidationReport {
    let (upper_top, upper_bottom) = band_deviation(&extents.upper, &target.upper);
    let (lower_top, lower_bottom) = band_deviation(&extents.lower, &target.lower);
    ValidationReport {
        upper_top,
        upper_bottom,
        lower_top,
        lower_bottom,
        tolerance: target.tolerance,
    }
}

/// `Success` iff all four extents are within `target.tolerance` of their targets.
pub fn evaluate(extents: &TrackedExtents, target: &TargetPattern) -> Outcome {
    report(extents, target).outcome()
}

fn band_deviation(extent: &Extent, band: &Band) -> (f64, f64) {
    (
        deviation(extent.top, band.top),
        deviation(extent.bottom, band.bottom),
    )
}

fn deviation(value: Option<f64>, target: f64) -> f64 {
    value.map_or(f64::INFINITY, |v| (v - target).abs())
}
