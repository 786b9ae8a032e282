use serde::{Deserialize, Serialize};

use crate::models::config::{EngineConfig, LineGeometry};
use crate::models::pose::Band;

/// Running extremes of the positions visited inside one band.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Extent {
    pub top: Option<f64>,
    pub bottom: Option<f64>,
}

impl Extent {
    pub fn is_set(&self) -> bool {
        self.top.is_some() && self.bottom.is_some()
    }
}

/// Extents for both bands of the pattern.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedExtents {
    pub upper: Extent,
    pub lower: Extent,
}

/// Line primitive handed to the renderer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineSegment {
    pub from: [f64; 3],
    pub to: [f64; 3],
}

/// Geometry for both tracked lines; `None` means the line is not drawn.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackedLines {
    pub upper: Option<LineSegment>,
    pub lower: Option<LineSegment>,
}

/// Folds one observed position into `extent`.
///
/// Positions outside `(band.bottom, band.top)` leave the extent untouched. When
/// `correction` is set, a newly recorded bottom is pushed down by
/// `correction * (top - y) / (top - bottom)`.
pub fn update(extent: Extent, band: &Band, y: f64, correction: Option<f64>) -> Extent {
    if !band.contains(y) {
        return extent;
    }

    let mut next = extent;
    if extent.top.map_or(true, |top| y > top) {
        next.top = Some(y);
    }
    if extent.bottom.map_or(true, |bottom| y < bottom) {
        let offset = match correction {
            // `contains` is strict, so the height is positive here.
            Some(factor) => factor * (band.top - y) / band.height(),
            None => 0.0,
        };
        next.bottom = Some(y - offset);
    }
    next
}

/// Tracks both bands for the lifetime of one drag session.
#[derive(Debug, Clone)]
pub struct LineExtentTracker {
    upper_band: Band,
    lower_band: Band,
    lower_correction: Option<f64>,
    extents: TrackedExtents,
}

impl LineExtentTracker {
    pub fn new(config: &EngineConfig) -> Self {
        Self {
            upper_band: config.target.upper,
            lower_band: config.target.lower,
            lower_correction: config.perspective_correction,
            extents: TrackedExtents::default(),
        }
    }

    /// Back to the unset state; called when a drag session starts.
    pub fn reset(&mut self) {
        self.extents = TrackedExtents::default();
    }

    /// Returns `true` when either extent changed.
    pub fn observe(&mut self, y: f64) -> bool {
        let before = self.extents;
        self.extents.upper = update(self.extents.upper, &self.upper_band, y, None);
        self.extents.lower = update(
            self.extents.lower,
            &self.lower_band,
            y,
            self.lower_correction,
        );
        before != self.extents
    }

    pub fn extents(&self) -> &TrackedExtents {
        &self.extents
    }

    pub fn lines(&self, geometry: &LineGeometry) -> TrackedLines {
        TrackedLines {
            upper: segment(&self.extents.upper, geometry),
            lower: segment(&self.extents.lower, geometry),
        }
    }
}

fn segment(extent: &Extent, geometry: &LineGeometry) -> Option<LineSegment> {
    let (top, bottom) = (extent.top?, extent.bottom?);
    Some(LineSegment {
        from: [geometry.x, top + geometry.y_reference, geometry.z],
        to: [geometry.x, bottom + geometry.y_reference, geometry.z],
    })
}
