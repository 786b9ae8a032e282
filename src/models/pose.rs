//! Поза инструмента, ограничения осей и эталонные полосы разреза.

use serde::{Deserialize, Serialize};

/// Текущая поза инструмента: вертикальное смещение и два угла поворота (рад).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pose {
    pub y: f64,
    pub pitch: f64,
    pub yaw: f64,
}

impl Pose {
    pub fn new(y: f64, pitch: f64, yaw: f64) -> Self {
        Self { y, pitch, yaw }
    }
}

/// Диапазон допустимых значений одной оси. Проверки строгие: границы недостижимы.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AxisLimits {
    pub min: f64,
    pub max: f64,
}

impl AxisLimits {
    pub fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `min < value < max`.
    pub fn contains_open(&self, value: f64) -> bool {
        value > self.min && value < self.max
    }

    pub fn scaled(&self, factor: f64) -> Self {
        Self {
            min: self.min * factor,
            max: self.max * factor,
        }
    }
}

/// Эталонный отрезок на оси позиции, `top >= bottom`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Band {
    pub top: f64,
    pub bottom: f64,
}

impl Band {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    /// `bottom < y < top`.
    pub fn contains(&self, y: f64) -> bool {
        y > self.bottom && y < self.top
    }

    /// Closed-interval check, used by the release guard.
    pub fn contains_inclusive(&self, y: f64) -> bool {
        y >= self.bottom && y <= self.top
    }

    pub fn height(&self) -> f64 {
        self.top - self.bottom
    }
}

/// Нормализованное движение одного события ввода.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MotionDelta {
    /// Pointer-lock: increments applied on top of the current pose.
    Relative { dy: f64, dpitch: f64, dyaw: f64 },
    /// Touch: values are assigned, not added. `yaw` is already damped and is
    /// checked against the squeezed yaw limits.
    Absolute { y: f64, pitch: f64, yaw: f64 },
}

impl MotionDelta {
    pub fn is_absolute(&self) -> bool {
        matches!(self, MotionDelta::Absolute { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn band_contains_is_strict() {
        let band = Band::new(0.0, -2.75);
        assert!(band.contains(-0.1));
        assert!(!band.contains(0.0));
        assert!(!band.contains(-2.75));
        assert!(band.contains_inclusive(-2.75));
    }

    #[test]
    fn axis_limits_reject_boundaries() {
        let limits = AxisLimits::new(-6.2, 0.0);
        assert!(limits.contains_open(-3.0));
        assert!(!limits.contains_open(0.0));
        assert!(!limits.contains_open(-6.2));
        assert_eq!(limits.scaled(0.5), AxisLimits::new(-3.1, 0.0));
    }
}
