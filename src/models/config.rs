//! Схема конфигурации упражнения (trainer.json).
//! schemaVersion: 1

use serde::{Deserialize, Serialize};

use crate::error::{Result, TrainerError};
use crate::models::pose::{AxisLimits, Band, Pose};

pub const SCHEMA_VERSION: u32 = 1;

/// Встроенные наборы констант, соответствующие ревизиям упражнения.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum ConfigProfile {
    /// First revision: coarse steps, no movement caps, no touch.
    #[default]
    Classic,
    /// Finer steps, tightened range and saturating movement caps.
    Clamped,
    /// Clamped plus lower-band perspective correction and a release guard.
    PerspectiveCorrected,
    /// PerspectiveCorrected plus the absolute touch mapping.
    Touch,
}

/// Whether the yaw axis is evaluated when the position axis rejects a motion.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum YawCoupling {
    /// Yaw is only considered when the position committed.
    #[default]
    Coupled,
    /// Yaw is checked against its own limits on every event.
    Independent,
}

/// Настройки оси позиции.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct PositionProps {
    /// Смещение на единицу movementY.
    pub step: f64,
    pub limits: AxisLimits,
    /// Sign-preserving cap on |movementY|; `None` disables it.
    #[serde(default)]
    pub max_movement: Option<f64>,
}

/// Настройки вращения.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct RotationProps {
    /// Радианы на единицу movement.
    pub step: f64,
    pub yaw_limits: AxisLimits,
    /// Sign-preserving cap on |movementX|; `None` disables it.
    #[serde(default)]
    pub max_movement: Option<f64>,
    /// Scale applied to `yaw_limits` for touch input.
    #[serde(default = "default_squeeze_factor")]
    pub squeeze_factor: f64,
    #[serde(default)]
    pub yaw_coupling: YawCoupling,
}

fn default_squeeze_factor() -> f64 {
    1.0
}

/// Эталонный рисунок разреза.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TargetPattern {
    pub upper: Band,
    pub lower: Band,
    pub tolerance: f64,
}

/// Отображение сенсорных координат страницы в координаты объекта.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct TouchMapping {
    pub scene_width: f64,
    pub scene_height: f64,
    /// Canvas origin in page coordinates.
    #[serde(default)]
    pub offset_left: f64,
    #[serde(default)]
    pub offset_top: f64,
    /// Accepted range of `sceneHeight - y`, inclusive.
    pub screen_min: f64,
    pub screen_max: f64,
    pub yaw_divisor: f64,
    pub pitch_divisor: f64,
    #[serde(default)]
    pub base_pitch: f64,
}

/// Положение линий, которые рисует внешний рендерер.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Default)]
#[serde(rename_all = "camelCase")]
pub struct LineGeometry {
    pub x: f64,
    pub z: f64,
    pub y_reference: f64,
}

/// Корневой объект trainer.json.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EngineConfig {
    pub schema_version: u32,
    pub position: PositionProps,
    pub rotation: RotationProps,
    pub target: TargetPattern,
    /// Lower-band bottom correction factor; `None` disables it.
    #[serde(default)]
    pub perspective_correction: Option<f64>,
    /// Release requests are ignored while the pose is inside this interval.
    #[serde(default)]
    pub forbidden_release_zone: Option<Band>,
    #[serde(default)]
    pub touch: Option<TouchMapping>,
    #[serde(default)]
    pub lines: LineGeometry,
    #[serde(default)]
    pub initial_pose: Pose,
    #[serde(default = "default_presentation_delay_ms")]
    pub presentation_delay_ms: u64,
    #[serde(default)]
    pub record_trace: bool,
}

fn default_presentation_delay_ms() -> u64 {
    1_000
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig::profile(ConfigProfile::default())
    }
}

impl EngineConfig {
    pub fn profile(profile: ConfigProfile) -> Self {
        match profile {
            ConfigProfile::Classic => EngineConfig {
                schema_version: SCHEMA_VERSION,
                position: PositionProps {
                    step: 0.1,
                    limits: AxisLimits::new(-5.0, 1.0),
                    max_movement: None,
                },
                rotation: RotationProps {
                    step: 0.01,
                    yaw_limits: AxisLimits::new(-20f64.to_radians(), 20f64.to_radians()),
                    max_movement: None,
                    squeeze_factor: 1.0,
                    yaw_coupling: YawCoupling::Coupled,
                },
                target: TargetPattern {
                    upper: Band::new(1.0, -2.0),
                    lower: Band::new(-3.0, -5.0),
                    tolerance: 0.5,
                },
                perspective_correction: None,
                forbidden_release_zone: None,
                touch: None,
                lines: LineGeometry::default(),
                initial_pose: Pose::default(),
                presentation_delay_ms: default_presentation_delay_ms(),
                record_trace: false,
            },
            ConfigProfile::Clamped => EngineConfig {
                position: PositionProps {
                    step: 0.05,
                    limits: AxisLimits::new(-6.2, 0.0),
                    max_movement: Some(20.0),
                },
                rotation: RotationProps {
                    step: 0.005,
                    yaw_limits: AxisLimits::new(-20f64.to_radians(), 20f64.to_radians()),
                    max_movement: Some(20.0),
                    squeeze_factor: 1.0,
                    yaw_coupling: YawCoupling::Coupled,
                },
                target: TargetPattern {
                    upper: Band::new(0.0, -2.75),
                    lower: Band::new(-4.0, -6.2),
                    tolerance: 0.5,
                },
                initial_pose: Pose::new(-0.01, 0.0, 0.0),
                ..EngineConfig::profile(ConfigProfile::Classic)
            },
            ConfigProfile::PerspectiveCorrected => EngineConfig {
                perspective_correction: Some(0.35),
                forbidden_release_zone: Some(Band::new(-2.9, -3.9)),
                ..EngineConfig::profile(ConfigProfile::Clamped)
            },
            ConfigProfile::Touch => {
                let mut config = EngineConfig::profile(ConfigProfile::PerspectiveCorrected);
                config.rotation.squeeze_factor = 0.5;
                config.touch = Some(TouchMapping {
                    scene_width: 850.0,
                    scene_height: 450.0,
                    offset_left: 0.0,
                    offset_top: 0.0,
                    screen_min: 60.0,
                    screen_max: 400.0,
                    yaw_divisor: 850.0,
                    pitch_divisor: 900.0,
                    base_pitch: 0.0,
                });
                config
            }
        }
    }

    pub fn from_json_str(raw: &str) -> std::result::Result<Self, serde_json::Error> {
        serde_json::from_str(raw)
    }

    /// Проверяет согласованность значений. Вызывается при загрузке и при создании движка.
    pub fn validate(&self) -> Result<()> {
        if self.schema_version != SCHEMA_VERSION {
            return Err(TrainerError::UnsupportedSchema {
                kind: "config",
                expected: SCHEMA_VERSION,
                found: self.schema_version,
            });
        }

        require_positive("position.step", self.position.step)?;
        require_positive("rotation.step", self.rotation.step)?;
        require_positive("rotation.squeezeFactor", self.rotation.squeeze_factor)?;
        require_range("position.limits", &self.position.limits)?;
        require_range("rotation.yawLimits", &self.rotation.yaw_limits)?;
        if let Some(cap) = self.position.max_movement {
            require_positive("position.maxMovement", cap)?;
        }
        if let Some(cap) = self.rotation.max_movement {
            require_positive("rotation.maxMovement", cap)?;
        }

        require_band("target.upper", &self.target.upper)?;
        require_band("target.lower", &self.target.lower)?;
        if !self.target.tolerance.is_finite() || self.target.tolerance < 0.0 {
            return Err(TrainerError::InvalidConfig(format!(
                "target.tolerance must be a non-negative number, got {}",
                self.target.tolerance
            )));
        }

        if let Some(factor) = self.perspective_correction {
            if !factor.is_finite() || factor < 0.0 {
                return Err(TrainerError::InvalidConfig(format!(
                    "perspectiveCorrection must be a non-negative number, got {factor}"
                )));
            }
        }
        if let Some(zone) = &self.forbidden_release_zone {
            require_band("forbiddenReleaseZone", zone)?;
        }

        if let Some(touch) = &self.touch {
            if touch.screen_max <= touch.screen_min {
                return Err(TrainerError::InvalidConfig(format!(
                    "touch.screenMax ({}) must exceed touch.screenMin ({})",
                    touch.screen_max, touch.screen_min
                )));
            }
            require_non_zero("touch.yawDivisor", touch.yaw_divisor)?;
            require_non_zero("touch.pitchDivisor", touch.pitch_divisor)?;
        }

        if !self.position.limits.contains_open(self.initial_pose.y) {
            return Err(TrainerError::InvalidConfig(format!(
                "initialPose.y ({}) must lie strictly inside position.limits ({}, {})",
                self.initial_pose.y, self.position.limits.min, self.position.limits.max
            )));
        }

        Ok(())
    }
}

fn require_positive(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(TrainerError::InvalidConfig(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

fn require_non_zero(name: &str, value: f64) -> Result<()> {
    if value.is_finite() && value != 0.0 {
        Ok(())
    } else {
        Err(TrainerError::InvalidConfig(format!(
            "{name} must be a non-zero number, got {value}"
        )))
    }
}

fn require_range(name: &str, limits: &AxisLimits) -> Result<()> {
    if limits.min.is_finite() && limits.max.is_finite() && limits.min < limits.max {
        Ok(())
    } else {
        Err(TrainerError::InvalidConfig(format!(
            "{name} must satisfy min < max, got ({}, {})",
            limits.min, limits.max
        )))
    }
}

fn require_band(name: &str, band: &Band) -> Result<()> {
    if band.top.is_finite() && band.bottom.is_finite() && band.top >= band.bottom {
        Ok(())
    } else {
        Err(TrainerError::InvalidConfig(format!(
            "{name} must satisfy top >= bottom, got top={} bottom={}",
            band.top, band.bottom
        )))
    }
}
