use crate::models::config::{EngineConfig, TouchMapping};
use crate::models::events::PointerEvent;
use crate::models::pose::MotionDelta;

/// Damping applied to the touch yaw candidate before it is checked against the
/// squeezed yaw limits.
const TOUCH_YAW_DAMPING: f64 = 0.5;

/// Converts a raw pointer event into normalized motion.
///
/// Returns `None` for events that carry no motion (`Press`), for touch events
/// when no touch mapping is configured, and for touch coordinates outside the
/// accepted screen band.
pub fn normalize(event: &PointerEvent, config: &EngineConfig) -> Option<MotionDelta> {
    match *event {
        PointerEvent::Move {
            movement_x,
            movement_y,
        } => Some(normalize_relative(movement_x, movement_y, config)),
        PointerEvent::Touch { page_x, page_y } => {
            let mapping = config.touch.as_ref()?;
            normalize_absolute(page_x, page_y, mapping, config)
        }
        PointerEvent::Press => None,
    }
}

fn normalize_relative(
    movement_x: Option<f64>,
    movement_y: Option<f64>,
    config: &EngineConfig,
) -> MotionDelta {
    let movement_x = saturate(finite_or_zero(movement_x), config.rotation.max_movement);
    let movement_y = saturate(finite_or_zero(movement_y), config.position.max_movement);

    MotionDelta::Relative {
        dy: -movement_y * config.position.step,
        dpitch: movement_y * config.rotation.step,
        dyaw: movement_x * config.rotation.step,
    }
}

/// Touch assigns pose values directly instead of producing increments.
fn normalize_absolute(
    page_x: f64,
    page_y: f64,
    mapping: &TouchMapping,
    config: &EngineConfig,
) -> Option<MotionDelta> {
    if !page_x.is_finite() || !page_y.is_finite() {
        return None;
    }

    let screen_x = page_x - mapping.offset_left;
    let effective_y = mapping.scene_height - (page_y - mapping.offset_top);
    if effective_y < mapping.screen_min || effective_y > mapping.screen_max {
        return None;
    }

    let limits = &config.position.limits;
    let ratio = (effective_y - mapping.screen_min) / (mapping.screen_max - mapping.screen_min);
    let y = ratio * (limits.max - limits.min) + limits.min;

    let yaw = (screen_x - mapping.scene_width * 0.5) / mapping.yaw_divisor * TOUCH_YAW_DAMPING;
    let pitch = mapping.base_pitch + effective_y / mapping.pitch_divisor;

    Some(MotionDelta::Absolute { y, pitch, yaw })
}

fn finite_or_zero(value: Option<f64>) -> f64 {
    value.filter(|v| v.is_finite()).unwrap_or(0.0)
}

/// Clamps to `[-cap, cap]` keeping the sign of the input.
fn saturate(value: f64, cap: Option<f64>) -> f64 {
    match cap {
        Some(cap) => value.clamp(-cap, cap),
        None => value,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ConfigProfile;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn relative_move_scales_by_steps() {
        let config = EngineConfig::profile(ConfigProfile::Classic);
        let delta = normalize(&PointerEvent::movement(2.0, 3.0), &config).expect("motion");

        match delta {
            MotionDelta::Relative { dy, dpitch, dyaw } => {
                assert!(approx(dy, -0.3));
                assert!(approx(dpitch, 0.03));
                assert!(approx(dyaw, 0.02));
            }
            other => panic!("expected relative motion, got {other:?}"),
        }
    }

    #[test]
    fn missing_movement_falls_back_to_zero() {
        let config = EngineConfig::profile(ConfigProfile::Classic);
        let event = PointerEvent::Move {
            movement_x: None,
            movement_y: Some(f64::NAN),
        };

        let delta = normalize(&event, &config).expect("motion");
        assert_eq!(
            delta,
            MotionDelta::Relative {
                dy: -0.0,
                dpitch: 0.0,
                dyaw: 0.0
            }
        );
    }

    #[test]
    fn caps_saturate_with_sign() {
        let config = EngineConfig::profile(ConfigProfile::Clamped);
        let delta = normalize(&PointerEvent::movement(-500.0, 500.0), &config).expect("motion");

        match delta {
            MotionDelta::Relative { dy, dyaw, .. } => {
                assert!(approx(dy, -20.0 * 0.05));
                assert!(approx(dyaw, -20.0 * 0.005));
            }
            other => panic!("expected relative motion, got {other:?}"),
        }
    }

    #[test]
    fn touch_maps_screen_band_linearly() {
        let config = EngineConfig::profile(ConfigProfile::Touch);
        // effectiveY = 450 - 220 = 230, halfway through [60, 400].
        let delta = normalize(&PointerEvent::touch(425.0, 220.0), &config).expect("motion");

        match delta {
            MotionDelta::Absolute { y, pitch, yaw } => {
                assert!(approx(y, -3.1));
                assert!(approx(yaw, 0.0));
                assert!(approx(pitch, 230.0 / 900.0));
            }
            other => panic!("expected absolute motion, got {other:?}"),
        }
    }

    #[test]
    fn touch_yaw_is_damped_offset_from_center() {
        let config = EngineConfig::profile(ConfigProfile::Touch);
        let delta = normalize(&PointerEvent::touch(595.0, 220.0), &config).expect("motion");

        match delta {
            MotionDelta::Absolute { yaw, .. } => assert!(approx(yaw, 170.0 / 850.0 * 0.5)),
            other => panic!("expected absolute motion, got {other:?}"),
        }
    }

    #[test]
    fn touch_outside_screen_band_is_ignored() {
        let config = EngineConfig::profile(ConfigProfile::Touch);
        // effectiveY = 450 - 430 = 20 < screenMin.
        assert!(normalize(&PointerEvent::touch(425.0, 430.0), &config).is_none());
        // effectiveY = 450 - 10 = 440 > screenMax.
        assert!(normalize(&PointerEvent::touch(425.0, 10.0), &config).is_none());
    }

    #[test]
    fn touch_without_mapping_is_ignored() {
        let config = EngineConfig::profile(ConfigProfile::Classic);
        assert!(normalize(&PointerEvent::touch(425.0, 220.0), &config).is_none());
        assert!(normalize(&PointerEvent::Press, &config).is_none());
    }
}
