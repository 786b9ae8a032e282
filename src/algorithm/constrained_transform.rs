use crate::models::config::{EngineConfig, YawCoupling};
use crate::models::pose::{MotionDelta, Pose};

/// Result of applying one motion to a pose.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Applied {
    pub pose: Pose,
    /// Position (and its companion pitch) were committed.
    pub position_committed: bool,
    pub yaw_committed: bool,
}

impl Applied {
    pub fn changed(&self) -> bool {
        self.position_committed || self.yaw_committed
    }
}

/// Applies `delta` to `pose` under the configured clamps.
///
/// Position uses an open interval: a candidate on or beyond a limit discards
/// the position and pitch for this event. Yaw has its own open-interval check
/// and, with [`YawCoupling::Coupled`], is only considered when the position
/// committed.
pub fn apply(pose: &Pose, delta: &MotionDelta, config: &EngineConfig) -> Applied {
    let (candidate_y, candidate_pitch, candidate_yaw) = match *delta {
        MotionDelta::Relative { dy, dpitch, dyaw } => {
            (pose.y + dy, pose.pitch + dpitch, pose.yaw + dyaw)
        }
        MotionDelta::Absolute { y, pitch, yaw } => (y, pitch, yaw),
    };

    let mut next = *pose;

    let position_committed = config.position.limits.contains_open(candidate_y);
    if position_committed {
        next.y = candidate_y;
        next.pitch = candidate_pitch;
    }

    let yaw_considered =
        position_committed || config.rotation.yaw_coupling == YawCoupling::Independent;
    let yaw_limits = if delta.is_absolute() {
        config
            .rotation
            .yaw_limits
            .scaled(config.rotation.squeeze_factor)
    } else {
        config.rotation.yaw_limits
    };
    let yaw_committed = yaw_considered && yaw_limits.contains_open(candidate_yaw);
    if yaw_committed {
        next.yaw = candidate_yaw;
    }

    Applied {
        pose: next,
        position_committed,
        yaw_committed,
    }
}
