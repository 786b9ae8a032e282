//! Схема трассировки сессии (trace.json).
//! schemaVersion: 1

use serde::{Deserialize, Serialize};

use crate::algorithm::line_tracker::TrackedExtents;
use crate::algorithm::validation::ValidationReport;
use crate::models::pose::Pose;
use crate::session::state::Outcome;

pub const SCHEMA_VERSION: u32 = 1;

/// Одна зафиксированная поза.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TraceSample {
    /// Миллисекунды от начала сессии.
    pub ts: u64,
    pub y: f64,
    pub pitch: f64,
    pub yaw: f64,
}

/// Корневой контейнер файла trace.json.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionTrace {
    pub schema_version: u32,
    /// UUID сессии.
    pub session_id: String,
    /// Unix timestamp (мс) начала перетаскивания.
    pub started_at_ms: u64,
    pub samples: Vec<TraceSample>,
    #[serde(default)]
    pub extents: Option<TrackedExtents>,
    #[serde(default)]
    pub report: Option<ValidationReport>,
    #[serde(default)]
    pub outcome: Option<Outcome>,
}

impl SessionTrace {
    pub fn new(session_id: String, started_at_ms: u64) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            session_id,
            started_at_ms,
            samples: Vec::new(),
            extents: None,
            report: None,
            outcome: None,
        }
    }

    pub fn push(&mut self, now_ms: u64, pose: &Pose) {
        self.samples.push(TraceSample {
            ts: now_ms.saturating_sub(self.started_at_ms),
            y: pose.y,
            pitch: pose.pitch,
            yaw: pose.yaw,
        });
    }
}
