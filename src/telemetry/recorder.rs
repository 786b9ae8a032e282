//! Запись трассировки одной сессии перетаскивания.
//!
//! Жизненный цикл:
//!   1. `start_session` открывает новую трассировку (UUID + Unix-время старта).
//!   2. `record` добавляет каждую зафиксированную позу, пока сессия открыта.
//!   3. `finish_session` закрывает трассировку, дописывает экстенты и итог и
//!      возвращает её вызывающему.
//!
//! При `enabled == false` все вызовы — пустые операции.

use crate::algorithm::line_tracker::TrackedExtents;
use crate::algorithm::validation::ValidationReport;
use crate::models::pose::Pose;
use crate::models::trace::SessionTrace;
use crate::session::state::Outcome;

#[derive(Debug, Default)]
pub struct TraceRecorder {
    enabled: bool,
    current: Option<SessionTrace>,
}

impl TraceRecorder {
    pub fn new(enabled: bool) -> Self {
        Self {
            enabled,
            current: None,
        }
    }

    pub fn is_recording(&self) -> bool {
        self.current.is_some()
    }

    /// Открывает новую трассировку, отбрасывая незавершённую предыдущую.
    pub fn start_session(&mut self) {
        if !self.enabled {
            return;
        }
        let session_id = uuid::Uuid::new_v4().to_string();
        log::debug!("trace: start session_id={session_id}");
        self.current = Some(SessionTrace::new(session_id, now_ms()));
    }

    pub fn record(&mut self, pose: &Pose) {
        if let Some(trace) = self.current.as_mut() {
            trace.push(now_ms(), pose);
        }
    }

    /// Закрывает текущую трассировку. `None`, если запись не велась.
    pub fn finish_session(
        &mut self,
        extents: &TrackedExtents,
        report: &ValidationReport,
        outcome: Outcome,
    ) -> Option<SessionTrace> {
        let mut trace = self.current.take()?;
        trace.extents = Some(*extents);
        trace.report = Some(*report);
        trace.outcome = Some(outcome);
        log::debug!(
            "trace: finish session_id={} samples={} outcome={outcome:?}",
            trace.session_id,
            trace.samples.len()
        );
        Some(trace)
    }

    /// Сбрасывает незавершённую трассировку.
    pub fn abandon(&mut self) {
        if let Some(trace) = self.current.take() {
            log::debug!("trace: abandon session_id={}", trace.session_id);
        }
    }
}

fn now_ms() -> u64 {
    chrono::Utc::now().timestamp_millis().max(0) as u64
}
