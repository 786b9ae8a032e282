//! Drag session lifecycle: Idle -> Dragging -> Evaluating -> ResultShown -> Idle.
//!
//! The machine owns the whole mutable context of the exercise (pose, extents,
//! activation gate, last outcome). Each input event runs normalization,
//! transform and extent tracking as one synchronous step.

use std::time::Duration;

use serde::Serialize;

use crate::algorithm::line_tracker::{LineExtentTracker, TrackedExtents};
use crate::algorithm::validation::{self, ValidationReport};
use crate::algorithm::{constrained_transform, input_normalizer};
use crate::error::Result;
use crate::models::config::EngineConfig;
use crate::models::events::PointerEvent;
use crate::models::pose::Pose;
use crate::models::trace::SessionTrace;
use crate::session::sink::SceneSink;
use crate::session::state::{Outcome, PopupKind, SessionState};
use crate::telemetry::recorder::TraceRecorder;

/// Presentation the caller must fire after `delay` via [`SessionStateMachine::present`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingPresentation {
    pub generation: u64,
    pub delay: Duration,
}

#[derive(Debug)]
struct PendingOutcome {
    generation: u64,
    outcome: Outcome,
    report: ValidationReport,
    trace: Option<SessionTrace>,
}

/// Read-only view of the engine, e.g. for a host status panel.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EngineSnapshot {
    pub state: SessionState,
    pub pose: Pose,
    pub extents: TrackedExtents,
    pub is_active: bool,
    pub assets_loaded: bool,
    pub generation: u64,
    pub last_outcome: Option<Outcome>,
    pub popup: PopupKind,
}

#[derive(Debug)]
pub struct SessionStateMachine {
    config: EngineConfig,
    state: SessionState,
    pose: Pose,
    tracker: LineExtentTracker,
    is_active: bool,
    assets_loaded: bool,
    /// Bumped on every session start, dismiss and reset.
    generation: u64,
    pending: Option<PendingOutcome>,
    last_outcome: Option<Outcome>,
    last_report: Option<ValidationReport>,
    recorder: TraceRecorder,
    last_trace: Option<SessionTrace>,
}

impl SessionStateMachine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            state: SessionState::Idle,
            pose: config.initial_pose,
            tracker: LineExtentTracker::new(&config),
            is_active: false,
            assets_loaded: false,
            generation: 0,
            pending: None,
            last_outcome: None,
            last_report: None,
            recorder: TraceRecorder::new(config.record_trace),
            last_trace: None,
            config,
        })
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn pose(&self) -> &Pose {
        &self.pose
    }

    pub fn extents(&self) -> &TrackedExtents {
        self.tracker.extents()
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn last_outcome(&self) -> Option<Outcome> {
        self.last_outcome
    }

    pub fn last_report(&self) -> Option<&ValidationReport> {
        self.last_report.as_ref()
    }

    pub fn last_trace(&self) -> Option<&SessionTrace> {
        self.last_trace.as_ref()
    }

    pub fn popup(&self) -> PopupKind {
        PopupKind::from(self.last_outcome)
    }

    pub fn snapshot(&self) -> EngineSnapshot {
        EngineSnapshot {
            state: self.state,
            pose: self.pose,
            extents: *self.tracker.extents(),
            is_active: self.is_active,
            assets_loaded: self.assets_loaded,
            generation: self.generation,
            last_outcome: self.last_outcome,
            popup: self.popup(),
        }
    }

    /// Model assets are ready; dragging may begin from now on.
    pub fn mark_assets_loaded(&mut self) {
        self.assets_loaded = true;
    }

    /// External activation gate, e.g. toggled when the intro popup is closed.
    pub fn set_active(&mut self, active: bool) {
        self.is_active = active;
    }

    /// Idle -> Dragging. Returns `false` when the request is ignored.
    pub fn request_lock(&mut self, sink: &mut impl SceneSink) -> bool {
        if self.state != SessionState::Idle {
            log::debug!("request_lock: ignored in state={:?}", self.state);
            return false;
        }
        if !self.is_active || !self.assets_loaded {
            log::debug!(
                "request_lock: ignored active={} assets_loaded={}",
                self.is_active,
                self.assets_loaded
            );
            return false;
        }

        self.generation += 1;
        self.pending = None;
        self.tracker.reset();
        self.recorder.start_session();
        self.state = SessionState::Dragging;

        sink.request_pointer_lock();
        sink.set_tracked_lines(&self.tracker.lines(&self.config.lines));
        log::info!("request_lock: drag started generation={}", self.generation);
        true
    }

    /// Routes one raw event. `Press` toggles the lock, motion is applied.
    pub fn handle_event(
        &mut self,
        event: &PointerEvent,
        sink: &mut impl SceneSink,
    ) -> Option<PendingPresentation> {
        match event {
            PointerEvent::Press => self.toggle_lock(sink),
            PointerEvent::Move { .. } | PointerEvent::Touch { .. } => {
                self.handle_motion(event, sink);
                None
            }
        }
    }

    /// Mouse-down behaviour: release while dragging, otherwise try to lock.
    pub fn toggle_lock(&mut self, sink: &mut impl SceneSink) -> Option<PendingPresentation> {
        if self.state == SessionState::Dragging {
            self.request_release(sink)
        } else {
            self.request_lock(sink);
            None
        }
    }

    /// Applies one motion event while dragging. Returns `true` when the pose changed.
    pub fn handle_motion(&mut self, event: &PointerEvent, sink: &mut impl SceneSink) -> bool {
        if self.state != SessionState::Dragging {
            return false;
        }
        let Some(delta) = input_normalizer::normalize(event, &self.config) else {
            return false;
        };

        let applied = constrained_transform::apply(&self.pose, &delta, &self.config);
        if !applied.changed() {
            return false;
        }

        self.pose = applied.pose;
        self.recorder.record(&self.pose);
        sink.set_object_pose(&self.pose);

        if applied.position_committed && self.tracker.observe(self.pose.y) {
            sink.set_tracked_lines(&self.tracker.lines(&self.config.lines));
        }
        true
    }

    /// Dragging -> Evaluating, unless the pose sits in the forbidden release zone.
    ///
    /// The outcome is computed immediately but only becomes visible through
    /// [`present`](Self::present) once the returned delay has elapsed.
    pub fn request_release(&mut self, sink: &mut impl SceneSink) -> Option<PendingPresentation> {
        if self.state != SessionState::Dragging {
            log::debug!("request_release: ignored in state={:?}", self.state);
            return None;
        }
        if let Some(zone) = &self.config.forbidden_release_zone {
            if zone.contains_inclusive(self.pose.y) {
                log::debug!("request_release: ignored inside release zone y={}", self.pose.y);
                return None;
            }
        }

        sink.exit_pointer_lock();
        self.state = SessionState::Evaluating;

        let report = validation::report(self.tracker.extents(), &self.config.target);
        let outcome = report.outcome();
        let trace = self
            .recorder
            .finish_session(self.tracker.extents(), &report, outcome);
        log::info!(
            "request_release: generation={} outcome={outcome:?} deviations={:?}",
            self.generation,
            report.deviations()
        );

        self.pending = Some(PendingOutcome {
            generation: self.generation,
            outcome,
            report,
            trace,
        });
        Some(PendingPresentation {
            generation: self.generation,
            delay: Duration::from_millis(self.config.presentation_delay_ms),
        })
    }

    /// Evaluating -> ResultShown. Stale generations are discarded.
    pub fn present(&mut self, generation: u64, sink: &mut impl SceneSink) -> bool {
        if self.state != SessionState::Evaluating || generation != self.generation {
            log::debug!(
                "present: stale generation={generation} current={} state={:?}",
                self.generation,
                self.state
            );
            return false;
        }
        let Some(pending) = self.pending.take() else {
            return false;
        };
        if pending.generation != generation {
            log::debug!("present: pending outcome belongs to generation={}", pending.generation);
            return false;
        }

        self.last_outcome = Some(pending.outcome);
        self.last_report = Some(pending.report);
        if pending.trace.is_some() {
            self.last_trace = pending.trace;
        }
        self.state = SessionState::ResultShown;
        self.is_active = false;

        sink.on_outcome(pending.outcome);
        true
    }

    /// ResultShown -> Idle. A failed attempt is retried straight away.
    pub fn dismiss(&mut self, sink: &mut impl SceneSink) -> bool {
        if self.state != SessionState::ResultShown {
            log::debug!("dismiss: ignored in state={:?}", self.state);
            return false;
        }

        self.generation += 1;
        self.state = SessionState::Idle;
        match self.last_outcome {
            Some(Outcome::Failure) => {
                self.is_active = true;
                self.request_lock(sink);
            }
            _ => self.is_active = false,
        }
        true
    }

    /// Back to Idle from any state with the initial pose. Any pending
    /// presentation is invalidated; the last outcome is kept.
    pub fn reset(&mut self, sink: &mut impl SceneSink) {
        if self.state == SessionState::Dragging {
            sink.exit_pointer_lock();
        }

        self.generation += 1;
        self.pending = None;
        self.recorder.abandon();
        self.tracker.reset();
        self.pose = self.config.initial_pose;
        self.state = SessionState::Idle;

        sink.set_object_pose(&self.pose);
        sink.set_tracked_lines(&self.tracker.lines(&self.config.lines));
        log::info!("reset: generation={}", self.generation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::config::ConfigProfile;
    use crate::session::testing::RecordingSink;

    fn ready_machine(profile: ConfigProfile) -> SessionStateMachine {
        let mut machine =
            SessionStateMachine::new(EngineConfig::profile(profile)).expect("valid profile");
        machine.mark_assets_loaded();
        machine.set_active(true);
        machine
    }

    /// Drags from the initial pose down through both bands.
    fn drag_full_stroke(machine: &mut SessionStateMachine, sink: &mut RecordingSink) {
        machine.handle_motion(&PointerEvent::movement(0.0, 1.0), sink);
        for _ in 0..12 {
            machine.handle_motion(&PointerEvent::movement(0.0, 10.0), sink);
        }
    }

    fn release_and_present(
        machine: &mut SessionStateMachine,
        sink: &mut RecordingSink,
    ) -> Outcome {
        let pending = machine.request_release(sink).expect("release accepted");
        assert_eq!(machine.state(), SessionState::Evaluating);
        assert!(machine.present(pending.generation, sink));
        machine.last_outcome().expect("outcome")
    }

    #[test]
    fn lock_requires_activation_and_assets() {
        let mut sink = RecordingSink::default();
        let mut machine =
            SessionStateMachine::new(EngineConfig::default()).expect("valid config");

        assert!(!machine.request_lock(&mut sink));
        machine.set_active(true);
        assert!(!machine.request_lock(&mut sink));
        machine.mark_assets_loaded();
        assert!(machine.request_lock(&mut sink));
        assert_eq!(machine.state(), SessionState::Dragging);
        assert_eq!(sink.locks, 1);
    }

    #[test]
    fn motion_is_ignored_outside_dragging() {
        let mut sink = RecordingSink::default();
        let mut machine = ready_machine(ConfigProfile::Clamped);
        let before = *machine.pose();

        assert!(!machine.handle_motion(&PointerEvent::movement(5.0, 5.0), &mut sink));
        assert_eq!(*machine.pose(), before);
        assert!(sink.poses.is_empty());
    }

    #[test]
    fn full_stroke_succeeds_and_rests_idle_after_dismiss() {
        let mut sink = RecordingSink::default();
        let mut machine = ready_machine(ConfigProfile::Clamped);
        assert!(machine.request_lock(&mut sink));

        drag_full_stroke(&mut machine, &mut sink);
        let limits = machine.config().position.limits;
        assert!(sink.poses.iter().all(|pose| limits.contains_open(pose.y)));
        assert!(machine.extents().lower.is_set());

        assert_eq!(release_and_present(&mut machine, &mut sink), Outcome::Success);
        assert_eq!(machine.state(), SessionState::ResultShown);
        assert_eq!(sink.outcomes, vec![Outcome::Success]);
        assert_eq!(sink.unlocks, 1);
        assert_eq!(machine.popup(), PopupKind::Success);

        assert!(machine.dismiss(&mut sink));
        assert_eq!(machine.state(), SessionState::Idle);
        assert!(!machine.is_active());
        assert!(!machine.request_lock(&mut sink));
        machine.set_active(true);
        assert!(machine.request_lock(&mut sink));
    }

    #[test]
    fn upper_only_stroke_fails_and_retries_on_dismiss() {
        let mut sink = RecordingSink::default();
        let mut machine = ready_machine(ConfigProfile::Clamped);
        machine.request_lock(&mut sink);

        machine.handle_motion(&PointerEvent::movement(0.0, 1.0), &mut sink);
        for _ in 0..5 {
            machine.handle_motion(&PointerEvent::movement(0.0, 10.0), &mut sink);
        }
        assert!(machine.extents().upper.is_set());
        assert_eq!(machine.extents().lower.top, None);

        assert_eq!(release_and_present(&mut machine, &mut sink), Outcome::Failure);
        assert_eq!(machine.popup(), PopupKind::Failure);

        assert!(machine.dismiss(&mut sink));
        assert_eq!(machine.state(), SessionState::Dragging);
        assert_eq!(*machine.extents(), TrackedExtents::default());
        assert_eq!(sink.locks, 2);
        assert_eq!(machine.last_outcome(), Some(Outcome::Failure));
    }

    #[test]
    fn outcome_is_overwritten_by_next_session() {
        let mut sink = RecordingSink::default();
        let mut machine = ready_machine(ConfigProfile::Clamped);
        machine.request_lock(&mut sink);
        assert_eq!(release_and_present(&mut machine, &mut sink), Outcome::Failure);

        machine.dismiss(&mut sink);
        drag_full_stroke(&mut machine, &mut sink);
        assert_eq!(release_and_present(&mut machine, &mut sink), Outcome::Success);
        assert_eq!(machine.last_outcome(), Some(Outcome::Success));
        assert_eq!(sink.outcomes, vec![Outcome::Failure, Outcome::Success]);
    }

    #[test]
    fn release_inside_forbidden_zone_keeps_dragging() {
        let mut sink = RecordingSink::default();
        let mut machine = ready_machine(ConfigProfile::PerspectiveCorrected);
        machine.request_lock(&mut sink);

        // -0.01 -> -0.06 -> ... -> -3.06, inside [-3.9, -2.9].
        machine.handle_motion(&PointerEvent::movement(0.0, 1.0), &mut sink);
        for _ in 0..6 {
            machine.handle_motion(&PointerEvent::movement(0.0, 10.0), &mut sink);
        }
        assert!((machine.pose().y + 3.06).abs() < 1e-9);

        assert!(machine.request_release(&mut sink).is_none());
        assert_eq!(machine.state(), SessionState::Dragging);
        assert_eq!(sink.unlocks, 0);

        machine.handle_motion(&PointerEvent::movement(0.0, 20.0), &mut sink);
        assert!(machine.request_release(&mut sink).is_some());
    }

    #[test]
    fn stale_presentation_is_discarded_after_reset() {
        let mut sink = RecordingSink::default();
        let mut machine = ready_machine(ConfigProfile::Clamped);
        machine.request_lock(&mut sink);
        drag_full_stroke(&mut machine, &mut sink);

        let pending = machine.request_release(&mut sink).expect("release accepted");
        machine.reset(&mut sink);

        assert!(!machine.present(pending.generation, &mut sink));
        assert_eq!(machine.state(), SessionState::Idle);
        assert_eq!(machine.last_outcome(), None);
        assert!(sink.outcomes.is_empty());
        assert_eq!(*machine.pose(), machine.config().initial_pose);
    }

    #[test]
    fn presentation_from_previous_session_does_not_leak() {
        let mut sink = RecordingSink::default();
        let mut machine = ready_machine(ConfigProfile::Clamped);
        machine.request_lock(&mut sink);
        let stale = machine.request_release(&mut sink).expect("release accepted");
        machine.reset(&mut sink);

        machine.request_lock(&mut sink);
        drag_full_stroke(&mut machine, &mut sink);
        let fresh = machine.request_release(&mut sink).expect("release accepted");

        assert!(!machine.present(stale.generation, &mut sink));
        assert!(machine.present(fresh.generation, &mut sink));
        assert_eq!(sink.outcomes, vec![Outcome::Success]);
    }

    #[test]
    fn press_toggles_lock() {
        let mut sink = RecordingSink::default();
        let mut machine = ready_machine(ConfigProfile::Classic);

        assert!(machine.handle_event(&PointerEvent::Press, &mut sink).is_none());
        assert_eq!(machine.state(), SessionState::Dragging);

        let pending = machine
            .handle_event(&PointerEvent::Press, &mut sink)
            .expect("press releases");
        assert_eq!(machine.state(), SessionState::Evaluating);
        assert_eq!(pending.delay, Duration::from_millis(1_000));

        assert!(machine.handle_event(&PointerEvent::Press, &mut sink).is_none());
        assert_eq!(machine.state(), SessionState::Evaluating);
    }

    #[test]
    fn touch_outside_screen_band_changes_nothing() {
        let mut sink = RecordingSink::default();
        let mut machine = ready_machine(ConfigProfile::Touch);
        machine.request_lock(&mut sink);
        let lines_before = sink.lines.len();
        let pose_before = *machine.pose();

        assert!(!machine.handle_motion(&PointerEvent::touch(425.0, 440.0), &mut sink));
        assert_eq!(*machine.pose(), pose_before);
        assert_eq!(*machine.extents(), TrackedExtents::default());
        assert!(sink.poses.is_empty());
        assert_eq!(sink.lines.len(), lines_before);

        assert!(machine.handle_motion(&PointerEvent::touch(425.0, 220.0), &mut sink));
        assert!((machine.pose().y + 3.1).abs() < 1e-9);
    }

    #[test]
    fn records_trace_when_enabled() {
        let mut config = EngineConfig::profile(ConfigProfile::Clamped);
        config.record_trace = true;
        let mut machine = SessionStateMachine::new(config).expect("valid config");
        machine.mark_assets_loaded();
        machine.set_active(true);
        let mut sink = RecordingSink::default();

        machine.request_lock(&mut sink);
        drag_full_stroke(&mut machine, &mut sink);
        release_and_present(&mut machine, &mut sink);

        let trace = machine.last_trace().expect("trace");
        assert_eq!(trace.samples.len(), sink.poses.len());
        assert_eq!(trace.outcome, Some(Outcome::Success));
    }

    #[test]
    fn snapshot_reflects_state() {
        let mut sink = RecordingSink::default();
        let mut machine = ready_machine(ConfigProfile::Clamped);
        machine.request_lock(&mut sink);

        let snapshot = machine.snapshot();
        assert_eq!(snapshot.state, SessionState::Dragging);
        assert_eq!(snapshot.generation, 1);
        assert_eq!(snapshot.popup, PopupKind::Intro);
        let json = serde_json::to_string(&snapshot).expect("serialize snapshot");
        assert!(json.contains("\"lastOutcome\":null"));
    }

    #[test]
    fn invalid_config_is_rejected() {
        let mut config = EngineConfig::default();
        config.position.step = 0.0;
        assert!(SessionStateMachine::new(config).is_err());
    }
}
