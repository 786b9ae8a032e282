use crate::algorithm::line_tracker::TrackedLines;
use crate::models::pose::Pose;
use crate::session::state::Outcome;

/// Host side of the engine: rendering, pointer capture and result popup.
///
/// Every method has an empty default so hosts only implement what they render.
pub trait SceneSink {
    /// Asks the host to capture the pointer (pointer lock). Touch hosts ignore it.
    fn request_pointer_lock(&mut self) {}

    fn exit_pointer_lock(&mut self) {}

    /// Called after every committed transform.
    fn set_object_pose(&mut self, _pose: &Pose) {}

    /// Called after every extent update.
    fn set_tracked_lines(&mut self, _lines: &TrackedLines) {}

    /// The host shows the result popup and later calls `dismiss`.
    fn on_outcome(&mut self, _outcome: Outcome) {}
}

/// Sink that drops every call.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl SceneSink for NullSink {}

impl<S: SceneSink + ?Sized> SceneSink for Box<S> {
    fn request_pointer_lock(&mut self) {
        (**self).request_pointer_lock()
    }

    fn exit_pointer_lock(&mut self) {
        (**self).exit_pointer_lock()
    }

    fn set_object_pose(&mut self, pose: &Pose) {
        (**self).set_object_pose(pose)
    }

    fn set_tracked_lines(&mut self, lines: &TrackedLines) {
        (**self).set_tracked_lines(lines)
    }

    fn on_outcome(&mut self, outcome: Outcome) {
        (**self).on_outcome(outcome)
    }
}
