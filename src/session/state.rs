//! Session lifecycle states and the outcome of a completed drag.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "kebab-case")]
pub enum SessionState {
    #[default]
    Idle,
    Dragging,
    Evaluating,
    ResultShown,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum Outcome {
    Success,
    Failure,
}

/// Which popup text the host should show.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum PopupKind {
    /// No session has completed yet.
    Intro,
    Success,
    Failure,
}

impl From<Option<Outcome>> for PopupKind {
    fn from(outcome: Option<Outcome>) -> Self {
        match outcome {
            None => PopupKind::Intro,
            Some(Outcome::Success) => PopupKind::Success,
            Some(Outcome::Failure) => PopupKind::Failure,
        }
    }
}
