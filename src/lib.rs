pub mod algorithm;
pub mod commands;
pub mod error;
pub mod models;
pub mod session;
pub mod telemetry;

pub use error::{Result, TrainerError};
pub use models::config::{ConfigProfile, EngineConfig};
pub use models::events::PointerEvent;
pub use models::pose::Pose;
pub use session::actor::{spawn_engine, EngineHandle};
pub use session::machine::SessionStateMachine;
pub use session::sink::SceneSink;
pub use session::state::{Outcome, SessionState};

/// Initialises `env_logger` for hosts that do not install their own logger.
/// Safe to call more than once.
pub fn init_logging() {
    let _ = env_logger::try_init();
}
