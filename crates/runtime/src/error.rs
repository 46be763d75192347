//! Unified error types surfaced by the runtime API.
//!
//! Player and enemy commands never fail outward: rejections are logged and
//! degrade to a no-op. What remains here are session setup and lifecycle
//! failures.
use thiserror::Error;

use tactics_core::{ErrorSeverity, FloorError, GameError, TurnPhase};

pub type Result<T> = std::result::Result<T, RuntimeError>;

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("session requires a floor layout or battlefield before building")]
    MissingFloor,

    #[error("failed to initialize floor")]
    Floor(#[from] FloorError),

    #[error("floor has no ally units")]
    NoAllies,

    #[error("session already started (phase {phase})")]
    AlreadyStarted { phase: TurnPhase },
}

impl RuntimeError {
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::Floor(inner) => inner.severity(),
            Self::MissingFloor | Self::NoAllies => ErrorSeverity::Fatal,
            Self::AlreadyStarted { .. } => ErrorSeverity::Validation,
        }
    }
}
