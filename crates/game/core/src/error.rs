//! Common error infrastructure for tactics-core.
//!
//! Domain-specific errors (`PathError`, `MoveError`, `ActionError`, ...) live next
//! to the operations they guard. None of them reach the player: callers log the
//! error and degrade to a no-op, so the shared trait here only carries what a
//! log line or a test needs.

use crate::grid::Position;
use crate::unit::UnitId;

/// Severity level of an error, used for categorization and log levels.
///
/// - **Recoverable**: the request was reasonable but the board said no
/// - **Validation**: the request itself was malformed or out of turn
/// - **Internal**: an invariant broke or a guard tripped
/// - **Fatal**: the floor can no longer be played
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ErrorSeverity {
    /// Examples: destination blocked, target out of range.
    Recoverable,

    /// Examples: unit not found, unit already moved this turn.
    Validation,

    /// Examples: runaway search, broken route.
    Internal,

    /// Examples: floor layout that cannot be built.
    Fatal,
}

impl ErrorSeverity {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Recoverable => "recoverable",
            Self::Validation => "validation",
            Self::Internal => "internal",
            Self::Fatal => "fatal",
        }
    }

    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Self::Recoverable)
    }

    /// Returns true if this error indicates an engine bug.
    pub const fn is_internal(&self) -> bool {
        matches!(self, Self::Internal | Self::Fatal)
    }
}

/// Contextual information attached to command errors.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ErrorContext {
    pub unit: Option<UnitId>,
    pub position: Option<Position>,
}

impl ErrorContext {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            unit: None,
            position: None,
        }
    }

    #[must_use]
    pub const fn with_unit(mut self, unit: UnitId) -> Self {
        self.unit = Some(unit);
        self
    }

    #[must_use]
    pub const fn with_position(mut self, position: Position) -> Self {
        self.position = Some(position);
        self
    }
}

/// Common trait for all tactics-core errors.
///
/// - Use `#[derive(thiserror::Error)]` for Display/Error impl
/// - Classify severity based on recoverability, not impact
pub trait GameError: core::fmt::Display + core::fmt::Debug {
    fn severity(&self) -> ErrorSeverity;

    fn context(&self) -> ErrorContext {
        ErrorContext::new()
    }

    /// Static identifier for this error variant, used in logs and tests.
    fn error_code(&self) -> &'static str;
}
