//! Pipeline lifecycle: `Starting → Ready → Draining → Stopped`.

use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

use serde::Serialize;
use utoipa::ToSchema;

use crate::error::PipelineError;

/// Lifecycle state of the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum PipelineState {
    /// Loading the watermark and seeding the station directory.
    Starting,
    /// Accepting raw records.
    Ready,
    /// Refusing new records while in-flight ones finish.
    Draining,
    /// Terminal.
    Stopped,
}

impl PipelineState {
    /// Lower-case state name.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Starting => "starting",
            Self::Ready => "ready",
            Self::Draining => "draining",
            Self::Stopped => "stopped",
        }
    }

    /// Returns `true` if the state machine allows `self → next`.
    #[must_use]
    pub const fn can_transition_to(&self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Starting, Self::Ready)
                | (Self::Starting, Self::Stopped)
                | (Self::Ready, Self::Draining)
                | (Self::Draining, Self::Stopped)
        )
    }

    const fn to_u8(self) -> u8 {
        match self {
            Self::Starting => 0,
            Self::Ready => 1,
            Self::Draining => 2,
            Self::Stopped => 3,
        }
    }

    const fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Starting,
            1 => Self::Ready,
            2 => Self::Draining,
            _ => Self::Stopped,
        }
    }
}

impl fmt::Display for PipelineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Atomic holder for the current [`PipelineState`].
#[derive(Debug)]
pub struct Lifecycle {
    state: AtomicU8,
}

impl Lifecycle {
    /// Creates a lifecycle in [`PipelineState::Starting`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            state: AtomicU8::new(PipelineState::Starting.to_u8()),
        }
    }

    /// Current state.
    #[must_use]
    pub fn current(&self) -> PipelineState {
        PipelineState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Moves to `next` if the transition is allowed from the current state,
    /// returning the state it left.
    ///
    /// # Errors
    ///
    /// Returns [`PipelineError::InvalidTransition`] otherwise; the state is
    /// left unchanged.
    pub fn transition(&self, next: PipelineState) -> Result<PipelineState, PipelineError> {
        self.state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                let from = PipelineState::from_u8(raw);
                from.can_transition_to(next).then_some(next.to_u8())
            })
            .map(PipelineState::from_u8)
            .map_err(|raw| PipelineError::InvalidTransition {
                from: PipelineState::from_u8(raw),
                to: next,
            })
    }
}

impl Default for Lifecycle {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;

    #[test]
    fn happy_path_runs_to_stopped() {
        let lifecycle = Lifecycle::new();
        assert_eq!(lifecycle.current(), PipelineState::Starting);
        assert!(lifecycle.transition(PipelineState::Ready).is_ok());
        assert!(lifecycle.transition(PipelineState::Draining).is_ok());
        assert!(lifecycle.transition(PipelineState::Stopped).is_ok());
        assert_eq!(lifecycle.current(), PipelineState::Stopped);
    }

    #[test]
    fn startup_failure_stops_directly() {
        let lifecycle = Lifecycle::new();
        assert!(lifecycle.transition(PipelineState::Stopped).is_ok());
    }

    #[test]
    fn stopped_is_terminal() {
        let lifecycle = Lifecycle::new();
        let _ = lifecycle.transition(PipelineState::Stopped);
        for next in [
            PipelineState::Starting,
            PipelineState::Ready,
            PipelineState::Draining,
            PipelineState::Stopped,
        ] {
            assert!(lifecycle.transition(next).is_err());
        }
    }

    #[test]
    fn rejected_transition_reports_both_states() {
        let lifecycle = Lifecycle::new();
        let Err(PipelineError::InvalidTransition { from, to }) =
            lifecycle.transition(PipelineState::Draining)
        else {
            panic!("starting -> draining must be rejected");
        };
        assert_eq!(from, PipelineState::Starting);
        assert_eq!(to, PipelineState::Draining);
        assert_eq!(lifecycle.current(), PipelineState::Starting);
    }

    #[test]
    fn ready_cannot_skip_draining() {
        let lifecycle = Lifecycle::new();
        let _ = lifecycle.transition(PipelineState::Ready);
        assert!(lifecycle.transition(PipelineState::Stopped).is_err());
        assert!(lifecycle.transition(PipelineState::Ready).is_err());
    }
}
