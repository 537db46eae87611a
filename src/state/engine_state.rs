//! Lifecycle states of the traversal driver
//!
//! The driver starts `Running`, moves to `Draining` once the frontier has been
//! closed (by the termination detector or by cancellation), and ends
//! `Terminated` after the last buffered item has been consumed.

use crate::CrawlError;
use serde::Serialize;
use std::fmt;

/// Represents the current state of a traversal driver
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    /// Dequeuing work items and dispatching fetch tasks
    Running,

    /// Frontier closed; consuming whatever is still buffered
    Draining,

    /// Frontier closed and empty; the driver has returned
    Terminated,
}

impl EngineState {
    /// Returns true if the driver may still dispatch work
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Running | Self::Draining)
    }

    /// Returns true once the driver has finished
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Terminated)
    }

    /// Returns true if moving from `self` to `next` is allowed
    ///
    /// Only forward moves are legal. `Running -> Terminated` is allowed for a
    /// frontier that closes while nothing is buffered.
    pub fn can_transition_to(&self, next: EngineState) -> bool {
        matches!(
            (self, next),
            (Self::Running, Self::Draining)
                | (Self::Running, Self::Terminated)
                | (Self::Draining, Self::Terminated)
        )
    }

    /// Moves to `next`, or returns an error for an illegal transition
    pub fn transition(&mut self, next: EngineState) -> Result<(), CrawlError> {
        if !self.can_transition_to(next) {
            return Err(CrawlError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }

    /// Short lowercase name used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Draining => "draining",
            Self::Terminated => "terminated",
        }
    }
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
