//! Pieces shared by the helper and admin consoles
//!
//! A console is a [`Simulation`]: state plus a virtual clock that only moves
//! through [`Simulation::advance_to`], and a closed set of commands applied
//! through [`Simulation::apply`]. The runtime in [`crate::runtime`] drives any
//! simulation from the tokio clock; tests drive them directly.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Result of applying a console command
///
/// Commands never fail. A command whose target is missing, or whose effect
/// the current state does not allow, is `Ignored` and leaves state as it was.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", content = "reason", rename_all = "snake_case")]
pub enum CommandOutcome {
    Applied,
    Ignored(String),
}

impl CommandOutcome {
    pub fn ignored(reason: impl Into<String>) -> Self {
        CommandOutcome::Ignored(reason.into())
    }

    pub fn is_applied(&self) -> bool {
        matches!(self, CommandOutcome::Applied)
    }
}

/// A console whose state moves on a virtual clock
pub trait Simulation: Send + 'static {
    /// Commands the console accepts
    type Command: Send + std::fmt::Debug + 'static;
    /// Read-only view handed to renderers
    type Snapshot: Send + 'static;

    /// Console name used in log fields
    const NAME: &'static str;

    /// Run every timer due up to `elapsed` since the console opened
    fn advance_to(&mut self, elapsed: Duration);

    /// Apply one command at the current virtual time
    fn apply(&mut self, command: Self::Command) -> CommandOutcome;

    /// Copy of the current state
    fn snapshot(&self) -> Self::Snapshot;

    /// Virtual time since the console opened
    fn elapsed(&self) -> Duration;
}

/// Maps virtual time onto wall-clock timestamps
#[derive(Debug, Clone, Copy)]
pub struct SessionClock {
    started_at: DateTime<Utc>,
}

impl SessionClock {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self { started_at }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Wall-clock time `elapsed` after the console opened
    pub fn at(&self, elapsed: Duration) -> DateTime<Utc> {
        let offset = chrono::Duration::from_std(elapsed).unwrap_or(chrono::Duration::zero());
        self.started_at + offset
    }
}
