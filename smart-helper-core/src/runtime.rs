//! Session runtime
//!
//! A console runs inside one tokio task that owns it outright. The task
//! advances the console's virtual clock from the tokio clock on every tick
//! and serves messages from a [`SessionHandle`] one at a time, so no lock is
//! ever taken on session state.
//!
//! The task ends on [`SessionHandle::shutdown`] or once every handle has been
//! dropped. Dropping the session releases all of its timers.

use std::time::Duration;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::Instrument;

use crate::error::{Error, Result};
use crate::session::{CommandOutcome, Simulation};

/// Default interval between clock advances
pub const DEFAULT_TICK: Duration = Duration::from_millis(250);

const CHANNEL_CAPACITY: usize = 64;

enum SessionMessage<S: Simulation> {
    Command {
        command: S::Command,
        reply: oneshot::Sender<CommandOutcome>,
    },
    Snapshot {
        reply: oneshot::Sender<S::Snapshot>,
    },
    Shutdown,
}

/// Cloneable handle to a running console
pub struct SessionHandle<S: Simulation> {
    sender: mpsc::Sender<SessionMessage<S>>,
}

impl<S: Simulation> Clone for SessionHandle<S> {
    fn clone(&self) -> Self {
        Self {
            sender: self.sender.clone(),
        }
    }
}

impl<S: Simulation> SessionHandle<S> {
    /// Move `session` into a new task ticking every `tick`.
    ///
    /// Must be called from inside a tokio runtime. The returned join handle
    /// resolves once the task has dropped the session.
    pub fn spawn(session: S, tick: Duration) -> (Self, JoinHandle<()>) {
        let (sender, receiver) = mpsc::channel(CHANNEL_CAPACITY);
        let span = tracing::info_span!("session", kind = S::NAME);
        let task = tokio::spawn(run_session(session, receiver, tick).instrument(span));
        (Self { sender }, task)
    }

    /// Apply a command once every timer due before it has fired
    pub async fn apply(&self, command: S::Command) -> Result<CommandOutcome> {
        let (reply, response) = oneshot::channel();
        self.send(SessionMessage::Command { command, reply }).await?;
        response.await.map_err(|_| closed::<S>())
    }

    /// Current state, caught up to the tokio clock
    pub async fn snapshot(&self) -> Result<S::Snapshot> {
        let (reply, response) = oneshot::channel();
        self.send(SessionMessage::Snapshot { reply }).await?;
        response.await.map_err(|_| closed::<S>())
    }

    /// Ask the task to stop after the messages already queued
    pub async fn shutdown(&self) -> Result<()> {
        self.send(SessionMessage::Shutdown).await
    }

    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    async fn send(&self, message: SessionMessage<S>) -> Result<()> {
        self.sender.send(message).await.map_err(|_| closed::<S>())
    }
}

fn closed<S: Simulation>() -> Error {
    Error::SessionClosed(S::NAME.to_string())
}

async fn run_session<S: Simulation>(
    mut session: S,
    mut receiver: mpsc::Receiver<SessionMessage<S>>,
    tick: Duration,
) {
    let offset = session.elapsed();
    let started = Instant::now();
    let mut interval = tokio::time::interval(tick.max(Duration::from_millis(1)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Delay);

    tracing::info!(tick_ms = tick.as_millis() as u64, "session started");

    loop {
        tokio::select! {
            _ = interval.tick() => {
                session.advance_to(offset + started.elapsed());
            }
            message = receiver.recv() => {
                session.advance_to(offset + started.elapsed());
                match message {
                    Some(SessionMessage::Command { command, reply }) => {
                        tracing::debug!(?command, "command received");
                        let outcome = session.apply(command);
                        if let CommandOutcome::Ignored(reason) = &outcome {
                            tracing::debug!(reason = %reason, "command ignored");
                        }
                        // Caller may have stopped waiting
                        let _ = reply.send(outcome);
                    }
                    Some(SessionMessage::Snapshot { reply }) => {
                        let _ = reply.send(session.snapshot());
                    }
                    Some(SessionMessage::Shutdown) | None => break,
                }
            }
        }
    }

    tracing::info!(
        elapsed_ms = session.elapsed().as_millis() as u64,
        "session stopped"
    );
}
