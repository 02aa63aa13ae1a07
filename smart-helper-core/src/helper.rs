//! Helper console session
//!
//! One helper's view of the marketplace: a queue of incoming request cards,
//! at most one active job, the history of finished or rejected jobs, and the
//! running earnings totals.
//!
//! ## State machine
//!
//! ```text
//!            accept(id)
//! Available ───────────► Busy ── job: Pending → On The Way → In Progress
//!     ▲                                                   │
//!     └──────────────── completion effect ◄───────────────┘
//! ```
//!
//! The manual status toggle overrides the displayed status without looking
//! at the active job, so a helper can show `Available` while still holding a
//! job. Accepting stays gated on having no active job.
//!
//! ## Timers
//!
//! - initial load: one-shot, seeds the queue with two cards
//! - arrival: repeating, adds one card while `Available`
//! - auto-reject: one-shot per card, rejects it when the countdown runs out

use std::time::Duration;

use serde::Serialize;

use crate::config::HelperConfig;
use crate::generate::MockGenerator;
use crate::notify::{NotificationFeed, NOTIFICATION_TTL};
use crate::scheduler::Scheduler;
use crate::session::{CommandOutcome, SessionClock, Simulation};
use crate::types::{
    ActiveJob, Earnings, HelperStatus, HistoryStatus, IncomingRequest, JobHistoryEntry,
    JobStatus, Notification, NotificationKind,
};

#[derive(Debug, Clone, PartialEq)]
enum HelperTimer {
    InitialLoad,
    Arrival,
    AutoReject(String),
}

/// Commands the helper console accepts
#[derive(Debug, Clone, PartialEq)]
pub enum HelperCommand {
    /// Take an incoming request as the active job
    Accept(String),
    /// Decline an incoming request
    Reject(String),
    /// Move the active job one stage forward
    AdvanceJob,
    /// Flip between `Available` and `Busy`
    ToggleStatus,
    /// Set the displayed status directly
    SetStatus(HelperStatus),
}

/// Read-only copy of the helper console
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HelperSnapshot {
    pub helper_name: String,
    pub helper_status: HelperStatus,
    pub incoming_requests: Vec<IncomingRequest>,
    pub active_job: Option<ActiveJob>,
    pub job_history: Vec<JobHistoryEntry>,
    pub earnings: Earnings,
    pub loading_requests: bool,
    pub notifications: Vec<Notification>,
    pub elapsed_ms: u64,
}

/// Cadences for a helper console
#[derive(Debug, Clone)]
pub struct HelperTimings {
    pub initial_delay: Duration,
    pub arrival_every: Duration,
    pub auto_reject_after: Duration,
    pub notification_ttl: Duration,
}

impl Default for HelperTimings {
    fn default() -> Self {
        Self {
            initial_delay: Duration::from_secs(1),
            arrival_every: Duration::from_secs(15),
            auto_reject_after: Duration::from_secs(10),
            notification_ttl: NOTIFICATION_TTL,
        }
    }
}

impl HelperTimings {
    pub fn from_config(config: &HelperConfig, notification_ttl: Duration) -> Self {
        Self {
            initial_delay: Duration::from_millis(config.initial_delay_ms),
            arrival_every: Duration::from_secs(config.arrival_secs),
            auto_reject_after: Duration::from_secs(config.auto_reject_secs),
            notification_ttl,
        }
    }
}

/// In-memory state of one open helper console
pub struct HelperSession {
    helper_name: String,
    status: HelperStatus,
    incoming: Vec<IncomingRequest>,
    active_job: Option<ActiveJob>,
    history: Vec<JobHistoryEntry>,
    earnings: Earnings,
    loading: bool,
    feed: NotificationFeed,
    timings: HelperTimings,
    scheduler: Scheduler<HelperTimer>,
    generator: MockGenerator,
    clock: SessionClock,
}

impl HelperSession {
    /// Open a console; the initial load and arrival timers start now
    pub fn new(
        helper_name: impl Into<String>,
        timings: HelperTimings,
        generator: MockGenerator,
        clock: SessionClock,
    ) -> Self {
        let mut scheduler = Scheduler::new();
        scheduler.after(HelperTimer::InitialLoad, timings.initial_delay);
        scheduler.every(HelperTimer::Arrival, timings.arrival_every);

        let helper_name = helper_name.into();
        tracing::info!(helper = %helper_name, "helper console opened");

        Self {
            helper_name,
            status: HelperStatus::Available,
            incoming: Vec::new(),
            active_job: None,
            history: Vec::new(),
            earnings: Earnings::default(),
            loading: true,
            feed: NotificationFeed::new(timings.notification_ttl),
            timings,
            scheduler,
            generator,
            clock,
        }
    }

    pub fn status(&self) -> HelperStatus {
        self.status
    }

    pub fn incoming(&self) -> &[IncomingRequest] {
        &self.incoming
    }

    pub fn active_job(&self) -> Option<&ActiveJob> {
        self.active_job.as_ref()
    }

    pub fn history(&self) -> &[JobHistoryEntry] {
        &self.history
    }

    pub fn earnings(&self) -> Earnings {
        self.earnings
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn notifications(&self) -> &NotificationFeed {
        &self.feed
    }

    fn notify(&mut self, message: impl Into<String>, kind: NotificationKind) {
        let now = self.scheduler.now();
        let id = self.generator.notification_id(self.clock.at(now));
        self.feed.push(id, message, kind, now);
    }

    /// Put a card at the top of the queue with a fresh countdown
    pub fn offer(&mut self, request: IncomingRequest) {
        self.add_incoming(request);
    }

    fn add_incoming(&mut self, request: IncomingRequest) {
        self.scheduler.after(
            HelperTimer::AutoReject(request.id.clone()),
            self.timings.auto_reject_after,
        );
        self.incoming.insert(0, request);
    }

    fn take_incoming(&mut self, id: &str) -> Option<IncomingRequest> {
        let index = self.incoming.iter().position(|r| r.id == id)?;
        self.scheduler
            .cancel(&HelperTimer::AutoReject(id.to_string()));
        Some(self.incoming.remove(index))
    }

    // ============================================
    // Commands
    // ============================================

    /// Take `id` as the active job.
    ///
    /// Ignored while a job is active, while the status is not `Available`,
    /// or when the card is no longer in the queue.
    pub fn accept(&mut self, id: &str) -> CommandOutcome {
        if self.active_job.is_some() {
            return CommandOutcome::ignored("a job is already active");
        }
        if self.status != HelperStatus::Available {
            return CommandOutcome::ignored("helper is not available");
        }
        let Some(request) = self.take_incoming(id) else {
            tracing::debug!(request_id = %id, "accept ignored: unknown request");
            return CommandOutcome::ignored(format!("no incoming request {}", id));
        };

        tracing::info!(request_id = %id, "request accepted");
        self.active_job = Some(ActiveJob {
            request,
            job_status: JobStatus::Pending,
        });
        self.status = HelperStatus::Busy;
        CommandOutcome::Applied
    }

    /// Decline `id`, recording it in the history
    pub fn reject(&mut self, id: &str) -> CommandOutcome {
        self.reject_with(id, HistoryStatus::Rejected)
    }

    fn reject_with(&mut self, id: &str, status: HistoryStatus) -> CommandOutcome {
        let Some(request) = self.take_incoming(id) else {
            tracing::debug!(request_id = %id, "reject ignored: unknown request");
            return CommandOutcome::ignored(format!("no incoming request {}", id));
        };

        let date = self.clock.at(self.scheduler.now());
        self.history.insert(
            0,
            JobHistoryEntry {
                id: request.id,
                customer_name: request.customer_name,
                service_type: request.service_type,
                amount: request.payment_amount,
                status,
                date,
            },
        );

        match status {
            HistoryStatus::AutoRejected => {
                self.notify("Request auto-rejected", NotificationKind::Warning)
            }
            _ => self.notify("Request reassigned", NotificationKind::Info),
        }
        tracing::info!(request_id = %id, status = status.as_str(), "request rejected");
        CommandOutcome::Applied
    }

    /// Move the active job to its next stage.
    ///
    /// Stepping into `Completed` runs the completion effect instead of
    /// storing the status. Returns the stage reached.
    pub fn advance_job(&mut self) -> Option<JobStatus> {
        let job = self.active_job.as_mut()?;
        let next = job.job_status.next()?;
        if next == JobStatus::Completed {
            self.complete_job();
        } else {
            job.job_status = next;
            tracing::debug!(request_id = %job.request.id, job_status = next.as_str(), "job advanced");
        }
        Some(next)
    }

    fn complete_job(&mut self) {
        let Some(job) = self.active_job.take() else {
            return;
        };
        let amount = job.request.payment_amount;
        let date = self.clock.at(self.scheduler.now());

        self.history.insert(
            0,
            JobHistoryEntry {
                id: job.request.id.clone(),
                customer_name: job.request.customer_name.clone(),
                service_type: job.request.service_type,
                amount,
                status: HistoryStatus::Completed,
                date,
            },
        );
        self.earnings.today += u64::from(amount);
        self.earnings.weekly += u64::from(amount);
        self.earnings.total_jobs += 1;
        self.status = HelperStatus::Available;

        tracing::info!(
            request_id = %job.request.id,
            amount,
            total_jobs = self.earnings.total_jobs,
            "job completed"
        );
        self.notify("Job completed", NotificationKind::Success);
    }

    /// Flip the displayed status between `Available` and `Busy`
    pub fn toggle_status(&mut self) -> CommandOutcome {
        let next = match self.status {
            HelperStatus::Available => HelperStatus::Busy,
            _ => HelperStatus::Available,
        };
        self.set_status(next)
    }

    /// Override the displayed status.
    ///
    /// Only `Available` and `Busy` exist on this console. The override does
    /// not look at the active job.
    pub fn set_status(&mut self, status: HelperStatus) -> CommandOutcome {
        if status == HelperStatus::Offline {
            return CommandOutcome::ignored("offline is not a helper console status");
        }
        if status == HelperStatus::Available && self.active_job.is_some() {
            tracing::warn!("helper marked available while a job is still active");
        }
        self.status = status;
        CommandOutcome::Applied
    }

    // ============================================
    // Timers
    // ============================================

    fn on_timer(&mut self, timer: HelperTimer) {
        match timer {
            HelperTimer::InitialLoad => {
                let now = self.clock.at(self.scheduler.now());
                let initial = self.generator.initial_incoming(now);
                // Keep pool order: first template on top
                for request in initial.into_iter().rev() {
                    self.add_incoming(request);
                }
                self.loading = false;
                tracing::debug!(count = self.incoming.len(), "initial requests loaded");
            }
            HelperTimer::Arrival => {
                if self.status != HelperStatus::Available {
                    return;
                }
                let now = self.clock.at(self.scheduler.now());
                let request = self.generator.incoming_request(now);
                let message = format!(
                    "New {} request from {}",
                    request.service_type, request.customer_name
                );
                self.add_incoming(request);
                self.notify(message, NotificationKind::Info);
            }
            HelperTimer::AutoReject(id) => {
                self.reject_with(&id, HistoryStatus::AutoRejected);
            }
        }
    }
}

impl Simulation for HelperSession {
    type Command = HelperCommand;
    type Snapshot = HelperSnapshot;

    const NAME: &'static str = "helper";

    fn advance_to(&mut self, elapsed: Duration) {
        while let Some((at, timer)) = self.scheduler.pop_due(elapsed) {
            self.feed.expire(at);
            self.on_timer(timer);
        }
        self.scheduler.settle(elapsed);
        self.feed.expire(elapsed);
    }

    fn apply(&mut self, command: HelperCommand) -> CommandOutcome {
        match command {
            HelperCommand::Accept(id) => self.accept(&id),
            HelperCommand::Reject(id) => self.reject(&id),
            HelperCommand::AdvanceJob => match self.advance_job() {
                Some(_) => CommandOutcome::Applied,
                None => CommandOutcome::ignored("no active job"),
            },
            HelperCommand::ToggleStatus => self.toggle_status(),
            HelperCommand::SetStatus(status) => self.set_status(status),
        }
    }

    fn snapshot(&self) -> HelperSnapshot {
        HelperSnapshot {
            helper_name: self.helper_name.clone(),
            helper_status: self.status,
            incoming_requests: self.incoming.clone(),
            active_job: self.active_job.clone(),
            job_history: self.history.clone(),
            earnings: self.earnings,
            loading_requests: self.loading,
            notifications: self.feed.active(),
            elapsed_ms: self.scheduler.now().as_millis() as u64,
        }
    }

    fn elapsed(&self) -> Duration {
        self.scheduler.now()
    }
}
