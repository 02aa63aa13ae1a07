//! Admin console session
//!
//! Fleet-wide state: every request and helper, the derived dashboard
//! metrics, an activity log, open fraud alerts and the console settings.
//!
//! Three repeating timers keep the fleet moving:
//!
//! | Timer       | Default | Effect                                          |
//! |-------------|---------|-------------------------------------------------|
//! | arrival     | 20s     | new pending request, alert when high risk       |
//! | drift       | 15s     | each helper may reroll its status               |
//! | auto-assign | 10s     | pending requests get assigned, assigned complete|
//!
//! Metrics are recomputed after every change to requests or helpers, so the
//! revenue figure is always the sum over completed requests.

use std::time::Duration;

use serde::Serialize;

use crate::config::AdminConfig;
use crate::generate::MockGenerator;
use crate::notify::{NotificationFeed, NOTIFICATION_TTL};
use crate::scheduler::Scheduler;
use crate::session::{CommandOutcome, SessionClock, Simulation};
use crate::types::{
    DashboardMetrics, FraudAlert, FraudRisk, Helper, HelperStatus, LogActor, LogEntry,
    LogEventType, LogStatus, Notification, NotificationKind, RequestStatus, ServiceRequest,
    ServiceType, SettingKey, SystemSettings, SYSTEM_UPTIME,
};

/// Reason attached to every generated fraud alert
pub const FRAUD_REASON: &str = "Suspicious payment pattern";

#[derive(Debug, Clone, Copy, PartialEq)]
enum AdminTimer {
    Arrival,
    Drift,
    AutoAssign,
}

/// Commands the admin console accepts
#[derive(Debug, Clone, PartialEq)]
pub enum AdminCommand {
    CancelRequest(String),
    ForceComplete(String),
    ManualAssign {
        request_id: String,
        helper_id: String,
    },
    ChangeHelperStatus {
        helper_id: String,
        status: HelperStatus,
    },
    SuspendHelper(String),
    BlockFraud(String),
    AllowFraud(String),
    UpdateSetting {
        key: SettingKey,
        value: bool,
    },
    /// Customer booking
    CreateRequest {
        customer_name: String,
        service_type: ServiceType,
        payment_amount: u32,
    },
}

/// Read-only copy of the admin console
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdminSnapshot {
    pub requests: Vec<ServiceRequest>,
    pub helpers: Vec<Helper>,
    pub metrics: DashboardMetrics,
    pub logs: Vec<LogEntry>,
    pub fraud_alerts: Vec<FraudAlert>,
    pub system_settings: SystemSettings,
    pub notifications: Vec<Notification>,
    pub elapsed_ms: u64,
}

/// Cadences, probabilities and seed sizes for an admin console
#[derive(Debug, Clone)]
pub struct AdminTuning {
    pub arrival_every: Duration,
    pub drift_every: Duration,
    pub auto_assign_every: Duration,
    pub drift_probability: f64,
    pub assign_probability: f64,
    pub complete_probability: f64,
    pub initial_requests: usize,
    pub initial_helpers: usize,
    pub initial_logs: usize,
    pub log_capacity: usize,
    pub notification_ttl: Duration,
}

impl Default for AdminTuning {
    fn default() -> Self {
        Self::from_config(&AdminConfig::default(), NOTIFICATION_TTL)
    }
}

impl AdminTuning {
    pub fn from_config(config: &AdminConfig, notification_ttl: Duration) -> Self {
        Self {
            arrival_every: Duration::from_secs(config.arrival_secs),
            drift_every: Duration::from_secs(config.drift_secs),
            auto_assign_every: Duration::from_secs(config.auto_assign_secs),
            drift_probability: config.drift_probability,
            assign_probability: config.assign_probability,
            complete_probability: config.complete_probability,
            initial_requests: config.initial_requests,
            initial_helpers: config.initial_helpers,
            initial_logs: config.initial_logs,
            log_capacity: config.log_capacity,
            notification_ttl,
        }
    }

    /// No seed data, so tests can place their own requests and helpers
    pub fn empty() -> Self {
        Self {
            initial_requests: 0,
            initial_helpers: 0,
            initial_logs: 0,
            ..Self::default()
        }
    }
}

/// In-memory state of one open admin console
pub struct AdminSession {
    requests: Vec<ServiceRequest>,
    helpers: Vec<Helper>,
    metrics: DashboardMetrics,
    logs: Vec<LogEntry>,
    fraud_alerts: Vec<FraudAlert>,
    settings: SystemSettings,
    feed: NotificationFeed,
    tuning: AdminTuning,
    next_log_seq: u64,
    scheduler: Scheduler<AdminTimer>,
    generator: MockGenerator,
    clock: SessionClock,
}

impl AdminSession {
    /// Open a console seeded with generated requests, helpers and logs
    pub fn new(tuning: AdminTuning, mut generator: MockGenerator, clock: SessionClock) -> Self {
        let now = clock.started_at();
        let requests: Vec<ServiceRequest> = (0..tuning.initial_requests)
            .map(|_| generator.create_request(now))
            .collect();
        let helpers: Vec<Helper> = (0..tuning.initial_helpers)
            .map(|_| generator.create_helper())
            .collect();
        let logs: Vec<LogEntry> = (0..tuning.initial_logs)
            .map(|i| generator.create_log_entry(i, now))
            .collect();
        let fraud_alerts = requests
            .iter()
            .filter(|r| r.fraud_risk == FraudRisk::High)
            .map(fraud_alert_for)
            .collect();

        let mut scheduler = Scheduler::new();
        scheduler.every(AdminTimer::Arrival, tuning.arrival_every);
        scheduler.every(AdminTimer::Drift, tuning.drift_every);
        scheduler.every(AdminTimer::AutoAssign, tuning.auto_assign_every);

        tracing::info!(
            requests = requests.len(),
            helpers = helpers.len(),
            "admin console opened"
        );

        let mut session = Self {
            requests,
            helpers,
            metrics: DashboardMetrics::default(),
            logs,
            fraud_alerts,
            settings: SystemSettings::default(),
            feed: NotificationFeed::new(tuning.notification_ttl),
            tuning,
            next_log_seq: 0,
            scheduler,
            generator,
            clock,
        };
        session.recompute_metrics();
        session
    }

    pub fn requests(&self) -> &[ServiceRequest] {
        &self.requests
    }

    pub fn request(&self, id: &str) -> Option<&ServiceRequest> {
        self.requests.iter().find(|r| r.id == id)
    }

    pub fn helpers(&self) -> &[Helper] {
        &self.helpers
    }

    pub fn helper(&self, id: &str) -> Option<&Helper> {
        self.helpers.iter().find(|h| h.id == id)
    }

    pub fn metrics(&self) -> &DashboardMetrics {
        &self.metrics
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn fraud_alerts(&self) -> &[FraudAlert] {
        &self.fraud_alerts
    }

    pub fn settings(&self) -> SystemSettings {
        self.settings
    }

    pub fn notifications(&self) -> &NotificationFeed {
        &self.feed
    }

    /// Place a request at the top of the list, as an arrival would
    pub fn insert_request(&mut self, request: ServiceRequest) {
        if request.fraud_risk == FraudRisk::High {
            self.fraud_alerts.insert(0, fraud_alert_for(&request));
        }
        self.requests.insert(0, request);
        self.recompute_metrics();
    }

    pub fn insert_helper(&mut self, helper: Helper) {
        self.helpers.push(helper);
        self.recompute_metrics();
    }

    fn recompute_metrics(&mut self) {
        let completed = self
            .requests
            .iter()
            .filter(|r| r.status == RequestStatus::Completed);

        self.metrics = DashboardMetrics {
            total_active_requests: self
                .requests
                .iter()
                .filter(|r| !r.status.is_terminal())
                .count(),
            total_online_helpers: self
                .helpers
                .iter()
                .filter(|h| h.status != HelperStatus::Offline)
                .count(),
            completed_today: completed.clone().count(),
            cancelled_today: self
                .requests
                .iter()
                .filter(|r| r.status == RequestStatus::Cancelled)
                .count(),
            revenue_today: completed.map(|r| u64::from(r.payment_amount)).sum(),
            avg_response_time: self.generator.avg_response_time(),
            system_uptime: SYSTEM_UPTIME.to_string(),
        };
    }

    fn notify(&mut self, message: impl Into<String>) {
        let now = self.scheduler.now();
        let id = self.generator.notification_id(self.clock.at(now));
        self.feed.push(id, message, NotificationKind::Info, now);
    }

    fn log(
        &mut self,
        event_type: LogEventType,
        actor: LogActor,
        description: impl Into<String>,
        status: LogStatus,
    ) {
        let timestamp = self.clock.at(self.scheduler.now());
        let id = format!("log-{}-{}", timestamp.timestamp_millis(), self.next_log_seq);
        self.next_log_seq += 1;
        self.logs.insert(
            0,
            LogEntry {
                id,
                timestamp,
                event_type,
                actor,
                description: description.into(),
                status,
            },
        );
        self.logs.truncate(self.tuning.log_capacity);
    }

    fn request_index(&self, id: &str) -> Option<usize> {
        self.requests.iter().position(|r| r.id == id)
    }

    fn helper_index(&self, id: &str) -> Option<usize> {
        self.helpers.iter().position(|h| h.id == id)
    }

    /// Move request `id` to `next` when the transition is allowed
    fn transition(&mut self, id: &str, next: RequestStatus) -> CommandOutcome {
        let Some(index) = self.request_index(id) else {
            tracing::debug!(request_id = %id, "command ignored: unknown request");
            return CommandOutcome::ignored(format!("no request {}", id));
        };
        let current = self.requests[index].status;
        if !current.can_transition_to(next) {
            tracing::debug!(
                request_id = %id,
                from = current.as_str(),
                to = next.as_str(),
                "command ignored: transition not allowed"
            );
            return CommandOutcome::ignored(format!(
                "request {} cannot move from {} to {}",
                id, current, next
            ));
        }
        self.requests[index].status = next;
        self.recompute_metrics();
        CommandOutcome::Applied
    }

    // ============================================
    // Commands
    // ============================================

    /// Cancel a pending or assigned request.
    ///
    /// Any known request gets the notification, even when its state keeps
    /// it from moving; the activity log only records real changes.
    pub fn cancel_request(&mut self, id: &str) -> CommandOutcome {
        let outcome = self.transition(id, RequestStatus::Cancelled);
        if self.request_index(id).is_some() {
            self.notify(format!("Request {} cancelled", id));
        }
        if outcome.is_applied() {
            self.log(
                LogEventType::SystemUpdate,
                LogActor::Admin,
                format!("Request {} cancelled", id),
                LogStatus::Warning,
            );
        }
        outcome
    }

    /// Complete an assigned request.
    ///
    /// Pending requests must be assigned first: requests only ever move
    /// `Pending -> Assigned -> Completed`.
    pub fn force_complete(&mut self, id: &str) -> CommandOutcome {
        let pending = self
            .request(id)
            .is_some_and(|r| r.status == RequestStatus::Pending);
        let outcome = if pending {
            tracing::debug!(request_id = %id, "force complete ignored: request not assigned");
            CommandOutcome::ignored(format!(
                "request {} is Pending; assign it before completing",
                id
            ))
        } else {
            self.transition(id, RequestStatus::Completed)
        };

        if self.request_index(id).is_some() {
            self.notify(format!("Request {} force completed", id));
        }
        if outcome.is_applied() {
            self.log(
                LogEventType::JobCompleted,
                LogActor::Admin,
                format!("Request {} force completed", id),
                LogStatus::Success,
            );
        }
        outcome
    }

    /// Assign a pending request to a helper, making the helper busy with it
    pub fn manual_assign(&mut self, request_id: &str, helper_id: &str) -> CommandOutcome {
        let Some(helper_index) = self.helper_index(helper_id) else {
            tracing::debug!(helper_id = %helper_id, "assign ignored: unknown helper");
            return CommandOutcome::ignored(format!("no helper {}", helper_id));
        };
        let Some(request_index) = self.request_index(request_id) else {
            tracing::debug!(request_id = %request_id, "assign ignored: unknown request");
            return CommandOutcome::ignored(format!("no request {}", request_id));
        };
        let name = self.helpers[helper_index].name.clone();
        let message = format!("Request {} manually assigned to {}", request_id, name);

        let current = self.requests[request_index].status;
        if !current.can_transition_to(RequestStatus::Assigned) {
            tracing::debug!(request_id = %request_id, from = current.as_str(), "assign ignored");
            self.notify(message);
            return CommandOutcome::ignored(format!(
                "request {} is {}",
                request_id, current
            ));
        }

        let helper = &mut self.helpers[helper_index];
        helper.status = HelperStatus::Busy;
        helper.current_job = Some(request_id.to_string());

        let request = &mut self.requests[request_index];
        request.status = RequestStatus::Assigned;
        request.assigned_helper = Some(name);
        self.recompute_metrics();

        tracing::info!(request_id = %request_id, helper_id = %helper_id, "request manually assigned");
        self.notify(message.clone());
        self.log(
            LogEventType::HelperAssigned,
            LogActor::Admin,
            message,
            LogStatus::Success,
        );
        CommandOutcome::Applied
    }

    pub fn change_helper_status(&mut self, helper_id: &str, status: HelperStatus) -> CommandOutcome {
        let Some(index) = self.helper_index(helper_id) else {
            tracing::debug!(helper_id = %helper_id, "status change ignored: unknown helper");
            return CommandOutcome::ignored(format!("no helper {}", helper_id));
        };
        self.helpers[index].status = status;
        self.recompute_metrics();

        self.notify(format!("Helper status updated to {}", status));
        let description = format!("Helper {} set to {}", self.helpers[index].name, status);
        self.log(
            LogEventType::SystemUpdate,
            LogActor::Admin,
            description,
            LogStatus::Success,
        );
        CommandOutcome::Applied
    }

    /// Take a helper offline and drop its current job
    pub fn suspend_helper(&mut self, helper_id: &str) -> CommandOutcome {
        let Some(index) = self.helper_index(helper_id) else {
            tracing::debug!(helper_id = %helper_id, "suspend ignored: unknown helper");
            return CommandOutcome::ignored(format!("no helper {}", helper_id));
        };
        let helper = &mut self.helpers[index];
        helper.status = HelperStatus::Offline;
        helper.current_job = None;
        let description = format!("Helper {} suspended", helper.name);
        self.recompute_metrics();

        tracing::info!(helper_id = %helper_id, "helper suspended");
        self.notify("Helper suspended");
        self.log(
            LogEventType::SystemUpdate,
            LogActor::Admin,
            description,
            LogStatus::Warning,
        );
        CommandOutcome::Applied
    }

    /// Cancel a flagged request, mark it blocked and clear its alert.
    ///
    /// A request that already finished keeps its state; only the alert goes.
    pub fn block_fraud_request(&mut self, request_id: &str) -> CommandOutcome {
        let known = self.request_index(request_id).is_some();
        let had_alert = self.remove_alert(request_id);
        let mut blocked = false;
        if let Some(index) = self.request_index(request_id) {
            let request = &mut self.requests[index];
            if request.status.can_transition_to(RequestStatus::Cancelled) {
                request.status = RequestStatus::Cancelled;
                request.fraud_risk = FraudRisk::Blocked;
                blocked = true;
            }
        }

        let message = format!("Request {} blocked due to fraud", request_id);
        if known || had_alert {
            self.notify(message.clone());
        }
        if !had_alert && !blocked {
            tracing::debug!(request_id = %request_id, "block ignored: nothing to block");
            return CommandOutcome::ignored(format!("nothing to block for {}", request_id));
        }
        if blocked {
            self.recompute_metrics();
        }

        tracing::info!(request_id = %request_id, blocked, "fraud request blocked");
        self.log(
            LogEventType::SystemUpdate,
            LogActor::Admin,
            message,
            LogStatus::Warning,
        );
        CommandOutcome::Applied
    }

    /// Dismiss the alert and leave the request alone
    pub fn allow_fraud_request(&mut self, request_id: &str) -> CommandOutcome {
        let known = self.request_index(request_id).is_some();
        let had_alert = self.remove_alert(request_id);
        let message = format!("Request {} allowed", request_id);
        if known || had_alert {
            self.notify(message.clone());
        }
        if !had_alert {
            tracing::debug!(request_id = %request_id, "allow ignored: no open alert");
            return CommandOutcome::ignored(format!("no fraud alert for {}", request_id));
        }
        self.log(
            LogEventType::SystemUpdate,
            LogActor::Admin,
            message,
            LogStatus::Success,
        );
        CommandOutcome::Applied
    }

    fn remove_alert(&mut self, request_id: &str) -> bool {
        let before = self.fraud_alerts.len();
        self.fraud_alerts.retain(|a| a.request_id != request_id);
        self.fraud_alerts.len() != before
    }

    /// Flip one console setting. Settings do not feed back into the timers.
    pub fn update_setting(&mut self, key: SettingKey, value: bool) -> CommandOutcome {
        self.settings.set(key, value);
        self.notify(format!("Setting {} updated", key));
        self.log(
            LogEventType::SystemUpdate,
            LogActor::Admin,
            format!("Setting {} set to {}", key, value),
            LogStatus::Success,
        );
        CommandOutcome::Applied
    }

    /// Book a new request on behalf of a customer
    pub fn create_request(
        &mut self,
        customer_name: &str,
        service_type: ServiceType,
        payment_amount: u32,
    ) -> ServiceRequest {
        let mut request = self.generator.create_request(self.clock.at(self.scheduler.now()));
        request.customer_name = customer_name.to_string();
        request.service_type = service_type;
        request.payment_amount = payment_amount;

        tracing::info!(request_id = %request.id, service = %service_type, "request booked");
        self.insert_request(request.clone());
        self.notify(format!(
            "New {} request from {}",
            request.service_type, request.customer_name
        ));
        self.log(
            LogEventType::RequestCreated,
            LogActor::System,
            format!("{} booked {}", request.customer_name, request.service_type),
            LogStatus::Success,
        );
        request
    }

    // ============================================
    // Timers
    // ============================================

    fn on_arrival(&mut self) {
        let request = self.generator.create_request(self.clock.at(self.scheduler.now()));
        let message = format!(
            "New {} request from {}",
            request.service_type, request.customer_name
        );
        let description = format!("New {} request created", request.service_type);
        tracing::debug!(request_id = %request.id, risk = request.fraud_risk.as_str(), "request arrived");

        self.insert_request(request);
        self.notify(message);
        self.log(
            LogEventType::RequestCreated,
            LogActor::System,
            description,
            LogStatus::Success,
        );
    }

    fn on_drift(&mut self) {
        let mut changes = Vec::new();
        for index in 0..self.helpers.len() {
            if !self.generator.roll(self.tuning.drift_probability) {
                continue;
            }
            let status = self.generator.helper_status();
            let helper = &mut self.helpers[index];
            if helper.status != status {
                changes.push(format!("Helper {} is now {}", helper.name, status));
            }
            helper.status = status;
        }
        self.recompute_metrics();
        for message in changes {
            self.notify(message);
        }
    }

    fn on_auto_assign(&mut self) {
        // Helper picked from the fleet as it stood when the round started
        let available = self
            .helpers
            .iter()
            .find(|h| h.status == HelperStatus::Available)
            .map(|h| h.name.clone());

        let mut events = Vec::new();
        for index in 0..self.requests.len() {
            match self.requests[index].status {
                RequestStatus::Pending => {
                    if !self.generator.roll(self.tuning.assign_probability) {
                        continue;
                    }
                    let Some(name) = available.clone() else {
                        continue;
                    };
                    let request = &mut self.requests[index];
                    request.status = RequestStatus::Assigned;
                    request.assigned_helper = Some(name.clone());
                    events.push((
                        LogEventType::HelperAssigned,
                        format!("Request {} assigned to {}", request.id, name),
                    ));
                }
                RequestStatus::Assigned => {
                    if !self.generator.roll(self.tuning.complete_probability) {
                        continue;
                    }
                    let request = &mut self.requests[index];
                    request.status = RequestStatus::Completed;
                    events.push((
                        LogEventType::JobCompleted,
                        format!("Request {} completed", request.id),
                    ));
                }
                _ => {}
            }
        }

        if events.is_empty() {
            return;
        }
        self.recompute_metrics();
        tracing::debug!(changes = events.len(), "auto-assignment round");
        for (event_type, message) in events {
            self.notify(message.clone());
            self.log(event_type, LogActor::System, message, LogStatus::Success);
        }
    }

    fn on_timer(&mut self, timer: AdminTimer) {
        match timer {
            AdminTimer::Arrival => self.on_arrival(),
            AdminTimer::Drift => self.on_drift(),
            AdminTimer::AutoAssign => self.on_auto_assign(),
        }
    }
}

fn fraud_alert_for(request: &ServiceRequest) -> FraudAlert {
    FraudAlert {
        request_id: request.id.clone(),
        customer_name: request.customer_name.clone(),
        risk_level: request.fraud_risk,
        reason: FRAUD_REASON.to_string(),
    }
}

impl Simulation for AdminSession {
    type Command = AdminCommand;
    type Snapshot = AdminSnapshot;

    const NAME: &'static str = "admin";

    fn advance_to(&mut self, elapsed: Duration) {
        while let Some((at, timer)) = self.scheduler.pop_due(elapsed) {
            self.feed.expire(at);
            self.on_timer(timer);
        }
        self.scheduler.settle(elapsed);
        self.feed.expire(elapsed);
    }

    fn apply(&mut self, command: AdminCommand) -> CommandOutcome {
        match command {
            AdminCommand::CancelRequest(id) => self.cancel_request(&id),
            AdminCommand::ForceComplete(id) => self.force_complete(&id),
            AdminCommand::ManualAssign {
                request_id,
                helper_id,
            } => self.manual_assign(&request_id, &helper_id),
            AdminCommand::ChangeHelperStatus { helper_id, status } => {
                self.change_helper_status(&helper_id, status)
            }
            AdminCommand::SuspendHelper(id) => self.suspend_helper(&id),
            AdminCommand::BlockFraud(id) => self.block_fraud_request(&id),
            AdminCommand::AllowFraud(id) => self.allow_fraud_request(&id),
            AdminCommand::UpdateSetting { key, value } => self.update_setting(key, value),
            AdminCommand::CreateRequest {
                customer_name,
                service_type,
                payment_amount,
            } => {
                self.create_request(&customer_name, service_type, payment_amount);
                CommandOutcome::Applied
            }
        }
    }

    fn snapshot(&self) -> AdminSnapshot {
        AdminSnapshot {
            requests: self.requests.clone(),
            helpers: self.helpers.clone(),
            metrics: self.metrics.clone(),
            logs: self.logs.clone(),
            fraud_alerts: self.fraud_alerts.clone(),
            system_settings: self.settings,
            notifications: self.feed.active(),
            elapsed_ms: self.scheduler.now().as_millis() as u64,
        }
    }

    fn elapsed(&self) -> Duration {
        self.scheduler.now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::MatchQuality;
    use chrono::Utc;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    fn request(id: &str, status: RequestStatus, payment: u32) -> ServiceRequest {
        ServiceRequest {
            id: id.to_string(),
            customer_name: "Meera Nair".to_string(),
            service_type: ServiceType::Plumbing,
            status,
            assigned_helper: None,
            created_at: Utc::now(),
            eta_minutes: 12,
            match_quality: MatchQuality::High,
            fraud_risk: FraudRisk::Low,
            payment_amount: payment,
        }
    }

    fn helper(id: &str, name: &str, status: HelperStatus) -> Helper {
        Helper {
            id: id.to_string(),
            name: name.to_string(),
            status,
            current_job: None,
            rating: 4.5,
            earnings_today: 900,
            location: "Kochi".to_string(),
        }
    }

    fn empty_session() -> AdminSession {
        AdminSession::new(
            AdminTuning::empty(),
            MockGenerator::from_seed(23),
            SessionClock::new(Utc::now()),
        )
    }

    fn quiet_tuning() -> AdminTuning {
        AdminTuning {
            drift_probability: 0.0,
            assign_probability: 0.0,
            complete_probability: 0.0,
            ..AdminTuning::empty()
        }
    }

    fn assert_revenue_consistent(session: &AdminSession) {
        let expected: u64 = session
            .requests()
            .iter()
            .filter(|r| r.status == RequestStatus::Completed)
            .map(|r| u64::from(r.payment_amount))
            .sum();
        assert_eq!(session.metrics().revenue_today, expected);
    }

    #[test]
    fn test_initial_seed() {
        let session = AdminSession::new(
            AdminTuning::default(),
            MockGenerator::from_seed(4),
            SessionClock::new(Utc::now()),
        );
        assert_eq!(session.requests().len(), 8);
        assert_eq!(session.helpers().len(), 12);
        assert_eq!(session.logs().len(), 20);

        let high: Vec<&str> = session
            .requests()
            .iter()
            .filter(|r| r.fraud_risk == FraudRisk::High)
            .map(|r| r.id.as_str())
            .collect();
        let alerted: Vec<&str> = session
            .fraud_alerts()
            .iter()
            .map(|a| a.request_id.as_str())
            .collect();
        assert_eq!(high, alerted);
        assert!(session.fraud_alerts().iter().all(|a| a.reason == FRAUD_REASON));

        assert_eq!(session.metrics().total_active_requests, 8);
        assert_eq!(session.metrics().revenue_today, 0);
        assert_eq!(session.metrics().system_uptime, "99.8%");
    }

    #[test]
    fn test_manual_assign_scenario() {
        let mut session = empty_session();
        session.insert_request(request("R1", RequestStatus::Pending, 500));
        session.insert_helper(helper("H1", "Sneha Menon", HelperStatus::Available));

        assert!(session.manual_assign("R1", "H1").is_applied());

        let r1 = session.request("R1").unwrap();
        assert_eq!(r1.status, RequestStatus::Assigned);
        assert_eq!(r1.assigned_helper.as_deref(), Some("Sneha Menon"));
        let h1 = session.helper("H1").unwrap();
        assert_eq!(h1.status, HelperStatus::Busy);
        assert_eq!(h1.current_job.as_deref(), Some("R1"));
        assert!(session.notifications().contains("manually assigned"));
        assert_eq!(session.logs()[0].actor, LogActor::Admin);
    }

    #[test]
    fn test_manual_assign_unknown_targets_ignored() {
        let mut session = empty_session();
        session.insert_request(request("R1", RequestStatus::Pending, 500));
        session.insert_helper(helper("H1", "Sneha Menon", HelperStatus::Available));

        assert!(!session.manual_assign("R1", "H9").is_applied());
        assert!(!session.manual_assign("R9", "H1").is_applied());
        assert_eq!(session.request("R1").unwrap().status, RequestStatus::Pending);
        assert_eq!(session.helper("H1").unwrap().status, HelperStatus::Available);
        assert!(session.notifications().is_empty());
    }

    #[test]
    fn test_transitions_never_reverse() {
        let mut session = empty_session();
        session.insert_request(request("P", RequestStatus::Pending, 300));
        session.insert_request(request("A", RequestStatus::Assigned, 400));

        // Pending cannot jump straight to Completed
        assert!(!session.force_complete("P").is_applied());
        assert_eq!(session.request("P").unwrap().status, RequestStatus::Pending);

        assert!(session.force_complete("A").is_applied());
        assert!(!session.cancel_request("A").is_applied());
        assert_eq!(session.request("A").unwrap().status, RequestStatus::Completed);

        assert!(session.cancel_request("P").is_applied());
        assert!(!session.force_complete("P").is_applied());
        assert_eq!(session.request("P").unwrap().status, RequestStatus::Cancelled);

        assert_eq!(session.metrics().completed_today, 1);
        assert_eq!(session.metrics().cancelled_today, 1);
        assert_eq!(session.metrics().total_active_requests, 0);
        assert_revenue_consistent(&session);
    }

    #[test]
    fn test_repeated_cancel_still_notifies() {
        let mut session = empty_session();
        session.insert_request(request("R1", RequestStatus::Pending, 500));
        assert!(session.cancel_request("R1").is_applied());
        let logged = session.logs().len();

        // First notification has expired by now
        session.advance_to(secs(4));
        assert!(session.notifications().is_empty());

        assert!(!session.cancel_request("R1").is_applied());
        assert_eq!(session.notifications().len(), 1);
        assert!(session.notifications().contains("Request R1 cancelled"));
        assert_eq!(session.request("R1").unwrap().status, RequestStatus::Cancelled);
        assert_eq!(session.logs().len(), logged);
    }

    #[test]
    fn test_force_complete_pending_is_explained() {
        let mut session = empty_session();
        session.insert_request(request("P1", RequestStatus::Pending, 300));

        let outcome = session.force_complete("P1");
        match outcome {
            CommandOutcome::Ignored(reason) => assert!(reason.contains("assign it before")),
            CommandOutcome::Applied => panic!("pending request must not complete"),
        }
        assert_eq!(session.request("P1").unwrap().status, RequestStatus::Pending);
        assert!(session.notifications().contains("Request P1 force completed"));
        assert!(session.logs().is_empty());
        assert_eq!(session.metrics().revenue_today, 0);
    }

    #[test]
    fn test_unknown_request_commands_stay_silent() {
        let mut session = empty_session();
        assert!(!session.cancel_request("R9").is_applied());
        assert!(!session.force_complete("R9").is_applied());
        assert!(!session.block_fraud_request("R9").is_applied());
        assert!(!session.allow_fraud_request("R9").is_applied());
        assert!(session.notifications().is_empty());
        assert!(session.logs().is_empty());
    }

    #[test]
    fn test_manual_assign_finished_request_notifies_without_change() {
        let mut session = empty_session();
        session.insert_request(request("R1", RequestStatus::Cancelled, 500));
        session.insert_helper(helper("H1", "Sneha Menon", HelperStatus::Available));

        assert!(!session.manual_assign("R1", "H1").is_applied());
        assert_eq!(session.request("R1").unwrap().status, RequestStatus::Cancelled);
        assert_eq!(session.helper("H1").unwrap().status, HelperStatus::Available);
        assert!(session.notifications().contains("manually assigned"));
        assert!(session.logs().is_empty());
    }

    #[test]
    fn test_revenue_tracks_completed_requests() {
        let mut session = empty_session();
        session.insert_request(request("A1", RequestStatus::Assigned, 450));
        session.insert_request(request("A2", RequestStatus::Assigned, 650));
        assert_eq!(session.metrics().revenue_today, 0);

        session.force_complete("A1");
        assert_eq!(session.metrics().revenue_today, 450);
        session.force_complete("A2");
        assert_eq!(session.metrics().revenue_today, 1100);
        assert!(session.notifications().contains("force completed"));
    }

    #[test]
    fn test_block_fraud_cancels_and_marks_blocked() {
        let mut session = empty_session();
        let mut flagged = request("F1", RequestStatus::Pending, 700);
        flagged.fraud_risk = FraudRisk::High;
        session.insert_request(flagged);
        assert_eq!(session.fraud_alerts().len(), 1);

        assert!(session.block_fraud_request("F1").is_applied());
        let f1 = session.request("F1").unwrap();
        assert_eq!(f1.status, RequestStatus::Cancelled);
        assert_eq!(f1.fraud_risk, FraudRisk::Blocked);
        assert!(session.fraud_alerts().is_empty());
        assert!(session.notifications().contains("blocked due to fraud"));
    }

    #[test]
    fn test_block_on_finished_request_only_clears_alert() {
        let mut session = empty_session();
        let mut flagged = request("F1", RequestStatus::Assigned, 700);
        flagged.fraud_risk = FraudRisk::High;
        session.insert_request(flagged);
        session.force_complete("F1");

        assert!(session.block_fraud_request("F1").is_applied());
        let f1 = session.request("F1").unwrap();
        assert_eq!(f1.status, RequestStatus::Completed);
        assert_eq!(f1.fraud_risk, FraudRisk::High);
        assert!(session.fraud_alerts().is_empty());
        assert_revenue_consistent(&session);
    }

    #[test]
    fn test_allow_fraud_leaves_request_untouched() {
        let mut session = empty_session();
        let mut flagged = request("F2", RequestStatus::Pending, 320);
        flagged.fraud_risk = FraudRisk::High;
        session.insert_request(flagged.clone());

        assert!(session.allow_fraud_request("F2").is_applied());
        assert!(session.fraud_alerts().is_empty());
        assert_eq!(session.request("F2").unwrap(), &flagged);
        assert!(session.notifications().contains("Request F2 allowed"));

        // Second allow has no alert to clear but is still announced
        assert!(!session.allow_fraud_request("F2").is_applied());
        assert_eq!(session.notifications().len(), 2);
        assert_eq!(session.request("F2").unwrap(), &flagged);
    }

    #[test]
    fn test_suspend_clears_current_job() {
        let mut session = empty_session();
        session.insert_request(request("R1", RequestStatus::Pending, 500));
        session.insert_helper(helper("H1", "Kiran Nair", HelperStatus::Available));
        session.manual_assign("R1", "H1");
        assert_eq!(session.metrics().total_online_helpers, 1);

        assert!(session.suspend_helper("H1").is_applied());
        let h1 = session.helper("H1").unwrap();
        assert_eq!(h1.status, HelperStatus::Offline);
        assert!(h1.current_job.is_none());
        assert_eq!(session.metrics().total_online_helpers, 0);
        assert!(session.notifications().contains("Helper suspended"));
    }

    #[test]
    fn test_change_helper_status() {
        let mut session = empty_session();
        session.insert_helper(helper("H1", "Arjun Das", HelperStatus::Offline));

        assert!(session
            .change_helper_status("H1", HelperStatus::Available)
            .is_applied());
        assert_eq!(session.helper("H1").unwrap().status, HelperStatus::Available);
        assert!(session
            .notifications()
            .contains("Helper status updated to Available"));
        assert!(!session
            .change_helper_status("H2", HelperStatus::Busy)
            .is_applied());
    }

    #[test]
    fn test_update_setting() {
        let mut session = empty_session();
        assert!(session.settings().auto_assignment);
        session.update_setting(SettingKey::AutoAssignment, false);
        assert!(!session.settings().auto_assignment);
        session.update_setting(SettingKey::DemandSurge, true);
        assert!(session.settings().demand_surge);
        assert!(session.notifications().contains("Setting demandSurge updated"));
    }

    #[test]
    fn test_create_request_books_pending() {
        let mut session = empty_session();
        let booked = session.create_request("Vikram Singh", ServiceType::Carpentry, 420);

        assert_eq!(session.requests()[0].id, booked.id);
        assert_eq!(booked.status, RequestStatus::Pending);
        assert_eq!(booked.customer_name, "Vikram Singh");
        assert_eq!(booked.payment_amount, 420);
        assert_eq!(session.metrics().total_active_requests, 1);
        assert_eq!(session.logs()[0].event_type, LogEventType::RequestCreated);
    }

    #[test]
    fn test_arrival_every_twenty_seconds() {
        let mut session = AdminSession::new(
            quiet_tuning(),
            MockGenerator::from_seed(8),
            SessionClock::new(Utc::now()),
        );
        session.advance_to(Duration::from_millis(19_999));
        assert!(session.requests().is_empty());

        session.advance_to(secs(20));
        assert_eq!(session.requests().len(), 1);
        assert!(session.notifications().contains("request from"));
        assert_eq!(session.logs()[0].actor, LogActor::System);

        session.advance_to(secs(60));
        assert_eq!(session.requests().len(), 3);
        assert_eq!(session.metrics().total_active_requests, 3);
        // Only the 60s arrival is still on screen
        assert_eq!(session.notifications().len(), 1);
    }

    #[test]
    fn test_high_risk_arrivals_raise_alerts() {
        let mut session = AdminSession::new(
            quiet_tuning(),
            MockGenerator::from_seed(31),
            SessionClock::new(Utc::now()),
        );
        session.advance_to(secs(20 * 40));

        let high: Vec<&str> = session
            .requests()
            .iter()
            .filter(|r| r.fraud_risk == FraudRisk::High)
            .map(|r| r.id.as_str())
            .collect();
        let alerted: Vec<&str> = session
            .fraud_alerts()
            .iter()
            .map(|a| a.request_id.as_str())
            .collect();
        assert!(!high.is_empty());
        assert_eq!(high, alerted);
    }

    #[test]
    fn test_auto_assign_uses_first_available_helper() {
        let mut session = AdminSession::new(
            AdminTuning {
                assign_probability: 1.0,
                ..quiet_tuning()
            },
            MockGenerator::from_seed(5),
            SessionClock::new(Utc::now()),
        );
        session.insert_helper(helper("H1", "Rajesh Kumar", HelperStatus::Busy));
        session.insert_helper(helper("H2", "Sneha Menon", HelperStatus::Available));
        session.insert_helper(helper("H3", "Alex Thomas", HelperStatus::Available));
        session.insert_request(request("R1", RequestStatus::Pending, 300));

        session.advance_to(secs(10));
        let r1 = session.request("R1").unwrap();
        assert_eq!(r1.status, RequestStatus::Assigned);
        assert_eq!(r1.assigned_helper.as_deref(), Some("Sneha Menon"));
        // The helper record itself is left alone
        assert_eq!(session.helper("H2").unwrap().status, HelperStatus::Available);
        assert!(session.notifications().contains("Request R1 assigned to Sneha Menon"));
    }

    #[test]
    fn test_auto_assign_without_available_helper() {
        let mut session = AdminSession::new(
            AdminTuning {
                assign_probability: 1.0,
                ..quiet_tuning()
            },
            MockGenerator::from_seed(5),
            SessionClock::new(Utc::now()),
        );
        session.insert_helper(helper("H1", "Rajesh Kumar", HelperStatus::Offline));
        session.insert_request(request("R1", RequestStatus::Pending, 300));

        session.advance_to(secs(10));
        assert_eq!(session.request("R1").unwrap().status, RequestStatus::Pending);
    }

    #[test]
    fn test_auto_complete_updates_revenue() {
        let mut session = AdminSession::new(
            AdminTuning {
                complete_probability: 1.0,
                ..quiet_tuning()
            },
            MockGenerator::from_seed(5),
            SessionClock::new(Utc::now()),
        );
        session.insert_request(request("A1", RequestStatus::Assigned, 610));

        session.advance_to(secs(10));
        assert_eq!(session.request("A1").unwrap().status, RequestStatus::Completed);
        assert_eq!(session.metrics().revenue_today, 610);
        assert!(session.notifications().contains("Request A1 completed"));
        assert_eq!(session.logs()[0].event_type, LogEventType::JobCompleted);
    }

    #[test]
    fn test_drift_rerolls_statuses() {
        let mut session = AdminSession::new(
            AdminTuning {
                drift_probability: 1.0,
                ..quiet_tuning()
            },
            MockGenerator::from_seed(12),
            SessionClock::new(Utc::now()),
        );
        for i in 0..20 {
            session.insert_helper(helper(&format!("H{}", i), "Kiran Nair", HelperStatus::Available));
        }

        session.advance_to(secs(15));
        let moved = session
            .helpers()
            .iter()
            .filter(|h| h.status != HelperStatus::Available)
            .count();
        assert!(moved > 0);
        assert_eq!(session.notifications().len(), moved);
        let online = session
            .helpers()
            .iter()
            .filter(|h| h.status != HelperStatus::Offline)
            .count();
        assert_eq!(session.metrics().total_online_helpers, online);
    }

    #[test]
    fn test_random_run_keeps_invariants() {
        let mut session = AdminSession::new(
            AdminTuning {
                assign_probability: 0.5,
                complete_probability: 0.5,
                ..AdminTuning::default()
            },
            MockGenerator::from_seed(77),
            SessionClock::new(Utc::now()),
        );
        let mut last: std::collections::HashMap<String, RequestStatus> = Default::default();

        for step in 1..=120 {
            session.advance_to(secs(step * 5));
            for r in session.requests() {
                if let Some(prev) = last.get(&r.id) {
                    assert!(
                        *prev == r.status || prev.can_transition_to(r.status),
                        "{} moved {} -> {}",
                        r.id,
                        prev,
                        r.status
                    );
                }
                last.insert(r.id.clone(), r.status);
            }
            assert_revenue_consistent(&session);
        }
        assert!(session.logs().len() <= 50);
    }
}
