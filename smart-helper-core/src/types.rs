//! Core domain types for smart-helper
//!
//! These types model the state owned by the two simulated consoles.
//!
//! ## Terminology
//!
//! | Term | Definition |
//! |------|------------|
//! | **Request** | A customer's booking for one service visit |
//! | **Helper** | A service professional in the admin fleet view |
//! | **Incoming request** | A request card offered to the helper console |
//! | **Active job** | The single request a helper console has accepted |
//! | **Fraud alert** | A flag raised for a request with `High` fraud risk |
//! | **Notification** | A short-lived message shown for a few seconds |
//!
//! All status-like fields are closed enums. Their serialized form is the
//! label shown to users (for example `"On The Way"`), so snapshots printed as
//! JSON read the same as the consoles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================
// Services and requests
// ============================================

/// Category of home service a customer can book
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceType {
    #[serde(rename = "AC Repair")]
    AcRepair,
    Electrical,
    Cleaning,
    Plumbing,
    Carpentry,
}

impl ServiceType {
    pub const ALL: [ServiceType; 5] = [
        ServiceType::AcRepair,
        ServiceType::Electrical,
        ServiceType::Cleaning,
        ServiceType::Plumbing,
        ServiceType::Carpentry,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ServiceType::AcRepair => "AC Repair",
            ServiceType::Electrical => "Electrical",
            ServiceType::Cleaning => "Cleaning",
            ServiceType::Plumbing => "Plumbing",
            ServiceType::Carpentry => "Carpentry",
        }
    }
}

impl std::fmt::Display for ServiceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ServiceType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().replace(|c: char| c == '-' || c == '_', " ").as_str() {
            "ac repair" | "ac" => Ok(ServiceType::AcRepair),
            "electrical" => Ok(ServiceType::Electrical),
            "cleaning" => Ok(ServiceType::Cleaning),
            "plumbing" => Ok(ServiceType::Plumbing),
            "carpentry" => Ok(ServiceType::Carpentry),
            _ => Err(format!("unknown service type: {}", s)),
        }
    }
}

/// Lifecycle of a service request
///
/// ```text
/// Pending ──► Assigned ──► Completed
///    │            │
///    └────────────┴──► Cancelled
/// ```
///
/// `Completed` and `Cancelled` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RequestStatus {
    Pending,
    Assigned,
    Completed,
    Cancelled,
}

impl RequestStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestStatus::Pending => "Pending",
            RequestStatus::Assigned => "Assigned",
            RequestStatus::Completed => "Completed",
            RequestStatus::Cancelled => "Cancelled",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, RequestStatus::Completed | RequestStatus::Cancelled)
    }

    /// Whether a request in this status may move to `next`.
    pub fn can_transition_to(&self, next: RequestStatus) -> bool {
        matches!(
            (self, next),
            (RequestStatus::Pending, RequestStatus::Assigned)
                | (RequestStatus::Assigned, RequestStatus::Completed)
                | (RequestStatus::Pending, RequestStatus::Cancelled)
                | (RequestStatus::Assigned, RequestStatus::Cancelled)
        )
    }
}

impl std::fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cosmetic label describing how well a helper matches a request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MatchQuality {
    #[serde(rename = "High match")]
    High,
    #[serde(rename = "Medium match")]
    Medium,
    #[serde(rename = "Low match")]
    Low,
}

impl MatchQuality {
    pub const ALL: [MatchQuality; 3] = [MatchQuality::High, MatchQuality::Medium, MatchQuality::Low];

    pub fn as_str(&self) -> &'static str {
        match self {
            MatchQuality::High => "High match",
            MatchQuality::Medium => "Medium match",
            MatchQuality::Low => "Low match",
        }
    }
}

impl std::fmt::Display for MatchQuality {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Cosmetic fraud tag; `High` raises an alert, `Blocked` marks an actioned one
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FraudRisk {
    Low,
    Medium,
    High,
    Blocked,
}

impl FraudRisk {
    /// Labels the generator draws from; `Blocked` is only ever set by an admin.
    pub const GENERATED: [FraudRisk; 3] = [FraudRisk::Low, FraudRisk::Medium, FraudRisk::High];

    pub fn as_str(&self) -> &'static str {
        match self {
            FraudRisk::Low => "Low",
            FraudRisk::Medium => "Medium",
            FraudRisk::High => "High",
            FraudRisk::Blocked => "Blocked",
        }
    }
}

impl std::fmt::Display for FraudRisk {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A customer's request as seen by the admin console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceRequest {
    /// `REQ-<unix millis>-<5 chars>`
    pub id: String,
    pub customer_name: String,
    pub service_type: ServiceType,
    pub status: RequestStatus,
    /// Helper name, set once assigned
    pub assigned_helper: Option<String>,
    pub created_at: DateTime<Utc>,
    pub eta_minutes: u32,
    pub match_quality: MatchQuality,
    pub fraud_risk: FraudRisk,
    pub payment_amount: u32,
}

// ============================================
// Helpers
// ============================================

/// Availability of a helper
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HelperStatus {
    Available,
    Busy,
    Offline,
}

impl HelperStatus {
    pub const ALL: [HelperStatus; 3] = [
        HelperStatus::Available,
        HelperStatus::Busy,
        HelperStatus::Offline,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HelperStatus::Available => "Available",
            HelperStatus::Busy => "Busy",
            HelperStatus::Offline => "Offline",
        }
    }
}

impl std::fmt::Display for HelperStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for HelperStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "available" => Ok(HelperStatus::Available),
            "busy" => Ok(HelperStatus::Busy),
            "offline" => Ok(HelperStatus::Offline),
            _ => Err(format!("unknown helper status: {}", s)),
        }
    }
}

/// A helper in the admin fleet view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Helper {
    /// `HLP-<7 chars>`
    pub id: String,
    pub name: String,
    pub status: HelperStatus,
    /// Request id the helper is working on
    pub current_job: Option<String>,
    /// 3.0 to 5.0, one decimal
    pub rating: f32,
    pub earnings_today: u32,
    pub location: String,
}

// ============================================
// Admin console records
// ============================================

/// Raised for each request whose fraud risk is `High`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FraudAlert {
    pub request_id: String,
    pub customer_name: String,
    pub risk_level: FraudRisk,
    pub reason: String,
}

/// Independent console toggles
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SystemSettings {
    pub auto_assignment: bool,
    pub demand_surge: bool,
    pub maintenance_mode: bool,
    pub notifications: bool,
}

impl Default for SystemSettings {
    fn default() -> Self {
        Self {
            auto_assignment: true,
            demand_surge: false,
            maintenance_mode: false,
            notifications: true,
        }
    }
}

impl SystemSettings {
    pub fn get(&self, key: SettingKey) -> bool {
        match key {
            SettingKey::AutoAssignment => self.auto_assignment,
            SettingKey::DemandSurge => self.demand_surge,
            SettingKey::MaintenanceMode => self.maintenance_mode,
            SettingKey::Notifications => self.notifications,
        }
    }

    pub fn set(&mut self, key: SettingKey, value: bool) {
        match key {
            SettingKey::AutoAssignment => self.auto_assignment = value,
            SettingKey::DemandSurge => self.demand_surge = value,
            SettingKey::MaintenanceMode => self.maintenance_mode = value,
            SettingKey::Notifications => self.notifications = value,
        }
    }
}

/// Names one field of [`SystemSettings`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SettingKey {
    AutoAssignment,
    DemandSurge,
    MaintenanceMode,
    Notifications,
}

impl SettingKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SettingKey::AutoAssignment => "autoAssignment",
            SettingKey::DemandSurge => "demandSurge",
            SettingKey::MaintenanceMode => "maintenanceMode",
            SettingKey::Notifications => "notifications",
        }
    }
}

impl std::fmt::Display for SettingKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SettingKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        // demandSurge, demand_surge and demand-surge all name the same key
        let folded: String = s
            .chars()
            .filter(|c| *c != '_' && *c != '-')
            .map(|c| c.to_ascii_lowercase())
            .collect();
        match folded.as_str() {
            "autoassignment" => Ok(SettingKey::AutoAssignment),
            "demandsurge" => Ok(SettingKey::DemandSurge),
            "maintenancemode" => Ok(SettingKey::MaintenanceMode),
            "notifications" => Ok(SettingKey::Notifications),
            _ => Err(format!("unknown setting: {}", s)),
        }
    }
}

/// Kind of event recorded in the admin activity log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogEventType {
    #[serde(rename = "Request Created")]
    RequestCreated,
    #[serde(rename = "Helper Assigned")]
    HelperAssigned,
    #[serde(rename = "Job Completed")]
    JobCompleted,
    #[serde(rename = "System Update")]
    SystemUpdate,
}

impl LogEventType {
    pub const ALL: [LogEventType; 4] = [
        LogEventType::RequestCreated,
        LogEventType::HelperAssigned,
        LogEventType::JobCompleted,
        LogEventType::SystemUpdate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogEventType::RequestCreated => "Request Created",
            LogEventType::HelperAssigned => "Helper Assigned",
            LogEventType::JobCompleted => "Job Completed",
            LogEventType::SystemUpdate => "System Update",
        }
    }
}

/// Who caused a logged event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogActor {
    System,
    Admin,
    Helper,
}

impl LogActor {
    pub const ALL: [LogActor; 3] = [LogActor::System, LogActor::Admin, LogActor::Helper];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogActor::System => "System",
            LogActor::Admin => "Admin",
            LogActor::Helper => "Helper",
        }
    }
}

/// Outcome of a logged event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LogStatus {
    Success,
    Warning,
    Error,
}

impl LogStatus {
    pub const ALL: [LogStatus; 3] = [LogStatus::Success, LogStatus::Warning, LogStatus::Error];

    pub fn as_str(&self) -> &'static str {
        match self {
            LogStatus::Success => "Success",
            LogStatus::Warning => "Warning",
            LogStatus::Error => "Error",
        }
    }
}

/// One row of the admin activity log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub event_type: LogEventType,
    pub actor: LogActor,
    pub description: String,
    pub status: LogStatus,
}

/// Figures shown in the admin console header
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardMetrics {
    /// Requests that are neither completed nor cancelled
    pub total_active_requests: usize,
    /// Helpers that are not offline
    pub total_online_helpers: usize,
    pub completed_today: usize,
    pub cancelled_today: usize,
    /// Sum of payments over completed requests
    pub revenue_today: u64,
    pub avg_response_time: String,
    pub system_uptime: String,
}

impl Default for DashboardMetrics {
    fn default() -> Self {
        Self {
            total_active_requests: 0,
            total_online_helpers: 0,
            completed_today: 0,
            cancelled_today: 0,
            revenue_today: 0,
            avg_response_time: "4.2 min".to_string(),
            system_uptime: SYSTEM_UPTIME.to_string(),
        }
    }
}

/// Uptime figure displayed by the admin console
pub const SYSTEM_UPTIME: &str = "99.8%";

// ============================================
// Notifications
// ============================================

/// Severity tag of a notification
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    #[default]
    Info,
    Success,
    Warning,
}

/// A short-lived message in a console's notification feed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub message: String,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
}

// ============================================
// Helper console records
// ============================================

/// Demand label attached to an incoming request card
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DemandLevel {
    Normal,
    #[serde(rename = "High demand")]
    High,
    #[serde(rename = "Peak demand")]
    Peak,
}

impl DemandLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            DemandLevel::Normal => "Normal",
            DemandLevel::High => "High demand",
            DemandLevel::Peak => "Peak demand",
        }
    }
}

/// A request card offered to the helper console
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncomingRequest {
    /// `req-<unix millis>-<counter>`
    pub id: String,
    pub customer_name: String,
    pub service_type: ServiceType,
    pub distance_km: f32,
    pub eta_minutes: u32,
    pub payment_amount: u32,
    pub location: String,
    pub requested_time: String,
    pub match_quality: MatchQuality,
    pub demand: DemandLevel,
    pub created_at: DateTime<Utc>,
}

/// Progress of the helper's active job
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    #[serde(rename = "On The Way")]
    OnTheWay,
    #[serde(rename = "In Progress")]
    InProgress,
    Completed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "Pending",
            JobStatus::OnTheWay => "On The Way",
            JobStatus::InProgress => "In Progress",
            JobStatus::Completed => "Completed",
        }
    }

    /// The following stage, or `None` once completed.
    pub fn next(&self) -> Option<JobStatus> {
        match self {
            JobStatus::Pending => Some(JobStatus::OnTheWay),
            JobStatus::OnTheWay => Some(JobStatus::InProgress),
            JobStatus::InProgress => Some(JobStatus::Completed),
            JobStatus::Completed => None,
        }
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The single request a helper is working on
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveJob {
    #[serde(flatten)]
    pub request: IncomingRequest,
    pub job_status: JobStatus,
}

/// How a job left the helper console
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HistoryStatus {
    Completed,
    Rejected,
    #[serde(rename = "Auto-rejected")]
    AutoRejected,
}

impl HistoryStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            HistoryStatus::Completed => "Completed",
            HistoryStatus::Rejected => "Rejected",
            HistoryStatus::AutoRejected => "Auto-rejected",
        }
    }
}

impl std::fmt::Display for HistoryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Terminal snapshot of a job that was completed or rejected
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobHistoryEntry {
    pub id: String,
    pub customer_name: String,
    pub service_type: ServiceType,
    pub amount: u32,
    pub status: HistoryStatus,
    pub date: DateTime<Utc>,
}

/// Running totals, changed only when a job completes
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Earnings {
    pub today: u64,
    pub total_jobs: u32,
    pub weekly: u64,
}

// ============================================
// Accounts
// ============================================

/// Console a user signs in to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Customer,
    Helper,
    Admin,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Customer => "customer",
            Role::Helper => "helper",
            Role::Admin => "admin",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "customer" => Ok(Role::Customer),
            "helper" => Ok(Role::Helper),
            "admin" => Ok(Role::Admin),
            _ => Err(format!("unknown role: {}", s)),
        }
    }
}

/// The logged-in user persisted between runs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthRecord {
    pub email: String,
    pub role: Role,
    pub token: String,
}

/// A registered user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub email: String,
    pub name: String,
    pub role: Role,
    /// Hex SHA-256 of `email:password`
    pub password_hash: String,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_status_transitions() {
        use RequestStatus::*;

        assert!(Pending.can_transition_to(Assigned));
        assert!(Assigned.can_transition_to(Completed));
        assert!(Pending.can_transition_to(Cancelled));
        assert!(Assigned.can_transition_to(Cancelled));

        assert!(!Pending.can_transition_to(Completed));
        assert!(!Assigned.can_transition_to(Pending));
        for terminal in [Completed, Cancelled] {
            assert!(terminal.is_terminal());
            for next in [Pending, Assigned, Completed, Cancelled] {
                assert!(!terminal.can_transition_to(next));
            }
        }
    }

    #[test]
    fn test_job_status_flow() {
        let mut status = JobStatus::Pending;
        let mut seen = vec![status];
        while let Some(next) = status.next() {
            seen.push(next);
            status = next;
        }
        assert_eq!(
            seen,
            vec![
                JobStatus::Pending,
                JobStatus::OnTheWay,
                JobStatus::InProgress,
                JobStatus::Completed
            ]
        );
    }

    #[test]
    fn test_labels_serialize_as_displayed() {
        assert_eq!(
            serde_json::to_string(&JobStatus::OnTheWay).unwrap(),
            "\"On The Way\""
        );
        assert_eq!(
            serde_json::to_string(&HistoryStatus::AutoRejected).unwrap(),
            "\"Auto-rejected\""
        );
        assert_eq!(
            serde_json::to_string(&ServiceType::AcRepair).unwrap(),
            "\"AC Repair\""
        );
        assert_eq!(
            serde_json::to_string(&MatchQuality::Medium).unwrap(),
            "\"Medium match\""
        );
        assert_eq!(serde_json::to_string(&Role::Admin).unwrap(), "\"admin\"");
    }

    #[test]
    fn test_settings_get_set() {
        let mut settings = SystemSettings::default();
        assert!(settings.get(SettingKey::AutoAssignment));
        assert!(!settings.get(SettingKey::MaintenanceMode));

        settings.set(SettingKey::MaintenanceMode, true);
        assert!(settings.maintenance_mode);
        // Other toggles are untouched
        assert!(settings.auto_assignment);
        assert!(!settings.demand_surge);
        assert!(settings.notifications);
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!("ac-repair".parse::<ServiceType>().unwrap(), ServiceType::AcRepair);
        assert_eq!("Offline".parse::<HelperStatus>().unwrap(), HelperStatus::Offline);
        assert_eq!("maintenance-mode".parse::<SettingKey>().unwrap(), SettingKey::MaintenanceMode);
        assert_eq!("demandSurge".parse::<SettingKey>().unwrap(), SettingKey::DemandSurge);
        assert_eq!("auto_assignment".parse::<SettingKey>().unwrap(), SettingKey::AutoAssignment);
        assert_eq!(SettingKey::DemandSurge.to_string(), "demandSurge");
        assert_eq!("HELPER".parse::<Role>().unwrap(), Role::Helper);
        assert!("plumber".parse::<ServiceType>().is_err());
    }
}
