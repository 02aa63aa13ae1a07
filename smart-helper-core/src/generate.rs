//! Mock data generators
//!
//! Every random value the consoles show comes from a [`MockGenerator`]. It
//! owns its random source so tests can build one from a fixed seed and get
//! the same requests, helpers and rolls every run.

use std::collections::HashSet;

use chrono::{DateTime, Duration as ChronoDuration, Utc};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::types::{
    DemandLevel, FraudRisk, Helper, HelperStatus, IncomingRequest, LogActor, LogEntry,
    LogEventType, LogStatus, MatchQuality, RequestStatus, ServiceRequest, ServiceType,
};

const CUSTOMERS: [&str; 5] = [
    "Anita Nair",
    "Rahul Kumar",
    "Priya Menon",
    "Vikram Singh",
    "Meera Nair",
];

const HELPER_NAMES: [&str; 5] = [
    "Alex Thomas",
    "Rajesh Kumar",
    "Sneha Menon",
    "Kiran Nair",
    "Arjun Das",
];

const LOCATIONS: [&str; 3] = ["Kochi", "Ernakulam", "Thrissur"];

const BASE36: &[u8] = b"0123456789ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// Template for the request cards offered to the helper console
#[derive(Debug, Clone, Copy)]
pub struct IncomingTemplate {
    pub customer_name: &'static str,
    pub service_type: ServiceType,
    pub distance_km: f32,
    pub eta_minutes: u32,
    pub payment_amount: u32,
    pub location: &'static str,
    pub requested_time: &'static str,
    pub match_quality: MatchQuality,
    pub demand: DemandLevel,
}

/// Fixed example pool the helper console draws incoming requests from
pub const INCOMING_POOL: [IncomingTemplate; 3] = [
    IncomingTemplate {
        customer_name: "Anita Nair",
        service_type: ServiceType::AcRepair,
        distance_km: 1.8,
        eta_minutes: 8,
        payment_amount: 650,
        location: "Panampilly Nagar, Kochi",
        requested_time: "Now",
        match_quality: MatchQuality::High,
        demand: DemandLevel::Peak,
    },
    IncomingTemplate {
        customer_name: "Rahul Kumar",
        service_type: ServiceType::Electrical,
        distance_km: 3.2,
        eta_minutes: 15,
        payment_amount: 450,
        location: "Kakkanad, Kochi",
        requested_time: "In 30 mins",
        match_quality: MatchQuality::Medium,
        demand: DemandLevel::Normal,
    },
    IncomingTemplate {
        customer_name: "Priya Menon",
        service_type: ServiceType::Cleaning,
        distance_km: 0.9,
        eta_minutes: 5,
        payment_amount: 520,
        location: "Vyttila, Kochi",
        requested_time: "Today, 5:30 PM",
        match_quality: MatchQuality::High,
        demand: DemandLevel::High,
    },
];

/// Source of randomized mock records
pub struct MockGenerator {
    rng: StdRng,
    issued_request_ids: HashSet<String>,
    incoming_counter: u64,
}

impl MockGenerator {
    /// Generator with reproducible output
    pub fn from_seed(seed: u64) -> Self {
        Self::with_rng(StdRng::seed_from_u64(seed))
    }

    /// Generator seeded from the operating system
    pub fn from_entropy() -> Self {
        Self::with_rng(StdRng::from_entropy())
    }

    /// Seeded when `seed` is given, entropy otherwise
    pub fn new(seed: Option<u64>) -> Self {
        match seed {
            Some(seed) => Self::from_seed(seed),
            None => Self::from_entropy(),
        }
    }

    fn with_rng(rng: StdRng) -> Self {
        Self {
            rng,
            issued_request_ids: HashSet::new(),
            incoming_counter: 1,
        }
    }

    fn suffix(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| BASE36[self.rng.gen_range(0..BASE36.len())] as char)
            .collect()
    }

    fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.rng.gen_range(0..items.len())]
    }

    /// `REQ-<unix millis>-<5 chars>`, never repeated by this generator
    pub fn request_id(&mut self, now: DateTime<Utc>) -> String {
        loop {
            let id = format!("REQ-{}-{}", now.timestamp_millis(), self.suffix(5));
            if self.issued_request_ids.insert(id.clone()) {
                return id;
            }
        }
    }

    /// `HLP-<7 chars>`
    pub fn helper_id(&mut self) -> String {
        format!("HLP-{}", self.suffix(7))
    }

    /// `<unix millis>-<5 lower-case chars>`
    pub fn notification_id(&mut self, now: DateTime<Utc>) -> String {
        format!(
            "{}-{}",
            now.timestamp_millis(),
            self.suffix(5).to_ascii_lowercase()
        )
    }

    /// A pending request with random customer, service and labels
    pub fn create_request(&mut self, now: DateTime<Utc>) -> ServiceRequest {
        ServiceRequest {
            id: self.request_id(now),
            customer_name: self.pick(&CUSTOMERS).to_string(),
            service_type: self.pick(&ServiceType::ALL),
            status: RequestStatus::Pending,
            assigned_helper: None,
            created_at: now,
            eta_minutes: self.rng.gen_range(5..35),
            match_quality: self.pick(&MatchQuality::ALL),
            fraud_risk: self.pick(&FraudRisk::GENERATED),
            payment_amount: self.rng.gen_range(300..800),
        }
    }

    /// A helper with random status, rating, earnings and location
    pub fn create_helper(&mut self) -> Helper {
        // Tenths between 3.0 and 5.0 inclusive
        let rating_tenths: u16 = self.rng.gen_range(30..=50);
        Helper {
            id: self.helper_id(),
            name: self.pick(&HELPER_NAMES).to_string(),
            status: self.pick(&HelperStatus::ALL),
            current_job: None,
            rating: f32::from(rating_tenths) / 10.0,
            earnings_today: self.rng.gen_range(500..2500),
            location: self.pick(&LOCATIONS).to_string(),
        }
    }

    /// Seed log entry, `index` minutes before `now`
    pub fn create_log_entry(&mut self, index: usize, now: DateTime<Utc>) -> LogEntry {
        LogEntry {
            id: format!("log-{}", index),
            timestamp: now - ChronoDuration::minutes(index as i64),
            event_type: self.pick(&LogEventType::ALL),
            actor: self.pick(&LogActor::ALL),
            description: "Mock log entry".to_string(),
            status: self.pick(&LogStatus::ALL),
        }
    }

    /// Card built from one pool template
    pub fn incoming_from(&mut self, template: &IncomingTemplate, now: DateTime<Utc>) -> IncomingRequest {
        let id = format!("req-{}-{}", now.timestamp_millis(), self.incoming_counter);
        self.incoming_counter += 1;
        IncomingRequest {
            id,
            customer_name: template.customer_name.to_string(),
            service_type: template.service_type,
            distance_km: template.distance_km,
            eta_minutes: template.eta_minutes,
            payment_amount: template.payment_amount,
            location: template.location.to_string(),
            requested_time: template.requested_time.to_string(),
            match_quality: template.match_quality,
            demand: template.demand,
            created_at: now,
        }
    }

    /// Card built from a random pool template
    pub fn incoming_request(&mut self, now: DateTime<Utc>) -> IncomingRequest {
        let template = self.pick(&INCOMING_POOL);
        self.incoming_from(&template, now)
    }

    /// The first two pool entries, as loaded when the helper console opens
    pub fn initial_incoming(&mut self, now: DateTime<Utc>) -> Vec<IncomingRequest> {
        INCOMING_POOL[..2]
            .iter()
            .map(|template| self.incoming_from(template, now))
            .collect()
    }

    /// Display-only average response time, `"x.y min"` between 3.0 and 5.0
    pub fn avg_response_time(&mut self) -> String {
        let tenths: u16 = self.rng.gen_range(30..50);
        format!("{:.1} min", f32::from(tenths) / 10.0)
    }

    /// True with probability `p`
    pub fn roll(&mut self, p: f64) -> bool {
        self.rng.gen_bool(p.clamp(0.0, 1.0))
    }

    /// Uniformly random helper status
    pub fn helper_status(&mut self) -> HelperStatus {
        self.pick(&HelperStatus::ALL)
    }
}
