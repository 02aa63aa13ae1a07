//! Plain-text rendering of console snapshots

use std::fmt::Write;

use smart_helper_core::{AdminSnapshot, HelperSnapshot, Notification};

/// Rupee amount with thousands separators
pub fn rupees(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + 4);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    format!("₹{}", out)
}

fn elapsed(ms: u64) -> String {
    format!("{}m{:02}s", ms / 60_000, (ms / 1000) % 60)
}

fn notifications(out: &mut String, notes: &[Notification]) {
    if notes.is_empty() {
        return;
    }
    let _ = writeln!(out, "\nNotifications:");
    for n in notes {
        let _ = writeln!(out, "  [{:?}] {}", n.kind, n.message);
    }
}

pub fn helper(snapshot: &HelperSnapshot) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Helper console: {} ({}) at {}",
        snapshot.helper_name,
        snapshot.helper_status,
        elapsed(snapshot.elapsed_ms)
    );
    let e = &snapshot.earnings;
    let _ = writeln!(
        out,
        "Earnings: today {}  weekly {}  jobs {}",
        rupees(e.today),
        rupees(e.weekly),
        e.total_jobs
    );

    let _ = writeln!(out, "\nActive job:");
    match &snapshot.active_job {
        Some(job) => {
            let r = &job.request;
            let _ = writeln!(
                out,
                "  {}  {} for {}  {}  [{}]",
                r.id,
                r.service_type,
                r.customer_name,
                rupees(u64::from(r.payment_amount)),
                job.job_status
            );
        }
        None => {
            let _ = writeln!(out, "  (none)");
        }
    }

    let _ = writeln!(out, "\nIncoming requests:");
    if snapshot.loading_requests {
        let _ = writeln!(out, "  loading...");
    } else if snapshot.incoming_requests.is_empty() {
        let _ = writeln!(out, "  (none)");
    }
    for (i, r) in snapshot.incoming_requests.iter().enumerate() {
        let _ = writeln!(
            out,
            "  #{} {}  {} for {}  {:.1} km  {} min  {}  {}  {}",
            i + 1,
            r.id,
            r.service_type,
            r.customer_name,
            r.distance_km,
            r.eta_minutes,
            rupees(u64::from(r.payment_amount)),
            r.match_quality,
            r.demand.as_str()
        );
    }

    if !snapshot.job_history.is_empty() {
        let _ = writeln!(out, "\nHistory:");
        for h in &snapshot.job_history {
            let _ = writeln!(
                out,
                "  {}  {} for {}  {}  {}",
                h.id,
                h.service_type,
                h.customer_name,
                rupees(u64::from(h.amount)),
                h.status
            );
        }
    }

    notifications(&mut out, &snapshot.notifications);
    out
}

pub fn admin(snapshot: &AdminSnapshot) -> String {
    let mut out = String::new();
    let m = &snapshot.metrics;
    let _ = writeln!(out, "Admin console at {}", elapsed(snapshot.elapsed_ms));
    let _ = writeln!(
        out,
        "Active requests {}  Online helpers {}  Completed {}  Cancelled {}",
        m.total_active_requests, m.total_online_helpers, m.completed_today, m.cancelled_today
    );
    let _ = writeln!(
        out,
        "Revenue {}  Avg response {}  Uptime {}",
        rupees(m.revenue_today),
        m.avg_response_time,
        m.system_uptime
    );

    let _ = writeln!(out, "\nRequests:");
    for (i, r) in snapshot.requests.iter().enumerate() {
        let _ = writeln!(
            out,
            "  #{} {}  {} for {}  {}  {}  risk {}  {}",
            i + 1,
            r.id,
            r.service_type,
            r.customer_name,
            rupees(u64::from(r.payment_amount)),
            r.status,
            r.fraud_risk,
            r.assigned_helper.as_deref().unwrap_or("-")
        );
    }

    let _ = writeln!(out, "\nHelpers:");
    for (i, h) in snapshot.helpers.iter().enumerate() {
        let _ = writeln!(
            out,
            "  #{} {}  {}  {}  {:.1}  {}  {}",
            i + 1,
            h.id,
            h.name,
            h.status,
            h.rating,
            h.location,
            h.current_job.as_deref().unwrap_or("-")
        );
    }

    if !snapshot.fraud_alerts.is_empty() {
        let _ = writeln!(out, "\nFraud alerts:");
        for a in &snapshot.fraud_alerts {
            let _ = writeln!(
                out,
                "  {}  {}  {}  {}",
                a.request_id, a.customer_name, a.risk_level, a.reason
            );
        }
    }

    let s = &snapshot.system_settings;
    let _ = writeln!(
        out,
        "\nSettings: auto_assignment={} demand_surge={} maintenance_mode={} notifications={}",
        s.auto_assignment, s.demand_surge, s.maintenance_mode, s.notifications
    );

    let _ = writeln!(out, "\nRecent activity:");
    for entry in snapshot.logs.iter().take(10) {
        let _ = writeln!(
            out,
            "  {}  {:<15} {:<6} {}  {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.event_type.as_str(),
            entry.actor.as_str(),
            entry.status.as_str(),
            entry.description
        );
    }

    notifications(&mut out, &snapshot.notifications);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rupees() {
        assert_eq!(rupees(0), "₹0");
        assert_eq!(rupees(650), "₹650");
        assert_eq!(rupees(1_100), "₹1,100");
        assert_eq!(rupees(1_234_567), "₹1,234,567");
    }

    #[test]
    fn test_elapsed() {
        assert_eq!(elapsed(0), "0m00s");
        assert_eq!(elapsed(75_500), "1m15s");
    }
}
