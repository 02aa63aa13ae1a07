//! Customer booking
//!
//! A booking lands in a simulated fleet, the same one the admin console
//! runs, and is followed in virtual time for `--duration` seconds so the
//! customer can see whether it was picked up.

use std::fmt::Write;
use std::time::Duration;

use anyhow::Result;
use smart_helper_core::{AdminSession, ServiceRequest, ServiceType, Simulation};

use crate::console::OutputFormat;
use crate::render::rupees;

/// Book `service_type` for `customer_name` and follow it for `track_for`
pub fn book(
    mut fleet: AdminSession,
    customer_name: &str,
    service_type: ServiceType,
    payment_amount: u32,
    track_for: Duration,
) -> ServiceRequest {
    let booked = fleet.create_request(customer_name, service_type, payment_amount);
    tracing::info!(request_id = %booked.id, "customer booking placed");

    fleet.advance_to(track_for);
    fleet.request(&booked.id).cloned().unwrap_or(booked)
}

pub fn print_booking(request: &ServiceRequest, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(request)?),
        OutputFormat::Text => print!("{}", describe(request)),
    }
    Ok(())
}

fn describe(request: &ServiceRequest) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Booked {}: {} for {}  {}",
        request.id,
        request.service_type,
        request.customer_name,
        rupees(u64::from(request.payment_amount))
    );
    let _ = write!(out, "Status: {}", request.status);
    if let Some(helper) = &request.assigned_helper {
        let _ = write!(out, " ({})", helper);
    }
    let _ = writeln!(out, "  ETA {} min", request.eta_minutes);
    out
}
