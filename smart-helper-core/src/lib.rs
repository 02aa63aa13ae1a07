//! # smart-helper-core
//!
//! Core library for smart-helper - a simulated home-services dispatch engine.
//!
//! This library provides:
//! - Domain types for requests, helpers, jobs and notifications
//! - Mock data generators over a seedable random source
//! - The helper and admin consoles, driven by a virtual-time scheduler
//! - A tokio runtime that owns one console per task
//! - Local accounts and the logged-in user record, stored in SQLite
//! - Configuration management
//! - Logging infrastructure
//!
//! ## Architecture
//!
//! A console is plain state plus a [`scheduler::Scheduler`] of named timers.
//! Tests step its virtual clock directly; [`runtime::SessionHandle`] moves it
//! with the tokio clock and serializes commands sent from other tasks.
//!
//! ## Example
//!
//! ```rust,no_run
//! use smart_helper_core::{AuthStore, Config, Database, Role};
//!
//! // Load configuration
//! let config = Config::load().expect("failed to load config");
//!
//! // Open database
//! let db = Database::open(&Config::database_path()).expect("failed to open database");
//! db.migrate().expect("failed to run migrations");
//!
//! // Only admins may open the admin console
//! let user = AuthStore::new(&db).require_role(Role::Admin);
//! ```

// Re-export commonly used items at the crate root
pub use admin::{AdminCommand, AdminSession, AdminSnapshot, AdminTuning};
pub use auth::{AuthError, AuthStore, SignUpForm};
pub use config::Config;
pub use db::Database;
pub use error::{Error, Result};
pub use generate::MockGenerator;
pub use helper::{HelperCommand, HelperSession, HelperSnapshot, HelperTimings};
pub use runtime::SessionHandle;
pub use session::{CommandOutcome, SessionClock, Simulation};
pub use types::*;

// Public modules
pub mod admin;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod generate;
pub mod helper;
pub mod logging;
pub mod notify;
pub mod runtime;
pub mod scheduler;
pub mod session;
pub mod types;
