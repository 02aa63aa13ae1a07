//! Database layer for smart-helper
//!
//! SQLite storage for the little that outlives a console:
//! - The logged-in user record, in a key/value table
//! - The account registry used by sign-up and login

pub mod repo;
pub mod schema;

pub use repo::Database;
