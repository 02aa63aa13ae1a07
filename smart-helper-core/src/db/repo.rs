//! Database repository layer
//!
//! Key/value reads and writes plus account lookups.

use crate::error::{Error, Result};
use crate::types::{Account, Role};
use chrono::{DateTime, Utc};
use rusqlite::types::Type;
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::PathBuf;
use std::sync::Mutex;

/// Main database handle
pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    /// Open or create a database at the given path
    pub fn open(path: &PathBuf) -> Result<Self> {
        // Ensure parent directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;
        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            ",
        )?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run migrations on this database
    pub fn migrate(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        super::schema::run_migrations(&conn)
    }

    /// Get the underlying connection (for advanced use)
    pub fn connection(&self) -> std::sync::MutexGuard<'_, Connection> {
        self.conn.lock().unwrap()
    }

    // ============================================
    // Key/value operations
    // ============================================

    /// Read the value stored under `key`
    pub fn kv_get(&self, key: &str) -> Result<Option<String>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row("SELECT value FROM kv WHERE key = ?", [key], |row| {
            row.get(0)
        })
        .optional()
        .map_err(Error::from)
    }

    /// Store `value` under `key`, replacing any previous value
    pub fn kv_set(&self, key: &str, value: &str) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        conn.execute(
            r#"
            INSERT INTO kv (key, value, updated_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at
            "#,
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Remove `key`. Returns whether it was present.
    pub fn kv_delete(&self, key: &str) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let removed = conn.execute("DELETE FROM kv WHERE key = ?", [key])?;
        Ok(removed > 0)
    }

    // ============================================
    // Account operations
    // ============================================

    /// Insert a new account. Returns false when the email is already taken.
    pub fn insert_account(&self, account: &Account) -> Result<bool> {
        let conn = self.conn.lock().unwrap();
        let inserted = conn.execute(
            r#"
            INSERT INTO accounts (email, name, role, password_hash, created_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(email) DO NOTHING
            "#,
            params![
                account.email,
                account.name,
                account.role.as_str(),
                account.password_hash,
                account.created_at.to_rfc3339(),
            ],
        )?;
        Ok(inserted > 0)
    }

    /// Look an account up by email, ignoring case
    pub fn get_account(&self, email: &str) -> Result<Option<Account>> {
        let conn = self.conn.lock().unwrap();
        conn.query_row(
            "SELECT * FROM accounts WHERE email = ?",
            [email],
            Self::row_to_account,
        )
        .optional()
        .map_err(Error::from)
    }

    /// Number of registered accounts with `role`
    pub fn count_accounts(&self, role: Role) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count = conn.query_row(
            "SELECT COUNT(*) FROM accounts WHERE role = ?",
            [role.as_str()],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    fn row_to_account(row: &Row) -> rusqlite::Result<Account> {
        let role_str: String = row.get("role")?;
        let created_at_str: String = row.get("created_at")?;

        let role = role_str.parse::<Role>().map_err(|e| {
            rusqlite::Error::FromSqlConversionFailure(
                2,
                Type::Text,
                Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e)),
            )
        })?;

        Ok(Account {
            email: row.get("email")?,
            name: row.get("name")?,
            role,
            password_hash: row.get("password_hash")?,
            created_at: DateTime::parse_from_rfc3339(&created_at_str)
                .map(|dt| dt.with_timezone(&Utc))
                .unwrap_or_else(|_| Utc::now()),
        })
    }
}
