//! Authentication
//!
//! The logged-in user is a single JSON record stored under [`AUTH_KEY`] in
//! the key/value table, so it survives restarts until logout. Sign-up keeps
//! a small account registry alongside it. Nothing here is meant to be
//! secure: passwords are stored as an unsalted SHA-256 digest and tokens
//! are opaque strings nobody verifies.

use chrono::Utc;
use sha2::{Digest, Sha256};
use thiserror::Error;

use crate::db::Database;
use crate::error::Result;
use crate::types::{Account, AuthRecord, Role};

/// Key the logged-in user is stored under
pub const AUTH_KEY: &str = "smart-helper-auth";

/// Token used when a caller logs in without one
pub const DEFAULT_TOKEN: &str = "mock-jwt-token";

pub const MIN_PASSWORD_LENGTH: usize = 6;

/// Rejections shown to the user as-is
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("Please select a role.")]
    MissingRole,

    #[error("Email is required.")]
    MissingEmail,

    #[error("Please enter a valid email address.")]
    InvalidEmail,

    #[error("Password is required.")]
    MissingPassword,

    #[error("Password must be at least 6 characters.")]
    PasswordTooShort,

    #[error("Passwords do not match.")]
    PasswordMismatch,

    #[error("This email is already registered. Please sign in.")]
    EmailTaken,

    #[error("Invalid email or password.")]
    InvalidCredentials,

    #[error("Please sign in first.")]
    NotSignedIn,

    #[error("This console requires the {0} role.")]
    WrongRole(Role),
}

/// Sign-up form as entered
#[derive(Debug, Clone, Default)]
pub struct SignUpForm {
    pub role: Option<Role>,
    pub name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
}

impl SignUpForm {
    /// Check the form, first failure wins
    pub fn validate(&self) -> std::result::Result<Role, AuthError> {
        let role = self.role.ok_or(AuthError::MissingRole)?;
        validate_email(&self.email)?;
        if self.password.trim().is_empty() {
            return Err(AuthError::MissingPassword);
        }
        if self.password.chars().count() < MIN_PASSWORD_LENGTH {
            return Err(AuthError::PasswordTooShort);
        }
        if self.password != self.confirm_password {
            return Err(AuthError::PasswordMismatch);
        }
        Ok(role)
    }
}

fn validate_email(email: &str) -> std::result::Result<(), AuthError> {
    let email = email.trim();
    if email.is_empty() {
        return Err(AuthError::MissingEmail);
    }
    if !is_valid_email(email) {
        return Err(AuthError::InvalidEmail);
    }
    Ok(())
}

/// `local@domain.tld` with no whitespace and exactly one `@`
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    // A dot with at least one character on each side
    domain
        .char_indices()
        .skip(1)
        .any(|(i, c)| c == '.' && i + 1 < domain.len())
}

/// Hex SHA-256 of `email:password`
pub fn password_hash(email: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.to_ascii_lowercase().as_bytes());
    hasher.update(b":");
    hasher.update(password.as_bytes());
    hex::encode(hasher.finalize())
}

/// Session and account operations over the local database
pub struct AuthStore<'a> {
    db: &'a Database,
}

impl<'a> AuthStore<'a> {
    pub fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Record `email` as logged in with `role`
    pub fn login(&self, email: &str, role: Role, token: Option<&str>) -> Result<AuthRecord> {
        let record = AuthRecord {
            email: email.trim().to_string(),
            role,
            token: token.unwrap_or(DEFAULT_TOKEN).to_string(),
        };
        self.db.kv_set(AUTH_KEY, &serde_json::to_string(&record)?)?;
        tracing::info!(email = %record.email, role = %role, "logged in");
        Ok(record)
    }

    /// Forget the logged-in user. Returns whether anyone was logged in.
    pub fn logout(&self) -> Result<bool> {
        let removed = self.db.kv_delete(AUTH_KEY)?;
        if removed {
            tracing::info!("logged out");
        }
        Ok(removed)
    }

    /// The logged-in user, if any.
    ///
    /// An unreadable record counts as nobody logged in.
    pub fn current_user(&self) -> Result<Option<AuthRecord>> {
        let Some(raw) = self.db.kv_get(AUTH_KEY)? else {
            return Ok(None);
        };
        match serde_json::from_str(&raw) {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                tracing::warn!(error = %e, "ignoring unreadable auth record");
                Ok(None)
            }
        }
    }

    /// Register a new account and log it in
    pub fn sign_up(&self, form: &SignUpForm) -> Result<AuthRecord> {
        let role = form.validate()?;
        let email = form.email.trim();

        let account = Account {
            email: email.to_string(),
            name: form.name.trim().to_string(),
            role,
            password_hash: password_hash(email, &form.password),
            created_at: Utc::now(),
        };
        if !self.db.insert_account(&account)? {
            return Err(AuthError::EmailTaken.into());
        }
        tracing::info!(email = %email, role = %role, "account registered");

        self.login(email, role, Some(&new_token()))
    }

    /// Check credentials for `role` and log the account in
    pub fn sign_in(&self, email: &str, password: &str, role: Option<Role>) -> Result<AuthRecord> {
        let role = role.ok_or(AuthError::MissingRole)?;
        validate_email(email)?;
        if password.trim().is_empty() {
            return Err(AuthError::MissingPassword.into());
        }

        let email = email.trim();
        let account = self.db.get_account(email)?;
        let matches = account.as_ref().is_some_and(|a| {
            a.role == role && a.password_hash == password_hash(email, password)
        });
        if !matches {
            tracing::warn!(email = %email, role = %role, "sign-in rejected");
            return Err(AuthError::InvalidCredentials.into());
        }

        self.login(email, role, Some(&new_token()))
    }

    /// The logged-in user, provided they hold `role`
    pub fn require_role(&self, role: Role) -> Result<AuthRecord> {
        let record = self.current_user()?.ok_or(AuthError::NotSignedIn)?;
        if record.role != role {
            return Err(AuthError::WrongRole(role).into());
        }
        Ok(record)
    }
}

fn new_token() -> String {
    uuid::Uuid::new_v4().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn test_db() -> Database {
        let db = Database::open_in_memory().unwrap();
        db.migrate().unwrap();
        db
    }

    fn form(email: &str, password: &str, confirm: &str) -> SignUpForm {
        SignUpForm {
            role: Some(Role::Helper),
            name: "Alex Thomas".to_string(),
            email: email.to_string(),
            password: password.to_string(),
            confirm_password: confirm.to_string(),
        }
    }

    fn auth_error(result: Result<AuthRecord>) -> AuthError {
        match result {
            Err(Error::Auth(e)) => e,
            other => panic!("expected auth error, got {:?}", other),
        }
    }

    #[test]
    fn test_login_logout_roundtrip() {
        let db = test_db();
        let store = AuthStore::new(&db);
        assert_eq!(store.current_user().unwrap(), None);

        let record = store.login("a@b.co", Role::Admin, None).unwrap();
        assert_eq!(record.token, DEFAULT_TOKEN);
        assert_eq!(store.current_user().unwrap(), Some(record));

        assert!(store.logout().unwrap());
        assert_eq!(store.current_user().unwrap(), None);
        assert!(!store.logout().unwrap());
    }

    #[test]
    fn test_record_stored_as_json() {
        let db = test_db();
        AuthStore::new(&db)
            .login("x@y.in", Role::Customer, Some("tok"))
            .unwrap();

        let raw = db.kv_get(AUTH_KEY).unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value["email"], "x@y.in");
        assert_eq!(value["role"], "customer");
        assert_eq!(value["token"], "tok");
    }

    #[test]
    fn test_unreadable_record_means_logged_out() {
        let db = test_db();
        db.kv_set(AUTH_KEY, "{not json").unwrap();
        assert_eq!(AuthStore::new(&db).current_user().unwrap(), None);
    }

    #[test]
    fn test_sign_up_validation_order() {
        let mut missing_role = form("", "", "");
        missing_role.role = None;
        assert_eq!(missing_role.validate(), Err(AuthError::MissingRole));

        assert_eq!(form("  ", "", "").validate(), Err(AuthError::MissingEmail));
        assert_eq!(form("nope", "", "").validate(), Err(AuthError::InvalidEmail));
        assert_eq!(form("a@b.co", "   ", "").validate(), Err(AuthError::MissingPassword));
        assert_eq!(form("a@b.co", "12345", "12345").validate(), Err(AuthError::PasswordTooShort));
        assert_eq!(form("a@b.co", "123456", "123457").validate(), Err(AuthError::PasswordMismatch));
        assert_eq!(form("a@b.co", "123456", "123456").validate(), Ok(Role::Helper));
    }

    #[test]
    fn test_email_shapes() {
        assert!(is_valid_email("anita@kochi.in"));
        assert!(is_valid_email("a@b.c"));
        assert!(!is_valid_email("a@.c"));
        assert!(!is_valid_email("a@b."));
        assert!(!is_valid_email("@b.co"));
        assert!(!is_valid_email("a@@b.co"));
        assert!(!is_valid_email("a b@c.de"));
        assert!(!is_valid_email("abc.de"));
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            AuthError::PasswordTooShort.to_string(),
            "Password must be at least 6 characters."
        );
        assert_eq!(
            AuthError::WrongRole(Role::Admin).to_string(),
            "This console requires the admin role."
        );
        let err: Error = AuthError::EmailTaken.into();
        assert_eq!(
            err.to_string(),
            "This email is already registered. Please sign in."
        );
    }

    #[test]
    fn test_sign_up_then_sign_in() {
        let db = test_db();
        let store = AuthStore::new(&db);

        let record = store
            .sign_up(&form(" rahul@example.com ", "secret1", "secret1"))
            .unwrap();
        assert_eq!(record.email, "rahul@example.com");
        assert_eq!(record.role, Role::Helper);
        assert_ne!(record.token, DEFAULT_TOKEN);

        store.logout().unwrap();
        let again = store
            .sign_in("rahul@example.com", "secret1", Some(Role::Helper))
            .unwrap();
        assert_eq!(store.current_user().unwrap(), Some(again));
    }

    #[test]
    fn test_duplicate_sign_up() {
        let db = test_db();
        let store = AuthStore::new(&db);
        store.sign_up(&form("dup@example.com", "secret1", "secret1")).unwrap();

        let err = auth_error(store.sign_up(&form("dup@example.com", "other12", "other12")));
        assert_eq!(err, AuthError::EmailTaken);
    }

    #[test]
    fn test_sign_in_rejections() {
        let db = test_db();
        let store = AuthStore::new(&db);
        store.sign_up(&form("meera@example.com", "secret1", "secret1")).unwrap();
        store.logout().unwrap();

        let err = auth_error(store.sign_in("meera@example.com", "wrong!!", Some(Role::Helper)));
        assert_eq!(err, AuthError::InvalidCredentials);
        let err = auth_error(store.sign_in("meera@example.com", "secret1", Some(Role::Admin)));
        assert_eq!(err, AuthError::InvalidCredentials);
        let err = auth_error(store.sign_in("ghost@example.com", "secret1", Some(Role::Helper)));
        assert_eq!(err, AuthError::InvalidCredentials);
        let err = auth_error(store.sign_in("meera@example.com", "secret1", None));
        assert_eq!(err, AuthError::MissingRole);

        assert_eq!(store.current_user().unwrap(), None);
    }

    #[test]
    fn test_require_role() {
        let db = test_db();
        let store = AuthStore::new(&db);
        assert_eq!(auth_error(store.require_role(Role::Admin)), AuthError::NotSignedIn);

        store.login("ops@example.com", Role::Helper, None).unwrap();
        assert_eq!(
            auth_error(store.require_role(Role::Admin)),
            AuthError::WrongRole(Role::Admin)
        );
        assert_eq!(store.require_role(Role::Helper).unwrap().email, "ops@example.com");
    }
}
