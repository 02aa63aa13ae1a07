//! Account commands: signup, login, logout, whoami

use anyhow::Result;
use smart_helper_core::{AuthRecord, AuthStore, Database, Role, SignUpForm};

use crate::console::OutputFormat;

pub fn signup(
    db: &Database,
    role: Option<Role>,
    name: String,
    email: String,
    password: String,
    confirm_password: Option<String>,
) -> Result<()> {
    let form = SignUpForm {
        role,
        name,
        email,
        confirm_password: confirm_password.unwrap_or_else(|| password.clone()),
        password,
    };
    let record = AuthStore::new(db).sign_up(&form)?;
    println!("Signed up as {} ({})", record.email, record.role);
    Ok(())
}

pub fn login(db: &Database, role: Option<Role>, email: &str, password: &str) -> Result<()> {
    let record = AuthStore::new(db).sign_in(email, password, role)?;
    println!("Logged in as {} ({})", record.email, record.role);
    Ok(())
}

pub fn logout(db: &Database) -> Result<()> {
    if AuthStore::new(db).logout()? {
        println!("Logged out");
    } else {
        println!("Not logged in");
    }
    Ok(())
}

pub fn whoami(db: &Database, format: OutputFormat) -> Result<()> {
    let user = AuthStore::new(db).current_user()?;
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
        OutputFormat::Text => println!("{}", describe(user.as_ref())),
    }
    Ok(())
}

fn describe(user: Option<&AuthRecord>) -> String {
    match user {
        Some(record) => format!("{} ({})", record.email, record.role),
        None => "Not logged in".to_string(),
    }
}

/// Display name for the logged-in helper, falling back to `default`
pub fn display_name(db: &Database, record: &AuthRecord, default: &str) -> Result<String> {
    let name = db
        .get_account(&record.email)?
        .map(|account| account.name)
        .filter(|name| !name.trim().is_empty());
    Ok(name.unwrap_or_else(|| default.to_string()))
}
