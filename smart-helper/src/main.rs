//! smart-helper - simulated home-services dispatch
//!
//! Command-line front end for the helper and admin consoles, customer
//! bookings, and the account commands that gate them.

mod account;
mod console;
mod customer;
mod render;
mod script;

use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use chrono::Utc;
use smart_helper_core::{
    AdminSession, AdminTuning, AuthStore, Config, Database, HelperSession, HelperTimings,
    MockGenerator, Role, ServiceType, SessionClock,
};

use crate::console::{OutputFormat, RunOptions};

#[derive(Parser)]
#[command(name = "smart-helper")]
#[command(about = "Simulated home-services dispatch consoles")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Register an account and log it in
    Signup {
        /// customer, helper or admin
        #[arg(long)]
        role: Option<Role>,

        #[arg(long, default_value = "")]
        name: String,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        password: String,

        /// Defaults to --password
        #[arg(long)]
        confirm_password: Option<String>,
    },

    /// Log in to an existing account
    Login {
        #[arg(long)]
        role: Option<Role>,

        #[arg(long, default_value = "")]
        email: String,

        #[arg(long, default_value = "")]
        password: String,
    },

    /// Forget the logged-in account
    Logout,

    /// Show the logged-in account
    Whoami {
        #[arg(long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Run the operations console (admin role)
    Admin(ConsoleArgs),

    /// Run the helper console (helper role)
    Helper(ConsoleArgs),

    /// Book a service and follow it (customer role)
    Customer(BookArgs),
}

#[derive(Args)]
struct BookArgs {
    /// ac-repair, electrical, cleaning, plumbing or carpentry
    #[arg(long)]
    service: ServiceType,

    /// Payment in rupees
    #[arg(long)]
    amount: u32,

    /// Simulated seconds to follow the booking for
    #[arg(short, long, default_value = "0")]
    duration: u64,

    /// RNG seed, overriding the configured one
    #[arg(long)]
    seed: Option<u64>,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

#[derive(Args)]
struct ConsoleArgs {
    /// Seconds to run; without it a real-time run lasts until Ctrl-C
    #[arg(short, long)]
    duration: Option<u64>,

    /// Step simulated time instead of waiting on the wall clock
    #[arg(long = "virtual")]
    virtual_time: bool,

    /// Console command to run once the console is ready (repeatable)
    #[arg(short, long = "exec", value_name = "COMMAND")]
    exec: Vec<String>,

    /// RNG seed, overriding the configured one
    #[arg(long)]
    seed: Option<u64>,

    /// Print a snapshot every N seconds during a real-time run
    #[arg(short, long, value_name = "SECONDS")]
    watch: Option<u64>,

    #[arg(long, value_enum, default_value = "text")]
    format: OutputFormat,
}

impl ConsoleArgs {
    fn run_options(&self, config: &Config, exec_at: Duration) -> RunOptions {
        RunOptions {
            duration: self.duration.map(Duration::from_secs),
            virtual_time: self.virtual_time,
            exec: self.exec.clone(),
            exec_at,
            watch: self.watch.map(Duration::from_secs),
            tick: config.simulation.tick(),
            format: self.format,
        }
    }

    fn generator(&self, config: &Config) -> MockGenerator {
        MockGenerator::new(self.seed.or(config.simulation.seed))
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    Config::ensure_xdg_env();
    let config = Config::load().context("failed to load configuration")?;

    let _log_guard =
        smart_helper_core::logging::init(&config.logging).context("failed to initialize logging")?;

    tracing::info!("smart-helper starting");

    let db_path = Config::database_path();
    tracing::info!(path = %db_path.display(), "Opening database");
    let db = Database::open(&db_path).context("failed to open database")?;
    db.migrate().context("failed to run database migrations")?;

    match cli.command {
        Command::Signup {
            role,
            name,
            email,
            password,
            confirm_password,
        } => account::signup(&db, role, name, email, password, confirm_password),
        Command::Login {
            role,
            email,
            password,
        } => account::login(&db, role, &email, &password),
        Command::Logout => account::logout(&db),
        Command::Whoami { format } => account::whoami(&db, format),
        Command::Admin(args) => run_admin(&db, &config, &args),
        Command::Helper(args) => run_helper(&db, &config, &args),
        Command::Customer(args) => run_customer(&db, &config, &args),
    }
}

fn run_admin(db: &Database, config: &Config, args: &ConsoleArgs) -> Result<()> {
    let user = AuthStore::new(db).require_role(Role::Admin)?;
    tracing::info!(email = %user.email, "opening admin console");

    let session = AdminSession::new(
        AdminTuning::from_config(&config.admin, config.simulation.notification_ttl()),
        args.generator(config),
        SessionClock::new(Utc::now()),
    );
    console::run(session, &args.run_options(config, Duration::ZERO))
}

fn run_helper(db: &Database, config: &Config, args: &ConsoleArgs) -> Result<()> {
    let user = AuthStore::new(db).require_role(Role::Helper)?;
    tracing::info!(email = %user.email, "opening helper console");

    let name = account::display_name(db, &user, &config.helper.name)?;
    let timings = HelperTimings::from_config(&config.helper, config.simulation.notification_ttl());
    let exec_at = timings.initial_delay;
    let session = HelperSession::new(
        name,
        timings,
        args.generator(config),
        SessionClock::new(Utc::now()),
    );
    console::run(session, &args.run_options(config, exec_at))
}

fn run_customer(db: &Database, config: &Config, args: &BookArgs) -> Result<()> {
    let user = AuthStore::new(db).require_role(Role::Customer)?;
    tracing::info!(email = %user.email, service = %args.service, "customer booking");

    let name = account::display_name(db, &user, &user.email)?;
    let fleet = AdminSession::new(
        AdminTuning::from_config(&config.admin, config.simulation.notification_ttl()),
        MockGenerator::new(args.seed.or(config.simulation.seed)),
        SessionClock::new(Utc::now()),
    );
    let booked = customer::book(
        fleet,
        &name,
        args.service,
        args.amount,
        Duration::from_secs(args.duration),
    );
    customer::print_booking(&booked, args.format)
}
