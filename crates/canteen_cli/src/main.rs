//! Operator command line for the canteen ledger.
//!
//! # Responsibility
//! - Resolve configuration, open the ledger and act as one caller.
//! - Print records as JSON and exports as CSV.
//!
//! # Invariants
//! - The acting caller is always resolved through the user directory.
//! - Rejected requests exit with code 2, failures with code 1.

mod error;

use canteen_core::db::Connection;
use canteen_core::model::calendar::parse_date;
use canteen_core::model::menu::assign_choice_numbers;
use canteen_core::{
    open_db, parse_role, Caller, CanteenConfig, ExchangeService, MenuCatalog, MenuItem,
    OrderService, ReportService, SqliteLedgerStore, SqliteMenuCatalog, SqliteUserDirectory,
    SystemClock, User, UserDirectory,
};
use clap::{Parser, Subcommand};
use error::{CliError, CliResult};
use log::{error, info};
use serde::Serialize;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use uuid::Uuid;

#[derive(Parser)]
#[command(name = "canteen")]
#[command(about = "Canteen meal reservations: orders, exchange and payroll exports")]
#[command(version)]
struct Cli {
    /// TOML configuration file
    #[arg(short, long, env = "CANTEEN_CONFIG")]
    config: Option<PathBuf>,

    /// Ledger database file; overrides configuration
    #[arg(long)]
    db: Option<PathBuf>,

    /// Login of the acting user
    #[arg(short = 'u', long = "as-user", env = "CANTEEN_USER")]
    as_user: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create or upgrade the ledger schema
    Migrate,

    /// Register a user in the directory
    AddUser {
        login: String,
        /// EMPLOYEE, ADMIN_USER or ADMIN_MEAL
        #[arg(long, default_value = "EMPLOYEE")]
        role: String,
        #[arg(long, default_value = "")]
        first_name: String,
        #[arg(long, default_value = "")]
        last_name: String,
        #[arg(long)]
        personal_number: Option<String>,
    },

    /// Add a meal to a date's menu
    AddMeal {
        /// Meal date, YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: Option<f64>,
    },

    /// Show a date's menu with choice numbers
    Menu {
        #[arg(long)]
        date: String,
    },

    /// Reserve a meal
    Place { meal_id: Uuid },

    /// Switch the reservation on the meal's date to this meal
    Change { meal_id: Uuid },

    /// Cancel a reservation before the order cutoff
    Cancel { reservation_id: Uuid },

    /// Offer a reservation in the exchange
    Release { reservation_id: Uuid },

    /// Take over a reservation from the exchange
    Claim { reservation_id: Uuid },

    /// List reservations offered by other users
    Exchange,

    /// List own reservations since the start of last month
    MyOrders,

    /// Write the kitchen export for one date
    ExportDaily {
        #[arg(long)]
        date: String,
        /// Output file or directory; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Write the payroll export for one closed month
    ExportMonthly {
        /// Month, YYYY-MM
        #[arg(long)]
        month: String,
        /// Output file or directory; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Print the payroll summary for one closed month as JSON
    MonthlyReport {
        #[arg(long)]
        month: String,
    },

    /// Print a user's full reservation history
    History {
        /// Login of the user to inspect
        #[arg(long)]
        user: String,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {err}");
            ExitCode::from(err.exit_code())
        }
    }
}

fn run(cli: Cli) -> CliResult<()> {
    let mut config = CanteenConfig::load(cli.config.as_deref())?;
    if let Some(db) = cli.db {
        config.db_path = db;
    }
    config.init_logging().map_err(CliError::Logging)?;

    let conn = open_db(&config.db_path)?;
    info!(
        "event=cli_command module=cli status=start db_path={}",
        config.db_path.display()
    );

    match cli.command {
        Command::Migrate => {
            println!(
                "ledger schema at version {}",
                canteen_core::db::migrations::latest_version()
            );
            Ok(())
        }
        Command::AddUser {
            login,
            role,
            first_name,
            last_name,
            personal_number,
        } => {
            let mut user = User::new(login, parse_role(&role)?).with_name(first_name, last_name);
            user.personal_number = personal_number;
            SqliteUserDirectory::new(&conn).add_user(&user)?;
            print_json(&user)
        }
        Command::AddMeal { date, name, price } => {
            let meal = MenuItem::new(parse_date(&date)?, name, price);
            let stored = SqliteMenuCatalog::new(&conn).add_meal(&meal)?;
            print_json(&stored)
        }
        Command::Menu { date } => {
            let meals = SqliteMenuCatalog::new(&conn).list_meals_on(parse_date(&date)?)?;
            print_json(&assign_choice_numbers(&meals))
        }
        Command::Place { meal_id } => {
            let caller = resolve_caller(&conn, cli.as_user.as_deref())?;
            print_json(&orders(&conn).place(&caller, meal_id)?)
        }
        Command::Change { meal_id } => {
            let caller = resolve_caller(&conn, cli.as_user.as_deref())?;
            print_json(&orders(&conn).change(&caller, meal_id)?)
        }
        Command::Cancel { reservation_id } => {
            let caller = resolve_caller(&conn, cli.as_user.as_deref())?;
            print_json(&orders(&conn).cancel(&caller, reservation_id)?)
        }
        Command::Release { reservation_id } => {
            let caller = resolve_caller(&conn, cli.as_user.as_deref())?;
            print_json(&orders(&conn).release(&caller, reservation_id)?)
        }
        Command::Claim { reservation_id } => {
            let caller = resolve_caller(&conn, cli.as_user.as_deref())?;
            print_json(&orders(&conn).claim(&caller, reservation_id)?)
        }
        Command::Exchange => {
            let caller = resolve_caller(&conn, cli.as_user.as_deref())?;
            let exchange =
                ExchangeService::new(SqliteLedgerStore::new(&conn), SqliteMenuCatalog::new(&conn));
            print_json(&exchange.list_available(&caller)?)
        }
        Command::MyOrders => {
            let caller = resolve_caller(&conn, cli.as_user.as_deref())?;
            print_json(&orders(&conn).my_orders(&caller)?)
        }
        Command::ExportDaily { date, out } => {
            let caller = resolve_caller(&conn, cli.as_user.as_deref())?;
            let export = reports(&conn).daily_export(&caller, &date)?;
            write_export(out.as_deref(), &export.file_name(), &export.render_csv())
        }
        Command::ExportMonthly { month, out } => {
            let caller = resolve_caller(&conn, cli.as_user.as_deref())?;
            let report = reports(&conn).monthly_report(&caller, &month)?;
            write_export(out.as_deref(), &report.file_name(), &report.render_csv())
        }
        Command::MonthlyReport { month } => {
            let caller = resolve_caller(&conn, cli.as_user.as_deref())?;
            print_json(&reports(&conn).monthly_report(&caller, &month)?)
        }
        Command::History { user } => {
            let caller = resolve_caller(&conn, cli.as_user.as_deref())?;
            let target = find_user(&conn, &user)?;
            print_json(&reports(&conn).user_history(&caller, target.id)?)
        }
    }
}

type SqliteOrders<'c> = OrderService<SqliteLedgerStore<'c>, SqliteMenuCatalog<'c>, SystemClock>;
type SqliteReports<'c> = ReportService<
    SqliteLedgerStore<'c>,
    SqliteMenuCatalog<'c>,
    SqliteUserDirectory<'c>,
    SystemClock,
>;

fn orders(conn: &Connection) -> SqliteOrders<'_> {
    OrderService::new(
        SqliteLedgerStore::new(conn),
        SqliteMenuCatalog::new(conn),
        SystemClock,
    )
}

fn reports(conn: &Connection) -> SqliteReports<'_> {
    ReportService::new(
        SqliteLedgerStore::new(conn),
        SqliteMenuCatalog::new(conn),
        SqliteUserDirectory::new(conn),
        SystemClock,
    )
}

fn resolve_caller(conn: &Connection, login: Option<&str>) -> CliResult<Caller> {
    let login = login.ok_or_else(|| {
        CliError::InvalidArgument("this command needs --as-user <login>".to_string())
    })?;
    let user = find_user(conn, login)?;
    Ok(Caller::new(user.id, user.role))
}

fn find_user(conn: &Connection, login: &str) -> CliResult<User> {
    SqliteUserDirectory::new(conn)
        .find_by_login(login)?
        .ok_or_else(|| CliError::UnknownUser(login.to_string()))
}

fn print_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value).map_err(CliError::Render)?;
    println!("{rendered}");
    Ok(())
}

/// Writes a CSV body to stdout, to `out`, or into `out` when it is a
/// directory using the export's own file name.
fn write_export(out: Option<&Path>, file_name: &str, body: &str) -> CliResult<()> {
    let Some(out) = out else {
        let mut stdout = std::io::stdout().lock();
        return stdout
            .write_all(body.as_bytes())
            .map_err(|source| CliError::Output { path: None, source });
    };

    let path = if out.is_dir() {
        out.join(file_name)
    } else {
        out.to_path_buf()
    };
    std::fs::write(&path, body).map_err(|source| CliError::Output {
        path: Some(path.clone()),
        source,
    })?;
    eprintln!("wrote {}", path.display());
    Ok(())
}
