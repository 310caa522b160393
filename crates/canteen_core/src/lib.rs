//! Canteen meal reservation ledger.
//!
//! Owns the reservation lifecycle, the exchange pool and the report
//! projections. Menu items, users and caller identity come from
//! collaborators and are consumed read-only.

pub mod clock;
pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod policy;
pub mod report;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{CanteenConfig, ConfigError};
pub use db::{open_db, open_db_in_memory, DbError, DbResult};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::calendar::{CalendarError, MonthKey};
pub use model::menu::{Choice, MealId, MenuItem};
pub use model::reservation::{Reservation, ReservationId, SlotState};
pub use model::role::{parse_role, Caller, Role, RoleError};
pub use model::user::{User, UserId};
pub use policy::deadline::DeadlineRule;
pub use report::csv::{DailyExport, MonthlyReport, CSV_CONTENT_TYPE};
pub use repo::ledger_repo::{LedgerStore, SqliteLedgerStore};
pub use repo::menu_repo::{MenuCatalog, SqliteMenuCatalog};
pub use repo::user_repo::{SqliteUserDirectory, UserDirectory};
pub use repo::{RepoError, RepoResult};
pub use service::exchange_service::{ExchangeOffer, ExchangeService};
pub use service::order_service::{OrderError, OrderErrorKind, OrderService, OrderView};
pub use service::report_service::{HistoryEntry, ReportError, ReportService};
