//! Reporting engine: read-only projections of the ledger for administrators.
//!
//! # Responsibility
//! - Daily kitchen export with choice numbers.
//! - Monthly payroll summary for closed months.
//! - Full reservation history of one user.
//!
//! # Invariants
//! - Choice numbers rank a date's meals by creation sequence.
//! - Reservations whose meal or holder no longer exists are dropped from the
//!   daily export. History reports their choice as unknown.
//! - Monthly summaries cover every known user, zero-filled, and are refused
//!   for the current month and any later one.

use crate::clock::Clock;
use crate::model::calendar::{parse_date, CalendarError, MonthKey};
use crate::model::menu::{assign_choice_numbers, Choice, MealId};
use crate::model::reservation::ReservationId;
use crate::model::role::{Caller, Role};
use crate::model::user::{User, UserId};
use crate::report::collation::compare_czech;
use crate::report::csv::{DailyExport, DailyExportRow, MonthlyReport, MonthlySummaryRow};
use crate::repo::ledger_repo::LedgerStore;
use crate::repo::menu_repo::MenuCatalog;
use crate::repo::user_repo::UserDirectory;
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::{error, info};
use serde::Serialize;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum ReportError {
    /// Caller's role may not read this report.
    Forbidden(Role),
    /// Requested month has not fully elapsed.
    MonthNotClosed(MonthKey),
    InvalidInput(CalendarError),
    Unavailable(RepoError),
}

impl Display for ReportError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Forbidden(role) => write!(f, "role {role} may not read this report"),
            Self::MonthNotClosed(month) => {
                write!(f, "summaries are available only for closed months, not {month}")
            }
            Self::InvalidInput(err) => write!(f, "{err}"),
            Self::Unavailable(err) => write!(f, "ledger unavailable: {err}"),
        }
    }
}

impl Error for ReportError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidInput(err) => Some(err),
            Self::Unavailable(err) => Some(err),
            Self::Forbidden(_) | Self::MonthNotClosed(_) => None,
        }
    }
}

impl From<RepoError> for ReportError {
    fn from(value: RepoError) -> Self {
        Self::Unavailable(value)
    }
}

impl From<CalendarError> for ReportError {
    fn from(value: CalendarError) -> Self {
        Self::InvalidInput(value)
    }
}

/// One reservation in a user's history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub id: ReservationId,
    pub date: NaiveDate,
    /// `None` when the meal is no longer on that date's menu.
    pub meal_choice: Option<u32>,
    pub in_exchange: bool,
}

pub struct ReportService<L, M, U, C>
where
    L: LedgerStore,
    M: MenuCatalog,
    U: UserDirectory,
    C: Clock,
{
    ledger: L,
    menu: M,
    users: U,
    clock: C,
}

impl<L, M, U, C> ReportService<L, M, U, C>
where
    L: LedgerStore,
    M: MenuCatalog,
    U: UserDirectory,
    C: Clock,
{
    pub fn new(ledger: L, menu: M, users: U, clock: C) -> Self {
        Self {
            ledger,
            menu,
            users,
            clock,
        }
    }

    /// Builds the kitchen export for `date` (`YYYY-MM-DD`).
    ///
    /// Rows are ordered by choice number, then by holder surname.
    pub fn daily_export(&self, caller: &Caller, date: &str) -> Result<DailyExport, ReportError> {
        let result = self.try_daily_export(caller, date);
        match &result {
            Ok(export) => info!(
                "event=report_daily module=reports status=ok date={} meals={} rows={}",
                export.date,
                export.choices.len(),
                export.rows.len()
            ),
            Err(err) => log_failure("report_daily", err),
        }
        result
    }

    /// Builds the payroll summary for `month` (`YYYY-MM`).
    pub fn monthly_report(
        &self,
        caller: &Caller,
        month: &str,
    ) -> Result<MonthlyReport, ReportError> {
        let result = self.try_monthly_report(caller, month);
        match &result {
            Ok(report) => info!(
                "event=report_monthly module=reports status=ok month={} users={} meals={}",
                report.month,
                report.rows.len(),
                report.total_meals()
            ),
            Err(err) => log_failure("report_monthly", err),
        }
        result
    }

    /// Every reservation currently held by `user_id`, newest date first.
    pub fn user_history(
        &self,
        caller: &Caller,
        user_id: UserId,
    ) -> Result<Vec<HistoryEntry>, ReportError> {
        let result = self.try_user_history(caller, user_id);
        match &result {
            Ok(entries) => info!(
                "event=report_history module=reports status=ok user_id={user_id} entries={}",
                entries.len()
            ),
            Err(err) => log_failure("report_history", err),
        }
        result
    }

    fn try_daily_export(&self, caller: &Caller, date: &str) -> Result<DailyExport, ReportError> {
        ensure_role(caller, Role::may_read_daily_reports)?;
        let date = parse_date(date)?;

        let meals = self.menu.list_meals_on(date)?;
        if meals.is_empty() {
            return Ok(DailyExport {
                date,
                choices: Vec::new(),
                rows: Vec::new(),
            });
        }
        let choices = assign_choice_numbers(&meals);
        let by_meal: HashMap<MealId, &Choice> =
            choices.iter().map(|choice| (choice.meal_id, choice)).collect();
        let users = self.users_by_id()?;

        let mut rows = Vec::new();
        for reservation in self.ledger.list_on_date(date)? {
            let (Some(choice), Some(holder)) = (
                by_meal.get(&reservation.meal_id),
                users.get(&reservation.holder_id),
            ) else {
                continue;
            };
            rows.push(DailyExportRow {
                choice_number: choice.number,
                meal_name: choice.name.clone(),
                first_name: holder.first_name.clone(),
                last_name: holder.last_name.clone(),
                personal_number: holder.personal_number.clone().unwrap_or_default(),
            });
        }
        rows.sort_by(|a, b| {
            a.choice_number
                .cmp(&b.choice_number)
                .then_with(|| compare_czech(&a.last_name, &b.last_name))
        });

        Ok(DailyExport {
            date,
            choices,
            rows,
        })
    }

    fn try_monthly_report(
        &self,
        caller: &Caller,
        month: &str,
    ) -> Result<MonthlyReport, ReportError> {
        ensure_role(caller, Role::may_read_payroll)?;
        let month = MonthKey::parse(month)?;
        if month >= MonthKey::of(self.clock.now().date()) {
            return Err(ReportError::MonthNotClosed(month));
        }

        let mut counts: HashMap<UserId, u32> = HashMap::new();
        for reservation in self.ledger.list_in_month(month)? {
            *counts.entry(reservation.holder_id).or_default() += 1;
        }

        let mut rows: Vec<MonthlySummaryRow> = self
            .users
            .list_users()?
            .into_iter()
            .map(|user| MonthlySummaryRow {
                count: counts.get(&user.id).copied().unwrap_or(0),
                personal_number: user.personal_number.unwrap_or_default(),
                last_name: user.last_name,
                first_name: user.first_name,
                login: user.login,
            })
            .collect();
        rows.sort_by(|a, b| compare_czech(&a.last_name, &b.last_name));

        Ok(MonthlyReport { month, rows })
    }

    fn try_user_history(
        &self,
        caller: &Caller,
        user_id: UserId,
    ) -> Result<Vec<HistoryEntry>, ReportError> {
        ensure_role(caller, Role::may_read_daily_reports)?;

        let reservations = self.ledger.list_for_holder(user_id, None)?;
        let mut menus: HashMap<NaiveDate, Vec<Choice>> = HashMap::new();
        let mut entries = Vec::with_capacity(reservations.len());
        for reservation in reservations {
            if !menus.contains_key(&reservation.date) {
                let meals = self.menu.list_meals_on(reservation.date)?;
                menus.insert(reservation.date, assign_choice_numbers(&meals));
            }
            let meal_choice = menus.get(&reservation.date).and_then(|choices| {
                choices
                    .iter()
                    .find(|choice| choice.meal_id == reservation.meal_id)
                    .map(|choice| choice.number)
            });
            entries.push(HistoryEntry {
                id: reservation.id,
                date: reservation.date,
                meal_choice,
                in_exchange: reservation.in_exchange,
            });
        }
        entries.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(entries)
    }

    fn users_by_id(&self) -> Result<HashMap<UserId, User>, ReportError> {
        Ok(self
            .users
            .list_users()?
            .into_iter()
            .map(|user| (user.id, user))
            .collect())
    }
}

fn ensure_role(caller: &Caller, allowed: fn(Role) -> bool) -> Result<(), ReportError> {
    if allowed(caller.role) {
        Ok(())
    } else {
        Err(ReportError::Forbidden(caller.role))
    }
}

fn log_failure(event: &str, err: &ReportError) {
    match err {
        ReportError::Unavailable(source) => {
            error!("event={event} module=reports status=error error={source}")
        }
        ReportError::Forbidden(role) => {
            info!("event={event} module=reports status=rejected reason=forbidden role={role}")
        }
        ReportError::MonthNotClosed(month) => {
            info!("event={event} module=reports status=rejected reason=month_not_closed month={month}")
        }
        ReportError::InvalidInput(_) => {
            info!("event={event} module=reports status=rejected reason=invalid_input")
        }
    }
}
