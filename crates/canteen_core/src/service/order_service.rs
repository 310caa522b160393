//! Reservation lifecycle engine.
//!
//! # Responsibility
//! - Validate and apply place/change/cancel/release/claim requests.
//! - Map every rejection to one typed `OrderError`.
//! - Emit one metadata-only log event per request outcome.
//!
//! # Invariants
//! - Each mutation is one `LedgerStore::write` unit: state is read, checked
//!   and written under the write lock, so a rejection leaves the ledger
//!   untouched.
//! - Deadlines are evaluated with the clock read inside the unit.
//! - Place and change keep at most one reservation per `(holder, date)`.
//!   Claim does not check the claimant's existing holdings.

use crate::clock::Clock;
use crate::model::calendar::MonthKey;
use crate::model::menu::{MealId, MenuItem};
use crate::model::reservation::{Reservation, ReservationId};
use crate::model::role::Caller;
use crate::policy::deadline::{check_release_window, order_cutoff_passed, DeadlineRule};
use crate::repo::ledger_repo::LedgerStore;
use crate::repo::menu_repo::MenuCatalog;
use crate::repo::RepoError;
use chrono::NaiveDate;
use log::{error, info};
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Rejection or failure of one lifecycle request.
#[derive(Debug)]
pub enum OrderError {
    /// A time rule closed the requested transition for `date`.
    DeadlinePassed { rule: DeadlineRule, date: NaiveDate },
    /// The caller already holds `existing` on `date`.
    AlreadyReserved {
        date: NaiveDate,
        existing: ReservationId,
    },
    AlreadyInExchange(ReservationId),
    NotInExchange(ReservationId),
    SelfClaim(ReservationId),
    MealNotFound(MealId),
    ReservationNotFound(ReservationId),
    /// Change requested for a date the caller holds nothing on.
    NoReservationForDate(NaiveDate),
    /// Caller is not the reservation's holder.
    NotOwner(ReservationId),
    /// Storage failure; never a business-rule rejection.
    Unavailable(RepoError),
}

/// Coarse classification used by callers that render messages or codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum OrderErrorKind {
    DeadlinePassed,
    AlreadyReserved,
    AlreadyInExchange,
    NotInExchange,
    SelfClaim,
    NotFound,
    Forbidden,
    Unavailable,
}

impl OrderErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::DeadlinePassed => "deadline_passed",
            Self::AlreadyReserved => "already_reserved",
            Self::AlreadyInExchange => "already_in_exchange",
            Self::NotInExchange => "not_in_exchange",
            Self::SelfClaim => "self_claim",
            Self::NotFound => "not_found",
            Self::Forbidden => "forbidden",
            Self::Unavailable => "unavailable",
        }
    }
}

impl OrderError {
    pub fn kind(&self) -> OrderErrorKind {
        match self {
            Self::DeadlinePassed { .. } => OrderErrorKind::DeadlinePassed,
            Self::AlreadyReserved { .. } => OrderErrorKind::AlreadyReserved,
            Self::AlreadyInExchange(_) => OrderErrorKind::AlreadyInExchange,
            Self::NotInExchange(_) => OrderErrorKind::NotInExchange,
            Self::SelfClaim(_) => OrderErrorKind::SelfClaim,
            Self::MealNotFound(_)
            | Self::ReservationNotFound(_)
            | Self::NoReservationForDate(_) => OrderErrorKind::NotFound,
            Self::NotOwner(_) => OrderErrorKind::Forbidden,
            Self::Unavailable(_) => OrderErrorKind::Unavailable,
        }
    }

    fn deadline(rule: DeadlineRule, date: NaiveDate) -> Self {
        Self::DeadlinePassed { rule, date }
    }
}

impl Display for OrderError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::DeadlinePassed { rule, date } => match rule {
                DeadlineRule::OrderCutoff => {
                    write!(f, "orders for {date} closed at midnight before the meal date")
                }
                DeadlineRule::ExchangeCutoff => {
                    write!(f, "the exchange for {date} closed at 12:00 on the meal date")
                }
                DeadlineRule::ReleaseNotYetOpen => write!(
                    f,
                    "reservation for {date} can still be cancelled; release opens at midnight"
                ),
            },
            Self::AlreadyReserved { date, existing } => {
                write!(f, "a meal is already reserved for {date} ({existing})")
            }
            Self::AlreadyInExchange(id) => write!(f, "reservation already in exchange: {id}"),
            Self::NotInExchange(id) => write!(f, "reservation is not in exchange: {id}"),
            Self::SelfClaim(id) => write!(f, "cannot claim own reservation: {id}"),
            Self::MealNotFound(id) => write!(f, "meal not found: {id}"),
            Self::ReservationNotFound(id) => write!(f, "reservation not found: {id}"),
            Self::NoReservationForDate(date) => write!(f, "no reservation to change for {date}"),
            Self::NotOwner(id) => write!(f, "reservation belongs to another user: {id}"),
            Self::Unavailable(err) => write!(f, "ledger unavailable: {err}"),
        }
    }
}

impl Error for OrderError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Unavailable(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for OrderError {
    fn from(value: RepoError) -> Self {
        Self::Unavailable(value)
    }
}

/// One of the caller's own reservations joined with its meal.
///
/// `meal` is `None` when the menu item has since been deleted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub reservation: Reservation,
    pub meal: Option<MenuItem>,
}

/// Lifecycle engine facade over the ledger, the menu and a clock.
pub struct OrderService<L, M, C>
where
    L: LedgerStore,
    M: MenuCatalog,
    C: Clock,
{
    ledger: L,
    menu: M,
    clock: C,
}

impl<L, M, C> OrderService<L, M, C>
where
    L: LedgerStore,
    M: MenuCatalog,
    C: Clock,
{
    pub fn new(ledger: L, menu: M, clock: C) -> Self {
        Self {
            ledger,
            menu,
            clock,
        }
    }

    /// Reserves `meal_id` for the caller.
    ///
    /// # Errors
    /// - `MealNotFound` when the meal does not exist.
    /// - `DeadlinePassed` once the order cutoff for the meal date passed.
    /// - `AlreadyReserved` when the caller already holds that date.
    pub fn place(&self, caller: &Caller, meal_id: MealId) -> Result<Reservation, OrderError> {
        let result = self.try_place(caller, meal_id);
        match &result {
            Ok(reservation) => log_applied("order_place", caller, reservation),
            Err(err) => log_rejected("order_place", caller, err),
        }
        result
    }

    /// Swaps the caller's reservation on the new meal's date to that meal.
    ///
    /// The reservation keeps its id and date and leaves the exchange pool.
    ///
    /// # Errors
    /// - `MealNotFound`, `DeadlinePassed` as for `place`.
    /// - `NoReservationForDate` when the caller holds nothing on that date.
    pub fn change(&self, caller: &Caller, new_meal_id: MealId) -> Result<Reservation, OrderError> {
        let result = self.try_change(caller, new_meal_id);
        match &result {
            Ok(reservation) => log_applied("order_change", caller, reservation),
            Err(err) => log_rejected("order_change", caller, err),
        }
        result
    }

    /// Deletes one of the caller's reservations and returns the removed record.
    ///
    /// # Errors
    /// - `ReservationNotFound`, `NotOwner`.
    /// - `DeadlinePassed` once the order cutoff passed.
    pub fn cancel(
        &self,
        caller: &Caller,
        reservation_id: ReservationId,
    ) -> Result<Reservation, OrderError> {
        let result = self.try_cancel(caller, reservation_id);
        match &result {
            Ok(reservation) => log_applied("order_cancel", caller, reservation),
            Err(err) => log_rejected("order_cancel", caller, err),
        }
        result
    }

    /// Offers one of the caller's reservations in the exchange pool.
    ///
    /// # Errors
    /// - `ReservationNotFound`, `NotOwner`, `AlreadyInExchange`.
    /// - `DeadlinePassed` before the order cutoff or after the exchange
    ///   cutoff.
    pub fn release(
        &self,
        caller: &Caller,
        reservation_id: ReservationId,
    ) -> Result<Reservation, OrderError> {
        let result = self.try_release(caller, reservation_id);
        match &result {
            Ok(reservation) => log_applied("order_release", caller, reservation),
            Err(err) => log_rejected("order_release", caller, err),
        }
        result
    }

    /// Takes over a released reservation.
    ///
    /// No deadline applies and the caller may end up holding two
    /// reservations on the same date.
    ///
    /// # Errors
    /// - `ReservationNotFound`, `NotInExchange`, `SelfClaim`.
    pub fn claim(
        &self,
        caller: &Caller,
        reservation_id: ReservationId,
    ) -> Result<Reservation, OrderError> {
        let result = self.try_claim(caller, reservation_id);
        match &result {
            Ok(reservation) => log_applied("order_claim", caller, reservation),
            Err(err) => log_rejected("order_claim", caller, err),
        }
        result
    }

    /// Lists the caller's reservations dated from the first day of the
    /// previous month onwards, oldest first.
    pub fn my_orders(&self, caller: &Caller) -> Result<Vec<OrderView>, OrderError> {
        let since = my_orders_since(self.clock.now().date());
        let reservations = self.ledger.list_for_holder(caller.user_id, Some(since))?;

        let mut views = Vec::with_capacity(reservations.len());
        for reservation in reservations {
            let meal = self.menu.get_meal(reservation.meal_id)?;
            views.push(OrderView { reservation, meal });
        }
        Ok(views)
    }

    fn try_place(&self, caller: &Caller, meal_id: MealId) -> Result<Reservation, OrderError> {
        let meal = self.load_meal(meal_id)?;

        self.ledger.write(|ledger| {
            if order_cutoff_passed(meal.date, self.clock.now()) {
                return Err(OrderError::deadline(DeadlineRule::OrderCutoff, meal.date));
            }
            if let Some(existing) = ledger.find_for_holder_on(caller.user_id, meal.date)? {
                return Err(OrderError::AlreadyReserved {
                    date: meal.date,
                    existing: existing.id,
                });
            }

            let reservation = Reservation::place(caller.user_id, &meal);
            ledger.insert_reservation(&reservation)?;
            Ok(reservation)
        })
    }

    fn try_change(&self, caller: &Caller, new_meal_id: MealId) -> Result<Reservation, OrderError> {
        let meal = self.load_meal(new_meal_id)?;

        self.ledger.write(|ledger| {
            if order_cutoff_passed(meal.date, self.clock.now()) {
                return Err(OrderError::deadline(DeadlineRule::OrderCutoff, meal.date));
            }
            let mut reservation = ledger
                .find_for_holder_on(caller.user_id, meal.date)?
                .ok_or(OrderError::NoReservationForDate(meal.date))?;
            if !reservation.change_meal(&meal) {
                return Err(OrderError::NoReservationForDate(meal.date));
            }

            ledger.update_reservation(&reservation)?;
            Ok(reservation)
        })
    }

    fn try_cancel(
        &self,
        caller: &Caller,
        reservation_id: ReservationId,
    ) -> Result<Reservation, OrderError> {
        self.ledger.write(|ledger| {
            let reservation = ledger
                .get_reservation(reservation_id)?
                .ok_or(OrderError::ReservationNotFound(reservation_id))?;
            if !reservation.is_held_by(caller.user_id) {
                return Err(OrderError::NotOwner(reservation_id));
            }
            if order_cutoff_passed(reservation.date, self.clock.now()) {
                return Err(OrderError::deadline(
                    DeadlineRule::OrderCutoff,
                    reservation.date,
                ));
            }

            ledger.delete_reservation(reservation_id)?;
            Ok(reservation)
        })
    }

    fn try_release(
        &self,
        caller: &Caller,
        reservation_id: ReservationId,
    ) -> Result<Reservation, OrderError> {
        self.ledger.write(|ledger| {
            let mut reservation = ledger
                .get_reservation(reservation_id)?
                .ok_or(OrderError::ReservationNotFound(reservation_id))?;
            if !reservation.is_held_by(caller.user_id) {
                return Err(OrderError::NotOwner(reservation_id));
            }
            if reservation.in_exchange {
                return Err(OrderError::AlreadyInExchange(reservation_id));
            }
            check_release_window(reservation.date, self.clock.now())
                .map_err(|rule| OrderError::deadline(rule, reservation.date))?;

            reservation.release();
            ledger.update_reservation(&reservation)?;
            Ok(reservation)
        })
    }

    fn try_claim(
        &self,
        caller: &Caller,
        reservation_id: ReservationId,
    ) -> Result<Reservation, OrderError> {
        self.ledger.write(|ledger| {
            let mut reservation = ledger
                .get_reservation(reservation_id)?
                .ok_or(OrderError::ReservationNotFound(reservation_id))?;
            if !reservation.in_exchange {
                return Err(OrderError::NotInExchange(reservation_id));
            }
            if reservation.is_held_by(caller.user_id) {
                return Err(OrderError::SelfClaim(reservation_id));
            }

            reservation.transfer_to(caller.user_id);
            ledger.update_reservation(&reservation)?;
            Ok(reservation)
        })
    }

    fn load_meal(&self, meal_id: MealId) -> Result<MenuItem, OrderError> {
        self.menu
            .get_meal(meal_id)?
            .ok_or(OrderError::MealNotFound(meal_id))
    }
}

/// First date included in a caller's own order list on `today`.
pub fn my_orders_since(today: NaiveDate) -> NaiveDate {
    MonthKey::of(today).previous().first_day()
}

fn log_applied(event: &str, caller: &Caller, reservation: &Reservation) {
    info!(
        "event={event} module=orders status=ok user_id={} reservation_id={} date={} in_exchange={}",
        caller.user_id, reservation.id, reservation.date, reservation.in_exchange
    );
}

fn log_rejected(event: &str, caller: &Caller, err: &OrderError) {
    match err {
        OrderError::Unavailable(source) => error!(
            "event={event} module=orders status=error user_id={} error={source}",
            caller.user_id
        ),
        OrderError::DeadlinePassed { rule, date } => info!(
            "event={event} module=orders status=rejected user_id={} reason=deadline_passed rule={rule} date={date}",
            caller.user_id
        ),
        other => info!(
            "event={event} module=orders status=rejected user_id={} reason={}",
            caller.user_id,
            other.kind().as_str()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(year: i32, month: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
    }

    #[test]
    fn my_orders_window_starts_on_first_day_of_previous_month() {
        assert_eq!(my_orders_since(day(2025, 3, 18)), day(2025, 2, 1));
        assert_eq!(my_orders_since(day(2025, 1, 1)), day(2024, 12, 1));
    }

    #[test]
    fn error_kinds_group_lookup_and_ownership_failures() {
        let id = uuid::Uuid::new_v4();
        assert_eq!(
            OrderError::ReservationNotFound(id).kind(),
            OrderErrorKind::NotFound
        );
        assert_eq!(
            OrderError::NoReservationForDate(day(2025, 3, 10)).kind(),
            OrderErrorKind::NotFound
        );
        assert_eq!(OrderError::NotOwner(id).kind(), OrderErrorKind::Forbidden);
    }

    #[test]
    fn deadline_message_names_the_rule() {
        let err = OrderError::deadline(DeadlineRule::ExchangeCutoff, day(2025, 3, 10));
        assert_eq!(err.kind(), OrderErrorKind::DeadlinePassed);
        assert!(err.to_string().contains("12:00"));
    }
}
