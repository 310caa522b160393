//! Reservation domain model.
//!
//! # Responsibility
//! - Define the ledger record that entitles one holder to one meal.
//! - Provide the in-place transitions used by the lifecycle engine.
//!
//! # Invariants
//! - `id` is assigned at creation and never reused.
//! - `date` equals the referenced meal's date and is fixed at creation.
//! - `holder_id` only changes through `transfer_to`.
//! - `in_exchange` is cleared by both `change_meal` and `transfer_to`.

use crate::model::menu::{MealId, MenuItem};
use crate::model::user::UserId;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of one reservation record.
pub type ReservationId = Uuid;

/// Observable state of a held slot.
///
/// A slot without any record is simply absent from the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SlotState {
    /// Held by its holder, not offered to anyone.
    Held,
    /// Offered in the exchange pool for another user to claim.
    Released,
}

/// Canonical ledger record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Reservation {
    pub id: ReservationId,
    /// User currently entitled to (and liable for) the meal.
    pub holder_id: UserId,
    pub meal_id: MealId,
    /// Denormalized meal date; all deadline and grouping logic uses it.
    pub date: NaiveDate,
    pub in_exchange: bool,
}

impl Reservation {
    /// Creates a held reservation for `meal` with a fresh id.
    pub fn place(holder_id: UserId, meal: &MenuItem) -> Self {
        Self::with_id(Uuid::new_v4(), holder_id, meal)
    }

    /// Creates a held reservation with a caller-provided id.
    pub fn with_id(id: ReservationId, holder_id: UserId, meal: &MenuItem) -> Self {
        Self {
            id,
            holder_id,
            meal_id: meal.id,
            date: meal.date,
            in_exchange: false,
        }
    }

    pub fn state(&self) -> SlotState {
        if self.in_exchange {
            SlotState::Released
        } else {
            SlotState::Held
        }
    }

    pub fn is_held_by(&self, user_id: UserId) -> bool {
        self.holder_id == user_id
    }

    /// Swaps the meal for another one on the same date.
    ///
    /// A pending release is withdrawn. Returns `false` and leaves the record
    /// untouched when `meal` is offered on a different date.
    pub fn change_meal(&mut self, meal: &MenuItem) -> bool {
        if meal.date != self.date {
            return false;
        }
        self.meal_id = meal.id;
        self.in_exchange = false;
        true
    }

    /// Offers this reservation in the exchange pool.
    pub fn release(&mut self) {
        self.in_exchange = true;
    }

    /// Hands the reservation to `claimant` and takes it off the pool.
    pub fn transfer_to(&mut self, claimant: UserId) {
        self.holder_id = claimant;
        self.in_exchange = false;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meal_on(date: NaiveDate) -> MenuItem {
        MenuItem::new(date, "Goulash", Some(95.0))
    }

    fn march(day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, day).expect("valid date")
    }

    #[test]
    fn place_copies_meal_date_and_starts_held() {
        let meal = meal_on(march(10));
        let holder = Uuid::new_v4();
        let reservation = Reservation::place(holder, &meal);

        assert_eq!(reservation.date, meal.date);
        assert_eq!(reservation.meal_id, meal.id);
        assert_eq!(reservation.state(), SlotState::Held);
        assert!(reservation.is_held_by(holder));
    }

    #[test]
    fn change_meal_withdraws_release_and_rejects_other_dates() {
        let mut reservation = Reservation::place(Uuid::new_v4(), &meal_on(march(10)));
        reservation.release();

        let other_day = meal_on(march(11));
        assert!(!reservation.change_meal(&other_day));
        assert_eq!(reservation.state(), SlotState::Released);

        let same_day = meal_on(march(10));
        assert!(reservation.change_meal(&same_day));
        assert_eq!(reservation.meal_id, same_day.id);
        assert_eq!(reservation.state(), SlotState::Held);
    }

    #[test]
    fn transfer_moves_holder_and_clears_exchange_flag() {
        let mut reservation = Reservation::place(Uuid::new_v4(), &meal_on(march(10)));
        reservation.release();
        let claimant = Uuid::new_v4();

        reservation.transfer_to(claimant);

        assert!(reservation.is_held_by(claimant));
        assert!(!reservation.in_exchange);
    }

    #[test]
    fn serializes_with_external_field_names() {
        let reservation = Reservation::place(Uuid::new_v4(), &meal_on(march(10)));
        let value = serde_json::to_value(&reservation).expect("serialize");
        assert_eq!(value["date"], "2025-03-10");
        assert_eq!(value["inExchange"], false);
        assert!(value.get("holderId").is_some());
    }
}
