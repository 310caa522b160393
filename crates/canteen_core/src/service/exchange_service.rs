//! Exchange pool projection.
//!
//! Read-only: lists released reservations a viewer could claim. Every call
//! queries the ledger, so the view reflects the latest committed state.

use crate::model::menu::MenuItem;
use crate::model::reservation::Reservation;
use crate::model::role::Caller;
use crate::repo::ledger_repo::LedgerStore;
use crate::repo::menu_repo::MenuCatalog;
use crate::service::order_service::OrderError;
use log::debug;
use serde::Serialize;

/// One released reservation joined with its meal for display.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExchangeOffer {
    pub reservation: Reservation,
    pub meal: MenuItem,
}

pub struct ExchangeService<L: LedgerStore, M: MenuCatalog> {
    ledger: L,
    menu: M,
}

impl<L: LedgerStore, M: MenuCatalog> ExchangeService<L, M> {
    pub fn new(ledger: L, menu: M) -> Self {
        Self { ledger, menu }
    }

    /// Released reservations not held by `viewer`, by date then release
    /// order.
    ///
    /// Offers whose meal was deleted are left out; they cannot be displayed.
    /// Every role sees the pool.
    pub fn list_available(&self, viewer: &Caller) -> Result<Vec<ExchangeOffer>, OrderError> {
        let released = self.ledger.list_in_exchange()?;
        let mut offers = Vec::with_capacity(released.len());
        for reservation in released {
            if reservation.is_held_by(viewer.user_id) {
                continue;
            }
            match self.menu.get_meal(reservation.meal_id)? {
                Some(meal) => offers.push(ExchangeOffer { reservation, meal }),
                None => debug!(
                    "event=exchange_list module=orders status=skipped reason=meal_missing reservation_id={}",
                    reservation.id
                ),
            }
        }
        Ok(offers)
    }
}
