//! Domain model for the meal reservation ledger.
//!
//! # Responsibility
//! - Define the core-owned `Reservation` record and its slot transitions.
//! - Define the read-only shapes supplied by collaborators (`MenuItem`,
//!   `User`) and the caller identity (`Caller`, `Role`).
//! - Parse calendar inputs (`YYYY-MM-DD` dates, `YYYY-MM` months).
//!
//! # Invariants
//! - Every reservation is identified by a stable `ReservationId`.
//! - A reservation's `date` is copied from its meal at creation and never
//!   changes afterwards.

pub mod calendar;
pub mod menu;
pub mod reservation;
pub mod role;
pub mod user;
