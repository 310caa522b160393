//! Use-case services over the ledger and collaborator lookups.
//!
//! # Responsibility
//! - `order_service`: the reservation lifecycle (place, change, cancel,
//!   release, claim) and the caller's own order list.
//! - `exchange_service`: the exchange pool projection.
//! - `report_service`: daily and monthly exports plus per-user history.
//!
//! # Invariants
//! - Only `order_service` mutates the ledger, always through
//!   `LedgerStore::write`.
//! - Every service reads "now" from its `Clock` at request time.

pub mod exchange_service;
pub mod order_service;
pub mod report_service;
