//! Report rendering primitives.
//!
//! # Responsibility
//! - Surname ordering under Czech collation rules.
//! - `;`-delimited CSV documents for the daily and monthly exports.
//!
//! # Invariants
//! - Rendering is pure; data gathering lives in `service::report_service`.

pub mod collation;
pub mod csv;
