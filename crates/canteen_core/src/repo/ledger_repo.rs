//! Reservation ledger contracts and SQLite implementation.
//!
//! # Responsibility
//! - Store reservation records keyed by id, looked up by `(holder, date)`.
//! - Run read-validate-write units under the database write lock.
//! - Serve the read-only projections (exchange pool, reports, history).
//!
//! # Invariants
//! - `write` opens a `BEGIN IMMEDIATE` transaction before the closure runs
//!   and commits only when the closure returns `Ok`; any `Err` rolls back.
//! - Concurrent writers on other connections wait on the busy timeout, so
//!   two units touching the same reservation never interleave.
//! - Lookups by `(holder, date)` return the oldest matching record.

use crate::model::calendar::{format_date, MonthKey};
use crate::model::reservation::{Reservation, ReservationId};
use crate::model::user::UserId;
use crate::repo::{parse_stored_date, parse_uuid, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, Row, Transaction, TransactionBehavior};

const RESERVATION_SELECT_SQL: &str = "SELECT
    id,
    holder_id,
    meal_id,
    date,
    in_exchange
FROM reservations";

/// Point lookups available both inside and outside a write unit.
pub trait LedgerRead {
    fn get_reservation(&self, id: ReservationId) -> RepoResult<Option<Reservation>>;
    fn find_for_holder_on(&self, holder_id: UserId, date: NaiveDate)
        -> RepoResult<Option<Reservation>>;
}

/// Mutations available only inside `LedgerStore::write`.
pub trait LedgerWrite: LedgerRead {
    fn insert_reservation(&self, reservation: &Reservation) -> RepoResult<()>;
    fn update_reservation(&self, reservation: &Reservation) -> RepoResult<()>;
    fn delete_reservation(&self, id: ReservationId) -> RepoResult<()>;
}

/// Durable reservation ledger.
pub trait LedgerStore: LedgerRead {
    /// Runs `op` as one atomic unit against the ledger.
    fn write<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce(&dyn LedgerWrite) -> Result<T, E>,
        E: From<RepoError>;

    /// Released reservations, ordered by date then creation.
    fn list_in_exchange(&self) -> RepoResult<Vec<Reservation>>;
    /// All reservations for one date, in creation order.
    fn list_on_date(&self, date: NaiveDate) -> RepoResult<Vec<Reservation>>;
    /// All reservations whose date string starts with `YYYY-MM-`.
    fn list_in_month(&self, month: MonthKey) -> RepoResult<Vec<Reservation>>;
    /// One holder's reservations on or after `since`, ordered by date.
    fn list_for_holder(
        &self,
        holder_id: UserId,
        since: Option<NaiveDate>,
    ) -> RepoResult<Vec<Reservation>>;
}

/// SQLite-backed reservation ledger.
pub struct SqliteLedgerStore<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteLedgerStore<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    fn query_list(&self, filter_sql: &str, bind_values: Vec<Value>) -> RepoResult<Vec<Reservation>> {
        let sql = format!("{RESERVATION_SELECT_SQL} {filter_sql}");
        let mut stmt = self.conn.prepare(&sql)?;
        let mut rows = stmt.query(params_from_iter(bind_values))?;
        let mut reservations = Vec::new();
        while let Some(row) = rows.next()? {
            reservations.push(parse_reservation_row(row)?);
        }
        Ok(reservations)
    }
}

impl LedgerRead for SqliteLedgerStore<'_> {
    fn get_reservation(&self, id: ReservationId) -> RepoResult<Option<Reservation>> {
        SqlLedger { conn: self.conn }.get_reservation(id)
    }

    fn find_for_holder_on(
        &self,
        holder_id: UserId,
        date: NaiveDate,
    ) -> RepoResult<Option<Reservation>> {
        SqlLedger { conn: self.conn }.find_for_holder_on(holder_id, date)
    }
}

impl LedgerStore for SqliteLedgerStore<'_> {
    fn write<T, E, F>(&self, op: F) -> Result<T, E>
    where
        F: FnOnce(&dyn LedgerWrite) -> Result<T, E>,
        E: From<RepoError>,
    {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)
            .map_err(RepoError::from)?;
        // Dropping `tx` on the error path rolls back.
        let value = op(&SqlLedger { conn: &tx })?;
        tx.commit().map_err(RepoError::from)?;
        Ok(value)
    }

    fn list_in_exchange(&self) -> RepoResult<Vec<Reservation>> {
        self.query_list(
            "WHERE in_exchange = 1 ORDER BY date ASC, created_at ASC, rowid ASC;",
            Vec::new(),
        )
    }

    fn list_on_date(&self, date: NaiveDate) -> RepoResult<Vec<Reservation>> {
        self.query_list(
            "WHERE date = ? ORDER BY created_at ASC, rowid ASC;",
            vec![Value::Text(format_date(date))],
        )
    }

    fn list_in_month(&self, month: MonthKey) -> RepoResult<Vec<Reservation>> {
        self.query_list(
            "WHERE substr(date, 1, 8) = ? ORDER BY date ASC, rowid ASC;",
            vec![Value::Text(month.date_prefix())],
        )
    }

    fn list_for_holder(
        &self,
        holder_id: UserId,
        since: Option<NaiveDate>,
    ) -> RepoResult<Vec<Reservation>> {
        let mut filter = String::from("WHERE holder_id = ?");
        let mut bind_values = vec![Value::Text(holder_id.to_string())];
        if let Some(since) = since {
            filter.push_str(" AND date >= ?");
            bind_values.push(Value::Text(format_date(since)));
        }
        filter.push_str(" ORDER BY date ASC, rowid ASC;");
        self.query_list(&filter, bind_values)
    }
}

/// Statement-level ledger access over a plain connection or an open
/// transaction.
struct SqlLedger<'c> {
    conn: &'c Connection,
}

impl LedgerRead for SqlLedger<'_> {
    fn get_reservation(&self, id: ReservationId) -> RepoResult<Option<Reservation>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{RESERVATION_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_reservation_row(row)?));
        }
        Ok(None)
    }

    fn find_for_holder_on(
        &self,
        holder_id: UserId,
        date: NaiveDate,
    ) -> RepoResult<Option<Reservation>> {
        let mut stmt = self.conn.prepare(&format!(
            "{RESERVATION_SELECT_SQL}
             WHERE holder_id = ?1
               AND date = ?2
             ORDER BY created_at ASC, rowid ASC
             LIMIT 1;"
        ))?;
        let mut rows = stmt.query(params![holder_id.to_string(), format_date(date)])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_reservation_row(row)?));
        }
        Ok(None)
    }
}

impl LedgerWrite for SqlLedger<'_> {
    fn insert_reservation(&self, reservation: &Reservation) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO reservations (
                id,
                holder_id,
                meal_id,
                date,
                in_exchange
            ) VALUES (?1, ?2, ?3, ?4, ?5);",
            params![
                reservation.id.to_string(),
                reservation.holder_id.to_string(),
                reservation.meal_id.to_string(),
                format_date(reservation.date),
                bool_to_int(reservation.in_exchange),
            ],
        )?;
        Ok(())
    }

    fn update_reservation(&self, reservation: &Reservation) -> RepoResult<()> {
        // `date` is immutable after creation and deliberately not written.
        let changed = self.conn.execute(
            "UPDATE reservations
             SET
                holder_id = ?1,
                meal_id = ?2,
                in_exchange = ?3,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE id = ?4;",
            params![
                reservation.holder_id.to_string(),
                reservation.meal_id.to_string(),
                bool_to_int(reservation.in_exchange),
                reservation.id.to_string(),
            ],
        )?;

        if changed == 0 {
            return Err(RepoError::NotFound(reservation.id));
        }
        Ok(())
    }

    fn delete_reservation(&self, id: ReservationId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM reservations WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

fn parse_reservation_row(row: &Row<'_>) -> RepoResult<Reservation> {
    let id_text: String = row.get("id")?;
    let holder_text: String = row.get("holder_id")?;
    let meal_text: String = row.get("meal_id")?;
    let date_text: String = row.get("date")?;

    let in_exchange = match row.get::<_, i64>("in_exchange")? {
        0 => false,
        1 => true,
        other => {
            return Err(RepoError::InvalidData(format!(
                "invalid in_exchange value `{other}` in reservations.in_exchange"
            )));
        }
    };

    Ok(Reservation {
        id: parse_uuid(&id_text, "reservations.id")?,
        holder_id: parse_uuid(&holder_text, "reservations.holder_id")?,
        meal_id: parse_uuid(&meal_text, "reservations.meal_id")?,
        date: parse_stored_date(&date_text, "reservations.date")?,
        in_exchange,
    })
}

fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}
