#![allow(dead_code)]

use canteen_core::repo::ledger_repo::LedgerRead;
use canteen_core::{
    Caller, FixedClock, LedgerStore, MenuItem, OrderService, Reservation, Role, SqliteLedgerStore,
    SqliteMenuCatalog, SqliteUserDirectory, User,
};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::Connection;

pub type TestOrders<'c> =
    OrderService<SqliteLedgerStore<'c>, SqliteMenuCatalog<'c>, &'c FixedClock>;

pub fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

pub fn at(year: i32, month: u32, day: u32, hour: u32, minute: u32) -> NaiveDateTime {
    date(year, month, day).and_hms_opt(hour, minute, 0).unwrap()
}

pub fn add_user(conn: &Connection, login: &str, last_name: &str, role: Role) -> User {
    let user = User::new(login, role)
        .with_name(login.to_uppercase(), last_name)
        .with_personal_number(format!("PN-{login}"));
    SqliteUserDirectory::new(conn).add_user(&user).unwrap();
    user
}

pub fn add_employee(conn: &Connection, login: &str, last_name: &str) -> Caller {
    let user = add_user(conn, login, last_name, Role::Employee);
    Caller::new(user.id, user.role)
}

pub fn add_meal(conn: &Connection, on: NaiveDate, name: &str) -> MenuItem {
    SqliteMenuCatalog::new(conn)
        .add_meal(&MenuItem::new(on, name, Some(95.0)))
        .unwrap()
}

pub fn orders<'c>(conn: &'c Connection, clock: &'c FixedClock) -> TestOrders<'c> {
    OrderService::new(
        SqliteLedgerStore::new(conn),
        SqliteMenuCatalog::new(conn),
        clock,
    )
}

/// Writes a record straight into the ledger, bypassing lifecycle checks.
pub fn insert_raw(conn: &Connection, reservation: &Reservation) {
    SqliteLedgerStore::new(conn)
        .write(|ledger| ledger.insert_reservation(reservation))
        .unwrap();
}

pub fn stored(conn: &Connection, reservation: &Reservation) -> Option<Reservation> {
    SqliteLedgerStore::new(conn)
        .get_reservation(reservation.id)
        .unwrap()
}
