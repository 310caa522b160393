//! Menu collaborator boundary and its SQLite stand-in.
//!
//! The ledger consumes menu items read-only through `MenuCatalog`. The
//! inherent `add_meal`/`delete_meal` methods exist so the store can be
//! populated the way the menu administration collaborator would.

use crate::model::calendar::format_date;
use crate::model::menu::{MealId, MenuItem};
use crate::repo::{parse_stored_date, parse_uuid, RepoError, RepoResult};
use chrono::NaiveDate;
use rusqlite::{params, Connection, Row};

const MEAL_SELECT_SQL: &str = "SELECT
    seq,
    id,
    date,
    name,
    price
FROM meals";

/// Read-only menu lookups.
pub trait MenuCatalog {
    fn get_meal(&self, id: MealId) -> RepoResult<Option<MenuItem>>;
    /// Meals offered on `date`, in creation order.
    fn list_meals_on(&self, date: NaiveDate) -> RepoResult<Vec<MenuItem>>;
}

pub struct SqliteMenuCatalog<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteMenuCatalog<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    /// Persists one menu item and returns it with its creation sequence.
    pub fn add_meal(&self, meal: &MenuItem) -> RepoResult<MenuItem> {
        self.conn.execute(
            "INSERT INTO meals (id, date, name, price) VALUES (?1, ?2, ?3, ?4);",
            params![
                meal.id.to_string(),
                format_date(meal.date),
                meal.name.as_str(),
                meal.price,
            ],
        )?;
        let mut stored = meal.clone();
        stored.seq = self.conn.last_insert_rowid();
        Ok(stored)
    }

    /// Removes a menu item. Reservations referencing it are left alone.
    pub fn delete_meal(&self, id: MealId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM meals WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }
}

impl MenuCatalog for SqliteMenuCatalog<'_> {
    fn get_meal(&self, id: MealId) -> RepoResult<Option<MenuItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEAL_SELECT_SQL} WHERE id = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_meal_row(row)?));
        }
        Ok(None)
    }

    fn list_meals_on(&self, date: NaiveDate) -> RepoResult<Vec<MenuItem>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEAL_SELECT_SQL} WHERE date = ?1 ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([format_date(date)])?;
        let mut meals = Vec::new();
        while let Some(row) = rows.next()? {
            meals.push(parse_meal_row(row)?);
        }
        Ok(meals)
    }
}

fn parse_meal_row(row: &Row<'_>) -> RepoResult<MenuItem> {
    let id_text: String = row.get("id")?;
    let date_text: String = row.get("date")?;
    Ok(MenuItem {
        id: parse_uuid(&id_text, "meals.id")?,
        date: parse_stored_date(&date_text, "meals.date")?,
        name: row.get("name")?,
        price: row.get("price")?,
        seq: row.get("seq")?,
    })
}
