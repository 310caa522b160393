//! CSV documents for spreadsheet import.
//!
//! # Invariants
//! - Documents start with a UTF-8 BOM and use `;` as the field delimiter.
//! - A field is quoted only when it contains `;`, `"`, CR or LF; embedded
//!   quotes are doubled.
//! - Lines are joined with `\n`; there is no trailing line break.
//! - A daily export for a date without any meal has an empty body.

use crate::model::calendar::{format_date, MonthKey};
use crate::model::menu::Choice;
use chrono::NaiveDate;
use serde::Serialize;
use std::borrow::Cow;

pub const UTF8_BOM: &str = "\u{feff}";
pub const CSV_CONTENT_TYPE: &str = "text/csv; charset=utf-8";
pub const CSV_DELIMITER: char = ';';

pub const DAILY_EXPORT_HEADER: [&str; 5] = [
    "Choice Number",
    "Meal Name",
    "First Name",
    "Last Name",
    "Personal Number",
];
pub const MONTHLY_EXPORT_HEADER: [&str; 5] = [
    "Personal Number",
    "Last Name",
    "First Name",
    "Login",
    "Meal Count",
];

/// Quotes `value` when it would otherwise break the row structure.
pub fn quote_field(value: &str) -> Cow<'_, str> {
    if value.contains([CSV_DELIMITER, '"', '\n', '\r']) {
        Cow::Owned(format!("\"{}\"", value.replace('"', "\"\"")))
    } else {
        Cow::Borrowed(value)
    }
}

fn render_line<'a>(fields: impl IntoIterator<Item = &'a str>) -> String {
    let delimiter = CSV_DELIMITER.to_string();
    fields
        .into_iter()
        .map(quote_field)
        .collect::<Vec<_>>()
        .join(delimiter.as_str())
}

fn render_document<'a>(header: &[&str], rows: impl Iterator<Item = Vec<Cow<'a, str>>>) -> String {
    let mut lines = vec![render_line(header.iter().copied())];
    lines.extend(rows.map(|row| render_line(row.iter().map(|field| &**field))));
    format!("{UTF8_BOM}{}", lines.join("\n"))
}

/// One kitchen row: who eats which choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyExportRow {
    pub choice_number: u32,
    pub meal_name: String,
    pub first_name: String,
    pub last_name: String,
    pub personal_number: String,
}

/// Kitchen export for one date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyExport {
    pub date: NaiveDate,
    /// The date's menu with choice numbers; empty when nothing was offered.
    pub choices: Vec<Choice>,
    /// Rows sorted by choice number, then surname.
    pub rows: Vec<DailyExportRow>,
}

impl DailyExport {
    pub fn file_name(&self) -> String {
        format!("orders_{}.csv", format_date(self.date))
    }

    pub fn render_csv(&self) -> String {
        if self.choices.is_empty() {
            return String::new();
        }
        render_document(
            &DAILY_EXPORT_HEADER,
            self.rows.iter().map(|row| {
                vec![
                    Cow::Owned(row.choice_number.to_string()),
                    Cow::Borrowed(row.meal_name.as_str()),
                    Cow::Borrowed(row.first_name.as_str()),
                    Cow::Borrowed(row.last_name.as_str()),
                    Cow::Borrowed(row.personal_number.as_str()),
                ]
            }),
        )
    }
}

/// Payroll row: how many meals one user is charged for in a month.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlySummaryRow {
    pub personal_number: String,
    pub last_name: String,
    pub first_name: String,
    pub login: String,
    pub count: u32,
}

/// Payroll summary for one closed month; every known user appears once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    pub month: MonthKey,
    pub rows: Vec<MonthlySummaryRow>,
}

impl MonthlyReport {
    pub fn file_name(&self) -> String {
        format!("meal_summary_{}.csv", self.month)
    }

    pub fn render_csv(&self) -> String {
        render_document(
            &MONTHLY_EXPORT_HEADER,
            self.rows.iter().map(|row| {
                vec![
                    Cow::Borrowed(row.personal_number.as_str()),
                    Cow::Borrowed(row.last_name.as_str()),
                    Cow::Borrowed(row.first_name.as_str()),
                    Cow::Borrowed(row.login.as_str()),
                    Cow::Owned(row.count.to_string()),
                ]
            }),
        )
    }

    /// Sum of all counts; one reservation is one chargeable meal.
    pub fn total_meals(&self) -> u32 {
        self.rows.iter().map(|row| row.count).sum()
    }
}
