//! Menu items as supplied by the menu collaborator.
//!
//! The ledger never mutates these records; it only copies `date` into new
//! reservations and ranks a day's items by `seq` for choice numbers.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type MealId = Uuid;

/// One dish offered on one calendar date.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuItem {
    pub id: MealId,
    pub date: NaiveDate,
    pub name: String,
    pub price: Option<f64>,
    /// Creation sequence assigned by storage; `0` until persisted.
    pub seq: i64,
}

impl MenuItem {
    pub fn new(date: NaiveDate, name: impl Into<String>, price: Option<f64>) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            name: name.into(),
            price,
            seq: 0,
        }
    }
}

/// 1-based rank of a meal among all meals offered on its date.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Choice {
    pub meal_id: MealId,
    pub number: u32,
    pub name: String,
}

/// Assigns choice numbers to one date's meals by creation sequence.
///
/// Input order does not matter; ties on `seq` keep their input order.
pub fn assign_choice_numbers(meals: &[MenuItem]) -> Vec<Choice> {
    let mut ordered: Vec<&MenuItem> = meals.iter().collect();
    ordered.sort_by_key(|meal| meal.seq);
    ordered
        .into_iter()
        .zip(1u32..)
        .map(|(meal, number)| Choice {
            meal_id: meal.id,
            number,
            name: meal.name.clone(),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::{assign_choice_numbers, MenuItem};
    use chrono::NaiveDate;

    #[test]
    fn choice_numbers_follow_creation_sequence_not_slice_order() {
        let date = NaiveDate::from_ymd_opt(2025, 3, 10).expect("valid date");
        let mut soup = MenuItem::new(date, "Soup", None);
        soup.seq = 4;
        let mut goulash = MenuItem::new(date, "Goulash", Some(110.0));
        goulash.seq = 9;

        let choices = assign_choice_numbers(&[goulash.clone(), soup.clone()]);

        assert_eq!(choices.len(), 2);
        assert_eq!(choices[0].meal_id, soup.id);
        assert_eq!(choices[0].number, 1);
        assert_eq!(choices[1].meal_id, goulash.id);
        assert_eq!(choices[1].number, 2);
    }

    #[test]
    fn empty_menu_has_no_choices() {
        assert!(assign_choice_numbers(&[]).is_empty());
    }
}
