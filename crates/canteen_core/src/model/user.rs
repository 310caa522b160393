//! User records as supplied by the user directory collaborator.

use crate::model::role::Role;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub type UserId = Uuid;

/// Directory entry joined into reports.
///
/// Names default to empty strings; the directory does not require them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: UserId,
    pub login: String,
    pub first_name: String,
    pub last_name: String,
    pub personal_number: Option<String>,
    pub role: Role,
}

impl User {
    pub fn new(login: impl Into<String>, role: Role) -> Self {
        Self {
            id: Uuid::new_v4(),
            login: login.into(),
            first_name: String::new(),
            last_name: String::new(),
            personal_number: None,
            role,
        }
    }

    pub fn with_name(mut self, first_name: impl Into<String>, last_name: impl Into<String>) -> Self {
        self.first_name = first_name.into();
        self.last_name = last_name.into();
        self
    }

    pub fn with_personal_number(mut self, personal_number: impl Into<String>) -> Self {
        self.personal_number = Some(personal_number.into());
        self
    }
}
