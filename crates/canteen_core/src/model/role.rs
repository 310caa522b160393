//! Caller roles supplied by the identity provider.
//!
//! Ordering and the exchange are open to every role; administrators eat in
//! the canteen too. Only reports are gated.

use crate::model::user::UserId;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Authorization role attached to every authenticated caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Employee,
    AdminUser,
    AdminMeal,
}

/// Stored/wire value for the employee role.
pub const ROLE_EMPLOYEE: &str = "EMPLOYEE";
/// Stored/wire value for the user administrator role.
pub const ROLE_ADMIN_USER: &str = "ADMIN_USER";
/// Stored/wire value for the menu administrator role.
pub const ROLE_ADMIN_MEAL: &str = "ADMIN_MEAL";

impl Role {
    /// Stable string id used in storage and by the identity provider.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Employee => ROLE_EMPLOYEE,
            Self::AdminUser => ROLE_ADMIN_USER,
            Self::AdminMeal => ROLE_ADMIN_MEAL,
        }
    }

    /// Daily export and per-user history.
    pub fn may_read_daily_reports(self) -> bool {
        matches!(self, Self::AdminUser | Self::AdminMeal)
    }

    /// Monthly payroll summary.
    pub fn may_read_payroll(self) -> bool {
        matches!(self, Self::AdminUser)
    }
}

impl Display for Role {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Parses one role from its stored string value. Matching is exact.
pub fn parse_role(value: &str) -> Result<Role, RoleError> {
    let normalized = value.trim();
    if normalized.is_empty() {
        return Err(RoleError::EmptyRole);
    }

    match normalized {
        ROLE_EMPLOYEE => Ok(Role::Employee),
        ROLE_ADMIN_USER => Ok(Role::AdminUser),
        ROLE_ADMIN_MEAL => Ok(Role::AdminMeal),
        other => Err(RoleError::UnsupportedRole(other.to_string())),
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RoleError {
    EmptyRole,
    UnsupportedRole(String),
}

impl Display for RoleError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyRole => write!(f, "role value must not be empty"),
            Self::UnsupportedRole(value) => write!(f, "role is unsupported: {value}"),
        }
    }
}

impl Error for RoleError {}

/// Authenticated identity attached to one request.
///
/// The core trusts this value as handed over by the identity provider.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caller {
    pub user_id: UserId,
    pub role: Role,
}

impl Caller {
    pub fn new(user_id: UserId, role: Role) -> Self {
        Self { user_id, role }
    }
}
