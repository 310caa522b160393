//! User directory boundary and its SQLite stand-in.

use crate::model::role::parse_role;
use crate::model::user::{User, UserId};
use crate::repo::{parse_uuid, RepoError, RepoResult};
use rusqlite::{params, Connection, Row};

const USER_SELECT_SQL: &str = "SELECT
    id,
    login,
    first_name,
    last_name,
    personal_number,
    role
FROM users";

/// Read-only identity lookups used for report joins and caller resolution.
pub trait UserDirectory {
    fn find_by_login(&self, login: &str) -> RepoResult<Option<User>>;
    /// Every known user, in registration order.
    fn list_users(&self) -> RepoResult<Vec<User>>;
}

pub struct SqliteUserDirectory<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserDirectory<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }

    pub fn add_user(&self, user: &User) -> RepoResult<UserId> {
        self.conn.execute(
            "INSERT INTO users (
                id,
                login,
                first_name,
                last_name,
                personal_number,
                role
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                user.id.to_string(),
                user.login.as_str(),
                user.first_name.as_str(),
                user.last_name.as_str(),
                user.personal_number.as_deref(),
                user.role.as_str(),
            ],
        )?;
        Ok(user.id)
    }

    pub fn delete_user(&self, id: UserId) -> RepoResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM users WHERE id = ?1;", [id.to_string()])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn query_one(&self, filter_sql: &str, value: String) -> RepoResult<Option<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} {filter_sql}"))?;
        let mut rows = stmt.query([value])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_user_row(row)?));
        }
        Ok(None)
    }
}

impl UserDirectory for SqliteUserDirectory<'_> {
    fn find_by_login(&self, login: &str) -> RepoResult<Option<User>> {
        self.query_one("WHERE login = ?1;", login.trim().to_string())
    }

    fn list_users(&self) -> RepoResult<Vec<User>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY created_at ASC, rowid ASC;"))?;
        let mut rows = stmt.query([])?;
        let mut users = Vec::new();
        while let Some(row) = rows.next()? {
            users.push(parse_user_row(row)?);
        }
        Ok(users)
    }
}

fn parse_user_row(row: &Row<'_>) -> RepoResult<User> {
    let id_text: String = row.get("id")?;
    let role_text: String = row.get("role")?;
    let role = parse_role(&role_text).map_err(|err| {
        RepoError::InvalidData(format!("{err} in users.role"))
    })?;

    Ok(User {
        id: parse_uuid(&id_text, "users.id")?,
        login: row.get("login")?,
        first_name: row.get("first_name")?,
        last_name: row.get("last_name")?,
        personal_number: row.get("personal_number")?,
        role,
    })
}
