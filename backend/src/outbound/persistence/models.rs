//! Internal Diesel row structs for the users table.
//!
//! These types never leave the persistence layer; conversions into domain
//! types re-validate every column.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::ports::UserPersistenceError;
use crate::domain::{Email, StoredUser, User, UserId, Username};

use super::schema::users;

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub username: String,
    pub email: Option<String>,
    pub password_hash: String,
    pub role: String,
    pub avatar_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub username: &'a str,
    pub email: Option<&'a str>,
    pub password_hash: &'a str,
    pub role: &'a str,
}

fn corrupt(column: &str, err: impl std::fmt::Display) -> UserPersistenceError {
    UserPersistenceError::query(format!("invalid {column} in database: {err}"))
}

impl UserRow {
    /// Convert into the public user, dropping the password hash.
    pub fn into_user(self) -> Result<User, UserPersistenceError> {
        self.into_stored().map(|stored| stored.user)
    }

    /// Convert into the user together with its password hash.
    pub fn into_stored(self) -> Result<StoredUser, UserPersistenceError> {
        let id = UserId::new(self.id).map_err(|err| corrupt("id", err))?;
        let username = Username::new(&self.username).map_err(|err| corrupt("username", err))?;
        let email = self
            .email
            .as_deref()
            .map(Email::new)
            .transpose()
            .map_err(|err| corrupt("email", err))?;
        let role = self.role.parse().map_err(|err| corrupt("role", err))?;
        let user = User::new(id, username, email, role, self.created_at)
            .with_avatar_url(self.avatar_url);
        Ok(StoredUser {
            user,
            password_hash: self.password_hash,
        })
    }
}
