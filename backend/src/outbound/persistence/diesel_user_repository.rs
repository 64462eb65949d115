//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Usernames are protected by the `users_username_key` unique constraint; a
//! violation of that constraint is reported as
//! [`UserPersistenceError::DuplicateUsername`] so callers can answer with a
//! failure envelope instead of a server error.

use async_trait::async_trait;
use diesel::pg::Pg;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::RunQueryDsl;
use tracing::debug;

use crate::domain::ports::{UserListFilter, UserListing, UserPersistenceError, UserRepository};
use crate::domain::{NewUser, StoredUser, User, UserId};

use super::models::{NewUserRow, UserRow};
use super::pool::{DbPool, PoolError};
use super::schema::users;

const USERNAME_CONSTRAINT: &str = "users_username_key";

/// Diesel-backed implementation of the `UserRepository` port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.into_message())
}

/// Map Diesel errors to user persistence errors.
///
/// `username` is the value being written, used to describe unique
/// violations on the username constraint.
fn map_diesel_error(error: DieselError, username: Option<&str>) -> UserPersistenceError {
    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        _ => debug!(
            error_type = %std::any::type_name_of_val(&error),
            "diesel operation failed"
        ),
    }

    match error {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info)
            if info.constraint_name() == Some(USERNAME_CONSTRAINT) =>
        {
            UserPersistenceError::duplicate_username(username.unwrap_or_default())
        }
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, _) => {
            UserPersistenceError::connection("database connection error")
        }
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        _ => UserPersistenceError::query("database error"),
    }
}

/// Escape `LIKE` metacharacters and wrap the needle in wildcards.
fn like_pattern(search: &str) -> String {
    let mut pattern = String::with_capacity(search.len() + 2);
    pattern.push('%');
    for ch in search.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(ch);
    }
    pattern.push('%');
    pattern
}

fn filtered(search: Option<&str>) -> users::BoxedQuery<'static, Pg> {
    let query = users::table.into_boxed();
    match search {
        Some(needle) => {
            let pattern = like_pattern(needle);
            query.filter(
                users::username
                    .ilike(pattern.clone())
                    .or(users::email.ilike(pattern)),
            )
        }
        None => query,
    }
}

fn to_i64(value: u64, what: &str) -> Result<i64, UserPersistenceError> {
    i64::try_from(value).map_err(|_| UserPersistenceError::query(format!("{what} out of range")))
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = NewUserRow {
            username: user.username.as_ref(),
            email: user.email.as_ref().map(AsRef::as_ref),
            password_hash: user.password_hash.as_str(),
            role: user.role.as_str(),
        };

        diesel::insert_into(users::table)
            .values(&row)
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, Some(user.username.as_ref())))?
            .into_user()
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?
            .map(UserRow::into_user)
            .transpose()
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        users::table
            .filter(users::username.eq(username))
            .select(UserRow::as_select())
            .first::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?
            .map(UserRow::into_stored)
            .transpose()
    }

    async fn update_avatar(
        &self,
        id: UserId,
        avatar_url: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        diesel::update(users::table.find(id.get()))
            .set(users::avatar_url.eq(avatar_url))
            .returning(UserRow::as_returning())
            .get_result::<UserRow>(&mut conn)
            .await
            .optional()
            .map_err(|err| map_diesel_error(err, None))?
            .map(UserRow::into_user)
            .transpose()
    }

    async fn list(&self, filter: &UserListFilter) -> Result<UserListing, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let search = filter.search.as_deref();

        let total: i64 = filtered(search)
            .count()
            .get_result(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?;

        let mut query = filtered(search)
            .select(UserRow::as_select())
            .order(users::id.asc())
            .offset(to_i64(filter.offset, "offset")?);
        if let Some(limit) = filter.limit {
            query = query.limit(i64::from(limit));
        }
        let rows = query
            .load::<UserRow>(&mut conn)
            .await
            .map_err(|err| map_diesel_error(err, None))?
            .into_iter()
            .map(UserRow::into_user)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(UserListing {
            rows,
            total: u64::try_from(total).unwrap_or_default(),
        })
    }
}
