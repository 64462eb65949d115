//! In-memory user repository.
//!
//! Used when no database URL is configured and by HTTP tests. Honours the
//! same contract as the Diesel adapter: sequential ids starting at 1, unique
//! usernames, ascending id order, case-insensitive search on username and
//! email.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{UserListFilter, UserListing, UserPersistenceError, UserRepository};
use crate::domain::{NewUser, StoredUser, User, UserId};

#[derive(Default)]
struct State {
    last_id: i64,
    users: BTreeMap<UserId, StoredUser>,
}

/// Process-local [`UserRepository`] guarded by a mutex.
pub struct InMemoryUserRepository {
    state: Mutex<State>,
    clock: Arc<dyn Clock>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::new(Arc::new(DefaultClock))
    }
}

impl InMemoryUserRepository {
    /// Create an empty repository stamping records with `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            state: Mutex::new(State::default()),
            clock,
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, State>, UserPersistenceError> {
        self.state
            .lock()
            .map_err(|_| UserPersistenceError::query("in-memory user store poisoned"))
    }
}

fn matches_search(user: &User, needle: &str) -> bool {
    user.username().as_ref().to_lowercase().contains(needle)
        || user
            .email()
            .is_some_and(|email| email.as_ref().to_lowercase().contains(needle))
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut state = self.lock()?;
        let taken = state
            .users
            .values()
            .any(|stored| stored.user.username() == &user.username);
        if taken {
            return Err(UserPersistenceError::duplicate_username(
                user.username.as_ref(),
            ));
        }

        let next = state.last_id + 1;
        let id = UserId::new(next).map_err(|err| UserPersistenceError::query(err.to_string()))?;
        let created = User::new(
            id,
            user.username.clone(),
            user.email.clone(),
            user.role,
            self.clock.utc(),
        );
        state.last_id = next;
        state.users.insert(
            id,
            StoredUser {
                user: created.clone(),
                password_hash: user.password_hash.clone(),
            },
        );
        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let state = self.lock()?;
        Ok(state.users.get(&id).map(|stored| stored.user.clone()))
    }

    async fn find_by_username(
        &self,
        username: &str,
    ) -> Result<Option<StoredUser>, UserPersistenceError> {
        let state = self.lock()?;
        Ok(state
            .users
            .values()
            .find(|stored| stored.user.username().as_ref() == username)
            .cloned())
    }

    async fn update_avatar(
        &self,
        id: UserId,
        avatar_url: &str,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut state = self.lock()?;
        let Some(stored) = state.users.get_mut(&id) else {
            return Ok(None);
        };
        stored.user = stored
            .user
            .clone()
            .with_avatar_url(Some(avatar_url.to_owned()));
        Ok(Some(stored.user.clone()))
    }

    async fn list(&self, filter: &UserListFilter) -> Result<UserListing, UserPersistenceError> {
        let state = self.lock()?;
        let needle = filter.search.as_deref().map(str::to_lowercase);
        let matching: Vec<&User> = state
            .users
            .values()
            .map(|stored| &stored.user)
            .filter(|user| needle.as_deref().is_none_or(|n| matches_search(user, n)))
            .collect();

        let total = u64::try_from(matching.len()).unwrap_or(u64::MAX);
        let skip = usize::try_from(filter.offset).unwrap_or(usize::MAX);
        let take = filter
            .limit
            .map_or(usize::MAX, |limit| usize::try_from(limit).unwrap_or(usize::MAX));
        let rows = matching.into_iter().skip(skip).take(take).cloned().collect();
        Ok(UserListing { rows, total })
    }
}
