//! Driving port for user lookups and the paginated user list.

use async_trait::async_trait;
use pagination::{Page, PageRequest};

use crate::domain::{Error, User, UserId};

/// Filter and paging for the user list.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserListQuery {
    page: PageRequest,
    search: Option<String>,
}

impl UserListQuery {
    /// Build a query; blank search phrases are treated as absent.
    ///
    /// # Examples
    /// ```
    /// use accounts::domain::ports::UserListQuery;
    /// use pagination::PageRequest;
    ///
    /// let query = UserListQuery::new(PageRequest::default(), Some("  ".to_owned()));
    /// assert_eq!(query.search(), None);
    /// ```
    pub fn new(page: PageRequest, search: Option<String>) -> Self {
        let search = search
            .map(|phrase| phrase.trim().to_owned())
            .filter(|phrase| !phrase.is_empty());
        Self { page, search }
    }

    pub fn page(&self) -> PageRequest {
        self.page
    }

    pub fn search(&self) -> Option<&str> {
        self.search.as_deref()
    }
}

/// Domain use-case port for reading users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UsersQuery: Send + Sync {
    /// Fetch a single user, returning `None` when it does not exist.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, Error>;

    /// Return one page of users matching the query, ordered by id.
    async fn list_users(&self, query: &UserListQuery) -> Result<Page<User>, Error>;
}
