//! Shared HTTP adapter state.
//!
//! Handlers accept this state via `actix_web::web::Data` so they only depend
//! on the driving ports and stay testable without I/O.

use std::sync::Arc;

use crate::domain::DEFAULT_AVATAR_MAX_BYTES;
use crate::domain::ports::{AvatarUpload, LoginService, UserCommand, UsersQuery};

/// Port implementations used by the user handlers.
#[derive(Clone)]
pub struct HttpStatePorts {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub commands: Arc<dyn UserCommand>,
    pub avatars: Arc<dyn AvatarUpload>,
}

/// Dependency bundle for HTTP handlers.
#[derive(Clone)]
pub struct HttpState {
    pub login: Arc<dyn LoginService>,
    pub users: Arc<dyn UsersQuery>,
    pub commands: Arc<dyn UserCommand>,
    pub avatars: Arc<dyn AvatarUpload>,
    /// Upper bound for an uploaded avatar in bytes.
    pub avatar_max_bytes: usize,
}

impl From<HttpStatePorts> for HttpState {
    fn from(ports: HttpStatePorts) -> Self {
        Self::new(ports)
    }
}

impl HttpState {
    /// Construct state with the default avatar size limit.
    pub fn new(ports: HttpStatePorts) -> Self {
        let HttpStatePorts {
            login,
            users,
            commands,
            avatars,
        } = ports;
        Self {
            login,
            users,
            commands,
            avatars,
            avatar_max_bytes: DEFAULT_AVATAR_MAX_BYTES,
        }
    }

    /// Override the avatar size limit.
    #[must_use]
    pub fn with_avatar_max_bytes(mut self, max_bytes: usize) -> Self {
        self.avatar_max_bytes = max_bytes;
        self
    }
}
