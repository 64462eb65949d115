//! Builders wiring user repositories and adapters into HTTP state.

use std::sync::Arc;

use actix_web::web;
use tracing::info;

use accounts::domain::UserService;
use accounts::domain::ports::UserRepository;
use accounts::inbound::http::state::{HttpState, HttpStatePorts};
use accounts::outbound::avatars::FilesystemAvatarStore;
use accounts::outbound::memory::InMemoryUserRepository;
use accounts::outbound::password::Argon2PasswordHasher;
use accounts::outbound::persistence::DieselUserRepository;

use super::ServerConfig;

/// Expose one [`UserService`] through every driving port the handlers use.
fn ports_for<R>(
    repo: Arc<R>,
    avatars: Arc<FilesystemAvatarStore>,
    hasher: Arc<Argon2PasswordHasher>,
) -> HttpStatePorts
where
    R: UserRepository + 'static,
{
    let service = Arc::new(UserService::new(repo, avatars, hasher));
    HttpStatePorts {
        login: service.clone(),
        users: service.clone(),
        commands: service.clone(),
        avatars: service,
    }
}

/// Build HTTP state from configuration.
///
/// Users live in PostgreSQL when a pool is configured and in process memory
/// otherwise.
///
/// # Errors
/// Returns [`std::io::Error`] when the avatar directory cannot be opened.
pub(super) fn build_http_state(config: &ServerConfig) -> std::io::Result<web::Data<HttpState>> {
    let avatars = Arc::new(FilesystemAvatarStore::open(
        &config.avatars.dir,
        config.avatars.public_prefix.clone(),
    )?);
    let hasher = Arc::new(Argon2PasswordHasher::default());

    let ports = match &config.db_pool {
        Some(pool) => {
            info!("using PostgreSQL user repository");
            ports_for(
                Arc::new(DieselUserRepository::new(pool.clone())),
                avatars,
                hasher,
            )
        }
        None => {
            info!("no database configured; users are kept in memory");
            ports_for(Arc::new(InMemoryUserRepository::default()), avatars, hasher)
        }
    };

    Ok(web::Data::new(
        HttpState::new(ports).with_avatar_max_bytes(config.avatars.max_bytes),
    ))
}
