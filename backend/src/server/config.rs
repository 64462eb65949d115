//! HTTP server configuration object and helpers.

use accounts::domain::DEFAULT_AVATAR_MAX_BYTES;
use accounts::inbound::http::session_config::SessionSettings;
use accounts::outbound::persistence::DbPool;
use std::net::SocketAddr;
use std::path::PathBuf;

#[cfg(feature = "metrics")]
use actix_web_prom::PrometheusMetrics;

const DEFAULT_AVATAR_PUBLIC_PREFIX: &str = "/avatars";

/// Where and how uploaded avatars are stored.
#[derive(Debug, Clone)]
pub struct AvatarConfig {
    pub(crate) dir: PathBuf,
    pub(crate) public_prefix: String,
    pub(crate) max_bytes: usize,
}

impl AvatarConfig {
    /// Store avatars under `dir` with the default prefix and size limit.
    #[must_use]
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            public_prefix: DEFAULT_AVATAR_PUBLIC_PREFIX.to_owned(),
            max_bytes: DEFAULT_AVATAR_MAX_BYTES,
        }
    }

    #[must_use]
    pub fn with_public_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.public_prefix = prefix.into();
        self
    }

    #[must_use]
    pub fn with_max_bytes(mut self, max_bytes: usize) -> Self {
        self.max_bytes = max_bytes;
        self
    }
}

/// Builder-style configuration for creating the HTTP server.
pub struct ServerConfig {
    pub(crate) session: SessionSettings,
    pub(crate) bind_addr: SocketAddr,
    pub(crate) avatars: AvatarConfig,
    pub(crate) db_pool: Option<DbPool>,
    #[cfg(feature = "metrics")]
    pub(crate) prometheus: Option<PrometheusMetrics>,
}

impl ServerConfig {
    /// Construct a server configuration from resolved session settings.
    #[must_use]
    pub fn new(session: SessionSettings, bind_addr: SocketAddr, avatars: AvatarConfig) -> Self {
        Self {
            session,
            bind_addr,
            avatars,
            db_pool: None,
            #[cfg(feature = "metrics")]
            prometheus: None,
        }
    }

    /// Attach a database connection pool.
    ///
    /// Without a pool the server keeps users in process memory.
    #[must_use]
    pub fn with_db_pool(mut self, pool: DbPool) -> Self {
        self.db_pool = Some(pool);
        self
    }

    #[cfg(feature = "metrics")]
    /// Attach Prometheus middleware to the configuration.
    #[must_use]
    pub fn with_metrics(mut self, prometheus: Option<PrometheusMetrics>) -> Self {
        self.prometheus = prometheus;
        self
    }
}
