//! Service settings loaded via OrthoConfig.
//!
//! Values layer CLI flags over `ACCOUNTS_*` environment variables over
//! defaults, so `ACCOUNTS_DATABASE_URL` switches persistence to PostgreSQL.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::DEFAULT_AVATAR_MAX_BYTES;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_AVATAR_DIR: &str = "avatars";
const DEFAULT_AVATAR_PUBLIC_PREFIX: &str = "/avatars";

/// Runtime settings for the accounts service.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "ACCOUNTS")]
pub struct AppSettings {
    /// Socket address to listen on.
    #[ortho_config(default = String::from(DEFAULT_BIND_ADDR))]
    pub bind_addr: String,
    /// PostgreSQL connection URL; the in-memory store is used when absent.
    pub database_url: Option<String>,
    /// Directory receiving uploaded avatars.
    #[ortho_config(default = PathBuf::from(DEFAULT_AVATAR_DIR))]
    pub avatar_dir: PathBuf,
    /// URL prefix under which stored avatars are published.
    #[ortho_config(default = String::from(DEFAULT_AVATAR_PUBLIC_PREFIX))]
    pub avatar_public_prefix: String,
    /// Largest accepted avatar upload in bytes.
    #[ortho_config(default = DEFAULT_AVATAR_MAX_BYTES)]
    pub avatar_max_bytes: usize,
}

/// Settings that cannot be turned into a runnable configuration.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("invalid bind address `{value}`: {source}")]
    BindAddr {
        value: String,
        #[source]
        source: std::net::AddrParseError,
    },
    #[error("avatar size limit must be positive")]
    ZeroAvatarLimit,
}

impl AppSettings {
    /// Parsed listen address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        self.bind_addr
            .trim()
            .parse()
            .map_err(|source| SettingsError::BindAddr {
                value: self.bind_addr.clone(),
                source,
            })
    }

    /// Database URL, ignoring blank values.
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }

    pub fn avatar_dir(&self) -> &Path {
        &self.avatar_dir
    }

    pub fn avatar_public_prefix(&self) -> &str {
        &self.avatar_public_prefix
    }

    pub fn avatar_max_bytes(&self) -> Result<usize, SettingsError> {
        match self.avatar_max_bytes {
            0 => Err(SettingsError::ZeroAvatarLimit),
            limit => Ok(limit),
        }
    }
}

#[cfg(test)]
mod tests {
    //! Settings loading from the process environment.

    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    use super::*;

    const VARS: [&str; 5] = [
        "ACCOUNTS_BIND_ADDR",
        "ACCOUNTS_DATABASE_URL",
        "ACCOUNTS_AVATAR_DIR",
        "ACCOUNTS_AVATAR_PUBLIC_PREFIX",
        "ACCOUNTS_AVATAR_MAX_BYTES",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("accounts")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default address"),
            SocketAddr::from(([0, 0, 0, 0], 8080))
        );
        assert!(settings.database_url().is_none());
        assert_eq!(settings.avatar_dir(), Path::new(DEFAULT_AVATAR_DIR));
        assert_eq!(settings.avatar_public_prefix(), "/avatars");
        assert_eq!(
            settings.avatar_max_bytes().expect("default limit"),
            DEFAULT_AVATAR_MAX_BYTES
        );
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("ACCOUNTS_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            (
                "ACCOUNTS_DATABASE_URL",
                Some("postgres://accounts@localhost/accounts".to_owned()),
            ),
            ("ACCOUNTS_AVATAR_DIR", Some("/srv/avatars".to_owned())),
            ("ACCOUNTS_AVATAR_PUBLIC_PREFIX", Some("/static/avatars".to_owned())),
            ("ACCOUNTS_AVATAR_MAX_BYTES", Some("1024".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("address"),
            SocketAddr::from(([127, 0, 0, 1], 9090))
        );
        assert_eq!(
            settings.database_url(),
            Some("postgres://accounts@localhost/accounts")
        );
        assert_eq!(settings.avatar_dir(), Path::new("/srv/avatars"));
        assert_eq!(settings.avatar_public_prefix(), "/static/avatars");
        assert_eq!(settings.avatar_max_bytes().expect("limit"), 1024);
    }

    #[rstest]
    fn invalid_values_are_reported() {
        let _guard = lock_env([
            ("ACCOUNTS_BIND_ADDR", Some("not-an-address".to_owned())),
            ("ACCOUNTS_DATABASE_URL", Some("   ".to_owned())),
            ("ACCOUNTS_AVATAR_DIR", None),
            ("ACCOUNTS_AVATAR_PUBLIC_PREFIX", None),
            ("ACCOUNTS_AVATAR_MAX_BYTES", Some("0".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
        assert!(settings.database_url().is_none());
        assert!(matches!(
            settings.avatar_max_bytes(),
            Err(SettingsError::ZeroAvatarLimit)
        ));
    }
}
