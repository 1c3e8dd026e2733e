//! Application settings loaded via OrthoConfig.
//!
//! Values come from `WORKFLOW_*` environment variables, an optional
//! configuration file and command-line flags, in OrthoConfig's usual order
//! of precedence.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors raised while interpreting loaded settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not `host:port`.
    #[error("invalid bind address {value:?}: {message}")]
    InvalidBindAddr {
        /// Configured value.
        value: String,
        /// Parser complaint.
        message: String,
    },
    /// A pool of zero connections can never serve a request.
    #[error("database pool size must be at least 1")]
    EmptyPool,
}

/// Runtime settings for the workflow server.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WORKFLOW")]
pub struct AppSettings {
    /// PostgreSQL connection string. Without it records live in memory.
    pub database_url: Option<String>,
    /// Socket address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// Upper bound on pooled database connections.
    pub db_pool_size: Option<u32>,
    /// Seed demo accounts and a sample contract into an empty store.
    #[ortho_config(default = false)]
    pub seed_demo_data: bool,
    /// Create officer accounts for unknown emails at sign-in.
    #[ortho_config(default = false)]
    pub auto_provision: bool,
}

impl AppSettings {
    /// The configured listen address, falling back to all interfaces on 8080.
    ///
    /// # Errors
    /// Returns [`SettingsError::InvalidBindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| {
            SettingsError::InvalidBindAddr {
                value: raw.to_owned(),
                message: err.to_string(),
            }
        })
    }

    /// The configured pool size, defaulting to ten connections.
    ///
    /// # Errors
    /// Returns [`SettingsError::EmptyPool`] for zero.
    pub fn db_pool_size(&self) -> Result<u32, SettingsError> {
        match self.db_pool_size.unwrap_or(DEFAULT_POOL_SIZE) {
            0 => Err(SettingsError::EmptyPool),
            size => Ok(size),
        }
    }

    /// The database URL, ignoring blank values.
    #[must_use]
    pub fn database_url(&self) -> Option<&str> {
        self.database_url
            .as_deref()
            .map(str::trim)
            .filter(|url| !url.is_empty())
    }
}

#[cfg(test)]
mod tests {
    //! Unit tests for settings parsing.

    use super::*;
    use std::ffi::OsString;

    use env_lock::lock_env;
    use rstest::rstest;

    const VARS: [&str; 5] = [
        "WORKFLOW_DATABASE_URL",
        "WORKFLOW_BIND_ADDR",
        "WORKFLOW_DB_POOL_SIZE",
        "WORKFLOW_SEED_DEMO_DATA",
        "WORKFLOW_AUTO_PROVISION",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("contract-workflow")])
            .expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert!(settings.database_url().is_none());
        assert_eq!(
            settings.bind_addr(),
            Ok(SocketAddr::from(([0, 0, 0, 0], 8080)))
        );
        assert_eq!(settings.db_pool_size(), Ok(DEFAULT_POOL_SIZE));
        assert!(!settings.seed_demo_data);
        assert!(!settings.auto_provision);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            (
                "WORKFLOW_DATABASE_URL",
                Some("postgres://workflow@localhost/workflow".to_owned()),
            ),
            ("WORKFLOW_BIND_ADDR", Some("127.0.0.1:9090".to_owned())),
            ("WORKFLOW_DB_POOL_SIZE", Some("4".to_owned())),
            ("WORKFLOW_SEED_DEMO_DATA", Some("true".to_owned())),
            ("WORKFLOW_AUTO_PROVISION", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.database_url(),
            Some("postgres://workflow@localhost/workflow")
        );
        assert_eq!(
            settings.bind_addr(),
            Ok(SocketAddr::from(([127, 0, 0, 1], 9090)))
        );
        assert_eq!(settings.db_pool_size(), Ok(4));
        assert!(settings.seed_demo_data);
        assert!(settings.auto_provision);
    }

    #[rstest]
    #[case(Some("nowhere"), None, true, false)]
    #[case(None, Some(0), false, true)]
    fn invalid_values_are_reported(
        #[case] bind_addr: Option<&str>,
        #[case] pool_size: Option<u32>,
        #[case] bad_addr: bool,
        #[case] bad_pool: bool,
    ) {
        let settings = AppSettings {
            database_url: Some("   ".to_owned()),
            bind_addr: bind_addr.map(str::to_owned),
            db_pool_size: pool_size,
            seed_demo_data: false,
            auto_provision: false,
        };
        assert!(settings.database_url().is_none());
        assert_eq!(settings.bind_addr().is_err(), bad_addr);
        assert_eq!(settings.db_pool_size().is_err(), bad_pool);
    }
}
