//! Application settings loaded via OrthoConfig.
//!
//! Every field can be set through a `WIES_` environment variable, for example
//! `WIES_DATABASE_URL` or `WIES_ALLOWED_EMAIL_DOMAINS`.

use std::net::SocketAddr;

use ortho_config::OrthoConfig;
use serde::Deserialize;

use crate::domain::AllowedEmailDomains;

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
const DEFAULT_DATABASE_URL: &str = "wies.sqlite3";
const DEFAULT_POOL_SIZE: u32 = 10;

/// Errors raised while interpreting settings.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    /// The bind address is not `host:port`.
    #[error("invalid bind address {value:?}: {message}")]
    BindAddr {
        /// Supplied bind address.
        value: String,
        /// Parse error details.
        message: String,
    },
}

/// Server and management settings.
#[derive(Debug, Clone, Default, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WIES")]
pub struct AppSettings {
    /// Address the HTTP server listens on.
    pub bind_addr: Option<String>,
    /// Path of the SQLite database file.
    pub database_url: Option<String>,
    /// Maximum pooled connections.
    pub pool_size: Option<u32>,
    /// Comma-separated e-mail suffixes accepted for users, e.g.
    /// `@rijksoverheid.nl,@minbzk.nl`. Empty allows every domain.
    pub allowed_email_domains: Option<String>,
    /// Enable `POST /api/v1/login` by e-mail address.
    #[ortho_config(default = false)]
    pub dev_login: bool,
}

impl AppSettings {
    /// Configured bind address, or `0.0.0.0:8080`.
    ///
    /// # Errors
    /// Returns [`SettingsError::BindAddr`] when the value does not parse.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let raw = self.bind_addr.as_deref().unwrap_or(DEFAULT_BIND_ADDR);
        raw.parse().map_err(|err: std::net::AddrParseError| SettingsError::BindAddr {
            value: raw.to_owned(),
            message: err.to_string(),
        })
    }

    /// Configured database path, or `wies.sqlite3`.
    #[must_use]
    pub fn database_url(&self) -> &str {
        self.database_url.as_deref().unwrap_or(DEFAULT_DATABASE_URL)
    }

    /// Configured pool size, at least one.
    #[must_use]
    pub fn pool_size(&self) -> u32 {
        self.pool_size.unwrap_or(DEFAULT_POOL_SIZE).max(1)
    }

    /// Parsed e-mail allow list.
    #[must_use]
    pub fn allowed_email_domains(&self) -> AllowedEmailDomains {
        AllowedEmailDomains::parse(self.allowed_email_domains.as_deref().unwrap_or_default())
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
        "WIES_BIND_ADDR",
        "WIES_DATABASE_URL",
        "WIES_POOL_SIZE",
        "WIES_ALLOWED_EMAIL_DOMAINS",
        "WIES_DEV_LOGIN",
    ];

    fn load_from_empty_args() -> AppSettings {
        AppSettings::load_from_iter([OsString::from("wies")]).expect("config should load")
    }

    #[rstest]
    fn defaults_apply_when_unset() {
        let _guard = lock_env(VARS.map(|name| (name, None::<String>)));

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("default parses"),
            DEFAULT_BIND_ADDR.parse::<SocketAddr>().expect("literal")
        );
        assert_eq!(settings.database_url(), DEFAULT_DATABASE_URL);
        assert_eq!(settings.pool_size(), DEFAULT_POOL_SIZE);
        assert!(settings.allowed_email_domains().allows("iemand@example.com"));
        assert!(!settings.dev_login);
    }

    #[rstest]
    fn environment_overrides_are_respected() {
        let _guard = lock_env([
            ("WIES_BIND_ADDR", Some("127.0.0.1:9000".to_owned())),
            ("WIES_DATABASE_URL", Some("/data/wies.sqlite3".to_owned())),
            ("WIES_POOL_SIZE", Some("3".to_owned())),
            (
                "WIES_ALLOWED_EMAIL_DOMAINS",
                Some("@rijksoverheid.nl".to_owned()),
            ),
            ("WIES_DEV_LOGIN", Some("true".to_owned())),
        ]);

        let settings = load_from_empty_args();
        assert_eq!(
            settings.bind_addr().expect("valid address").port(),
            9000
        );
        assert_eq!(settings.database_url(), "/data/wies.sqlite3");
        assert_eq!(settings.pool_size(), 3);
        assert!(settings.allowed_email_domains().allows("jan@rijksoverheid.nl"));
        assert!(!settings.allowed_email_domains().allows("jan@example.com"));
        assert!(settings.dev_login);
    }

    #[rstest]
    #[case("localhost")]
    #[case("0.0.0.0")]
    fn malformed_bind_address_is_reported(#[case] raw: &str) {
        let settings = AppSettings {
            bind_addr: Some(raw.to_owned()),
            ..AppSettings::default()
        };
        assert!(matches!(
            settings.bind_addr(),
            Err(SettingsError::BindAddr { .. })
        ));
    }

    #[rstest]
    fn pool_size_is_never_zero() {
        let settings = AppSettings {
            pool_size: Some(0),
            ..AppSettings::default()
        };
        assert_eq!(settings.pool_size(), 1);
    }
}
