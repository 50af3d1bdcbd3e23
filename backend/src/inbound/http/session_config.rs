//! Session cookie settings read from the environment.
//!
//! Debug builds fall back to defaults with a warning; release builds insist
//! on explicit, valid values so a misconfigured deployment fails at start-up
//! instead of issuing weak cookies.

use std::path::PathBuf;

use actix_web::cookie::{Key, SameSite};
use mockable::Env;
use sha2::{Digest, Sha256};
use tracing::warn;
use zeroize::Zeroize;

const SESSION_KEY_DEFAULT_PATH: &str = "/run/secrets/wies_session_key";
const SESSION_KEY_MIN_LEN: usize = 64;
const FINGERPRINT_BYTES: usize = 8;
const COOKIE_SECURE_ENV: &str = "SESSION_COOKIE_SECURE";
const SAMESITE_ENV: &str = "SESSION_SAMESITE";
const ALLOW_EPHEMERAL_ENV: &str = "SESSION_ALLOW_EPHEMERAL";
const KEY_FILE_ENV: &str = "SESSION_KEY_FILE";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";
const SAMESITE_EXPECTED: &str = "Strict|Lax|None";

/// Build mode for session configuration validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum BuildMode {
    /// Debug builds tolerate defaults and emit warnings for missing toggles.
    Debug,
    /// Release builds require explicit, valid session toggles.
    Release,
}

impl BuildMode {
    /// Determine the build mode from `cfg!(debug_assertions)`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use wies::inbound::http::session_config::BuildMode;
    ///
    /// let mode = BuildMode::from_debug_assertions();
    /// assert_eq!(mode == BuildMode::Debug, cfg!(debug_assertions));
    /// ```
    #[must_use]
    pub const fn from_debug_assertions() -> Self {
        if cfg!(debug_assertions) {
            Self::Debug
        } else {
            Self::Release
        }
    }

    const fn is_debug(self) -> bool {
        matches!(self, Self::Debug)
    }
}

/// Validated session cookie settings.
pub struct SessionSettings {
    /// Signing and encryption key for cookie sessions.
    pub key: Key,
    /// Whether session cookies are marked `Secure`.
    pub cookie_secure: bool,
    /// `SameSite` policy for session cookies.
    pub same_site: SameSite,
}

/// Errors raised while validating session configuration.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A required environment variable is missing.
    #[error("missing required environment variable: {name}")]
    MissingEnv {
        /// Name of the missing variable.
        name: &'static str,
    },
    /// A variable is present but contains an invalid value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Name of the variable.
        name: &'static str,
        /// Value that was supplied.
        value: String,
        /// Description of the expected value.
        expected: &'static str,
    },
    /// Reading the session key file failed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        /// Path of the key file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The key file is too short for release builds.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        /// Path of the key file.
        path: PathBuf,
        /// Actual key length in bytes.
        length: usize,
        /// Minimum required key length in bytes.
        min_len: usize,
    },
    /// `SameSite=None` without a secure cookie in a release build.
    #[error("SESSION_SAMESITE=None requires SESSION_COOKIE_SECURE=1")]
    InsecureSameSiteNone,
    /// Release builds must not allow ephemeral session keys.
    #[error("SESSION_ALLOW_EPHEMERAL must be 0 in release builds")]
    EphemeralNotAllowed,
}

/// Read and validate the session settings.
///
/// # Errors
/// Release builds reject missing or malformed toggles, unreadable or short
/// keys, and `SameSite=None` on insecure cookies.
///
/// # Examples
///
/// ```rust
/// use mockable::MockEnv;
/// use wies::inbound::http::session_config::{BuildMode, session_settings_from_env};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let dir = tempfile::tempdir()?;
/// let key_path = dir.path().join("session_key");
/// std::fs::write(&key_path, vec![b'k'; 64])?;
/// let key_path = key_path.to_string_lossy().into_owned();
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(move |name| match name {
///     "SESSION_KEY_FILE" => Some(key_path.clone()),
///     "SESSION_COOKIE_SECURE" => Some("1".to_owned()),
///     "SESSION_SAMESITE" => Some("Strict".to_owned()),
///     "SESSION_ALLOW_EPHEMERAL" => Some("0".to_owned()),
///     _ => None,
/// });
///
/// let settings = session_settings_from_env(&env, BuildMode::Release)?;
/// assert!(settings.cookie_secure);
/// # Ok(())
/// # }
/// ```
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = bool_toggle(env, mode, COOKIE_SECURE_ENV, true)?;
    let same_site = same_site_from_env(env, mode, cookie_secure)?;
    let allow_ephemeral = bool_toggle(env, mode, ALLOW_EPHEMERAL_ENV, false)?;
    if allow_ephemeral && !mode.is_debug() {
        return Err(SessionConfigError::EphemeralNotAllowed);
    }
    let key = session_key_from_env(env, mode, allow_ephemeral)?;
    Ok(SessionSettings {
        key,
        cookie_secure,
        same_site,
    })
}

/// Truncated SHA-256 fingerprint of the signing key, safe to log.
///
/// # Examples
///
/// ```rust
/// use actix_web::cookie::Key;
/// use wies::inbound::http::session_config::key_fingerprint;
///
/// let fp = key_fingerprint(&Key::generate());
/// assert_eq!(fp.len(), 16);
/// ```
#[must_use]
pub fn key_fingerprint(key: &Key) -> String {
    let digest = Sha256::digest(key.signing());
    hex::encode(digest.iter().take(FINGERPRINT_BYTES).copied().collect::<Vec<u8>>())
}

fn bool_toggle<E: Env>(
    env: &E,
    mode: BuildMode,
    name: &'static str,
    debug_default: bool,
) -> Result<bool, SessionConfigError> {
    let Some(value) = env.string(name) else {
        if mode.is_debug() {
            warn!(name, default = debug_default, "session toggle not set; using default");
            return Ok(debug_default);
        }
        return Err(SessionConfigError::MissingEnv { name });
    };
    match parse_bool(&value) {
        Some(flag) => Ok(flag),
        None if mode.is_debug() => {
            warn!(name, value = %value, default = debug_default, "invalid session toggle; using default");
            Ok(debug_default)
        }
        None => Err(SessionConfigError::InvalidEnv {
            name,
            value,
            expected: BOOL_EXPECTED,
        }),
    }
}

fn same_site_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    cookie_secure: bool,
) -> Result<SameSite, SessionConfigError> {
    let fallback = if mode.is_debug() {
        SameSite::Lax
    } else {
        SameSite::Strict
    };
    let Some(value) = env.string(SAMESITE_ENV) else {
        if mode.is_debug() {
            warn!("SESSION_SAMESITE not set; using default");
            return Ok(fallback);
        }
        return Err(SessionConfigError::MissingEnv { name: SAMESITE_ENV });
    };
    match value.to_ascii_lowercase().as_str() {
        "lax" => Ok(SameSite::Lax),
        "strict" => Ok(SameSite::Strict),
        "none" if cookie_secure => Ok(SameSite::None),
        "none" if mode.is_debug() => {
            warn!("SESSION_SAMESITE=None on an insecure cookie; browsers may drop it");
            Ok(SameSite::None)
        }
        "none" => Err(SessionConfigError::InsecureSameSiteNone),
        _ if mode.is_debug() => {
            warn!(value = %value, "invalid SESSION_SAMESITE; using default");
            Ok(fallback)
        }
        _ => Err(SessionConfigError::InvalidEnv {
            name: SAMESITE_ENV,
            value,
            expected: SAMESITE_EXPECTED,
        }),
    }
}

fn session_key_from_env<E: Env>(
    env: &E,
    mode: BuildMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );
    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            if mode == BuildMode::Release && length < SESSION_KEY_MIN_LEN {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len: SESSION_KEY_MIN_LEN,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if mode.is_debug() || allow_ephemeral => {
            warn!(path = %path.display(), error = %error, "using temporary session key");
            Ok(Key::generate())
        }
        Err(source) => Err(SessionConfigError::KeyRead { path, source }),
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "y" => Some(true),
        "0" | "false" | "no" | "n" => Some(false),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use mockable::MockEnv;
    use rstest::{fixture, rstest};
    use tempfile::TempDir;

    struct KeyFile {
        _dir: TempDir,
        path: String,
    }

    fn key_file(len: usize) -> KeyFile {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("session_key");
        std::fs::write(&path, vec![b'a'; len]).expect("write key");
        KeyFile {
            path: path.to_string_lossy().into_owned(),
            _dir: dir,
        }
    }

    #[fixture]
    fn full_key() -> KeyFile {
        key_file(SESSION_KEY_MIN_LEN)
    }

    fn mock_env(vars: HashMap<&'static str, String>) -> MockEnv {
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        env
    }

    fn release_vars(key_path: &str) -> HashMap<&'static str, String> {
        HashMap::from([
            (KEY_FILE_ENV, key_path.to_owned()),
            (COOKIE_SECURE_ENV, "1".to_owned()),
            (SAMESITE_ENV, "Strict".to_owned()),
            (ALLOW_EPHEMERAL_ENV, "0".to_owned()),
        ])
    }

    #[rstest]
    fn release_accepts_complete_configuration(full_key: KeyFile) {
        let env = mock_env(release_vars(&full_key.path));
        let settings =
            session_settings_from_env(&env, BuildMode::Release).expect("valid settings");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Strict);
    }

    #[rstest]
    #[case(COOKIE_SECURE_ENV)]
    #[case(SAMESITE_ENV)]
    #[case(ALLOW_EPHEMERAL_ENV)]
    fn release_rejects_missing_toggles(full_key: KeyFile, #[case] missing: &'static str) {
        let mut vars = release_vars(&full_key.path);
        vars.remove(missing);
        let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
            .err()
            .expect("missing toggle fails");
        assert!(matches!(err, SessionConfigError::MissingEnv { name } if name == missing));
    }

    #[rstest]
    #[case(COOKIE_SECURE_ENV, "maybe")]
    #[case(SAMESITE_ENV, "sometimes")]
    #[case(ALLOW_EPHEMERAL_ENV, "")]
    fn release_rejects_invalid_values(
        full_key: KeyFile,
        #[case] name: &'static str,
        #[case] value: &str,
    ) {
        let mut vars = release_vars(&full_key.path);
        vars.insert(name, value.to_owned());
        let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
            .err()
            .expect("invalid toggle fails");
        assert!(matches!(err, SessionConfigError::InvalidEnv { name: found, .. } if found == name));
    }

    #[rstest]
    fn release_rejects_same_site_none_without_secure(full_key: KeyFile) {
        let mut vars = release_vars(&full_key.path);
        vars.insert(COOKIE_SECURE_ENV, "0".to_owned());
        vars.insert(SAMESITE_ENV, "None".to_owned());
        let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
            .err()
            .expect("insecure None fails");
        assert!(matches!(err, SessionConfigError::InsecureSameSiteNone));
    }

    #[rstest]
    fn release_rejects_ephemeral_keys(full_key: KeyFile) {
        let mut vars = release_vars(&full_key.path);
        vars.insert(ALLOW_EPHEMERAL_ENV, "yes".to_owned());
        let err = session_settings_from_env(&mock_env(vars), BuildMode::Release)
            .err()
            .expect("ephemeral fails");
        assert!(matches!(err, SessionConfigError::EphemeralNotAllowed));
    }

    #[rstest]
    fn release_rejects_short_key() {
        let short = key_file(SESSION_KEY_MIN_LEN - 1);
        let err = session_settings_from_env(&mock_env(release_vars(&short.path)), BuildMode::Release)
            .err()
            .expect("short key fails");
        assert!(matches!(
            err,
            SessionConfigError::KeyTooShort { length, .. } if length == SESSION_KEY_MIN_LEN - 1
        ));
    }

    #[rstest]
    fn release_rejects_unreadable_key() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent").to_string_lossy().into_owned();
        let err = session_settings_from_env(&mock_env(release_vars(&missing)), BuildMode::Release)
            .err()
            .expect("missing key fails");
        assert!(matches!(err, SessionConfigError::KeyRead { .. }));
    }

    #[rstest]
    fn debug_defaults_everything() {
        let dir = tempfile::tempdir().expect("tempdir");
        let missing = dir.path().join("absent").to_string_lossy().into_owned();
        let env = mock_env(HashMap::from([(KEY_FILE_ENV, missing)]));
        let settings = session_settings_from_env(&env, BuildMode::Debug).expect("debug defaults");
        assert!(settings.cookie_secure);
        assert_eq!(settings.same_site, SameSite::Lax);
    }

    #[rstest]
    fn fingerprint_is_stable_per_key() {
        let key = Key::derive_from(&[7_u8; 64]);
        assert_eq!(key_fingerprint(&key), key_fingerprint(&key));
        assert_ne!(key_fingerprint(&key), key_fingerprint(&Key::generate()));
    }
}
