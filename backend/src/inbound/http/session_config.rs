//! Session cookie configuration derived from the environment.
//!
//! The signing key and the cookie `Secure` flag are read here so `main`
//! stays a thin bootstrap and the rules can be exercised with `MockEnv`.

use std::path::PathBuf;

use actix_web::cookie::Key;
use mockable::Env;
use tracing::warn;
use zeroize::Zeroize;

use crate::config::RuntimeMode;

/// Default location of the session key file.
pub const SESSION_KEY_DEFAULT_PATH: &str = "/var/run/secrets/session_key";
/// Minimum key material accepted in production.
pub const SESSION_KEY_MIN_LEN: usize = 64;
/// Minimum key material accepted in any mode; shorter input cannot derive a key.
pub const SESSION_KEY_DERIVE_MIN_LEN: usize = 32;
/// Environment variable naming the key file.
pub const KEY_FILE_ENV: &str = "CMS_SESSION_KEY_FILE";
/// Environment variable toggling the `Secure` cookie flag.
pub const COOKIE_SECURE_ENV: &str = "CMS_SESSION_COOKIE_SECURE";
/// Environment variable permitting a generated key in production.
pub const ALLOW_EPHEMERAL_ENV: &str = "CMS_SESSION_ALLOW_EPHEMERAL";
const BOOL_EXPECTED: &str = "1|0|true|false|yes|no|y|n";

/// Resolved session cookie settings.
pub struct SessionSettings {
    /// Signing and encryption key for the session cookie.
    pub key: Key,
    /// Whether the cookie carries the `Secure` attribute.
    pub cookie_secure: bool,
}

/// Errors raised while resolving session settings.
#[derive(thiserror::Error, Debug)]
pub enum SessionConfigError {
    /// A variable holds an unparseable value.
    #[error("invalid value for {name}='{value}'; expected {expected}")]
    InvalidEnv {
        /// Variable name.
        name: &'static str,
        /// Offending value.
        value: String,
        /// Accepted values.
        expected: &'static str,
    },
    /// The key file could not be read and no fallback is allowed.
    #[error("failed to read session key at {path}: {source}")]
    KeyRead {
        /// Key file path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The key file holds too little key material for the mode.
    #[error("session key at {path} too short: need >= {min_len} bytes, got {length}")]
    KeyTooShort {
        /// Key file path.
        path: PathBuf,
        /// Bytes found.
        length: usize,
        /// Bytes required.
        min_len: usize,
    },
}

/// Resolve session settings for `mode`.
///
/// # Examples
///
/// ```rust
/// use cms::config::RuntimeMode;
/// use cms::inbound::http::session_config::session_settings_from_env;
/// use mockable::MockEnv;
///
/// let mut env = MockEnv::new();
/// env.expect_string().returning(|_| None);
///
/// let settings = session_settings_from_env(&env, RuntimeMode::Test).expect("test defaults");
/// assert!(!settings.cookie_secure);
/// ```
///
/// # Errors
/// Returns [`SessionConfigError`] when a toggle is malformed or production
/// lacks a usable key.
pub fn session_settings_from_env<E: Env>(
    env: &E,
    mode: RuntimeMode,
) -> Result<SessionSettings, SessionConfigError> {
    let cookie_secure = bool_from_env(env, COOKIE_SECURE_ENV)?
        .unwrap_or(matches!(mode, RuntimeMode::Production));
    let allow_ephemeral =
        bool_from_env(env, ALLOW_EPHEMERAL_ENV)?.unwrap_or(false) || mode.allows_ephemeral_key();
    let key = session_key_from_env(env, mode, allow_ephemeral)?;
    Ok(SessionSettings { key, cookie_secure })
}

fn bool_from_env<E: Env>(env: &E, name: &'static str) -> Result<Option<bool>, SessionConfigError> {
    env.string(name)
        .map(|value| {
            parse_bool(&value).ok_or(SessionConfigError::InvalidEnv {
                name,
                value,
                expected: BOOL_EXPECTED,
            })
        })
        .transpose()
}

fn session_key_from_env<E: Env>(
    env: &E,
    mode: RuntimeMode,
    allow_ephemeral: bool,
) -> Result<Key, SessionConfigError> {
    let path = PathBuf::from(
        env.string(KEY_FILE_ENV)
            .unwrap_or_else(|| SESSION_KEY_DEFAULT_PATH.to_owned()),
    );

    match std::fs::read(&path) {
        Ok(mut bytes) => {
            let length = bytes.len();
            let min_len = match mode {
                RuntimeMode::Production => SESSION_KEY_MIN_LEN,
                RuntimeMode::Development | RuntimeMode::Test => SESSION_KEY_DERIVE_MIN_LEN,
            };
            if length < min_len {
                bytes.zeroize();
                return Err(SessionConfigError::KeyTooShort {
                    path,
                    length,
                    min_len,
                });
            }
            let key = Key::derive_from(&bytes);
            bytes.zeroize();
            Ok(key)
        }
        Err(error) if allow_ephemeral => {
            warn!(
                path = %path.display(),
                error = %error,
                %mode,
                "using temporary session key; sessions end on restart"
            );
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
    use super::*;
    use mockable::MockEnv;
    use rstest::rstest;
    use std::collections::HashMap;
    use tempfile::NamedTempFile;

    use crate::test_support::cap_fs::write_file;

    fn key_file(len: usize) -> NamedTempFile {
        let file = NamedTempFile::new().expect("temp key file");
        write_file(file.path(), &vec![b'k'; len]).expect("write key");
        file
    }

    fn mock_env(vars: &[(&str, &str)]) -> MockEnv {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_owned(), (*v).to_owned()))
            .collect();
        let mut env = MockEnv::new();
        env.expect_string()
            .times(0..)
            .returning(move |key| vars.get(key).cloned());
        env
    }

    #[rstest]
    fn production_with_key_file_is_secure_by_default() {
        let file = key_file(SESSION_KEY_MIN_LEN);
        let path = file.path().to_str().expect("utf-8 path");
        let env = mock_env(&[(KEY_FILE_ENV, path)]);

        let settings =
            session_settings_from_env(&env, RuntimeMode::Production).expect("valid settings");
        assert!(settings.cookie_secure);
    }

    #[rstest]
    fn same_key_file_derives_same_key() {
        let file = key_file(SESSION_KEY_MIN_LEN);
        let path = file.path().to_str().expect("utf-8 path");
        let env = mock_env(&[(KEY_FILE_ENV, path)]);

        let first = session_settings_from_env(&env, RuntimeMode::Production).expect("first");
        let second = session_settings_from_env(&env, RuntimeMode::Production).expect("second");
        assert_eq!(first.key.master(), second.key.master());
    }

    #[rstest]
    fn production_missing_key_file_is_rejected() {
        let env = mock_env(&[(KEY_FILE_ENV, "/nonexistent/cms/session_key")]);
        let err = session_settings_from_env(&env, RuntimeMode::Production)
            .err()
            .expect("missing key must fail");
        assert!(matches!(err, SessionConfigError::KeyRead { .. }));
    }

    #[rstest]
    fn production_missing_key_file_allowed_when_opted_in() {
        let env = mock_env(&[
            (KEY_FILE_ENV, "/nonexistent/cms/session_key"),
            (ALLOW_EPHEMERAL_ENV, "yes"),
        ]);
        assert!(session_settings_from_env(&env, RuntimeMode::Production).is_ok());
    }

    #[rstest]
    fn production_short_key_is_rejected_even_with_opt_in() {
        let file = key_file(16);
        let path = file.path().to_str().expect("utf-8 path");
        let env = mock_env(&[(KEY_FILE_ENV, path), (ALLOW_EPHEMERAL_ENV, "1")]);

        let err = session_settings_from_env(&env, RuntimeMode::Production)
            .err()
            .expect("short key must fail");
        assert!(matches!(
            err,
            SessionConfigError::KeyTooShort { length: 16, .. }
        ));
    }

    #[rstest]
    #[case(RuntimeMode::Development)]
    #[case(RuntimeMode::Test)]
    fn non_production_falls_back_to_ephemeral_insecure_cookie(#[case] mode: RuntimeMode) {
        let env = mock_env(&[(KEY_FILE_ENV, "/nonexistent/cms/session_key")]);
        let settings = session_settings_from_env(&env, mode).expect("fallback key");
        assert!(!settings.cookie_secure);
    }

    #[rstest]
    fn development_accepts_shorter_keys_down_to_derive_minimum() {
        let file = key_file(SESSION_KEY_DERIVE_MIN_LEN);
        let path = file.path().to_str().expect("utf-8 path");
        let env = mock_env(&[(KEY_FILE_ENV, path)]);
        assert!(session_settings_from_env(&env, RuntimeMode::Development).is_ok());

        let short = key_file(SESSION_KEY_DERIVE_MIN_LEN - 1);
        let path = short.path().to_str().expect("utf-8 path");
        let env = mock_env(&[(KEY_FILE_ENV, path)]);
        let err = session_settings_from_env(&env, RuntimeMode::Development)
            .err()
            .expect("too short to derive");
        assert!(matches!(err, SessionConfigError::KeyTooShort { min_len: 32, .. }));
    }

    #[rstest]
    #[case("maybe")]
    #[case("")]
    fn malformed_toggle_is_rejected(#[case] value: &str) {
        let env = mock_env(&[(COOKIE_SECURE_ENV, value)]);
        let err = session_settings_from_env(&env, RuntimeMode::Test)
            .err()
            .expect("malformed toggle must fail");
        assert!(matches!(
            err,
            SessionConfigError::InvalidEnv {
                name: COOKIE_SECURE_ENV,
                ..
            }
        ));
    }

    #[rstest]
    fn explicit_toggle_overrides_mode_default() {
        let env = mock_env(&[(COOKIE_SECURE_ENV, "true")]);
        let settings = session_settings_from_env(&env, RuntimeMode::Development).expect("ok");
        assert!(settings.cookie_secure);
    }
}
