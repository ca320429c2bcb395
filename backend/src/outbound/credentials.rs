//! YAML-backed credential store.
//!
//! The file maps usernames to bcrypt hashes:
//!
//! ```text
//! admin: $2b$12$C3EPp2Lkd1x4Ea2y1oTxB.3Vv0uBGa4xYpm1zY0kQ1nYbZyJgE9XG
//! ```
//!
//! It is read once when the adapter is constructed and held in memory.

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use thiserror::Error;

use crate::domain::Username;
use crate::domain::ports::{CredentialRepository, CredentialRepositoryError};

/// Errors raised while loading the credential file.
#[derive(Debug, Error)]
pub enum CredentialStoreLoadError {
    /// The file could not be read.
    #[error("failed to read credentials at {path}: {source}")]
    Read {
        /// Path to the credential file.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
    /// The file is not a YAML mapping of strings.
    #[error("failed to parse credentials at {path}: {source}")]
    Parse {
        /// Path to the credential file.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },
}

/// In-memory snapshot of the credential file.
#[derive(Debug, Clone, Default)]
pub struct YamlCredentialRepository {
    users: BTreeMap<String, String>,
}

impl YamlCredentialRepository {
    /// Load and parse the credential file at `path`.
    ///
    /// # Errors
    /// Returns [`CredentialStoreLoadError`] when the file is unreadable or
    /// malformed.
    pub fn load(path: &Path) -> Result<Self, CredentialStoreLoadError> {
        let contents = read_file(path).map_err(|source| CredentialStoreLoadError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_yaml_str(&contents).map_err(|source| CredentialStoreLoadError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Parse credentials from YAML text. An empty document yields no users.
    ///
    /// # Errors
    /// Returns the YAML error when the text is not a string-to-string map.
    pub fn from_yaml_str(yaml: &str) -> Result<Self, serde_yaml::Error> {
        if yaml.trim().is_empty() {
            return Ok(Self::default());
        }
        let users: BTreeMap<String, String> = serde_yaml::from_str(yaml)?;
        Ok(Self { users })
    }

    /// Build a store from `(username, hash)` pairs.
    pub fn from_entries<I, U, H>(entries: I) -> Self
    where
        I: IntoIterator<Item = (U, H)>,
        U: Into<String>,
        H: Into<String>,
    {
        Self {
            users: entries
                .into_iter()
                .map(|(user, hash)| (user.into(), hash.into()))
                .collect(),
        }
    }

    /// Number of users known to the store.
    #[must_use]
    pub fn len(&self) -> usize {
        self.users.len()
    }

    /// Whether the store holds no users.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.users.is_empty()
    }
}

fn read_file(path: &Path) -> io::Result<String> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        io::Error::new(io::ErrorKind::InvalidInput, "path must name a file")
    })?;
    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    dir.read_to_string(file_name)
}

#[async_trait]
impl CredentialRepository for YamlCredentialRepository {
    async fn password_hash(
        &self,
        username: &Username,
    ) -> Result<Option<String>, CredentialRepositoryError> {
        Ok(self.users.get(username.as_str()).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use tempfile::TempDir;

    use crate::test_support::cap_fs::write_file;

    fn user(raw: &str) -> Username {
        Username::new(raw).expect("valid username")
    }

    #[rstest]
    #[tokio::test]
    async fn load_reads_yaml_mapping() {
        let tmp = TempDir::new().expect("temp dir");
        let path = tmp.path().join("users.yaml");
        write_file(&path, b"admin: $2b$04$abc\nguest: $2b$04$def\n").expect("write users");

        let store = YamlCredentialRepository::load(&path).expect("load");
        assert_eq!(store.len(), 2);
        assert_eq!(
            store.password_hash(&user("admin")).await.expect("lookup"),
            Some("$2b$04$abc".to_owned())
        );
        assert_eq!(store.password_hash(&user("nobody")).await.expect("lookup"), None);
    }

    #[test]
    fn missing_file_is_a_read_error() {
        let tmp = TempDir::new().expect("temp dir");
        let err = YamlCredentialRepository::load(&tmp.path().join("absent.yaml"))
            .expect_err("missing file");
        assert!(matches!(err, CredentialStoreLoadError::Read { .. }));
    }

    #[rstest]
    #[case("- admin\n- guest\n")]
    #[case("admin: [1, 2]\n")]
    fn non_mapping_yaml_is_rejected(#[case] yaml: &str) {
        assert!(YamlCredentialRepository::from_yaml_str(yaml).is_err());
    }

    #[test]
    fn empty_yaml_has_no_users() {
        let store = YamlCredentialRepository::from_yaml_str("").expect("empty is valid");
        assert!(store.is_empty());
    }
}
