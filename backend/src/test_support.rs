//! Test utilities for the cms crate.
//!
//! Shared by unit tests (in `src/`) and integration tests (in `tests/`).
//! Compiled for tests and when the `test-support` feature is enabled.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::{Cookie, Key};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::{App, web};
use tempfile::TempDir;

use crate::Trace;
use crate::domain::CredentialLoginService;
use crate::inbound::http::{configure, state::HttpState};
use crate::outbound::{CapDocumentRepository, YamlCredentialRepository};

/// Name of the session cookie used across the crate.
pub const SESSION_COOKIE: &str = "session";

/// Username seeded into the test credential file.
pub const TEST_USERNAME: &str = "admin";
/// Password for [`TEST_USERNAME`].
pub const TEST_PASSWORD: &str = "secret";

pub mod cap_fs {
    //! Capability-safe filesystem helpers for tests.
    //!
    //! Built on `cap_std::fs::Dir` so test suites share the same file access
    //! style as the adapters.

    use std::ffi::OsString;
    use std::io;
    use std::path::Path;

    use cap_std::{ambient_authority, fs::Dir};

    /// Read a UTF-8 text file.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use cms::test_support::cap_fs::{read_file_to_string, write_file};
    ///
    /// let path = std::env::temp_dir().join("cms-cap-fs-read-example.txt");
    /// write_file(&path, b"hello\n")?;
    /// assert_eq!(read_file_to_string(&path)?, "hello\n");
    /// # Ok::<(), std::io::Error>(())
    /// ```
    pub fn read_file_to_string(path: &Path) -> io::Result<String> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.read_to_string(Path::new(&file_name))
    }

    /// Write bytes to a file, replacing it.
    pub fn write_file(path: &Path, contents: &[u8]) -> io::Result<()> {
        let (parent, file_name) = parent_and_file_name(path)?;
        let directory = Dir::open_ambient_dir(parent, ambient_authority())?;
        directory.write(Path::new(&file_name), contents)
    }

    /// Return true when `path` exists.
    pub fn path_exists(path: &Path) -> bool {
        let Ok((parent, file_name)) = parent_and_file_name(path) else {
            return false;
        };
        let Ok(directory) = Dir::open_ambient_dir(parent, ambient_authority()) else {
            return false;
        };
        directory.exists(Path::new(&file_name))
    }

    fn parent_and_file_name(path: &Path) -> io::Result<(&Path, OsString)> {
        let parent = path.parent().unwrap_or_else(|| Path::new("."));
        let file_name = path.file_name().ok_or_else(|| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "path must include a file or directory name",
            )
        })?;
        Ok((parent, file_name.to_os_string()))
    }
}

/// Cookie session middleware with a random key and no `Secure` flag.
pub fn test_session_middleware() -> SessionMiddleware<CookieSessionStore> {
    SessionMiddleware::builder(CookieSessionStore::default(), Key::generate())
        .cookie_name(SESSION_COOKIE.to_owned())
        .cookie_secure(false)
        .build()
}

/// Session cookie set by `res`, if any.
pub fn session_cookie<B>(res: &ServiceResponse<B>) -> Option<Cookie<'static>> {
    res.response()
        .cookies()
        .find(|cookie| cookie.name() == SESSION_COOKIE)
        .map(Cookie::into_owned)
}

/// A complete CMS over disposable storage.
///
/// Holds a temporary directory containing `data/` and `users.yaml`, the
/// latter listing [`TEST_USERNAME`] with a bcrypt hash of [`TEST_PASSWORD`].
pub struct TestCms {
    _root: TempDir,
    data_dir: PathBuf,
    users_file: PathBuf,
}

impl TestCms {
    /// Create empty storage with the test user.
    ///
    /// # Panics
    /// Panics when the temporary directory or the credential file cannot be
    /// prepared.
    #[must_use]
    pub fn new() -> Self {
        let root = TempDir::new().expect("temporary root");
        let data_dir = root.path().join("data");
        let users_file = root.path().join("users.yaml");
        // Cost 4 is the bcrypt minimum and keeps the suite fast.
        let hash = bcrypt::hash(TEST_PASSWORD, 4).expect("hash test password");
        cap_fs::write_file(&users_file, format!("{TEST_USERNAME}: {hash}\n").as_bytes())
            .expect("write users file");
        Self {
            _root: root,
            data_dir,
            users_file,
        }
    }

    /// Directory holding the documents.
    #[must_use]
    pub fn data_dir(&self) -> &Path {
        &self.data_dir
    }

    /// Path of the document called `name`.
    #[must_use]
    pub fn document_path(&self, name: &str) -> PathBuf {
        self.data_dir.join(name)
    }

    /// Seed a document directly on disk.
    ///
    /// # Panics
    /// Panics when the file cannot be written.
    pub fn create_document(&self, name: &str, content: &str) {
        cap_std::fs::Dir::create_ambient_dir_all(&self.data_dir, cap_std::ambient_authority())
            .expect("create data dir");
        cap_fs::write_file(&self.document_path(name), content.as_bytes())
            .expect("write document");
    }

    /// Handler state wired to the real adapters.
    ///
    /// # Panics
    /// Panics when the adapters cannot open their files.
    #[must_use]
    pub fn state(&self) -> HttpState {
        let documents = CapDocumentRepository::open(&self.data_dir).expect("open documents");
        let credentials =
            YamlCredentialRepository::load(&self.users_file).expect("load credentials");
        HttpState::new(
            Arc::new(CredentialLoginService::new(Arc::new(credentials))),
            Arc::new(documents),
        )
    }
}

impl Default for TestCms {
    fn default() -> Self {
        Self::new()
    }
}

/// Application configured like the server around `state`, with a test
/// session key.
pub fn cms_app(
    state: HttpState,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .wrap(test_session_middleware())
        .wrap(Trace)
        .app_data(web::Data::new(state))
        .configure(configure)
}
