//! Flat-directory document store built on `cap_std`.
//!
//! The data directory is opened once as a capability handle. Every lookup is
//! resolved relative to that handle, so names can never reach files outside
//! it even if validation upstream were bypassed.

use std::io;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use tracing::debug;

use crate::domain::ports::{DocumentRepository, DocumentRepositoryError};
use crate::domain::{Document, DocumentName};

/// Document store backed by one flat directory.
#[derive(Clone)]
pub struct CapDocumentRepository {
    dir: Arc<Dir>,
}

impl CapDocumentRepository {
    /// Open `path`, creating it (and its parents) when missing.
    ///
    /// # Errors
    /// Returns the underlying I/O error when the directory cannot be created
    /// or opened.
    pub fn open(path: &Path) -> io::Result<Self> {
        Dir::create_ambient_dir_all(path, ambient_authority())?;
        let dir = Dir::open_ambient_dir(path, ambient_authority())?;
        Ok(Self { dir: Arc::new(dir) })
    }

    /// Run a blocking filesystem operation on the worker pool.
    async fn run<T, F>(&self, op: F) -> Result<T, DocumentRepositoryError>
    where
        T: Send + 'static,
        F: FnOnce(&Dir) -> Result<T, DocumentRepositoryError> + Send + 'static,
    {
        let dir = Arc::clone(&self.dir);
        tokio::task::spawn_blocking(move || op(&dir))
            .await
            .map_err(|err| DocumentRepositoryError::storage(format!("worker failed: {err}")))?
    }
}

fn storage_error(action: &str, name: &str, err: &io::Error) -> DocumentRepositoryError {
    DocumentRepositoryError::storage(format!("{action} {name}: {}", err.kind()))
}

fn list_names(dir: &Dir) -> Result<Vec<DocumentName>, DocumentRepositoryError> {
    let entries = dir
        .entries()
        .map_err(|err| storage_error("list", "directory", &err))?;
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry.map_err(|err| storage_error("list", "directory", &err))?;
        let is_file = entry
            .file_type()
            .map_err(|err| storage_error("stat", "entry", &err))?
            .is_file();
        let file_name = entry.file_name();
        let Some(raw) = file_name.to_str() else {
            debug!(entry = ?file_name, "skipping non UTF-8 directory entry");
            continue;
        };
        match DocumentName::parse(raw) {
            Ok(name) if is_file && name.as_str() == raw => names.push(name),
            _ => debug!(entry = raw, "skipping directory entry that is not a document"),
        }
    }
    names.sort();
    Ok(names)
}

#[async_trait]
impl DocumentRepository for CapDocumentRepository {
    async fn list(&self) -> Result<Vec<DocumentName>, DocumentRepositoryError> {
        self.run(list_names).await
    }

    async fn exists(&self, name: &DocumentName) -> Result<bool, DocumentRepositoryError> {
        let name = name.clone();
        self.run(move |dir| match dir.metadata(name.as_str()) {
            Ok(meta) => Ok(meta.is_file()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(err) => Err(storage_error("stat", name.as_str(), &err)),
        })
        .await
    }

    async fn read(&self, name: &DocumentName) -> Result<Document, DocumentRepositoryError> {
        let name = name.clone();
        self.run(move |dir| match dir.read(name.as_str()) {
            Ok(content) => Ok(Document::new(name, content)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(DocumentRepositoryError::not_found(name.as_str()))
            }
            Err(err) => Err(storage_error("read", name.as_str(), &err)),
        })
        .await
    }

    async fn write(
        &self,
        name: &DocumentName,
        content: &[u8],
    ) -> Result<(), DocumentRepositoryError> {
        let name = name.clone();
        let content = content.to_vec();
        self.run(move |dir| {
            dir.write(name.as_str(), content)
                .map_err(|err| storage_error("write", name.as_str(), &err))
        })
        .await
    }

    async fn delete(&self, name: &DocumentName) -> Result<(), DocumentRepositoryError> {
        let name = name.clone();
        self.run(move |dir| match dir.remove_file(name.as_str()) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                Err(DocumentRepositoryError::not_found(name.as_str()))
            }
            Err(err) => Err(storage_error("delete", name.as_str(), &err)),
        })
        .await
    }
}
