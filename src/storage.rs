//! Attachment storage on disk.
//!
//! Attached files are copied into one flat directory under generated unique
//! names; documents reference them by filename only. A file nothing in the
//! hierarchy references is orphaned and gets deleted by the sweep.

use std::collections::HashSet;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::registry::Registry;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("attachment source has no file name: {0}")]
    NoFileName(PathBuf),
    #[error(transparent)]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, StorageError>;

/// Flat on-disk store for attachment files.
pub struct AttachmentStore {
    dir: PathBuf,
}

impl AttachmentStore {
    /// Open the store, creating the directory if needed.
    pub fn new(dir: &Path) -> Result<Self> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Full path of a stored filename.
    pub fn path_of(&self, filename: &str) -> PathBuf {
        self.dir.join(filename)
    }

    /// Copy `source` into the store under a generated unique name:
    /// original stem, a random 8-hex suffix, original extension.
    ///
    /// Returns the stored filename.
    pub fn attach(&self, source: &Path) -> Result<String> {
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or_else(|| StorageError::NoFileName(source.to_path_buf()))?;
        let extension = source.extension().and_then(|e| e.to_str());

        let filename = loop {
            let candidate = generated_name(stem, extension);
            if !self.dir.join(&candidate).exists() {
                break candidate;
            }
        };

        fs::copy(source, self.dir.join(&filename))?;
        Ok(filename)
    }

    /// Delete a stored file. A file already gone is not an error.
    pub fn remove(&self, filename: &str) -> Result<()> {
        match fs::remove_file(self.path_of(filename)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    /// Delete a batch of stored files, logging failures instead of aborting.
    ///
    /// Returns how many files were deleted.
    pub fn remove_all<'a>(&self, filenames: impl IntoIterator<Item = &'a str>) -> usize {
        let mut removed = 0;
        for filename in filenames {
            match self.remove(filename) {
                Ok(()) => removed += 1,
                Err(err) => warn!(filename, %err, "failed to delete attachment"),
            }
        }
        removed
    }

    /// Delete every file in the store that no document references.
    ///
    /// Per-file deletion failures are logged and do not abort the sweep.
    /// Returns how many files were deleted.
    pub fn sweep_orphans(&self, registry: &Registry) -> Result<usize> {
        let referenced: HashSet<&str> = registry
            .documents_with_paths()
            .flat_map(|(_, doc)| doc.attachments.iter().map(String::as_str))
            .collect();

        let mut removed = 0;
        for entry in fs::read_dir(&self.dir)? {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name();
            let name = name.to_string_lossy();
            if referenced.contains(name.as_ref()) {
                continue;
            }
            match fs::remove_file(entry.path()) {
                Ok(()) => {
                    debug!(filename = %name, "deleted orphaned attachment");
                    removed += 1;
                }
                Err(err) => warn!(filename = %name, %err, "failed to delete orphaned attachment"),
            }
        }
        Ok(removed)
    }
}

fn generated_name(stem: &str, extension: Option<&str>) -> String {
    let id = uuid::Uuid::new_v4().simple().to_string();
    let suffix = &id[..8];
    match extension {
        Some(ext) => format!("{stem}-{suffix}.{ext}"),
        None => format!("{stem}-{suffix}"),
    }
}
