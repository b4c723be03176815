//! In-memory folder hierarchy, the sole source of truth while running.
//!
//! The persistence layer serializes this structure wholesale and rebuilds it
//! on load; nothing reads the database directly during normal operation.
//! Folders keep insertion order, and documents keep their list order, so a
//! listing after a reload matches the listing before it.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::models::Document;

/// Structural errors reported before any state is mutated.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("folder '{0}' already exists")]
    DuplicateFolder(String),
    #[error("subfolder '{name}' already exists in '{folder}'")]
    DuplicateSubfolder { folder: String, name: String },
    #[error("no such folder: {0}")]
    UnknownFolder(String),
    #[error("no such path: {0}")]
    UnknownPath(FolderPath),
    #[error("'{0}' is not empty")]
    NotEmpty(FolderPath),
    #[error("no document with id {0}")]
    UnknownDocument(i64),
}

type Result<T> = std::result::Result<T, RegistryError>;

/// Address of a folder or a folder/subfolder pair.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FolderPath {
    pub folder: String,
    pub subfolder: Option<String>,
}

impl FolderPath {
    /// Path to a top-level folder.
    pub fn top(folder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            subfolder: None,
        }
    }

    /// Path to a subfolder.
    pub fn sub(folder: impl Into<String>, subfolder: impl Into<String>) -> Self {
        Self {
            folder: folder.into(),
            subfolder: Some(subfolder.into()),
        }
    }
}

impl fmt::Display for FolderPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.subfolder {
            Some(sub) => write!(f, "{}/{}", self.folder, sub),
            None => write!(f, "{}", self.folder),
        }
    }
}

/// Error for path text with an empty folder or subfolder component.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid folder path '{0}', expected FOLDER or FOLDER/SUBFOLDER")]
pub struct FolderPathParseError(String);

impl FromStr for FolderPath {
    type Err = FolderPathParseError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let invalid = || FolderPathParseError(s.to_string());
        match s.split_once('/') {
            Some((folder, sub)) => {
                if folder.trim().is_empty() || sub.trim().is_empty() {
                    return Err(invalid());
                }
                Ok(Self::sub(folder.trim(), sub.trim()))
            }
            None => {
                if s.trim().is_empty() {
                    return Err(invalid());
                }
                Ok(Self::top(s.trim()))
            }
        }
    }
}

/// A second-level folder holding an ordered document list.
#[derive(Debug, Clone, Default)]
pub struct Subfolder {
    pub name: String,
    pub documents: Vec<Document>,
}

/// A top-level folder holding documents and subfolders.
#[derive(Debug, Clone, Default)]
pub struct Folder {
    pub name: String,
    pub documents: Vec<Document>,
    pub subfolders: Vec<Subfolder>,
}

impl Folder {
    fn subfolder(&self, name: &str) -> Option<&Subfolder> {
        self.subfolders.iter().find(|sub| sub.name == name)
    }

    fn subfolder_mut(&mut self, name: &str) -> Option<&mut Subfolder> {
        self.subfolders.iter_mut().find(|sub| sub.name == name)
    }
}

/// The folder hierarchy plus an identity index over persisted documents.
///
/// The index maps a database id to the path holding the document, so edits
/// address records by identity instead of scanning the whole hierarchy.
#[derive(Debug, Default)]
pub struct Registry {
    folders: Vec<Folder>,
    by_id: HashMap<i64, FolderPath>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Top-level folders in insertion order.
    pub fn folders(&self) -> &[Folder] {
        &self.folders
    }

    pub(crate) fn folders_mut(&mut self) -> &mut [Folder] {
        &mut self.folders
    }

    pub fn folder(&self, name: &str) -> Option<&Folder> {
        self.folders.iter().find(|folder| folder.name == name)
    }

    fn folder_mut(&mut self, name: &str) -> Option<&mut Folder> {
        self.folders.iter_mut().find(|folder| folder.name == name)
    }

    /// Create a top-level folder. Duplicate names are rejected.
    pub fn add_folder(&mut self, name: &str) -> Result<()> {
        if self.folder(name).is_some() {
            return Err(RegistryError::DuplicateFolder(name.to_string()));
        }
        self.folders.push(Folder {
            name: name.to_string(),
            ..Folder::default()
        });
        Ok(())
    }

    /// Create a subfolder under an existing folder. Duplicates within the
    /// parent are rejected.
    pub fn add_subfolder(&mut self, folder: &str, name: &str) -> Result<()> {
        let parent = self
            .folder_mut(folder)
            .ok_or_else(|| RegistryError::UnknownFolder(folder.to_string()))?;
        if parent.subfolder(name).is_some() {
            return Err(RegistryError::DuplicateSubfolder {
                folder: folder.to_string(),
                name: name.to_string(),
            });
        }
        parent.subfolders.push(Subfolder {
            name: name.to_string(),
            documents: Vec::new(),
        });
        Ok(())
    }

    /// Get-or-create a top-level folder; used when rebuilding from rows.
    pub(crate) fn ensure_folder(&mut self, name: &str) -> &mut Folder {
        if let Some(pos) = self.folders.iter().position(|folder| folder.name == name) {
            return &mut self.folders[pos];
        }
        self.folders.push(Folder {
            name: name.to_string(),
            ..Folder::default()
        });
        self.folders.last_mut().unwrap()
    }

    /// Get-or-create a subfolder; used when rebuilding from rows.
    pub(crate) fn ensure_subfolder(&mut self, folder: &str, name: &str) -> &mut Subfolder {
        let parent = self.ensure_folder(folder);
        if let Some(pos) = parent.subfolders.iter().position(|sub| sub.name == name) {
            return &mut parent.subfolders[pos];
        }
        parent.subfolders.push(Subfolder {
            name: name.to_string(),
            documents: Vec::new(),
        });
        parent.subfolders.last_mut().unwrap()
    }

    /// Delete the folder or subfolder at `path`.
    ///
    /// Rejected while the addressed folder still holds documents, directly or
    /// in any subfolder. A folder whose subfolders are all empty is removed
    /// together with them.
    pub fn remove_folder(&mut self, path: &FolderPath) -> Result<()> {
        match &path.subfolder {
            None => {
                let pos = self
                    .folders
                    .iter()
                    .position(|folder| folder.name == path.folder)
                    .ok_or_else(|| RegistryError::UnknownPath(path.clone()))?;
                let folder = &self.folders[pos];
                let occupied = !folder.documents.is_empty()
                    || folder.subfolders.iter().any(|sub| !sub.documents.is_empty());
                if occupied {
                    return Err(RegistryError::NotEmpty(path.clone()));
                }
                self.folders.remove(pos);
            }
            Some(sub_name) => {
                let folder = self
                    .folder_mut(&path.folder)
                    .ok_or_else(|| RegistryError::UnknownPath(path.clone()))?;
                let pos = folder
                    .subfolders
                    .iter()
                    .position(|sub| &sub.name == sub_name)
                    .ok_or_else(|| RegistryError::UnknownPath(path.clone()))?;
                if !folder.subfolders[pos].documents.is_empty() {
                    return Err(RegistryError::NotEmpty(path.clone()));
                }
                folder.subfolders.remove(pos);
            }
        }
        Ok(())
    }

    /// Document list at `path`.
    pub fn documents(&self, path: &FolderPath) -> Result<&[Document]> {
        let folder = self
            .folder(&path.folder)
            .ok_or_else(|| RegistryError::UnknownPath(path.clone()))?;
        match &path.subfolder {
            None => Ok(&folder.documents),
            Some(sub_name) => folder
                .subfolder(sub_name)
                .map(|sub| sub.documents.as_slice())
                .ok_or_else(|| RegistryError::UnknownPath(path.clone())),
        }
    }

    fn documents_vec_mut(&mut self, path: &FolderPath) -> Result<&mut Vec<Document>> {
        let folder = self
            .folder_mut(&path.folder)
            .ok_or_else(|| RegistryError::UnknownPath(path.clone()))?;
        match &path.subfolder {
            None => Ok(&mut folder.documents),
            Some(sub_name) => folder
                .subfolder_mut(sub_name)
                .map(|sub| &mut sub.documents)
                .ok_or_else(|| RegistryError::UnknownPath(path.clone())),
        }
    }

    /// Append a document at `path`.
    pub fn add_document(&mut self, path: &FolderPath, document: Document) -> Result<()> {
        let id = document.id;
        self.documents_vec_mut(path)?.push(document);
        if let Some(id) = id {
            self.by_id.insert(id, path.clone());
        }
        Ok(())
    }

    /// Every document with its path, in hierarchy iteration order: each
    /// folder's own documents first, then its subfolders in order.
    pub fn documents_with_paths(&self) -> impl Iterator<Item = (FolderPath, &Document)> {
        self.folders.iter().flat_map(|folder| {
            let top = FolderPath::top(folder.name.clone());
            folder
                .documents
                .iter()
                .map(move |doc| (top.clone(), doc))
                .chain(folder.subfolders.iter().flat_map(move |sub| {
                    let path = FolderPath::sub(folder.name.clone(), sub.name.clone());
                    sub.documents.iter().map(move |doc| (path.clone(), doc))
                }))
        })
    }

    /// Path holding the document with the given persisted identity.
    pub fn document_location(&self, id: i64) -> Option<&FolderPath> {
        self.by_id.get(&id)
    }

    /// Look up a persisted document by identity.
    pub fn document(&self, id: i64) -> Option<&Document> {
        let path = self.by_id.get(&id)?;
        self.documents(path)
            .ok()?
            .iter()
            .find(|doc| doc.id == Some(id))
    }

    /// Mutable lookup by identity.
    pub fn document_mut(&mut self, id: i64) -> Option<&mut Document> {
        let path = self.by_id.get(&id)?.clone();
        self.documents_vec_mut(&path)
            .ok()?
            .iter_mut()
            .find(|doc| doc.id == Some(id))
    }

    /// Replace the document with identity `id` in place, keeping its slot
    /// and its identity. Matching is by identity, not value equality.
    pub fn update_document(&mut self, id: i64, mut document: Document) -> Result<()> {
        let slot = self
            .document_mut(id)
            .ok_or(RegistryError::UnknownDocument(id))?;
        document.id = Some(id);
        *slot = document;
        Ok(())
    }

    /// Remove the document with identity `id` from its folder list, returning
    /// it so the caller can release its attachment files.
    pub fn remove_document(&mut self, id: i64) -> Result<Document> {
        let path = self
            .by_id
            .get(&id)
            .cloned()
            .ok_or(RegistryError::UnknownDocument(id))?;
        let documents = self.documents_vec_mut(&path)?;
        let pos = documents
            .iter()
            .position(|doc| doc.id == Some(id))
            .ok_or(RegistryError::UnknownDocument(id))?;
        let document = documents.remove(pos);
        self.by_id.remove(&id);
        Ok(document)
    }

    /// Rebuild the identity index after a save or load assigned fresh ids.
    pub(crate) fn reindex(&mut self) {
        let mut by_id = HashMap::new();
        for (path, doc) in self.documents_with_paths() {
            if let Some(id) = doc.id {
                by_id.insert(id, path);
            }
        }
        self.by_id = by_id;
    }

    /// Total document count across the hierarchy.
    pub fn document_count(&self) -> usize {
        self.documents_with_paths().count()
    }
}
