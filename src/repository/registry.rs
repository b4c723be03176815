//! Registry repository for SQLite persistence.

use std::path::{Path, PathBuf};

use chrono::Local;
use rusqlite::{params, Connection, Row};
use tracing::{debug, warn};

use super::{connect, parse_date, Result};
use crate::models::{Document, DATE_FORMAT};
use crate::registry::{FolderPath, Registry};

/// SQLite-backed store for the whole folder hierarchy.
///
/// Saving is a full rewrite: every row of every table is deleted and
/// re-inserted inside one transaction. Incremental sync is not worth its
/// complexity at this volume, and the transaction keeps a failed save from
/// leaving a half-written store behind.
pub struct RegistryRepository {
    db_path: PathBuf,
}

impl RegistryRepository {
    /// Create a new registry repository, ensuring the schema exists.
    pub fn new(db_path: &Path) -> Result<Self> {
        let repo = Self {
            db_path: db_path.to_path_buf(),
        };
        repo.init_schema()?;
        Ok(repo)
    }

    fn connect(&self) -> Result<Connection> {
        connect(&self.db_path)
    }

    fn init_schema(&self) -> Result<()> {
        let conn = self.connect()?;
        conn.execute_batch(
            r#"
            CREATE TABLE IF NOT EXISTS folders (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                subfolder TEXT
            );

            CREATE TABLE IF NOT EXISTS documents (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                folder TEXT NOT NULL,
                subfolder TEXT,
                number TEXT NOT NULL,
                name TEXT NOT NULL,
                counterparty TEXT NOT NULL,
                start_date TEXT NOT NULL,
                end_date TEXT,
                description TEXT NOT NULL
            );

            CREATE TABLE IF NOT EXISTS attachments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                document_id INTEGER NOT NULL,
                filename TEXT NOT NULL,
                FOREIGN KEY (document_id) REFERENCES documents(id) ON DELETE CASCADE
            );

            CREATE INDEX IF NOT EXISTS idx_documents_folder
                ON documents(folder, subfolder);
            CREATE INDEX IF NOT EXISTS idx_attachments_document
                ON attachments(document_id);
        "#,
        )?;
        Ok(())
    }

    /// Persist the whole hierarchy, replacing every stored row.
    ///
    /// Fresh identities are assigned in hierarchy order and written back into
    /// the in-memory documents; the registry's identity index is rebuilt to
    /// match.
    pub fn save_all(&self, registry: &mut Registry) -> Result<()> {
        let mut conn = self.connect()?;
        let tx = conn.transaction()?;

        tx.execute("DELETE FROM attachments", [])?;
        tx.execute("DELETE FROM documents", [])?;
        tx.execute("DELETE FROM folders", [])?;

        for folder in registry.folders() {
            tx.execute(
                "INSERT INTO folders (name, subfolder) VALUES (?1, NULL)",
                params![folder.name],
            )?;
            for sub in &folder.subfolders {
                tx.execute(
                    "INSERT INTO folders (name, subfolder) VALUES (?1, ?2)",
                    params![folder.name, sub.name],
                )?;
            }
        }

        for folder in registry.folders_mut() {
            let folder_name = folder.name.clone();
            for doc in &mut folder.documents {
                insert_document(&tx, &folder_name, None, doc)?;
            }
            for sub in &mut folder.subfolders {
                let sub_name = sub.name.clone();
                for doc in &mut sub.documents {
                    insert_document(&tx, &folder_name, Some(&sub_name), doc)?;
                }
            }
        }

        tx.commit()?;
        registry.reindex();
        debug!(documents = registry.document_count(), "registry saved");
        Ok(())
    }

    /// Rebuild the full hierarchy from stored rows.
    ///
    /// Folder rows come first so explicitly created empty folders reappear in
    /// creation order; documents and attachments follow in row-id order, which
    /// preserves the listing order of the previous session.
    pub fn load_all(&self) -> Result<Registry> {
        let conn = self.connect()?;
        let mut registry = Registry::new();

        let mut stmt = conn.prepare("SELECT name, subfolder FROM folders ORDER BY id")?;
        let folder_rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, Option<String>>(1)?))
        })?;
        for row in folder_rows {
            let (name, subfolder) = row?;
            match subfolder {
                None => {
                    registry.ensure_folder(&name);
                }
                Some(sub) => {
                    registry.ensure_subfolder(&name, &sub);
                }
            }
        }

        let mut stmt = conn.prepare(
            "SELECT id, folder, subfolder, number, name, counterparty,
                    start_date, end_date, description
             FROM documents ORDER BY id",
        )?;
        let doc_rows = stmt.query_map([], row_to_located_document)?;
        for row in doc_rows {
            let (path, doc) = row?;
            match path.subfolder.as_deref() {
                None => registry.ensure_folder(&path.folder).documents.push(doc),
                Some(sub) => registry
                    .ensure_subfolder(&path.folder, sub)
                    .documents
                    .push(doc),
            }
        }
        registry.reindex();

        let mut stmt =
            conn.prepare("SELECT document_id, filename FROM attachments ORDER BY id")?;
        let attachment_rows = stmt.query_map([], |row| {
            Ok((row.get::<_, i64>(0)?, row.get::<_, String>(1)?))
        })?;
        for row in attachment_rows {
            let (document_id, filename) = row?;
            match registry.document_mut(document_id) {
                Some(doc) => doc.attachments.push(filename),
                None => warn!(document_id, filename = %filename, "attachment row without document"),
            }
        }

        debug!(documents = registry.document_count(), "registry loaded");
        Ok(registry)
    }
}

fn insert_document(
    tx: &Connection,
    folder: &str,
    subfolder: Option<&str>,
    doc: &mut Document,
) -> Result<()> {
    tx.execute(
        r#"
        INSERT INTO documents
            (folder, subfolder, number, name, counterparty, start_date, end_date, description)
        VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
        "#,
        params![
            folder,
            subfolder,
            doc.number,
            doc.name,
            doc.counterparty,
            doc.start_date_text(),
            doc.end_date.map(|d| d.format(DATE_FORMAT).to_string()),
            doc.description,
        ],
    )?;
    let id = tx.last_insert_rowid();
    doc.id = Some(id);

    for filename in &doc.attachments {
        tx.execute(
            "INSERT INTO attachments (document_id, filename) VALUES (?1, ?2)",
            params![id, filename],
        )?;
    }
    Ok(())
}

fn row_to_located_document(row: &Row) -> rusqlite::Result<(FolderPath, Document)> {
    let path = FolderPath {
        folder: row.get("folder")?,
        subfolder: row.get("subfolder")?,
    };
    // Unparsable stored dates: start falls back to today, end to open-ended.
    let start_date = parse_date(&row.get::<_, String>("start_date")?)
        .unwrap_or_else(|| Local::now().date_naive());
    let end_date = row
        .get::<_, Option<String>>("end_date")?
        .as_deref()
        .and_then(parse_date);
    let doc = Document {
        id: Some(row.get("id")?),
        number: row.get("number")?,
        name: row.get("name")?,
        counterparty: row.get("counterparty")?,
        start_date,
        end_date,
        description: row.get("description")?,
        attachments: Vec::new(),
    };
    Ok((path, doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use tempfile::tempdir;

    use crate::models::DateInput;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn doc(number: &str, name: &str, end: Option<NaiveDate>) -> Document {
        let mut doc = Document::new(
            number.to_string(),
            name.to_string(),
            "Acme LLC".to_string(),
            DateInput::Date(date(2024, 1, 10)),
            DateInput::Unset,
            "test record".to_string(),
        );
        doc.end_date = end;
        doc
    }

    fn sample_registry() -> Registry {
        let mut registry = Registry::new();
        registry.add_folder("Incoming").unwrap();
        registry.add_folder("Contracts").unwrap();
        registry.add_subfolder("Contracts", "2024").unwrap();

        registry
            .add_document(&FolderPath::top("Incoming"), doc("INC-001", "Request", None))
            .unwrap();
        let mut with_files = doc("CNT-001", "Supply contract", Some(date(2025, 3, 1)));
        with_files.attachments = vec![
            "scan-1a2b3c4d.pdf".to_string(),
            "appendix-5e6f7a8b.docx".to_string(),
        ];
        registry
            .add_document(&FolderPath::sub("Contracts", "2024"), with_files)
            .unwrap();
        registry
    }

    #[test]
    fn test_save_assigns_ids() {
        let dir = tempdir().unwrap();
        let repo = RegistryRepository::new(&dir.path().join("registry.db")).unwrap();
        let mut registry = sample_registry();

        repo.save_all(&mut registry).unwrap();

        let ids: Vec<i64> = registry
            .documents_with_paths()
            .map(|(_, doc)| doc.id.unwrap())
            .collect();
        assert_eq!(ids.len(), 2);
        assert_ne!(ids[0], ids[1]);
        // Identity index resolves every saved document.
        for id in ids {
            assert!(registry.document(id).is_some());
        }
    }

    #[test]
    fn test_round_trip_preserves_tuples() {
        let dir = tempdir().unwrap();
        let repo = RegistryRepository::new(&dir.path().join("registry.db")).unwrap();
        let mut registry = sample_registry();
        repo.save_all(&mut registry).unwrap();

        let loaded = repo.load_all().unwrap();

        let tuples = |reg: &Registry| -> Vec<(String, String, String, String, String, String, String, Vec<String>)> {
            reg.documents_with_paths()
                .map(|(path, d)| {
                    (
                        path.to_string(),
                        d.number.clone(),
                        d.name.clone(),
                        d.counterparty.clone(),
                        d.start_date_text(),
                        d.end_date_text(),
                        d.description.clone(),
                        d.attachments.clone(),
                    )
                })
                .collect()
        };
        assert_eq!(tuples(&registry), tuples(&loaded));
    }

    #[test]
    fn test_empty_folders_survive_round_trip() {
        let dir = tempdir().unwrap();
        let repo = RegistryRepository::new(&dir.path().join("registry.db")).unwrap();
        let mut registry = Registry::new();
        registry.add_folder("Outgoing").unwrap();
        registry.add_folder("Incoming").unwrap();
        registry.add_subfolder("Incoming", "2023").unwrap();
        repo.save_all(&mut registry).unwrap();

        let loaded = repo.load_all().unwrap();
        let names: Vec<&str> = loaded.folders().iter().map(|f| f.name.as_str()).collect();
        assert_eq!(names, ["Outgoing", "Incoming"]);
        assert_eq!(loaded.folder("Incoming").unwrap().subfolders[0].name, "2023");
    }

    #[test]
    fn test_save_is_a_full_rewrite() {
        let dir = tempdir().unwrap();
        let repo = RegistryRepository::new(&dir.path().join("registry.db")).unwrap();
        let mut registry = sample_registry();
        repo.save_all(&mut registry).unwrap();

        let id = registry
            .documents(&FolderPath::top("Incoming"))
            .unwrap()
            .first()
            .unwrap()
            .id
            .unwrap();
        registry.remove_document(id).unwrap();
        repo.save_all(&mut registry).unwrap();

        let loaded = repo.load_all().unwrap();
        assert_eq!(loaded.document_count(), 1);
        assert!(loaded
            .documents(&FolderPath::top("Incoming"))
            .unwrap()
            .is_empty());
    }

    #[test]
    fn test_load_order_matches_saved_order() {
        let dir = tempdir().unwrap();
        let repo = RegistryRepository::new(&dir.path().join("registry.db")).unwrap();
        let mut registry = Registry::new();
        registry.add_folder("Incoming").unwrap();
        for n in 1..=5 {
            registry
                .add_document(
                    &FolderPath::top("Incoming"),
                    doc(&format!("INC-{n:03}"), "Letter", None),
                )
                .unwrap();
        }
        repo.save_all(&mut registry).unwrap();

        let loaded = repo.load_all().unwrap();
        let numbers: Vec<&str> = loaded
            .documents(&FolderPath::top("Incoming"))
            .unwrap()
            .iter()
            .map(|d| d.number.as_str())
            .collect();
        assert_eq!(numbers, ["INC-001", "INC-002", "INC-003", "INC-004", "INC-005"]);
    }

    #[test]
    fn test_schema_init_is_idempotent() {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("registry.db");
        let repo = RegistryRepository::new(&db_path).unwrap();
        let mut registry = sample_registry();
        repo.save_all(&mut registry).unwrap();

        // Re-opening must not disturb existing rows.
        let reopened = RegistryRepository::new(&db_path).unwrap();
        assert_eq!(reopened.load_all().unwrap().document_count(), 2);
    }
}
