//! Tabular export of a folder's document list.

use std::io::Write;
use std::path::Path;

use serde::Serialize;

use crate::models::Document;

/// One export row. Dates render as `dd.mm.yyyy`; attachments are joined with
/// `", "` (filenames containing the separator will not round-trip).
#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    number: &'a str,
    name: &'a str,
    counterparty: &'a str,
    start_date: String,
    end_date: String,
    description: &'a str,
    attachments: String,
}

impl<'a> From<&'a Document> for ExportRecord<'a> {
    fn from(doc: &'a Document) -> Self {
        Self {
            number: &doc.number,
            name: &doc.name,
            counterparty: &doc.counterparty,
            start_date: doc.start_date_text(),
            end_date: doc.end_date_text(),
            description: &doc.description,
            attachments: doc.attachments_joined(),
        }
    }
}

/// Write the documents as CSV with a header row.
pub fn write_csv<W: Write>(documents: &[Document], writer: W) -> csv::Result<()> {
    let mut writer = csv::Writer::from_writer(writer);
    for doc in documents {
        writer.serialize(ExportRecord::from(doc))?;
    }
    writer.flush()?;
    Ok(())
}

/// One-shot export of a document list to a CSV file at `path`.
pub fn export_csv(documents: &[Document], path: &Path) -> csv::Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for doc in documents {
        writer.serialize(ExportRecord::from(doc))?;
    }
    writer.flush()?;
    Ok(())
}
