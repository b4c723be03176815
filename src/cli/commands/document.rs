//! Document CRUD commands.

use console::style;

use super::super::helpers::{open_repository, open_store, parse_date_flag, truncate};
use crate::config::Settings;
use crate::models::{DateInput, Document};
use crate::registry::FolderPath;

/// Field values for a new document.
pub struct DocFields {
    pub number: String,
    pub name: String,
    pub counterparty: String,
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: String,
}

/// Optional field updates for an existing document.
pub struct DocEdits {
    pub number: Option<String>,
    pub name: Option<String>,
    pub counterparty: Option<String>,
    pub start: Option<String>,
    pub end: Option<String>,
    pub description: Option<String>,
}

/// Register a document at a folder path.
pub fn cmd_doc_add(settings: &Settings, path: &FolderPath, fields: DocFields) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let mut registry = repo.load_all()?;

    let doc = Document::new(
        fields.number,
        fields.name,
        fields.counterparty,
        parse_date_flag(fields.start.as_deref())?,
        parse_date_flag(fields.end.as_deref())?,
        fields.description,
    );
    registry.add_document(path, doc)?;
    repo.save_all(&mut registry)?;

    // The save assigned the identity; the new document is last in its list.
    let saved = registry.documents(path)?.last().cloned();
    let (id, number) = saved
        .map(|doc| (doc.id.unwrap_or_default(), doc.number))
        .unwrap_or_default();
    println!(
        "{} Registered document {} (id {}) in {}",
        style("✓").green(),
        number,
        id,
        path
    );
    Ok(())
}

/// Edit fields of a document addressed by identity.
pub fn cmd_doc_edit(settings: &Settings, id: i64, edits: DocEdits) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let mut registry = repo.load_all()?;

    let start = edits.start.as_deref().map(DateInput::parse).transpose()?;
    let end = edits.end.as_deref().map(DateInput::parse).transpose()?;

    {
        let doc = registry
            .document_mut(id)
            .ok_or_else(|| anyhow::anyhow!("no document with id {id}"))?;
        if let Some(number) = edits.number {
            doc.number = number;
        }
        if let Some(name) = edits.name {
            doc.name = name;
        }
        if let Some(counterparty) = edits.counterparty {
            doc.counterparty = counterparty;
        }
        if let Some(start) = start {
            doc.start_date = start.unwrap_or(chrono::Local::now().date_naive());
        }
        if let Some(end) = end {
            doc.end_date = end.into_option();
        }
        if let Some(description) = edits.description {
            doc.description = description;
        }
    }
    repo.save_all(&mut registry)?;

    println!("{} Updated document id {}", style("✓").green(), id);
    Ok(())
}

/// Delete a document and its attachment files.
pub fn cmd_doc_rm(settings: &Settings, id: i64) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let store = open_store(settings)?;
    let mut registry = repo.load_all()?;

    let doc = registry.remove_document(id)?;
    store.remove_all(doc.attachments.iter().map(String::as_str));
    repo.save_all(&mut registry)?;

    println!(
        "{} Deleted document {} (id {})",
        style("✓").green(),
        doc.number,
        id
    );
    Ok(())
}

/// Show a document's full record.
pub fn cmd_doc_show(settings: &Settings, id: i64) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let registry = repo.load_all()?;

    let doc = registry
        .document(id)
        .ok_or_else(|| anyhow::anyhow!("no document with id {id}"))?;
    let path = registry
        .document_location(id)
        .map(|path| path.to_string())
        .unwrap_or_default();

    println!("{}", style(&doc.number).bold());
    println!("  Folder:       {}", path);
    println!("  Name:         {}", doc.name);
    println!("  Counterparty: {}", doc.counterparty);
    println!("  Start date:   {}", doc.start_date_text());
    println!(
        "  End date:     {}",
        if doc.end_date.is_some() {
            doc.end_date_text()
        } else {
            "open-ended".to_string()
        }
    );
    println!("  Description:  {}", doc.description);
    println!(
        "  Attachments:  {}",
        if doc.attachments.is_empty() {
            "none".to_string()
        } else {
            doc.attachments_joined()
        }
    );
    Ok(())
}

/// List documents at a folder path.
pub fn cmd_doc_list(settings: &Settings, path: &FolderPath) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let registry = repo.load_all()?;
    let documents = registry.documents(path)?;

    if documents.is_empty() {
        println!("{} No documents in {}", style("!").yellow(), path);
        return Ok(());
    }

    println!("\n{}", style(path.to_string()).bold());
    println!("{}", "-".repeat(78));
    println!(
        "{:>4} {:<14} {:<28} {:<16} {:<10} End",
        "ID", "Number", "Name", "Counterparty", "Start"
    );
    println!("{}", "-".repeat(78));
    for doc in documents {
        println!(
            "{:>4} {:<14} {:<28} {:<16} {:<10} {}",
            doc.id.unwrap_or_default(),
            truncate(&doc.number, 13),
            truncate(&doc.name, 27),
            truncate(&doc.counterparty, 15),
            doc.start_date_text(),
            doc.end_date_text(),
        );
    }
    println!("Documents: {}", documents.len());
    Ok(())
}
