//! Attachment management commands.

use std::path::Path;

use console::style;
use tracing::warn;

use super::super::helpers::{open_repository, open_store};
use crate::config::Settings;

/// Copy a file into the store and reference it from a document.
pub fn cmd_attach_add(settings: &Settings, id: i64, file: &Path) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let store = open_store(settings)?;
    let mut registry = repo.load_all()?;

    let stored = {
        let doc = registry
            .document_mut(id)
            .ok_or_else(|| anyhow::anyhow!("no document with id {id}"))?;
        let stored = store.attach(file)?;
        doc.attachments.push(stored.clone());
        stored
    };
    repo.save_all(&mut registry)?;

    println!(
        "{} Attached {} to document id {}",
        style("✓").green(),
        stored,
        id
    );
    Ok(())
}

/// Drop a stored file from a document and delete it from disk.
pub fn cmd_attach_rm(settings: &Settings, id: i64, filename: &str) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let store = open_store(settings)?;
    let mut registry = repo.load_all()?;

    {
        let doc = registry
            .document_mut(id)
            .ok_or_else(|| anyhow::anyhow!("no document with id {id}"))?;
        let pos = doc
            .attachments
            .iter()
            .position(|name| name == filename)
            .ok_or_else(|| anyhow::anyhow!("document id {id} has no attachment '{filename}'"))?;
        doc.attachments.remove(pos);
    }
    // The reference is gone either way; a failed delete leaves an orphan for
    // the next sweep.
    if let Err(err) = store.remove(filename) {
        warn!(filename, %err, "failed to delete attachment file");
    }
    repo.save_all(&mut registry)?;

    println!(
        "{} Removed {} from document id {}",
        style("✓").green(),
        filename,
        id
    );
    Ok(())
}

/// List a document's attachments.
pub fn cmd_attach_list(settings: &Settings, id: i64) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let store = open_store(settings)?;
    let registry = repo.load_all()?;

    let doc = registry
        .document(id)
        .ok_or_else(|| anyhow::anyhow!("no document with id {id}"))?;

    if doc.attachments.is_empty() {
        println!("{} Document id {} has no attachments", style("!").yellow(), id);
        return Ok(());
    }

    for filename in &doc.attachments {
        let marker = if store.path_of(filename).exists() {
            style("✓").green()
        } else {
            style("missing").red()
        };
        println!("{} {}", marker, filename);
    }
    Ok(())
}
