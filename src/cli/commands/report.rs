//! Search, expiry, export, sweep, and status commands.

use std::path::Path;

use chrono::NaiveDate;
use console::style;

use super::super::helpers::{open_repository, open_store, truncate};
use super::super::FieldSelector;
use crate::config::Settings;
use crate::expiry::{expiring_contracts, ExpiryTier};
use crate::export::export_csv;
use crate::models::DateInput;
use crate::registry::FolderPath;
use crate::search::{search, SearchQuery};

/// Search documents across the whole hierarchy.
pub fn cmd_search(
    settings: &Settings,
    field: FieldSelector,
    text: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let registry = repo.load_all()?;

    let query = build_query(field, text, from, to)?;
    let hits = search(&registry, &query);

    if hits.is_empty() {
        println!("{} No documents found", style("!").yellow());
        return Ok(());
    }

    println!("{}", "-".repeat(78));
    println!(
        "{:<20} {:>4} {:<14} {:<24} {:<10} End",
        "Folder", "ID", "Number", "Name", "Start"
    );
    println!("{}", "-".repeat(78));
    for hit in &hits {
        let doc = hit.document;
        println!(
            "{:<20} {:>4} {:<14} {:<24} {:<10} {}",
            truncate(&hit.path.to_string(), 19),
            doc.id.unwrap_or_default(),
            truncate(&doc.number, 13),
            truncate(&doc.name, 23),
            doc.start_date_text(),
            doc.end_date_text(),
        );
    }
    println!("Documents found: {}", hits.len());
    Ok(())
}

fn build_query(
    field: FieldSelector,
    text: Option<&str>,
    from: Option<&str>,
    to: Option<&str>,
) -> anyhow::Result<SearchQuery> {
    match field {
        FieldSelector::All => Ok(SearchQuery::AllFields {
            text: required_text(text)?,
        }),
        FieldSelector::Text(field) => Ok(SearchQuery::Field {
            field,
            text: required_text(text)?,
        }),
        FieldSelector::Date(field) => Ok(SearchQuery::DateRange {
            field,
            from: parse_bound(from)?.unwrap_or(NaiveDate::MIN),
            to: parse_bound(to)?.unwrap_or(NaiveDate::MAX),
        }),
    }
}

fn required_text(text: Option<&str>) -> anyhow::Result<String> {
    text.map(str::to_string)
        .ok_or_else(|| anyhow::anyhow!("--text is required for text searches"))
}

fn parse_bound(text: Option<&str>) -> anyhow::Result<Option<NaiveDate>> {
    match text {
        None => Ok(None),
        Some(text) => Ok(DateInput::parse(text)?.into_option()),
    }
}

/// List contracts expiring within the threshold, tagged by severity tier.
pub fn cmd_expiring(settings: &Settings, days: Option<i64>) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let registry = repo.load_all()?;

    let threshold = days.unwrap_or(settings.expiry_threshold_days);
    let expiring = expiring_contracts(&registry, &settings.contracts_folder, threshold);

    if expiring.is_empty() {
        println!(
            "{} No contracts expiring within {} days",
            style("✓").green(),
            threshold
        );
        return Ok(());
    }

    println!("{}", "-".repeat(78));
    println!(
        "{:<8} {:<20} {:>4} {:<14} {:<24} {:>5}",
        "Tier", "Folder", "ID", "Number", "Name", "Days"
    );
    println!("{}", "-".repeat(78));
    for entry in &expiring {
        let tier = match entry.tier {
            ExpiryTier::Urgent => style(entry.tier.as_str()).red(),
            ExpiryTier::Warning => style(entry.tier.as_str()).yellow(),
            ExpiryTier::Normal => style(entry.tier.as_str()).dim(),
        };
        println!(
            "{:<8} {:<20} {:>4} {:<14} {:<24} {:>5}",
            tier,
            truncate(&entry.path.to_string(), 19),
            entry.document.id.unwrap_or_default(),
            truncate(&entry.document.number, 13),
            truncate(&entry.document.name, 23),
            entry.days_left,
        );
    }
    println!(
        "Expiring contracts: {}. Threshold: {} days",
        expiring.len(),
        threshold
    );
    Ok(())
}

/// Export a folder's documents to a CSV file.
pub fn cmd_export(settings: &Settings, path: &FolderPath, output: &Path) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let registry = repo.load_all()?;

    let documents = registry.documents(path)?;
    if documents.is_empty() {
        println!("{} No documents to export in {}", style("!").yellow(), path);
        return Ok(());
    }

    export_csv(documents, output)?;
    println!(
        "{} Exported {} documents to {}",
        style("✓").green(),
        documents.len(),
        output.display()
    );
    Ok(())
}

/// Delete attachment files no document references.
pub fn cmd_sweep(settings: &Settings) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let store = open_store(settings)?;
    let registry = repo.load_all()?;

    let removed = store.sweep_orphans(&registry)?;
    println!(
        "{} Deleted {} orphaned attachment file(s)",
        style("✓").green(),
        removed
    );
    Ok(())
}

/// Show document counts per folder.
pub fn cmd_status(settings: &Settings) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let registry = repo.load_all()?;

    println!("\n{}", style("Document registry").bold());
    println!("  Data directory: {}", settings.data_dir.display());
    for folder in registry.folders() {
        let total: usize = folder.documents.len()
            + folder
                .subfolders
                .iter()
                .map(|sub| sub.documents.len())
                .sum::<usize>();
        println!("  {:<24} {}", folder.name, total);
    }
    println!("  Total documents: {}", registry.document_count());
    Ok(())
}
