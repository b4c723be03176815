//! Folder management commands.

use console::style;

use super::super::helpers::open_repository;
use crate::config::Settings;
use crate::registry::FolderPath;

/// Create a folder, or a subfolder when `parent` is given.
pub fn cmd_folder_add(
    settings: &Settings,
    name: &str,
    parent: Option<&str>,
) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let mut registry = repo.load_all()?;

    match parent {
        None => registry.add_folder(name)?,
        Some(parent) => registry.add_subfolder(parent, name)?,
    }
    repo.save_all(&mut registry)?;

    let path = match parent {
        None => FolderPath::top(name),
        Some(parent) => FolderPath::sub(parent, name),
    };
    println!("{} Created folder {}", style("✓").green(), path);
    Ok(())
}

/// Delete an empty folder or subfolder.
pub fn cmd_folder_rm(settings: &Settings, path: &FolderPath) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let mut registry = repo.load_all()?;

    registry.remove_folder(path)?;
    repo.save_all(&mut registry)?;

    println!("{} Deleted folder {}", style("✓").green(), path);
    Ok(())
}

/// List folders with document counts.
pub fn cmd_folder_list(settings: &Settings) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let registry = repo.load_all()?;

    if registry.folders().is_empty() {
        println!(
            "{} No folders yet. Run 'docreg init' first.",
            style("!").yellow()
        );
        return Ok(());
    }

    for folder in registry.folders() {
        println!(
            "{}  ({} documents)",
            style(&folder.name).bold(),
            folder.documents.len()
        );
        for sub in &folder.subfolders {
            println!("  {}/{}  ({} documents)", folder.name, sub.name, sub.documents.len());
        }
    }
    Ok(())
}
