//! Initialize command.

use console::style;

use super::super::helpers::open_repository;
use crate::config::Settings;

/// Standard folders seeded into a fresh registry.
const SEED_FOLDERS: [&str; 2] = ["Incoming", "Outgoing"];

/// Initialize the data directory and database.
pub fn cmd_init(settings: &Settings) -> anyhow::Result<()> {
    let repo = open_repository(settings)?;
    let mut registry = repo.load_all()?;

    if registry.folders().is_empty() {
        for name in SEED_FOLDERS {
            registry.add_folder(name)?;
            println!("  {} Added folder: {}", style("✓").green(), name);
        }
        registry.add_folder(&settings.contracts_folder)?;
        println!(
            "  {} Added folder: {}",
            style("✓").green(),
            settings.contracts_folder
        );
        repo.save_all(&mut registry)?;
    }

    println!(
        "{} Initialized registry in {}",
        style("✓").green(),
        settings.data_dir.display()
    );
    Ok(())
}
