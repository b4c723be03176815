//! Shared helper functions for CLI commands.

use crate::config::Settings;
use crate::models::DateInput;
use crate::repository::RegistryRepository;
use crate::storage::AttachmentStore;

/// Open the registry store, creating directories and schema as needed.
pub fn open_repository(settings: &Settings) -> anyhow::Result<RegistryRepository> {
    settings.ensure_directories()?;
    Ok(RegistryRepository::new(&settings.database_path())?)
}

/// Open the attachment store.
pub fn open_store(settings: &Settings) -> anyhow::Result<AttachmentStore> {
    Ok(AttachmentStore::new(&settings.attachments_dir())?)
}

/// Parse an optional date flag; an absent flag is an unset date.
pub fn parse_date_flag(text: Option<&str>) -> anyhow::Result<DateInput> {
    match text {
        None => Ok(DateInput::Unset),
        Some(text) => Ok(DateInput::parse(text)?),
    }
}

pub fn truncate(s: &str, max: usize) -> String {
    if s.len() <= max {
        s.to_string()
    } else {
        format!("{}...", &s[..max - 3])
    }
}
