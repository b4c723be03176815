//! Contract expiry reporting.

use chrono::{Local, NaiveDate};

use crate::models::Document;
use crate::registry::{FolderPath, Registry};

/// Days left at or under which a match is urgent.
pub const URGENT_MAX_DAYS: i64 = 7;
/// Days left at or under which a match is a warning.
pub const WARNING_MAX_DAYS: i64 = 14;

/// Severity tier of an expiring document, by days left.
///
/// Boundaries are fixed constants, independent of the caller's threshold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExpiryTier {
    Urgent,
    Warning,
    Normal,
}

impl ExpiryTier {
    pub fn classify(days_left: i64) -> Self {
        if days_left <= URGENT_MAX_DAYS {
            Self::Urgent
        } else if days_left <= WARNING_MAX_DAYS {
            Self::Warning
        } else {
            Self::Normal
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Urgent => "urgent",
            Self::Warning => "warning",
            Self::Normal => "normal",
        }
    }
}

/// An expiring document with its location and classification.
#[derive(Debug)]
pub struct ExpiringDocument<'a> {
    pub path: FolderPath,
    pub document: &'a Document,
    pub days_left: i64,
    pub tier: ExpiryTier,
}

/// Documents under the contracts folder (including its subfolders) expiring
/// within `threshold_days` of `today`, in hierarchy order.
pub fn expiring_contracts_on<'a>(
    registry: &'a Registry,
    contracts_folder: &str,
    threshold_days: i64,
    today: NaiveDate,
) -> Vec<ExpiringDocument<'a>> {
    registry
        .documents_with_paths()
        .filter(|(path, _)| path.folder == contracts_folder)
        .filter_map(|(path, document)| {
            let days_left = document.days_until_expiry_on(today)?;
            if !(0..=threshold_days).contains(&days_left) {
                return None;
            }
            Some(ExpiringDocument {
                path,
                document,
                days_left,
                tier: ExpiryTier::classify(days_left),
            })
        })
        .collect()
}

/// [`expiring_contracts_on`] against the current local date.
pub fn expiring_contracts<'a>(
    registry: &'a Registry,
    contracts_folder: &str,
    threshold_days: i64,
) -> Vec<ExpiringDocument<'a>> {
    expiring_contracts_on(
        registry,
        contracts_folder,
        threshold_days,
        Local::now().date_naive(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateInput;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contract(number: &str, end: NaiveDate) -> Document {
        let mut doc = Document::new(
            number.to_string(),
            "Contract".to_string(),
            "Acme LLC".to_string(),
            DateInput::Date(date(2024, 1, 1)),
            DateInput::Unset,
            String::new(),
        );
        doc.end_date = Some(end);
        doc
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(ExpiryTier::classify(0), ExpiryTier::Urgent);
        assert_eq!(ExpiryTier::classify(7), ExpiryTier::Urgent);
        assert_eq!(ExpiryTier::classify(8), ExpiryTier::Warning);
        assert_eq!(ExpiryTier::classify(14), ExpiryTier::Warning);
        assert_eq!(ExpiryTier::classify(15), ExpiryTier::Normal);
        assert_eq!(ExpiryTier::classify(365), ExpiryTier::Normal);
    }

    #[test]
    fn test_subfolder_contract_reported_urgent() {
        let today = date(2024, 6, 1);
        let mut registry = Registry::new();
        registry.add_folder("Contracts").unwrap();
        registry.add_subfolder("Contracts", "2024").unwrap();
        registry
            .add_document(
                &FolderPath::sub("Contracts", "2024"),
                contract("CNT-001", date(2024, 6, 6)),
            )
            .unwrap();

        let expiring = expiring_contracts_on(&registry, "Contracts", 7, today);
        assert_eq!(expiring.len(), 1);
        let hit = &expiring[0];
        assert_eq!(hit.document.number, "CNT-001");
        assert_eq!(hit.days_left, 5);
        assert_eq!(hit.tier, ExpiryTier::Urgent);
        assert_eq!(hit.path, FolderPath::sub("Contracts", "2024"));
    }

    #[test]
    fn test_other_folders_are_ignored() {
        let today = date(2024, 6, 1);
        let mut registry = Registry::new();
        registry.add_folder("Incoming").unwrap();
        registry.add_folder("Contracts").unwrap();
        registry
            .add_document(
                &FolderPath::top("Incoming"),
                contract("INC-001", date(2024, 6, 3)),
            )
            .unwrap();
        registry
            .add_document(
                &FolderPath::top("Contracts"),
                contract("CNT-001", date(2024, 6, 3)),
            )
            .unwrap();

        let expiring = expiring_contracts_on(&registry, "Contracts", 30, today);
        let numbers: Vec<&str> = expiring.iter().map(|e| e.document.number.as_str()).collect();
        assert_eq!(numbers, ["CNT-001"]);
    }

    #[test]
    fn test_threshold_does_not_move_tier_boundaries() {
        let today = date(2024, 6, 1);
        let mut registry = Registry::new();
        registry.add_folder("Contracts").unwrap();
        registry
            .add_document(
                &FolderPath::top("Contracts"),
                contract("CNT-001", date(2024, 6, 11)),
            )
            .unwrap();

        // 10 days left stays a warning whatever the threshold.
        for threshold in [10, 14, 180] {
            let expiring = expiring_contracts_on(&registry, "Contracts", threshold, today);
            assert_eq!(expiring[0].tier, ExpiryTier::Warning);
        }
    }

    #[test]
    fn test_past_due_and_open_ended_excluded() {
        let today = date(2024, 6, 1);
        let mut registry = Registry::new();
        registry.add_folder("Contracts").unwrap();
        registry
            .add_document(
                &FolderPath::top("Contracts"),
                contract("CNT-OLD", date(2024, 5, 1)),
            )
            .unwrap();
        let mut open_ended = contract("CNT-OPEN", today);
        open_ended.end_date = None;
        registry
            .add_document(&FolderPath::top("Contracts"), open_ended)
            .unwrap();

        assert!(expiring_contracts_on(&registry, "Contracts", 365, today).is_empty());
    }
}
