//! Document record model.
//!
//! A document carries the registered field values plus the list of stored
//! attachment filenames. The database identity is assigned on first save and
//! stays `None` for records that were never persisted.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Textual date format used at every boundary (user input, database, export).
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Error for date text that is neither empty nor a valid `dd.mm.yyyy` date.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid date '{input}', expected dd.mm.yyyy")]
pub struct DateParseError {
    pub input: String,
}

/// A user-entered date field: either a concrete date or explicitly unset.
///
/// Invalid text is an error at the boundary, never silently replaced with
/// the current date.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateInput {
    Unset,
    Date(NaiveDate),
}

impl DateInput {
    /// Parse user-entered text. Empty (or whitespace-only) text is `Unset`.
    pub fn parse(text: &str) -> Result<Self, DateParseError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Ok(Self::Unset);
        }
        NaiveDate::parse_from_str(trimmed, DATE_FORMAT)
            .map(Self::Date)
            .map_err(|_| DateParseError {
                input: trimmed.to_string(),
            })
    }

    /// Resolve to a concrete date, substituting `fallback` when unset.
    pub fn unwrap_or(self, fallback: NaiveDate) -> NaiveDate {
        match self {
            Self::Unset => fallback,
            Self::Date(date) => date,
        }
    }

    /// Resolve to an optional date.
    pub fn into_option(self) -> Option<NaiveDate> {
        match self {
            Self::Unset => None,
            Self::Date(date) => Some(date),
        }
    }
}

/// A registered document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    /// Database row id. `None` until the document is first saved.
    pub id: Option<i64>,
    /// Registration number.
    pub number: String,
    /// Document title.
    pub name: String,
    /// Counterparty organization.
    pub counterparty: String,
    /// Registration or validity start date.
    pub start_date: NaiveDate,
    /// Validity end date. `None` means open-ended.
    pub end_date: Option<NaiveDate>,
    /// Free-form description.
    pub description: String,
    /// Stored attachment filenames, in attach order.
    pub attachments: Vec<String>,
}

impl Document {
    /// Create an unsaved document. An unset start date resolves to today.
    pub fn new(
        number: String,
        name: String,
        counterparty: String,
        start_date: DateInput,
        end_date: DateInput,
        description: String,
    ) -> Self {
        Self {
            id: None,
            number,
            name,
            counterparty,
            start_date: start_date.unwrap_or(Local::now().date_naive()),
            end_date: end_date.into_option(),
            description,
            attachments: Vec::new(),
        }
    }

    /// Signed days from `today` to the end date; `None` when open-ended.
    pub fn days_until_expiry_on(&self, today: NaiveDate) -> Option<i64> {
        self.end_date
            .map(|end| end.signed_duration_since(today).num_days())
    }

    /// Whether the document expires within `[0, threshold_days]` of `today`.
    ///
    /// Past-due documents do not count; only the forward-looking window does.
    pub fn is_expiring_on(&self, today: NaiveDate, threshold_days: i64) -> bool {
        match self.days_until_expiry_on(today) {
            Some(days_left) => (0..=threshold_days).contains(&days_left),
            None => false,
        }
    }

    /// [`is_expiring_on`](Self::is_expiring_on) against the current local date.
    pub fn is_expiring(&self, threshold_days: i64) -> bool {
        self.is_expiring_on(Local::now().date_naive(), threshold_days)
    }

    /// Start date rendered as `dd.mm.yyyy`.
    pub fn start_date_text(&self) -> String {
        self.start_date.format(DATE_FORMAT).to_string()
    }

    /// End date rendered as `dd.mm.yyyy`; empty when open-ended.
    pub fn end_date_text(&self) -> String {
        self.end_date
            .map(|date| date.format(DATE_FORMAT).to_string())
            .unwrap_or_default()
    }

    /// Attachment filenames joined with `", "`.
    ///
    /// Filenames containing the separator will not round-trip through this
    /// rendering; the joined form is for display and export only.
    pub fn attachments_joined(&self) -> String {
        self.attachments.join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn contract(end_date: Option<NaiveDate>) -> Document {
        Document {
            id: None,
            number: "CNT-001".to_string(),
            name: "Supply contract".to_string(),
            counterparty: "Acme LLC".to_string(),
            start_date: date(2024, 1, 10),
            end_date,
            description: String::new(),
            attachments: Vec::new(),
        }
    }

    #[test]
    fn test_date_input_parses_dotted_format() {
        assert_eq!(
            DateInput::parse("05.03.2024"),
            Ok(DateInput::Date(date(2024, 3, 5)))
        );
    }

    #[test]
    fn test_date_input_empty_is_unset() {
        assert_eq!(DateInput::parse(""), Ok(DateInput::Unset));
        assert_eq!(DateInput::parse("   "), Ok(DateInput::Unset));
    }

    #[test]
    fn test_date_input_rejects_garbage() {
        assert!(DateInput::parse("2024-03-05").is_err());
        assert!(DateInput::parse("31.02.2024").is_err());
        assert!(DateInput::parse("soon").is_err());
    }

    #[test]
    fn test_no_end_date_never_expires() {
        let doc = contract(None);
        let today = date(2024, 6, 1);
        for threshold in [0, 7, 30, 365, 10_000] {
            assert!(!doc.is_expiring_on(today, threshold));
        }
    }

    #[test]
    fn test_expiry_window_boundaries() {
        let today = date(2024, 6, 1);
        let at_threshold = contract(Some(date(2024, 7, 1)));
        assert!(at_threshold.is_expiring_on(today, 30));
        let past_threshold = contract(Some(date(2024, 7, 2)));
        assert!(!past_threshold.is_expiring_on(today, 30));
    }

    #[test]
    fn test_expiring_today_counts() {
        let today = date(2024, 6, 1);
        let doc = contract(Some(today));
        assert!(doc.is_expiring_on(today, 0));
    }

    #[test]
    fn test_past_due_does_not_count() {
        let today = date(2024, 6, 1);
        let doc = contract(Some(date(2024, 5, 20)));
        assert!(!doc.is_expiring_on(today, 0));
        assert!(!doc.is_expiring_on(today, 30));
        assert!(!doc.is_expiring_on(today, 10_000));
    }

    #[test]
    fn test_date_text_rendering() {
        let doc = contract(Some(date(2024, 12, 31)));
        assert_eq!(doc.start_date_text(), "10.01.2024");
        assert_eq!(doc.end_date_text(), "31.12.2024");
        assert_eq!(contract(None).end_date_text(), "");
    }

    #[test]
    fn test_attachments_joined() {
        let mut doc = contract(None);
        assert_eq!(doc.attachments_joined(), "");
        doc.attachments = vec!["scan-1a2b3c4d.pdf".to_string(), "act-5e6f7a8b.docx".to_string()];
        assert_eq!(doc.attachments_joined(), "scan-1a2b3c4d.pdf, act-5e6f7a8b.docx");
    }
}
