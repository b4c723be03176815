//! Text and date-range search over the whole hierarchy.
//!
//! A linear scan in hierarchy iteration order; no ranking. Volumes are small
//! enough that nothing smarter pays for itself.

use chrono::NaiveDate;

use crate::models::Document;
use crate::registry::{FolderPath, Registry};

/// Text fields a search can target individually.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextField {
    Number,
    Name,
    Counterparty,
    Description,
}

impl TextField {
    fn value<'a>(&self, doc: &'a Document) -> &'a str {
        match self {
            Self::Number => &doc.number,
            Self::Name => &doc.name,
            Self::Counterparty => &doc.counterparty,
            Self::Description => &doc.description,
        }
    }
}

/// Date fields a search can range over.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateField {
    Start,
    End,
}

/// A search request.
#[derive(Debug, Clone)]
pub enum SearchQuery {
    /// Case-insensitive substring match; any one of the four text fields
    /// qualifies the document.
    AllFields { text: String },
    /// Case-insensitive substring match against a single field.
    Field { field: TextField, text: String },
    /// The date field is present and within the inclusive range.
    DateRange {
        field: DateField,
        from: NaiveDate,
        to: NaiveDate,
    },
}

/// A matching document together with the folder path holding it.
#[derive(Debug)]
pub struct SearchHit<'a> {
    pub path: FolderPath,
    pub document: &'a Document,
}

/// Scan every document in every folder and subfolder.
pub fn search<'a>(registry: &'a Registry, query: &SearchQuery) -> Vec<SearchHit<'a>> {
    registry
        .documents_with_paths()
        .filter(|(_, doc)| matches(doc, query))
        .map(|(path, document)| SearchHit { path, document })
        .collect()
}

fn matches(doc: &Document, query: &SearchQuery) -> bool {
    match query {
        SearchQuery::AllFields { text } => [
            TextField::Number,
            TextField::Name,
            TextField::Counterparty,
            TextField::Description,
        ]
        .iter()
        .any(|field| contains_ci(field.value(doc), text)),
        SearchQuery::Field { field, text } => contains_ci(field.value(doc), text),
        SearchQuery::DateRange { field, from, to } => {
            let value = match field {
                DateField::Start => Some(doc.start_date),
                DateField::End => doc.end_date,
            };
            value.is_some_and(|date| (*from..=*to).contains(&date))
        }
    }
}

fn contains_ci(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::DateInput;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn doc(number: &str, name: &str, counterparty: &str) -> Document {
        Document::new(
            number.to_string(),
            name.to_string(),
            counterparty.to_string(),
            DateInput::Date(date(2024, 2, 1)),
            DateInput::Unset,
            String::new(),
        )
    }

    fn sample_registry() -> Registry {
        let mut registry = Registry::new();
        registry.add_folder("Incoming").unwrap();
        registry.add_folder("Contracts").unwrap();
        registry.add_subfolder("Contracts", "2024").unwrap();

        registry
            .add_document(
                &FolderPath::top("Incoming"),
                doc("INC-001", "Invoice for equipment", "Acme LLC"),
            )
            .unwrap();
        registry
            .add_document(
                &FolderPath::top("Incoming"),
                doc("INC-002", "Information request", "Beta Corp"),
            )
            .unwrap();
        let mut contract = doc("CNT-001", "Supply contract", "Acme LLC");
        contract.start_date = date(2024, 6, 15);
        contract.end_date = Some(date(2025, 6, 15));
        registry
            .add_document(&FolderPath::sub("Contracts", "2024"), contract)
            .unwrap();
        registry
    }

    #[test]
    fn test_all_fields_is_case_insensitive() {
        let registry = sample_registry();
        let hits = search(
            &registry,
            &SearchQuery::AllFields {
                text: "invoice".to_string(),
            },
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.number, "INC-001");
        assert_eq!(hits[0].path, FolderPath::top("Incoming"));
    }

    #[test]
    fn test_all_fields_hits_any_text_field() {
        let registry = sample_registry();
        let hits = search(
            &registry,
            &SearchQuery::AllFields {
                text: "acme".to_string(),
            },
        );
        let numbers: Vec<&str> = hits.iter().map(|h| h.document.number.as_str()).collect();
        assert_eq!(numbers, ["INC-001", "CNT-001"]);
    }

    #[test]
    fn test_single_field_does_not_leak_to_others() {
        let registry = sample_registry();
        let hits = search(
            &registry,
            &SearchQuery::Field {
                field: TextField::Name,
                text: "acme".to_string(),
            },
        );
        assert!(hits.is_empty());
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let registry = sample_registry();
        let hits = search(
            &registry,
            &SearchQuery::DateRange {
                field: DateField::Start,
                from: date(2024, 6, 15),
                to: date(2024, 6, 15),
            },
        );
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.number, "CNT-001");
    }

    #[test]
    fn test_end_date_search_skips_open_ended() {
        let registry = sample_registry();
        let hits = search(
            &registry,
            &SearchQuery::DateRange {
                field: DateField::End,
                from: NaiveDate::MIN,
                to: NaiveDate::MAX,
            },
        );
        // Only the contract carries an end date.
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].document.number, "CNT-001");
    }
}
