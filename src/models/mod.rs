//! Data models for the document registry.

mod document;

pub use document::{DateInput, DateParseError, Document, DATE_FORMAT};
