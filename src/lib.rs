//! Document registry: a record-keeping system for organizational documents
//! (correspondence, contracts) grouped into a two-level folder hierarchy,
//! with SQLite persistence, file attachments, search, and expiry reporting.

pub mod cli;
pub mod config;
pub mod export;
pub mod expiry;
pub mod models;
pub mod registry;
pub mod repository;
pub mod search;
pub mod storage;
