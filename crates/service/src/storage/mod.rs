//! Storage abstractions for service layer
//!
//! Holds the single JSON file that backs every person and review, and the
//! critical section that serializes read-modify-write cycles on it.

pub mod document_store;
