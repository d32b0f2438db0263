//! Service layer for greetbook.
//! - `storage`: the JSON data file and its write lock.
//! - `persons` / `reviews`: accessors over the loaded document, plus
//!   services that run one accessor per load / save cycle.
//! - Errors are reported as [`errors::ServiceError`] and never retried here.

pub mod errors;
pub mod runtime;
pub mod document;
pub mod storage;
pub mod persons;
pub mod reviews;
