//! Integration tests for the time zone engine
//!
//! - Lookups against the bundled dataset, holes and region restriction
//! - Source formats and compression
//! - Concurrent lookups from many tasks sharing one engine


#[cfg(test)]
pub mod source_test;
