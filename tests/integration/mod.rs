//! Library-level integration tests.
//!
//! Live-server tests are skipped unless DATABASE_URL is set.

pub mod connection_test;
pub mod sequence_test;
