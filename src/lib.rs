//! pgportal - prints every row of a query fetched through a server-side cursor.
//!
//! This library exposes the core modules for use by the binary and the
//! integration tests.

pub mod cli;
pub mod config;
pub mod conninfo;
pub mod error;
pub mod logging;
pub mod printer;
pub mod runner;
pub mod sequence;
pub mod session;
pub mod table;
