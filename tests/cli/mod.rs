//! Tests that drive the pgportal binary.

pub mod binary_test;
pub mod common;
