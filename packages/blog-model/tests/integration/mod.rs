//! Integration tests for the blog model.
//!
//! 1. Entity lifecycle, queries and relations
//! 2. Fixture loading

pub mod basic_tests;
