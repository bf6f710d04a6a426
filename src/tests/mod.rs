//! Library tests and fixtures

mod interface_tests;
mod schema_tests;
