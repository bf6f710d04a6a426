//! Declarative macros used across the crate.

#[macro_use]
mod tracing;
