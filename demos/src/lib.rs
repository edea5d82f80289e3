//! Shared setup for the runnable demos.
pub mod common;
