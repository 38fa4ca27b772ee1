//! Conformance validators.

pub mod artifacts;
