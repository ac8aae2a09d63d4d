//! Internal helpers shared by the source implementations.

pub(crate) mod log_sanitizer;
