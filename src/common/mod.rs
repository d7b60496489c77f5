//! Common utilities shared across modules
//!
//! - `path_normalizer`: canonical repository-relative paths

pub mod path_normalizer;
