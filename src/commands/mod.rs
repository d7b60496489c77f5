//! Command implementations for the provenance CLI

pub mod clean_cache;
pub mod resolve;
