//! Configuration file handling
//!
//! This module contains data structures for:
//! - `provenance.yaml` - Resolver configuration

pub mod resolver_config;

pub use resolver_config::ResolverConfig;
