//! Core types and shared functionality for mcp-offline.
//!
//! This crate provides:
//! - Named cache storage with SQLite backend
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;

pub use cache::{CacheKind, CacheNames, CacheStorage, NamedCache, ResponseType, StoredResponse};
pub use config::{AppConfig, ConfigError};
pub use error::Error;
