//! Core types and shared functionality for netfirst.
//!
//! This crate provides:
//! - Generation-tagged cache buckets with a SQLite backend
//! - The request/response model shared by the proxy and its host
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod http;

pub use cache::{Bucket, BucketSummary, CacheDb, CacheMatch, EntryKey};
pub use config::AppConfig;
pub use error::Error;
pub use http::{Headers, ProxyRequest, ProxyResponse};
