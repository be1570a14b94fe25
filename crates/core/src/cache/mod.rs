//! SQLite-backed host cache storage.
//!
//! Models the host platform's cache API: named buckets (one per generation)
//! holding request -> response entries. It supports:
//!
//! - Opening a bucket by name, creating it on first use
//! - Match / put (overwrite) / keys within a bucket
//! - Whole-bucket deletion with cascading entry removal
//! - Enumerating every bucket ever created (the generation registry)

pub mod buckets;
pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;

pub use crate::Error;

pub use buckets::BucketSummary;
pub use connection::CacheDb;
pub use entries::{Bucket, CacheMatch, EntryKey};
