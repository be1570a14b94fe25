//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting and pruning cache buckets.

pub mod buckets;
pub mod delete;
pub mod get;

pub use buckets::buckets_impl;
pub use delete::{CacheDeleteParams, delete_impl};
pub use get::{CacheGetParams, get_impl};
