//! Client code for netfirst.
//!
//! This crate provides the network layer and the interception cache proxy
//! that sits between a page and that network.

pub mod fetch;
pub mod worker;

pub use fetch::{FetchClient, FetchConfig, Network, NetworkError};
pub use worker::{ActivateOutcome, InstallOutcome, InterceptionProxy, ResponseSource, Route, Served, WorkerState};
