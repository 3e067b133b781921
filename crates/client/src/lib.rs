//! Client code for mcp-offline.
//!
//! This crate provides the network seam and the cache controller that the
//! server drives: lifecycle, request routing and caching strategies.

pub mod fetch;
pub mod worker;

pub use fetch::{FetchClient, FetchConfig, FetchRequest, FetchResponse, Network};
pub use worker::{
    ActivateOutcome, Bypass, CacheController, ControllerConfig, Destination, InstallOutcome, InterceptedRequest,
    RequestMode, ResponseSource, Route, WorkerResponse, WorkerState,
};
