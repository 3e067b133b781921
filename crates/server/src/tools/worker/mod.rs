//! Lifecycle and fetch tools driving the cache controller.

pub mod activate;
pub mod fetch;
pub mod install;

pub use activate::activate_impl;
pub use fetch::{WorkerFetchParams, fetch_impl};
pub use install::install_impl;
