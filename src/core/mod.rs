//! Shared primitives: storage access, configuration, errors and audit.

pub mod broker;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod schemas;
pub mod store;
pub mod time;
