#![forbid(unsafe_code)]

//! StudentCredo — Runtime
//!
//! Wraps the kernel with key-value persistence, change notification,
//! snapshots and configuration.
//!
//! No scoring or transition rules live here; they are delegated to
//! the kernel.

pub mod error;
pub mod store;
pub mod event_bus;
pub mod clock;
pub mod data_manager;
pub mod snapshot;
pub mod config;

pub use data_manager::DataManager;
