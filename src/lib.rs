//! Hoover - inventory aggregation across foundations.
//!
//! Collects application, service instance, relationship and account
//! snapshots from every configured foundation and merges them into
//! cross-foundation collections and reports.

pub mod aggregation;
pub mod cli;
pub mod client;
pub mod config;
pub mod gateway;
pub mod models;
pub mod report;

#[cfg(test)]
mod testing;

pub use client::SnapshotClient;
pub use config::Config;
