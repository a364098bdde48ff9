//! SQLite-backed partitioned response cache.
//!
//! This module provides a persistent store of response snapshots grouped
//! into named partitions, using SQLite with async access via
//! tokio-rusqlite. It supports:
//!
//! - Independent named partitions, deleted as a unit
//! - Entries keyed by a SHA-256 hash of method and absolute URL
//! - Ordered lookup across several partitions
//! - Automatic schema migrations
//! - WAL mode for concurrent access

pub mod connection;
pub mod entries;
pub mod hash;
pub mod migrations;
pub mod partitions;
pub mod response;

pub use crate::Error;

pub use connection::CacheDb;
pub use partitions::PartitionInfo;
pub use response::ResponseSnapshot;
