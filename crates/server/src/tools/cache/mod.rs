//! Cache inspection tools.
//!
//! Read-only views of the partitions the worker maintains.

pub mod entries;
pub mod partitions;

pub use entries::{CacheEntriesParams, entries_impl};
pub use partitions::partitions_impl;
