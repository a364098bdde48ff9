//! Network side of tether.
//!
//! This crate provides the HTTP fetch pipeline used by the worker, the
//! [`Fetcher`] seam the caching strategies are written against, and URL
//! helpers for same-origin classification.

pub mod fetch;

pub use fetch::{FetchClient, FetchConfig, FetchResponse, Fetcher};
pub use fetch::url::{UrlError, canonicalize, resolve, same_origin};
