//! Shared test utilities for the dropdir workspace.
//!
//! Dev-dependency only, never published.
//!
//! # Modules
//!
//! - [`storage`]: [`TestStorage`](storage::TestStorage), a scratch registry
//!   plus base location
//! - [`tree`]: source tree fixtures and tree comparison

pub mod storage;
pub mod tree;
