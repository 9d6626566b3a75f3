//! # memokit core
//!
//! Small, dependable building blocks:
//!
//! - **Memoization** — [`Memo`], [`MemoSlots`] and the [`memoize`] /
//!   [`try_memoize`] wrappers compute a zero-argument method at most once per
//!   owning instance and serve the stored value afterwards.
//! - **Nested lookup** — [`access_nested_map`] walks a JSON object one key at
//!   a time and names the first key that is missing.
//! - **Delayed numbers** — [`numbers::delayed_numbers`] yields a finite stream
//!   of random floats, sleeping before each one.
//!
//! ## Cache policy
//!
//! - A computation runs at most once per (instance, accessor) pair, even when
//!   several threads race on the first read.
//! - A failed computation stores nothing; the next read retries.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod memo;
pub mod nested;
pub mod numbers;
pub mod stats;

pub use config::MemokitConfig;
pub use error::{MemokitError, Result};
pub use memo::{Memo, MemoHost, MemoKey, MemoSlots, Memoized, TryMemoized, memoize, try_memoize};
pub use nested::{access_nested_map, parse_path};
pub use stats::MemoStats;
