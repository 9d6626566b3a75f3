//! # memokit-http — JSON over HTTP
//!
//! Fetches a URL and returns its parsed JSON body:
//!
//! - [`JsonTransport`] is the seam: [`ReqwestTransport`] talks to the network,
//!   tests substitute their own implementation.
//! - [`get_json`] issues exactly one GET per call. No retry, no caching.
//! - [`JsonResource`] layers memoization on top: the first successful fetch
//!   is kept, failures are retried on the next read.

#![deny(clippy::unwrap_used)]
#![deny(missing_docs)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod fetch;
pub mod resource;
pub mod transport;

pub use error::FetchError;
pub use fetch::get_json;
pub use resource::JsonResource;
pub use transport::{JsonTransport, ReqwestTransport};
