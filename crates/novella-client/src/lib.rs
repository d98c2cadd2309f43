#![forbid(unsafe_code)]
#![deny(
    warnings,
    dead_code,
    unused,
    unused_imports,
    unused_must_use,
    unreachable_pub,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    rustdoc::broken_intra_doc_links,
    rustdoc::bare_urls,
    missing_docs
)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::future_not_send)]

//! `reqwest` transport implementing the Novella backend seam.
//!
//! Layout:
//! - `config.rs`: base URL, timeout, and session credentials
//! - `http.rs`: the `Backend` implementation and response classification
//! - `error.rs`: construction failures

pub mod config;
pub mod error;
pub mod http;

pub use config::ClientConfig;
pub use error::ClientError;
pub use http::HttpBackend;
