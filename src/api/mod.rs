//! HTTP clients for the Vatify API.
//!
//! [`VatifyClient`] is async; [`BlockingVatifyClient`] (feature `blocking`)
//! runs the same calls on the calling thread. Both delegate request building
//! and response normalization to [`endpoint`].

#[cfg(feature = "blocking")]
mod blocking;
mod client;
mod config;
pub mod endpoint;

#[cfg(feature = "blocking")]
pub use blocking::BlockingVatifyClient;
pub use client::VatifyClient;
pub use config::{ClientConfig, DEFAULT_BASE_URL, DEFAULT_TIMEOUT, USER_AGENT};
