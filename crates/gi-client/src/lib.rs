//! HTTP client for the `GlobalInsights` sentiment backend.
//!
//! The backend does all of the heavy lifting (search, scoring, geocoding,
//! LLM calls); this crate only knows how to ask for results and decode them.

pub mod client;
pub mod error;

pub use client::ApiClient;
pub use error::ApiError;
