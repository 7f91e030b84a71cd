//! HTTP client for the horoscope backend.
//!
//! # Responsibility
//! - Build requests for every backend endpoint the UI uses.
//! - Decode JSON bodies into model types and streamed roasts into events.
//!
//! # Invariants
//! - Non-2xx responses are errors; the client never retries.
//! - User-entered values are percent-encoded in paths and queries.

mod error;
mod http;
pub mod stream;

pub use error::ApiError;
pub use http::{ApiClient, RoastStream};
pub use stream::{RoastEvent, RoastProgress, RoastStreamDecoder};
