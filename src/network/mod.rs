//! HTTP networking module
//!
//! Provides the shared HTTP client and the retry policy used by remote
//! backends.

mod client;
mod request;
mod retry;

pub use client::HttpClient;
pub use request::{HttpRequest, HttpResponse};
pub use retry::RetryPolicy;
