//! API Client for the book server.
//!
//! [`BookApiClient`] is generic over [`crate::traits::HttpClient`]: the
//! binary uses [`crate::adapters::ReqwestHttpClient`], tests use
//! [`crate::adapters::mock::MockHttpClient`].

mod client;

pub use client::{ApiHealth, BookApiClient, ConnectionReport};
