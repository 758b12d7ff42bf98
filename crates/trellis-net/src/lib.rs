//! HTTP transport for Trellis.
//!
//! This crate implements the [`trellis::RemoteTransport`] boundary on
//! reqwest: page fetches go out as GET requests with the remote query
//! flattened into URL parameters, reorders as POSTs with a JSON
//! `{"ids": [...]}` body.
//!
//! # Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use trellis::{TableBinding, TableBindingConfig, RemoteConfig};
//! use trellis_net::HttpTransport;
//!
//! let transport = Arc::new(HttpTransport::new());
//! let config = TableBindingConfig::new(columns)
//!     .with_remote(RemoteConfig::new("https://api.example.com/rows"));
//! let binding = TableBinding::mount(config, &host, Some(transport))?;
//! ```

mod error;
mod http;

pub use error::{NetworkError, Result};
pub use http::{DEFAULT_TIMEOUT, HttpTransport};
