//! Core components for IoT Hub service clients.
//!
//! This crate provides the foundational types shared by the IoT Hub service
//! crates in this workspace.
//!
//! ## Overview
//!
//! - **Context**: A container that holds implementations for HTTP sending and environment access
//! - **Error**: The flat result taxonomy every service operation reports through
//! - **Credential**: The [`SigningCredential`] trait implemented by service credentials
//!
//! ## Example
//!
//! ```no_run
//! use iothub_service_core::{Context, HttpSend, OsEnv, Result};
//! use async_trait::async_trait;
//! use bytes::Bytes;
//!
//! #[derive(Debug)]
//! struct MyTransport;
//!
//! #[async_trait]
//! impl HttpSend for MyTransport {
//!     async fn http_send(&self, _req: http::Request<Bytes>) -> Result<http::Response<Bytes>> {
//!         Ok(http::Response::new(Bytes::new()))
//!     }
//! }
//!
//! let ctx = Context::new().with_http_send(MyTransport).with_env(OsEnv);
//! ```
//!
//! ## Utilities
//!
//! - [`hash`]: Cryptographic hashing utilities
//! - [`time`]: Time manipulation utilities
//! - [`utils`]: General utilities including data redaction

// Make sure all our public APIs have docs.
#![warn(missing_docs)]

pub mod hash;
pub mod time;
pub mod utils;

mod context;
pub use context::{Context, Env, HttpSend, NoopEnv, NoopHttpSend, OsEnv, StaticEnv};

mod error;
pub use error::{Error, ErrorKind, Result};

mod api;
pub use api::SigningCredential;
