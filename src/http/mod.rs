//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, dispatch by listen path)
//!     → request.rs (correlation id per request)
//!     → [relay pipeline handles the request]
//!     → client.rs (shared backend client, connection reuse)
//!     → response.rs (CORS, relay backend headers)
//!     → Send to client
//! ```

pub mod client;
pub mod request;
pub mod response;
pub mod server;

pub use client::{BackendResponse, BackendTransport, ForwardOutcome, TransportError};
pub use request::CorrelationId;
pub use server::HttpServer;
