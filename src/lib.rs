//! HTTP traffic relay library.
//!
//! Accepts requests on configured listen paths, forwards each to one of the
//! route's backends in round-robin order, and relays the response, logging a
//! bounded snapshot of every exchange.

// Core subsystems
pub mod config;
pub mod http;
pub mod relay;
pub mod routing;

// Traffic management
pub mod load_balancer;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod resilience;

pub use config::RelayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
