//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate listen paths and detect duplicates
//! - Validate backend URLs and method overrides
//! - Validate value ranges (timeouts > 0, address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RelayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system
//! - An empty rotation set is legal; such routes answer 503

use std::collections::HashSet;
use std::net::SocketAddr;

use axum::http::Method;
use thiserror::Error;
use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("listen address {0:?} is not a socket address")]
    ListenAddress(String),

    #[error("route {index}: listen path {path:?} must start with '/'")]
    ListenPath { index: usize, path: String },

    #[error("route {index}: listen path {path:?} is already bound")]
    DuplicateListenPath { index: usize, path: String },

    #[error("route {index}: backend {url:?} is not a valid http(s) URL")]
    BackendUrl { index: usize, url: String },

    #[error("route {index}: method override {method:?} is not a valid HTTP method")]
    MethodOverride { index: usize, method: String },

    #[error("{0} must be greater than zero")]
    ZeroValue(&'static str),
}

/// Check a parsed configuration for semantic errors.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.listen_addr.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::ListenAddress(
            config.listener.listen_addr.clone(),
        ));
    }
    if config.listener.forward_timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("relay.forward_timeout_secs"));
    }
    if config.listener.request_timeout_secs == Some(0) {
        errors.push(ValidationError::ZeroValue("relay.request_timeout_secs"));
    }
    if config.transport.timeout_secs == 0 {
        errors.push(ValidationError::ZeroValue("transport.timeout_secs"));
    }
    if config.throughput.interval_ms == 0 {
        errors.push(ValidationError::ZeroValue("throughput.interval_ms"));
    }

    let mut seen = HashSet::new();
    for (index, route) in config.routes.iter().enumerate() {
        let path = &route.listen_path;
        if !path.starts_with('/') {
            errors.push(ValidationError::ListenPath {
                index,
                path: path.clone(),
            });
        } else if !seen.insert(path.as_str()) {
            errors.push(ValidationError::DuplicateListenPath {
                index,
                path: path.clone(),
            });
        }

        for url in route.targets() {
            if !is_backend_url(&url) {
                errors.push(ValidationError::BackendUrl { index, url });
            }
        }

        if let Some(method) = route.method_override() {
            if Method::from_bytes(method.to_uppercase().as_bytes()).is_err() {
                errors.push(ValidationError::MethodOverride {
                    index,
                    method: method.to_string(),
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn is_backend_url(raw: &str) -> bool {
    match Url::parse(raw) {
        Ok(url) => matches!(url.scheme(), "http" | "https") && url.has_host(),
        Err(_) => false,
    }
}
