//! Captured inbound request.
//!
//! The inbound body is drained exactly once into an owned buffer. Every later
//! consumer (audit log, forwarder) reads the same `Bytes`, which are
//! reference-counted, so handing out views never copies or re-reads.

use axum::body::{Body, Bytes};
use axum::http::{request::Parts, HeaderMap, Method, Request, Uri, Version};
use http_body_util::{BodyExt, LengthLimitError, Limited};

use crate::relay::diagnostics;
use crate::relay::error::RelayError;

/// Inbound request head plus its fully captured body.
#[derive(Debug)]
pub struct RequestSnapshot {
    parts: Parts,
    body: Bytes,
}

impl RequestSnapshot {
    /// Drain the body of `request`.
    ///
    /// A missing body yields an empty buffer. When `limit` is set, a body
    /// longer than `limit` bytes fails with [`RelayError::PayloadTooLarge`].
    pub async fn capture(request: Request<Body>, limit: Option<usize>) -> Result<Self, RelayError> {
        let (parts, body) = request.into_parts();

        let body = match limit {
            Some(limit) => Limited::new(body, limit)
                .collect()
                .await
                .map_err(|e| {
                    if e.downcast_ref::<LengthLimitError>().is_some() {
                        RelayError::PayloadTooLarge { limit }
                    } else {
                        RelayError::InboundBodyRead(e.to_string())
                    }
                })?
                .to_bytes(),
            None => body
                .collect()
                .await
                .map_err(|e| RelayError::InboundBodyRead(e.to_string()))?
                .to_bytes(),
        };

        Ok(Self { parts, body })
    }

    pub fn method(&self) -> &Method {
        &self.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.parts.uri
    }

    pub fn version(&self) -> Version {
        self.parts.version
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.parts.headers
    }

    /// The captured body. Cloning the returned `Bytes` is cheap.
    pub fn body(&self) -> &Bytes {
        &self.body
    }

    pub fn dump(&self) -> String {
        diagnostics::dump_request(
            self.method(),
            self.uri(),
            self.version(),
            self.headers(),
            &self.body,
        )
    }
}
