//! Response shaping.
//!
//! # Responsibilities
//! - Answer CORS preflight requests without touching a backend
//! - Stamp the permissive CORS origin on every other response
//! - Copy a backend response onto the caller's response
//!
//! # Design Decisions
//! - Backend headers replace same-named headers already present, including
//!   the CORS origin
//! - `Transfer-Encoding` is not copied: the body is already buffered and the
//!   server chooses the framing

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::Response;

use crate::http::client::BackendResponse;

fn any() -> HeaderValue {
    HeaderValue::from_static("*")
}

/// Empty 200 with permissive CORS headers.
pub fn preflight() -> Response {
    let mut response = Response::new(Body::empty());
    *response.status_mut() = StatusCode::OK;
    let headers = response.headers_mut();
    headers.insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, any());
    headers.insert(header::ACCESS_CONTROL_ALLOW_METHODS, any());
    headers.insert(header::ACCESS_CONTROL_ALLOW_HEADERS, any());
    response
}

/// Set `Access-Control-Allow-Origin: *` unless the response already has one.
pub fn allow_any_origin(mut response: Response) -> Response {
    response
        .headers_mut()
        .entry(header::ACCESS_CONTROL_ALLOW_ORIGIN)
        .or_insert(any());
    response
}

/// Copy every header of `source` into `target`, replacing same-named entries.
pub fn relay_headers(target: &mut HeaderMap, source: &HeaderMap) {
    for name in source.keys() {
        if *name == header::TRANSFER_ENCODING {
            continue;
        }
        target.remove(name);
        for value in source.get_all(name) {
            target.append(name.clone(), value.clone());
        }
    }
}

/// Build the caller's response from a fully read backend response.
pub fn relay(backend: BackendResponse) -> Response {
    let mut response = Response::new(Body::empty());
    response
        .headers_mut()
        .insert(header::ACCESS_CONTROL_ALLOW_ORIGIN, any());
    relay_headers(response.headers_mut(), &backend.headers);
    *response.status_mut() = backend.status;
    *response.body_mut() = Body::from(backend.body);
    response
}
