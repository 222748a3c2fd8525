//! Bounded textual snapshots of requests and responses for the audit log.
//!
//! Rendering is pure: callers decide whether and where to log the result.
//! Request bodies are rendered up to [`MAX_LOGGED_BODY`] bytes followed by a
//! note of the true length. Response bodies are never rendered.
//!
//! Repeated header values are joined with `", "` in request dumps and with
//! `","` in response dumps, matching the relay's existing log format.

use std::fmt::Write;

use axum::http::{HeaderMap, Method, StatusCode, Uri, Version};

/// Body bytes rendered before truncating.
pub const MAX_LOGGED_BODY: usize = 1024;

const REQUEST_VALUE_SEPARATOR: &str = ", ";
const RESPONSE_VALUE_SEPARATOR: &str = ",";

/// Render a request head and body.
pub fn dump_request(
    method: &Method,
    uri: &Uri,
    version: Version,
    headers: &HeaderMap,
    body: &[u8],
) -> String {
    let mut out = String::new();
    let target = uri.path_and_query().map(|pq| pq.as_str()).unwrap_or("/");

    out.push_str("=== HTTP REQUEST START ===\n");
    let _ = writeln!(out, "Method: {}", method);
    let _ = writeln!(out, "URI: {}", target);
    let _ = writeln!(out, "Protocol: {:?}", version);

    out.push_str("\n--- Headers ---\n");
    write_headers(&mut out, headers, REQUEST_VALUE_SEPARATOR);

    out.push_str("\n--- Body ---\n");
    write_body(&mut out, body);

    out.push_str("=== HTTP REQUEST END ===\n");
    out
}

/// Render a response status and headers.
pub fn dump_response(status: StatusCode, headers: &HeaderMap) -> String {
    let mut out = String::new();

    out.push_str("=== HTTP RESPONSE START ===\n");
    let _ = writeln!(out, "Status Code: {}", status.as_u16());

    out.push_str("\n--- Headers ---\n");
    write_headers(&mut out, headers, RESPONSE_VALUE_SEPARATOR);

    out.push_str("=== HTTP RESPONSE END ===\n");
    out
}

// One line per header name, repeated values joined in arrival order.
fn write_headers(out: &mut String, headers: &HeaderMap, separator: &str) {
    for name in headers.keys() {
        let values: Vec<_> = headers
            .get_all(name)
            .iter()
            .map(|v| String::from_utf8_lossy(v.as_bytes()))
            .collect();
        let _ = writeln!(out, "{}: {}", name, values.join(separator));
    }
}

fn write_body(out: &mut String, body: &[u8]) {
    if body.is_empty() {
        out.push_str("[empty]\n");
    } else if body.len() > MAX_LOGGED_BODY {
        let _ = writeln!(
            out,
            "{}\n[body truncated, original length {} bytes]",
            String::from_utf8_lossy(&body[..MAX_LOGGED_BODY]),
            body.len()
        );
    } else {
        let _ = writeln!(out, "{}", String::from_utf8_lossy(body));
    }
}
