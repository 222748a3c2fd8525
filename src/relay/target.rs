//! Outbound method and URL resolution.

use axum::http::{Method, Uri};

/// The method to send upstream when it differs from the inbound one.
///
/// The override is compared case-insensitively and applied upper-cased.
/// Returns `None` when there is no override or it names the inbound method.
pub fn method_rewrite(inbound: &Method, method_override: Option<&str>) -> Option<String> {
    let wanted = method_override?.to_uppercase();
    if wanted == inbound.as_str() {
        None
    } else {
        Some(wanted)
    }
}

/// Join a backend base URL with the inbound path and raw query.
///
/// Trailing slashes on the base are dropped so the inbound path (which always
/// starts with `/`) never produces `//`. The query is appended unchanged.
pub fn build_target_url(base: &str, uri: &Uri) -> String {
    let mut target = String::with_capacity(base.len() + uri.path().len() + 16);
    target.push_str(base.trim_end_matches('/'));
    target.push_str(uri.path());
    if let Some(query) = uri.query().filter(|q| !q.is_empty()) {
        target.push('?');
        target.push_str(query);
    }
    target
}
