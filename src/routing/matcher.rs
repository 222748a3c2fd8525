//! Listen path matching.
//!
//! # Responsibilities
//! - Classify a listen path as exact or subtree
//! - Test whether a request path falls under a listen path
//!
//! # Design Decisions
//! - A listen path ending in `/` binds its whole subtree; any other path
//!   binds only itself
//! - Path matching is case-sensitive and literal (no decoding, no regex)

/// A compiled listen path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListenPattern {
    /// Matches the path exactly.
    Exact(String),
    /// Matches every path starting with this prefix (which ends in `/`).
    Subtree(String),
}

impl ListenPattern {
    pub fn parse(listen_path: &str) -> Self {
        if listen_path.ends_with('/') {
            ListenPattern::Subtree(listen_path.to_string())
        } else {
            ListenPattern::Exact(listen_path.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            ListenPattern::Exact(p) | ListenPattern::Subtree(p) => p,
        }
    }

    pub fn matches(&self, path: &str) -> bool {
        match self {
            ListenPattern::Exact(p) => path == p,
            ListenPattern::Subtree(prefix) => path.starts_with(prefix.as_str()),
        }
    }
}
