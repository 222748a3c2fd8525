//! Route lookup and dispatch.
//!
//! # Responsibilities
//! - Own one relay pipeline per configured route
//! - Look up the pipeline for a request path
//! - Return matched pipeline, a redirect to a bound subtree, or no-match
//!
//! # Design Decisions
//! - Immutable after construction (thread-safe without locks)
//! - O(1) exact lookup via HashMap, then longest matching subtree
//! - A path bound only as the subtree `path/` redirects there, ahead of any
//!   shorter subtree that would otherwise match
//! - Explicit NoMatch rather than silent default

use std::collections::HashMap;
use std::sync::Arc;

use crate::config::RouteConfig;
use crate::http::client::BackendTransport;
use crate::relay::{PipelineSettings, RelayPipeline};
use crate::routing::matcher::ListenPattern;

/// Outcome of resolving a request path.
#[derive(Debug)]
pub enum RouteMatch<'a> {
    Pipeline(&'a Arc<RelayPipeline>),
    /// Only the subtree `{path}/` is bound. Carries that subtree path.
    Redirect(String),
    NotFound,
}

/// Registry mapping listen paths to their pipelines.
#[derive(Debug, Default)]
pub struct RouteRegistry {
    exact: HashMap<String, Arc<RelayPipeline>>,
    /// Subtree patterns, longest first.
    subtrees: Vec<(ListenPattern, Arc<RelayPipeline>)>,
}

impl RouteRegistry {
    /// Build the registry. Every pipeline shares `transport`'s connection pool.
    pub fn new(routes: &[RouteConfig], transport: &BackendTransport, settings: PipelineSettings) -> Self {
        let mut registry = Self::default();
        for route in routes {
            let pipeline = Arc::new(RelayPipeline::new(route, transport.clone(), settings));
            registry.register(pipeline);
        }
        registry
    }

    /// Bind a pipeline to its listen path. A later binding for the same path wins.
    pub fn register(&mut self, pipeline: Arc<RelayPipeline>) {
        let targets = pipeline.targets();
        if targets.is_empty() {
            tracing::warn!(
                listen_path = %pipeline.listen_path(),
                "Route has no backends; requests will get 503"
            );
        }
        tracing::info!(
            listen_path = %pipeline.listen_path(),
            backends = %targets.join(", "),
            method_override = pipeline.method_override().unwrap_or("-"),
            "Route registered"
        );

        match ListenPattern::parse(pipeline.listen_path()) {
            ListenPattern::Exact(path) => {
                self.exact.insert(path, pipeline);
            }
            pattern @ ListenPattern::Subtree(_) => {
                self.subtrees.retain(|(p, _)| p != &pattern);
                self.subtrees.push((pattern, pipeline));
                self.subtrees
                    .sort_by(|(a, _), (b, _)| b.as_str().len().cmp(&a.as_str().len()));
            }
        }
    }

    /// Find the pipeline for `path`.
    pub fn resolve(&self, path: &str) -> RouteMatch<'_> {
        if let Some(pipeline) = self.exact.get(path) {
            return RouteMatch::Pipeline(pipeline);
        }
        if self.binds_subtree_of(path) {
            return RouteMatch::Redirect(format!("{path}/"));
        }
        self.subtrees
            .iter()
            .find(|(pattern, _)| pattern.matches(path))
            .map_or(RouteMatch::NotFound, |(_, pipeline)| RouteMatch::Pipeline(pipeline))
    }

    fn binds_subtree_of(&self, path: &str) -> bool {
        self.subtrees
            .iter()
            .any(|(pattern, _)| pattern.as_str().strip_suffix('/') == Some(path))
    }

    pub fn len(&self) -> usize {
        self.exact.len() + self.subtrees.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::TransportConfig;

    fn registry(paths: &[&str]) -> RouteRegistry {
        let routes: Vec<_> = paths
            .iter()
            .map(|p| RouteConfig {
                listen_path: p.to_string(),
                backend_url: Some(format!("http://backend{}", p.replace('/', "-"))),
                ..Default::default()
            })
            .collect();
        let transport = BackendTransport::new(&TransportConfig::default()).unwrap();
        RouteRegistry::new(&routes, &transport, PipelineSettings::default())
    }

    fn matched(registry: &RouteRegistry, path: &str) -> Option<String> {
        match registry.resolve(path) {
            RouteMatch::Pipeline(p) => Some(p.listen_path().to_string()),
            _ => None,
        }
    }

    fn pipeline<'a>(registry: &'a RouteRegistry, path: &str) -> &'a Arc<RelayPipeline> {
        match registry.resolve(path) {
            RouteMatch::Pipeline(p) => p,
            other => panic!("{path} resolved to {other:?}"),
        }
    }

    #[test]
    fn test_exact_before_subtree() {
        let registry = registry(&["/api/", "/api/health"]);
        assert_eq!(matched(&registry, "/api/health").as_deref(), Some("/api/health"));
        assert_eq!(matched(&registry, "/api/users").as_deref(), Some("/api/"));
    }

    #[test]
    fn test_longest_subtree_wins() {
        let registry = registry(&["/", "/api/", "/api/v2/"]);
        assert_eq!(matched(&registry, "/api/v2/items").as_deref(), Some("/api/v2/"));
        assert_eq!(matched(&registry, "/api/v1/items").as_deref(), Some("/api/"));
        assert_eq!(matched(&registry, "/static/app.js").as_deref(), Some("/"));
    }

    #[test]
    fn test_no_match() {
        let registry = registry(&["/api/", "/login"]);
        assert_eq!(matched(&registry, "/login/again"), None);
        assert_eq!(matched(&registry, "/other"), None);
        assert!(matches!(registry.resolve("/other"), RouteMatch::NotFound));
        assert_eq!(registry.len(), 2);
    }

    #[test]
    fn test_bare_subtree_path_redirects() {
        let registry = registry(&["/", "/api/"]);
        match registry.resolve("/api") {
            RouteMatch::Redirect(location) => assert_eq!(location, "/api/"),
            other => panic!("expected redirect, got {other:?}"),
        }
        assert_eq!(matched(&registry, "/api/").as_deref(), Some("/api/"));
        assert_eq!(matched(&registry, "/apix").as_deref(), Some("/"));
    }

    #[test]
    fn test_exact_binding_beats_redirect() {
        let registry = registry(&["/api", "/api/"]);
        assert_eq!(matched(&registry, "/api").as_deref(), Some("/api"));
    }

    #[test]
    fn test_each_route_gets_its_own_rotation() {
        let registry = registry(&["/a", "/b"]);
        let a = pipeline(&registry, "/a");
        let b = pipeline(&registry, "/b");
        assert!(!Arc::ptr_eq(a, b));
        assert_eq!(a.targets(), ["http://backend-a"]);
        assert_eq!(b.targets(), ["http://backend-b"]);
    }

    #[test]
    fn test_empty_registry() {
        let registry = RouteRegistry::default();
        assert!(registry.is_empty());
        assert!(matches!(registry.resolve("/"), RouteMatch::NotFound));
    }
}
