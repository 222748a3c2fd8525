//! Routing subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming Request (path)
//!     → router.rs (exact lookup, then longest subtree)
//!     → matcher.rs (evaluate listen patterns)
//!     → Return: matched RelayPipeline, Redirect to a bound subtree, or NoMatch
//!
//! Registry construction (at startup):
//!     RouteConfig[]
//!     → one RelayPipeline per route (own rotator, shared transport)
//!     → Freeze as immutable RouteRegistry
//! ```
//!
//! # Design Decisions
//! - Routes compiled at startup, immutable at runtime
//! - No regex in hot path (exact and prefix matching only)
//! - Deterministic: same input always matches same route

pub mod matcher;
pub mod router;

pub use router::{RouteMatch, RouteRegistry};
