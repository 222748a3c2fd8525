//! Load balancing subsystem.
//!
//! # Data Flow
//! ```text
//! Route matched → its pipeline owns one RoundRobin
//!     → round_robin.rs (rotate through the route's backend URLs)
//!     → Return backend base URL, or None for an empty rotation set
//! ```
//!
//! # Design Decisions
//! - One rotator per route, created with the route and never shared
//! - Rotation state is a single atomic cursor; no locks on the hot path
//! - No health filtering or weighting: every configured backend takes its turn

pub mod round_robin;

pub use round_robin::RoundRobin;
