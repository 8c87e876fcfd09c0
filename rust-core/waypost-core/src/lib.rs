//! # Waypost Core
//!
//! Path-routing engine for HTTP request dispatch.
//! Resolves a request method and path to a registered handler with its
//! extracted path parameters, and generates URLs back from route names.
//!
//! ## Architecture
//!
//! Routes are declared with typed path templates (`/user/<id:int>`),
//! compiled once against a pattern type registry, and stored in a
//! read-only collection shared across requests. Per request, either the
//! collection is matched directly ([`UrlMatcher`]) or a request-scoped
//! [`Router`] drains its group and route queues, registering nested
//! routes only under the prefixes the path actually takes.
//!
//! ## Modules
//!
//! - `types` - Placeholder types and typed parameter values
//! - `registry` - Tag to placeholder type registry
//! - `pattern` - Path template compiler and formatter
//! - `route` - Routes, pipes and their definitions
//! - `collection` - Ordered, name-indexed route store
//! - `matcher` - Single-route and collection matching
//! - `router` - Request-scoped dispatch driver
//! - `generator` - URL generation
//! - `loader` - JSON route sources
//! - `middleware` - Middleware attachment
//! - `context` - Request snapshot
//! - `config` - Loader configuration
//! - `telemetry` - Tracing subscriber setup
//! - `error` - Error types and handling

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collection;
pub mod config;
pub mod context;
pub mod error;
pub mod generator;
pub mod loader;
pub mod matcher;
pub mod middleware;
pub mod pattern;
pub mod registry;
pub mod route;
pub mod router;
pub mod telemetry;
pub mod types;

pub use collection::{Entry, RouteCollection};
pub use config::LoaderConfig;
pub use context::RequestContext;
pub use error::{Error, Result};
pub use generator::Generator;
pub use loader::{JsonLoader, Loader};
pub use matcher::{MatchedRoute, RouteMatcher, UrlMatcher};
pub use middleware::{Middleware, MiddlewareList};
pub use pattern::{CompiledPattern, PathMatcher, Segment};
pub use registry::PatternTypes;
pub use route::{Handler, Pipe, PipeDefinition, Route, RouteDefinition};
pub use router::{Dispatched, Method, Router};
pub use types::{ParamType, ParamValue, PatternType, ScalarType};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
