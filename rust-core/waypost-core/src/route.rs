//! # Routes and Pipes
//!
//! A [`Route`] binds a name to a method set, a compiled path pattern, an
//! opaque [`Handler`] and a middleware list. A [`Pipe`] groups routes
//! under a shared URL prefix and middleware list.
//!
//! Both are produced from plain definitions ([`RouteDefinition`],
//! [`PipeDefinition`]) by compiling against a [`PatternTypes`] registry,
//! and are immutable afterwards.

use crate::error::{Error, Result};
use crate::middleware::{Middleware, MiddlewareList};
use crate::pattern::{CompiledPattern, PathMatcher};
use crate::registry::PatternTypes;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque handler reference
///
/// Typically a controller identifier such as `User::show`. The engine
/// stores and returns it, it never resolves or invokes it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Handler(String);

impl Handler {
    /// Create a handler reference
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Handler identifier
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Whether the identifier is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Handler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Handler {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for Handler {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Uncompiled route definition
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    /// Route name, unique within a collection
    pub name: String,
    /// Allowed methods (case-sensitive)
    pub methods: Vec<String>,
    /// Path template
    pub path: String,
    /// Handler reference
    pub handler: Handler,
    /// Attached middleware
    pub middleware: MiddlewareList,
}

impl RouteDefinition {
    /// Create a `GET` route definition
    pub fn new(name: impl Into<String>, path: impl Into<String>, handler: impl Into<Handler>) -> Self {
        Self {
            name: name.into(),
            methods: vec!["GET".to_string()],
            path: path.into(),
            handler: handler.into(),
            middleware: MiddlewareList::new(),
        }
    }

    /// Replace the allowed methods
    #[must_use]
    pub fn methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.methods = methods.into_iter().map(Into::into).collect();
        self
    }

    /// Attach a middleware
    #[must_use]
    pub fn middleware(mut self, middleware: impl Into<Middleware>) -> Self {
        self.middleware.add(middleware);
        self
    }

    /// Check that name, path, handler and methods are present
    ///
    /// # Errors
    ///
    /// Returns `Error::BadRoute` describing the first missing part.
    pub fn validate(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::bad_route("", "Route name is undefined."));
        }
        if self.path.is_empty() {
            return Err(Error::bad_route(&self.name, "Route path is undefined."));
        }
        if self.handler.is_empty() {
            return Err(Error::bad_route(&self.name, "Route handler is undefined."));
        }
        if self.methods.is_empty() || self.methods.iter().any(String::is_empty) {
            return Err(Error::bad_route(&self.name, "Route method is undefined."));
        }
        Ok(())
    }

    /// Validate and compile into a [`Route`]
    ///
    /// # Errors
    ///
    /// Returns `Error::BadRoute` for incomplete definitions and any
    /// pattern compilation error.
    pub fn compile(self, types: &PatternTypes) -> Result<Route> {
        self.validate()?;
        let pattern = CompiledPattern::compile(&self.path, types, &self.name)?;
        Ok(Route {
            name: self.name,
            methods: self.methods,
            path: self.path,
            pattern,
            handler: self.handler,
            middleware: self.middleware,
        })
    }

    /// Validate and compile as a member of the pipe with `prefix`
    fn compile_in(self, prefix: &str, types: &PatternTypes) -> Result<Route> {
        self.validate()?;
        Self {
            name: format!("{prefix}/{}", self.name),
            path: format!("/{prefix}/{}", self.path.trim_start_matches('/')),
            ..self
        }
        .compile(types)
    }
}

/// A compiled, immutable route
#[derive(Debug, Clone)]
pub struct Route {
    name: String,
    methods: Vec<String>,
    path: String,
    pattern: CompiledPattern,
    handler: Handler,
    middleware: MiddlewareList,
}

impl Route {
    /// Route name
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Allowed methods
    #[must_use]
    pub fn methods(&self) -> &[String] {
        &self.methods
    }

    /// Whether `method` is allowed (case-sensitive)
    #[must_use]
    pub fn allows(&self, method: &str) -> bool {
        self.methods.iter().any(|m| m == method)
    }

    /// Path template, including any pipe prefix
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Compiled pattern
    #[must_use]
    pub const fn pattern(&self) -> &CompiledPattern {
        &self.pattern
    }

    /// Handler reference
    #[must_use]
    pub const fn handler(&self) -> &Handler {
        &self.handler
    }

    /// Attached middleware
    #[must_use]
    pub const fn middleware(&self) -> &MiddlewareList {
        &self.middleware
    }

    /// Match the path against this route's pattern
    #[must_use]
    pub fn match_path(&self, path: &str) -> Option<Vec<String>> {
        self.pattern.match_path(path)
    }
}

/// Uncompiled pipe definition
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipeDefinition {
    /// Pipe name; trimmed of slashes it becomes the URL prefix
    pub name: String,
    /// Member routes, names relative to the pipe
    pub routes: Vec<RouteDefinition>,
    /// Pipe-level middleware
    pub middleware: MiddlewareList,
}

impl PipeDefinition {
    /// Create an empty pipe definition
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Add a member route
    #[must_use]
    pub fn route(mut self, route: RouteDefinition) -> Self {
        self.routes.push(route);
        self
    }

    /// Attach a pipe-level middleware
    #[must_use]
    pub fn middleware(mut self, middleware: impl Into<Middleware>) -> Self {
        self.middleware.add(middleware);
        self
    }

    /// Validate and compile every member route under the pipe prefix
    ///
    /// # Errors
    ///
    /// Returns `Error::BadRoute` if the pipe name or any member
    /// definition is incomplete, `Error::DuplicateRoute` if two members
    /// share a name, and any pattern compilation error.
    pub fn compile(self, types: &PatternTypes) -> Result<Pipe> {
        let prefix = self.name.trim_matches('/').to_string();
        if prefix.is_empty() {
            return Err(Error::bad_route(&self.name, "Pipe name is undefined."));
        }

        let mut routes: Vec<Route> = Vec::with_capacity(self.routes.len());
        for definition in self.routes {
            let route = definition.compile_in(&prefix, types)?;
            if routes.iter().any(|r| r.name == route.name) {
                return Err(Error::duplicate_route(&route.name));
            }
            routes.push(route);
        }

        Ok(Pipe {
            name: self.name,
            prefix,
            routes,
            middleware: self.middleware,
        })
    }
}

/// A compiled group of routes sharing a prefix
#[derive(Debug, Clone)]
pub struct Pipe {
    name: String,
    prefix: String,
    routes: Vec<Route>,
    middleware: MiddlewareList,
}

impl Pipe {
    /// Pipe name as declared
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// URL prefix segment(s), without surrounding slashes
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Member routes in declaration order
    #[must_use]
    pub fn routes(&self) -> &[Route] {
        &self.routes
    }

    /// Pipe-level middleware
    #[must_use]
    pub const fn middleware(&self) -> &MiddlewareList {
        &self.middleware
    }

    /// Find a member by its qualified name (`admin/dashboard`)
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Route> {
        self.routes.iter().find(|route| route.name == name)
    }

    /// Whether `path` starts with this pipe's prefix segments
    #[must_use]
    pub fn covers(&self, path: &str) -> bool {
        let path = path.trim_matches('/');
        path.strip_prefix(self.prefix.as_str())
            .is_some_and(|rest| rest.is_empty() || rest.starts_with('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_route_definition_defaults_to_get() {
        let route = RouteDefinition::new("home", "/", "Home::index")
            .compile(&PatternTypes::default())
            .unwrap();
        assert_eq!(route.methods(), ["GET"]);
        assert!(route.allows("GET"));
        assert!(!route.allows("get"));
        assert!(route.pattern().is_static());
    }

    #[test]
    fn test_validate_missing_parts() {
        let types = PatternTypes::default();
        let err = RouteDefinition::new("", "/", "h").compile(&types).unwrap_err();
        assert!(err.to_string().contains("name is undefined"));

        let err = RouteDefinition::new("a", "", "h").compile(&types).unwrap_err();
        assert!(err.to_string().contains("path is undefined"));

        let err = RouteDefinition::new("a", "/a", "").compile(&types).unwrap_err();
        assert!(err.to_string().contains("handler is undefined"));

        let err = RouteDefinition::new("a", "/a", "h")
            .methods(Vec::<String>::new())
            .compile(&types)
            .unwrap_err();
        assert!(matches!(err, Error::BadRoute { .. }));
    }

    #[test]
    fn test_route_with_middleware() {
        let route = RouteDefinition::new("user", "/user/<id:int>", "User::show")
            .methods(["GET", "POST"])
            .middleware("Auth")
            .middleware(Middleware::with_args("Throttle", ["60"]))
            .compile(&PatternTypes::default())
            .unwrap();

        assert_eq!(route.middleware().names(), vec!["Auth", "Throttle"]);
        assert_eq!(route.match_path("/user/5"), Some(vec!["5".to_string()]));
        assert_eq!(route.handler().as_str(), "User::show");
    }

    #[test]
    fn test_pipe_prefixes_members() {
        let pipe = PipeDefinition::new("admin/")
            .middleware("Admin")
            .route(RouteDefinition::new("dashboard", "dashboard", "Admin::dashboard"))
            .route(RouteDefinition::new("user", "/user/<id:int>", "Admin::user"))
            .compile(&PatternTypes::default())
            .unwrap();

        assert_eq!(pipe.prefix(), "admin");
        assert_eq!(pipe.routes()[0].name(), "admin/dashboard");
        assert_eq!(pipe.routes()[0].path(), "/admin/dashboard");
        assert!(pipe.get("admin/user").unwrap().match_path("/admin/user/3").is_some());
        assert_eq!(pipe.middleware().names(), vec!["Admin"]);
    }

    #[test]
    fn test_pipe_validates_members() {
        let err = PipeDefinition::new("admin/")
            .route(RouteDefinition::new("dashboard", "dashboard", ""))
            .compile(&PatternTypes::default())
            .unwrap_err();
        assert!(matches!(err, Error::BadRoute { .. }));
    }

    #[test]
    fn test_pipe_rejects_duplicate_members() {
        let err = PipeDefinition::new("admin")
            .route(RouteDefinition::new("a", "a", "h"))
            .route(RouteDefinition::new("a", "b", "h"))
            .compile(&PatternTypes::default())
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateRoute { .. }));
    }

    #[test]
    fn test_pipe_covers() {
        let pipe = PipeDefinition::new("admin/").compile(&PatternTypes::default()).unwrap();
        assert!(pipe.covers("/admin/dashboard"));
        assert!(pipe.covers("/admin/"));
        assert!(!pipe.covers("/administrator"));
        assert!(!pipe.covers("/other/admin"));
    }
}
