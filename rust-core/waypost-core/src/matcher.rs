//! # Route Matching
//!
//! [`RouteMatcher`] tests a single route against a path and keeps the
//! captured arguments. [`UrlMatcher`] walks a whole [`RouteCollection`]
//! in declaration order and returns the first route whose method set and
//! pattern both accept the request.
//!
//! Failing to match is a normal outcome (`false` / `None`), never an error.

use crate::collection::{Entry, RouteCollection};
use crate::context::RequestContext;
use crate::middleware::MiddlewareList;
use crate::route::{Pipe, Route};
use crate::types::ParamValue;
use tracing::trace;

/// Matches one route against request paths
#[derive(Debug)]
pub struct RouteMatcher<'a> {
    route: &'a Route,
    arguments: Vec<String>,
    params: Vec<(String, ParamValue)>,
}

impl<'a> RouteMatcher<'a> {
    /// Create a matcher for `route`
    #[must_use]
    pub const fn new(route: &'a Route) -> Self {
        Self {
            route,
            arguments: Vec::new(),
            params: Vec::new(),
        }
    }

    /// Test `path`, caching the captured arguments on success
    ///
    /// Trailing slashes on either side do not affect the outcome. On
    /// failure the previously cached arguments are left untouched.
    pub fn match_path(&mut self, path: &str) -> bool {
        match self.route.pattern().match_params(path) {
            Some((arguments, params)) => {
                self.arguments = arguments;
                self.params = params;
                true
            }
            None => false,
        }
    }

    /// Arguments captured by the last successful match, left to right
    #[must_use]
    pub fn arguments(&self) -> &[String] {
        &self.arguments
    }

    /// Captured arguments converted by their placeholder types
    #[must_use]
    pub fn params(&self) -> &[(String, ParamValue)] {
        &self.params
    }

    /// The route being matched
    #[must_use]
    pub const fn route(&self) -> &'a Route {
        self.route
    }
}

/// A route selected for a request
#[derive(Debug, Clone)]
pub struct MatchedRoute<'a> {
    /// The winning route
    pub route: &'a Route,
    /// The pipe the route belongs to, if any
    pub pipe: Option<&'a Pipe>,
    /// Raw captured arguments, left to right
    pub arguments: Vec<String>,
    /// Captured arguments converted by their placeholder types
    pub params: Vec<(String, ParamValue)>,
}

impl MatchedRoute<'_> {
    /// Get a typed parameter by name
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }

    /// Pipe middleware followed by route middleware
    #[must_use]
    pub fn middleware(&self) -> MiddlewareList {
        let mut list = self
            .pipe
            .map(|pipe| pipe.middleware().clone())
            .unwrap_or_default();
        list.extend(self.route.middleware());
        list
    }
}

/// Matches requests against every route of a collection
#[derive(Debug, Clone, Copy)]
pub struct UrlMatcher<'a> {
    collection: &'a RouteCollection,
}

impl<'a> UrlMatcher<'a> {
    /// Create a matcher over `collection`
    #[must_use]
    pub const fn new(collection: &'a RouteCollection) -> Self {
        Self { collection }
    }

    /// Match a request snapshot
    #[must_use]
    pub fn match_request(&self, context: &RequestContext) -> Option<MatchedRoute<'a>> {
        self.match_path(context.method(), context.path())
    }

    /// Find the first route, in declaration order, accepting `method` and `path`
    ///
    /// Pipes whose prefix does not cover the path are skipped without
    /// testing their members.
    #[must_use]
    pub fn match_path(&self, method: &str, path: &str) -> Option<MatchedRoute<'a>> {
        self.candidates(path).into_iter().find_map(|(route, pipe)| {
            if !route.allows(method) {
                return None;
            }
            let (arguments, params) = route.pattern().match_params(path)?;
            trace!(route = %route.name(), %method, %path, "Route matched");
            Some(MatchedRoute {
                params,
                route,
                pipe,
                arguments,
            })
        })
    }

    /// Methods of the routes whose pattern accepts `path`
    ///
    /// Empty when nothing matches the path at all; a non-empty result for
    /// a request that `match_path` rejected means the method is not allowed.
    #[must_use]
    pub fn allowed_methods(&self, path: &str) -> Vec<String> {
        let mut methods: Vec<String> = Vec::new();
        for (route, _) in self.candidates(path) {
            if route.match_path(path).is_some() {
                for method in route.methods() {
                    if !methods.contains(method) {
                        methods.push(method.clone());
                    }
                }
            }
        }
        methods
    }

    /// Routes in declaration order, skipping pipes that cannot cover `path`
    fn candidates(&self, path: &str) -> Vec<(&'a Route, Option<&'a Pipe>)> {
        let mut candidates = Vec::new();
        for entry in self.collection.entries() {
            match entry {
                Entry::Route(route) => candidates.push((route, None)),
                Entry::Pipe(pipe) if pipe.covers(path) => {
                    candidates.extend(pipe.routes().iter().map(|route| (route, Some(pipe))));
                }
                Entry::Pipe(_) => {}
            }
        }
        candidates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::route::{PipeDefinition, RouteDefinition};

    fn collection() -> RouteCollection {
        let mut routes = RouteCollection::default();
        routes
            .add_route(RouteDefinition::new("user", "/user/<id:int>", "User::show"))
            .unwrap();
        routes
            .add_route(
                RouteDefinition::new("user.update", "/user/<id:int>", "User::update")
                    .methods(["PUT"]),
            )
            .unwrap();
        routes
            .add_pipe(
                PipeDefinition::new("admin/")
                    .middleware("Admin")
                    .route(RouteDefinition::new("dashboard", "dashboard", "Admin::dashboard").middleware("Auth")),
            )
            .unwrap();
        routes
    }

    #[test]
    fn test_route_matcher_caches_arguments() {
        let routes = collection();
        let mut matcher = RouteMatcher::new(routes.get("user").unwrap());

        assert!(matcher.match_path("/user/42"));
        assert_eq!(matcher.arguments(), ["42"]);
        assert_eq!(matcher.params(), [("id".to_string(), ParamValue::Int(42))]);

        assert!(!matcher.match_path("/user/abc"));
        assert_eq!(matcher.arguments(), ["42"]);
    }

    #[test]
    fn test_route_matcher_trailing_slash() {
        let routes = collection();
        let mut matcher = RouteMatcher::new(routes.get("admin/dashboard").unwrap());
        assert!(matcher.match_path("/admin/dashboard/"));
        assert!(matcher.match_path("/admin/dashboard"));
        assert!(matcher.arguments().is_empty());
    }

    #[test]
    fn test_url_matcher_respects_method() {
        let routes = collection();
        let matcher = UrlMatcher::new(&routes);

        let hit = matcher.match_path("GET", "/user/7").unwrap();
        assert_eq!(hit.route.name(), "user");
        assert_eq!(hit.param("id"), Some(&ParamValue::Int(7)));

        let hit = matcher.match_path("PUT", "/user/7").unwrap();
        assert_eq!(hit.route.name(), "user.update");

        assert!(matcher.match_path("DELETE", "/user/7").is_none());
        assert_eq!(matcher.allowed_methods("/user/7"), vec!["GET", "PUT"]);
        assert!(matcher.allowed_methods("/nothing").is_empty());
    }

    #[test]
    fn test_int_route_never_yields_string_params() {
        let routes = collection();
        let matcher = UrlMatcher::new(&routes);
        assert!(matcher.match_path("GET", "/user/\u{664}\u{662}").is_none());
        assert!(matcher.match_path("GET", "/user/99999999999999999999").is_none());
        assert!(matcher.allowed_methods("/user/99999999999999999999").is_empty());

        let mut single = RouteMatcher::new(routes.get("user").unwrap());
        assert!(single.match_path("/user/5"));
        assert!(!single.match_path("/user/99999999999999999999"));
        assert_eq!(single.params(), [("id".to_string(), ParamValue::Int(5))]);
    }

    #[test]
    fn test_url_matcher_pipe_middleware() {
        let routes = collection();
        let hit = UrlMatcher::new(&routes)
            .match_path("GET", "/admin/dashboard")
            .unwrap();
        assert_eq!(hit.pipe.map(Pipe::prefix), Some("admin"));
        assert_eq!(hit.middleware().names(), vec!["Admin", "Auth"]);
    }

    #[test]
    fn test_url_matcher_request_context() {
        let routes = collection();
        let context = RequestContext::new("/user/9/", "GET");
        let hit = UrlMatcher::new(&routes).match_request(&context).unwrap();
        assert_eq!(hit.arguments, vec!["9"]);
    }
}
