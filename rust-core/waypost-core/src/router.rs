//! # Dispatch Router
//!
//! Request-scoped dispatcher built around two FIFO queues:
//!
//! - **routes**: candidate payloads (methods, compiled pattern, handler);
//! - **groups**: prefix descriptors with a registration callback.
//!
//! A dispatch pass first drains the group queue. A group queued under the
//! prefix matched so far, whose own prefix equals the next unconsumed path
//! segment, has its callback invoked, and routes (or nested groups) it
//! registers are scoped under the matched prefix. Groups that do not match never run their callback, so the cost
//! of building routes for a request grows with the depth of the matching
//! prefix chain, not with the total number of declared routes. The route
//! queue is then drained until the first candidate accepting both the
//! working path and the request method.
//!
//! Create one `Router` per request; the pattern type registry is shared
//! through an `Arc`.

use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::middleware::{Middleware, MiddlewareList};
use crate::pattern::{normalize, CompiledPattern, PathMatcher};
use crate::registry::PatternTypes;
use crate::route::Handler;
use crate::types::ParamValue;
use regex::Regex;
use std::collections::VecDeque;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, trace};

/// HTTP methods with registration helpers on the router
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// HTTP GET
    Get,
    /// HTTP POST
    Post,
    /// HTTP PUT
    Put,
    /// HTTP DELETE
    Delete,
    /// HTTP PATCH
    Patch,
    /// HTTP HEAD
    Head,
    /// HTTP OPTIONS
    Options,
}

impl Method {
    /// Method token as sent on the wire
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Head => "HEAD",
            Self::Options => "OPTIONS",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Group registration callback
///
/// Receives the router and the matched prefix segment, and registers the
/// routes and groups reachable under that prefix.
pub type GroupCallback = Box<dyn FnOnce(&mut Router, &str) -> Result<()>>;

/// Queued route candidate
#[derive(Debug)]
struct RoutePayload {
    methods: Vec<String>,
    pattern: CompiledPattern,
    handler: Handler,
    middleware: MiddlewareList,
}

/// Queued group descriptor
struct GroupDescriptor {
    pattern: String,
    /// Matched prefix the group was queued under, empty at top level
    parent: String,
    callback: GroupCallback,
}

impl fmt::Debug for GroupDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GroupDescriptor")
            .field("pattern", &self.pattern)
            .field("parent", &self.parent)
            .finish_non_exhaustive()
    }
}

/// The winning candidate of a dispatch pass
#[derive(Debug, Clone)]
pub struct Dispatched {
    /// Methods the route was registered for
    pub methods: Vec<String>,
    /// Template the route was registered with, group prefix included
    pub template: String,
    /// Handler reference
    pub handler: Handler,
    /// Raw captured arguments, left to right
    pub arguments: Vec<String>,
    /// Captured arguments converted by their placeholder types
    pub params: Vec<(String, ParamValue)>,
    /// Middleware attached at registration
    pub middleware: MiddlewareList,
}

impl Dispatched {
    /// Get a typed parameter by name
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&ParamValue> {
        self.params
            .iter()
            .find_map(|(key, value)| (key == name).then_some(value))
    }
}

/// Request-scoped dispatch driver
pub struct Router {
    types: Arc<PatternTypes>,
    context: RequestContext,
    /// Working path, possibly rewritten
    path: String,
    routes: VecDeque<RoutePayload>,
    groups: VecDeque<GroupDescriptor>,
    group_level: usize,
    /// Accumulated matched prefix, `admin/users/`
    group_path: String,
    path_segments: Vec<String>,
    /// Segments not yet consumed by a group
    group_segments: VecDeque<String>,
    matched: bool,
    pattern: Option<String>,
    allowed: Vec<String>,
}

impl fmt::Debug for Router {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Router")
            .field("context", &self.context)
            .field("path", &self.path)
            .field("routes", &self.routes.len())
            .field("groups", &self.groups)
            .field("group_level", &self.group_level)
            .field("group_path", &self.group_path)
            .field("matched", &self.matched)
            .finish_non_exhaustive()
    }
}

impl Router {
    /// Create a router for one request
    #[must_use]
    pub fn new(context: RequestContext, types: Arc<PatternTypes>) -> Self {
        let mut router = Self {
            path: context.path().to_string(),
            types,
            context,
            routes: VecDeque::new(),
            groups: VecDeque::new(),
            group_level: 0,
            group_path: String::new(),
            path_segments: Vec::new(),
            group_segments: VecDeque::new(),
            matched: false,
            pattern: None,
            allowed: Vec::new(),
        };
        router.init();
        router
    }

    /// Split the working path into segments for group matching
    fn init(&mut self) {
        self.path_segments = self
            .path
            .trim_matches('/')
            .split('/')
            .map(str::to_string)
            .collect();
        self.group_segments = self.path_segments.iter().cloned().collect();
    }

    /// Rewrite the working path for requests whose method is in `methods`
    ///
    /// `pattern` is anchored at both ends and applied once; `replacement`
    /// may reference captures as `$1` or `${name}`. Call it before
    /// registering groups: the path segments are recomputed from the
    /// rewritten path.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidPattern` if `pattern` is not a valid regex.
    pub fn rewrite<I, S>(&mut self, methods: I, pattern: &str, replacement: &str) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let method = self.context.method();
        if !methods.into_iter().any(|m| m.as_ref() == method) {
            return Ok(());
        }

        let source = format!("^/{}$", pattern.trim_start_matches('/'));
        let regex = Regex::new(&source).map_err(|e| Error::invalid_pattern(&source, e))?;
        let rewritten = format!(
            "/{}",
            regex.replacen(&self.path, 1, replacement).trim_start_matches('/')
        );

        if rewritten != self.path {
            debug!(from = %self.path, to = %rewritten, "Path rewritten");
            self.path = rewritten;
            self.init();
        }
        Ok(())
    }

    /// Queue a route for `methods`
    ///
    /// Inside a matched group the pattern is prefixed with the matched
    /// prefix path.
    ///
    /// # Errors
    ///
    /// Returns any pattern compilation error.
    pub fn map<I, S>(&mut self, methods: I, pattern: &str, handler: impl Into<Handler>) -> Result<&mut Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rule = pattern.trim_matches('/');
        let template = if self.group_level > 0 {
            format!("{}{rule}", self.group_path)
        } else {
            rule.to_string()
        };
        let compiled = CompiledPattern::compile(&template, &self.types, &template)?;
        let methods: Vec<String> = methods.into_iter().map(Into::into).collect();
        trace!(pattern = %template, methods = ?methods, "Route queued");

        self.routes.push_back(RoutePayload {
            methods,
            pattern: compiled,
            handler: handler.into(),
            middleware: MiddlewareList::new(),
        });
        Ok(self)
    }

    /// Queue a `GET` route
    ///
    /// # Errors
    ///
    /// See [`Router::map`].
    pub fn get(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<&mut Self> {
        self.map([Method::Get.as_str()], pattern, handler)
    }

    /// Queue a `POST` route
    ///
    /// # Errors
    ///
    /// See [`Router::map`].
    pub fn post(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<&mut Self> {
        self.map([Method::Post.as_str()], pattern, handler)
    }

    /// Queue a `PUT` route
    ///
    /// # Errors
    ///
    /// See [`Router::map`].
    pub fn put(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<&mut Self> {
        self.map([Method::Put.as_str()], pattern, handler)
    }

    /// Queue a `PATCH` route
    ///
    /// # Errors
    ///
    /// See [`Router::map`].
    pub fn patch(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<&mut Self> {
        self.map([Method::Patch.as_str()], pattern, handler)
    }

    /// Queue a `DELETE` route
    ///
    /// # Errors
    ///
    /// See [`Router::map`].
    pub fn delete(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<&mut Self> {
        self.map([Method::Delete.as_str()], pattern, handler)
    }

    /// Queue an `OPTIONS` route
    ///
    /// # Errors
    ///
    /// See [`Router::map`].
    pub fn options(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<&mut Self> {
        self.map([Method::Options.as_str()], pattern, handler)
    }

    /// Queue a `HEAD` route
    ///
    /// # Errors
    ///
    /// See [`Router::map`].
    pub fn head(&mut self, pattern: &str, handler: impl Into<Handler>) -> Result<&mut Self> {
        self.map([Method::Head.as_str()], pattern, handler)
    }

    /// Attach a middleware to the most recently queued route
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if no route has been queued yet.
    pub fn middleware(&mut self, middleware: impl Into<Middleware>) -> Result<&mut Self> {
        let Some(payload) = self.routes.back_mut() else {
            return Err(Error::invalid_argument(
                "Middleware must follow a route registration.",
            ));
        };
        payload.middleware.add(middleware);
        Ok(self)
    }

    /// Queue a group under the prefix segment `pattern`
    ///
    /// Inside a matched group the new group is nested under the matched
    /// prefix and only runs once that whole prefix chain has matched.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidArgument` if the prefix is empty.
    pub fn group<F>(&mut self, pattern: &str, callback: F) -> Result<&mut Self>
    where
        F: FnOnce(&mut Self, &str) -> Result<()> + 'static,
    {
        let pattern = pattern.trim_matches('/');
        if pattern.is_empty() {
            return Err(Error::invalid_argument("Group pattern must not be empty."));
        }
        let parent = if self.group_level > 0 {
            self.group_path.clone()
        } else {
            String::new()
        };
        self.groups.push_back(GroupDescriptor {
            pattern: pattern.to_string(),
            parent,
            callback: Box::new(callback),
        });
        Ok(self)
    }

    /// Drain the group queue, running the callback of every group whose
    /// parent prefix is the one matched so far and whose own prefix is the
    /// next unconsumed path segment
    ///
    /// Groups queued by a callback are visited in the same pass.
    ///
    /// # Errors
    ///
    /// Propagates the first error returned by a group callback.
    pub fn pop_group(&mut self) -> Result<()> {
        while let Some(group) = self.groups.pop_front() {
            let hit = group.parent == self.group_path
                && self
                    .group_segments
                    .front()
                    .is_some_and(|segment| !segment.is_empty() && *segment == group.pattern);
            if !hit {
                trace!(group = %group.pattern, "Group skipped");
                continue;
            }

            self.group_level += 1;
            self.group_path.push_str(&group.pattern);
            self.group_path.push('/');
            debug!(
                group = %group.pattern,
                level = self.group_level,
                prefix = %self.group_path,
                "Group matched"
            );
            (group.callback)(self, &group.pattern)?;
            self.group_segments.pop_front();
        }
        self.group_level = 0;
        Ok(())
    }

    /// Drain the route queue until a candidate accepts the working path
    /// and the request method
    ///
    /// Returns `None` when the queue empties without a match. Candidates
    /// matching the path but not the method are remembered in
    /// [`Router::allowed_methods`].
    pub fn pop_route(&mut self) -> Option<Dispatched> {
        let path = normalize(&self.path);
        while let Some(candidate) = self.routes.pop_front() {
            let Some((arguments, params)) = candidate.pattern.match_params(&path) else {
                continue;
            };

            if !candidate.methods.iter().any(|m| m == self.context.method()) {
                trace!(
                    pattern = %candidate.pattern.template(),
                    method = %self.context.method(),
                    "Route matched path but not method"
                );
                for method in candidate.methods {
                    if !self.allowed.contains(&method) {
                        self.allowed.push(method);
                    }
                }
                continue;
            }

            self.matched = true;
            self.pattern = Some(candidate.pattern.as_str().to_string());
            debug!(
                pattern = %candidate.pattern.template(),
                handler = %candidate.handler,
                "Route matched"
            );
            return Some(Dispatched {
                params,
                template: candidate.pattern.path().to_string(),
                methods: candidate.methods,
                handler: candidate.handler,
                arguments,
                middleware: candidate.middleware,
            });
        }
        None
    }

    /// Run a full dispatch pass: groups first, then routes
    ///
    /// # Errors
    ///
    /// Propagates group callback errors.
    pub fn dispatch(&mut self) -> Result<Option<Dispatched>> {
        self.pop_group()?;
        Ok(self.pop_route())
    }

    /// The request snapshot
    #[must_use]
    pub const fn context(&self) -> &RequestContext {
        &self.context
    }

    /// Working path, after any rewrite
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Working path split into segments
    #[must_use]
    pub fn path_segments(&self) -> &[String] {
        &self.path_segments
    }

    /// Accumulated prefix of matched groups, `admin/users/`
    #[must_use]
    pub fn group_path(&self) -> &str {
        &self.group_path
    }

    /// Current group nesting depth, non-zero only inside a callback
    #[must_use]
    pub const fn group_level(&self) -> usize {
        self.group_level
    }

    /// Whether a route matched
    #[must_use]
    pub const fn has_match(&self) -> bool {
        self.matched
    }

    /// Source of the winning pattern
    #[must_use]
    pub fn pattern(&self) -> Option<&str> {
        self.pattern.as_deref()
    }

    /// Methods of path-matching candidates rejected on method
    #[must_use]
    pub fn allowed_methods(&self) -> &[String] {
        &self.allowed
    }

    /// Number of routes still queued
    #[must_use]
    pub fn queued_routes(&self) -> usize {
        self.routes.len()
    }
}
