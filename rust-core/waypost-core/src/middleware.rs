//! # Middleware Attachment
//!
//! Routes and pipes carry an ordered list of middleware names with
//! optional arguments. The engine only records the association; running
//! the middleware is left to the dispatch pipeline of the host
//! application, which reads the list off the matched route.

use serde::{Deserialize, Serialize};

/// A named middleware with its argument list
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "MiddlewareEntry")]
pub struct Middleware {
    /// Middleware name as understood by the host pipeline
    pub name: String,
    /// Arguments passed to the middleware, in order
    pub args: Vec<String>,
}

impl Middleware {
    /// Create a middleware reference without arguments
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
        }
    }

    /// Create a middleware reference with arguments
    pub fn with_args<I, S>(name: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<&str> for Middleware {
    fn from(name: &str) -> Self {
        Self::new(name)
    }
}

/// Source forms accepted for a middleware entry: `"Auth"` or
/// `{ "name": "Throttle", "args": ["60"] }`
#[derive(Deserialize)]
#[serde(untagged)]
enum MiddlewareEntry {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        args: Vec<String>,
    },
}

impl From<MiddlewareEntry> for Middleware {
    fn from(entry: MiddlewareEntry) -> Self {
        match entry {
            MiddlewareEntry::Name(name) => Self::new(name),
            MiddlewareEntry::Full { name, args } => Self { name, args },
        }
    }
}

/// Ordered middleware list attached to a route or pipe
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MiddlewareList {
    middlewares: Vec<Middleware>,
}

impl MiddlewareList {
    /// Create an empty list
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a middleware
    pub fn add(&mut self, middleware: impl Into<Middleware>) {
        self.middlewares.push(middleware.into());
    }

    /// Append every middleware of `other`, keeping order
    pub fn extend(&mut self, other: &Self) {
        self.middlewares.extend(other.middlewares.iter().cloned());
    }

    /// Iterate in attachment order
    pub fn iter(&self) -> std::slice::Iter<'_, Middleware> {
        self.middlewares.iter()
    }

    /// Middleware names in attachment order
    #[must_use]
    pub fn names(&self) -> Vec<&str> {
        self.middlewares.iter().map(|m| m.name.as_str()).collect()
    }

    /// Get the number of middlewares
    #[must_use]
    pub fn len(&self) -> usize {
        self.middlewares.len()
    }

    /// Check if list is empty
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.middlewares.is_empty()
    }
}

impl<M: Into<Middleware>> FromIterator<M> for MiddlewareList {
    fn from_iter<I: IntoIterator<Item = M>>(iter: I) -> Self {
        Self {
            middlewares: iter.into_iter().map(Into::into).collect(),
        }
    }
}

impl<'a> IntoIterator for &'a MiddlewareList {
    type Item = &'a Middleware;
    type IntoIter = std::slice::Iter<'a, Middleware>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
