//! # Route Collection
//!
//! Ordered, name-indexed store of routes and pipes. Declaration order is
//! preserved because it is the order [`UrlMatcher`](crate::matcher::UrlMatcher)
//! tries entries in. Names are unique across top-level routes, pipes and
//! pipe members.
//!
//! The collection owns the [`PatternTypes`] registry its routes were
//! compiled against, so the URL generator resolves types from the same
//! source. Once built it is read-only and can be shared across threads.

use crate::error::{Error, Result};
use crate::registry::PatternTypes;
use crate::route::{Pipe, PipeDefinition, Route, RouteDefinition};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// A top-level collection entry
#[derive(Debug, Clone)]
pub enum Entry {
    /// A standalone route
    Route(Route),
    /// A group of routes under a prefix
    Pipe(Pipe),
}

/// Position of a named route: entry index, plus member index inside a pipe
#[derive(Debug, Clone, Copy)]
enum Slot {
    Route(usize),
    Pipe(usize),
    Member(usize, usize),
}

/// Registry of all named routes and pipes
#[derive(Debug, Clone)]
pub struct RouteCollection {
    types: Arc<PatternTypes>,
    entries: Vec<Entry>,
    index: HashMap<String, Slot>,
    /// (route name, locale) -> localized path template
    translations: HashMap<(String, String), String>,
}

impl Default for RouteCollection {
    fn default() -> Self {
        Self::new(Arc::new(PatternTypes::default()))
    }
}

impl RouteCollection {
    /// Create an empty collection compiling against `types`
    #[must_use]
    pub fn new(types: Arc<PatternTypes>) -> Self {
        Self {
            types,
            entries: Vec::new(),
            index: HashMap::new(),
            translations: HashMap::new(),
        }
    }

    /// The pattern type registry
    #[must_use]
    pub const fn types(&self) -> &Arc<PatternTypes> {
        &self.types
    }

    fn ensure_unique(&self, name: &str) -> Result<()> {
        if self.index.contains_key(name) {
            return Err(Error::duplicate_route(name));
        }
        Ok(())
    }

    /// Compile and append a route
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateRoute` if the name is taken, plus any
    /// validation or compilation error from the definition.
    pub fn add_route(&mut self, definition: RouteDefinition) -> Result<()> {
        self.ensure_unique(&definition.name)?;
        let route = definition.compile(&self.types)?;
        debug!(
            name = %route.name(),
            path = %route.path(),
            methods = ?route.methods(),
            "Route registered"
        );

        self.index
            .insert(route.name().to_string(), Slot::Route(self.entries.len()));
        self.entries.push(Entry::Route(route));
        Ok(())
    }

    /// Compile and append a pipe with all its member routes
    ///
    /// # Errors
    ///
    /// Returns `Error::DuplicateRoute` if the pipe name or any qualified
    /// member name is taken, plus any validation or compilation error.
    pub fn add_pipe(&mut self, definition: PipeDefinition) -> Result<()> {
        self.ensure_unique(&definition.name)?;
        let pipe = definition.compile(&self.types)?;
        for route in pipe.routes() {
            self.ensure_unique(route.name())?;
        }
        debug!(
            name = %pipe.name(),
            prefix = %pipe.prefix(),
            routes = pipe.routes().len(),
            "Pipe registered"
        );

        let slot = self.entries.len();
        self.index.insert(pipe.name().to_string(), Slot::Pipe(slot));
        for (member, route) in pipe.routes().iter().enumerate() {
            self.index
                .insert(route.name().to_string(), Slot::Member(slot, member));
        }
        self.entries.push(Entry::Pipe(pipe));
        Ok(())
    }

    /// Look up a route by name, including pipe members (`admin/dashboard`)
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Route> {
        match *self.index.get(name)? {
            Slot::Route(slot) => match &self.entries[slot] {
                Entry::Route(route) => Some(route),
                Entry::Pipe(_) => None,
            },
            Slot::Member(slot, member) => match &self.entries[slot] {
                Entry::Pipe(pipe) => pipe.routes().get(member),
                Entry::Route(_) => None,
            },
            Slot::Pipe(_) => None,
        }
    }

    /// Look up a pipe by name
    #[must_use]
    pub fn get_pipe(&self, name: &str) -> Option<&Pipe> {
        match *self.index.get(name)? {
            Slot::Pipe(slot) => match &self.entries[slot] {
                Entry::Pipe(pipe) => Some(pipe),
                Entry::Route(_) => None,
            },
            _ => None,
        }
    }

    /// Whether a route or pipe with this name exists
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    /// Top-level entries in declaration order
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    /// Every route, pipe members flattened in place, in declaration order
    pub fn routes(&self) -> impl Iterator<Item = &Route> {
        self.entries.iter().flat_map(|entry| match entry {
            Entry::Route(route) => std::slice::from_ref(route).iter(),
            Entry::Pipe(pipe) => pipe.routes().iter(),
        })
    }

    /// Number of routes, counting pipe members
    #[must_use]
    pub fn len(&self) -> usize {
        self.routes().count()
    }

    /// Whether the collection holds no routes
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.routes().next().is_none()
    }

    /// Register the localized path template of a route
    ///
    /// # Errors
    ///
    /// Returns `Error::RouteNotFound` if no route has this name.
    pub fn add_translation(
        &mut self,
        name: &str,
        locale: impl Into<String>,
        path: impl Into<String>,
    ) -> Result<()> {
        if self.get(name).is_none() {
            return Err(Error::route_not_found(name));
        }
        self.translations
            .insert((name.to_string(), locale.into()), path.into());
        Ok(())
    }

    /// Localized path template of a route, if one was registered
    #[must_use]
    pub fn translate_path(&self, name: &str, locale: &str) -> Option<&str> {
        self.translations
            .get(&(name.to_string(), locale.to_string()))
            .map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn collection() -> RouteCollection {
        let mut routes = RouteCollection::default();
        routes
            .add_route(RouteDefinition::new("home", "/", "Home::index"))
            .unwrap();
        routes
            .add_pipe(
                PipeDefinition::new("admin/")
                    .route(RouteDefinition::new("dashboard", "dashboard", "Admin::dashboard")),
            )
            .unwrap();
        routes
            .add_route(RouteDefinition::new("user", "/user/<id:int>", "User::show"))
            .unwrap();
        routes
    }

    #[test]
    fn test_get_routes_and_members() {
        let routes = collection();
        assert_eq!(routes.get("home").unwrap().handler().as_str(), "Home::index");
        assert_eq!(routes.get("admin/dashboard").unwrap().path(), "/admin/dashboard");
        assert!(routes.get("admin/").is_none());
        assert!(routes.get_pipe("admin/").is_some());
        assert!(routes.get("missing").is_none());
    }

    #[test]
    fn test_declaration_order() {
        let routes = collection();
        let names: Vec<&str> = routes.routes().map(Route::name).collect();
        assert_eq!(names, vec!["home", "admin/dashboard", "user"]);
        assert_eq!(routes.len(), 3);
        assert_eq!(routes.entries().len(), 3);
    }

    #[test]
    fn test_names_are_unique() {
        let mut routes = collection();
        let err = routes
            .add_route(RouteDefinition::new("home", "/other", "Other::index"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateRoute { .. }));

        let err = routes
            .add_route(RouteDefinition::new("admin/", "/x", "X::index"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateRoute { .. }));

        let err = routes
            .add_pipe(PipeDefinition::new("user"))
            .unwrap_err();
        assert!(matches!(err, Error::DuplicateRoute { .. }));
    }

    #[test]
    fn test_failed_add_leaves_collection_untouched() {
        let mut routes = collection();
        assert!(routes
            .add_route(RouteDefinition::new("bad", "/x/<id:uuid>", "X::y"))
            .is_err());
        assert!(!routes.contains("bad"));
        assert_eq!(routes.len(), 3);
    }

    #[test]
    fn test_translations() {
        let mut routes = collection();
        routes.add_translation("user", "tr", "/kullanici/<id:int>").unwrap();
        assert_eq!(routes.translate_path("user", "tr"), Some("/kullanici/<id:int>"));
        assert_eq!(routes.translate_path("user", "de"), None);
        assert!(routes.add_translation("nope", "tr", "/x").is_err());
    }
}
