//! # Route Loader
//!
//! Builds a [`RouteCollection`] from a declarative JSON source:
//!
//! ```json
//! {
//!   "home":   { "path": "/", "handler": "Home::index" },
//!   "user":   { "method": ["GET", "POST"], "path": "/user/<id:int>",
//!               "handler": "User::show", "middleware": ["Auth"] },
//!   "admin/": { "middleware": ["Admin"],
//!               "dashboard": { "path": "dashboard", "handler": "Admin::dashboard" } }
//! }
//! ```
//!
//! Keys containing the pipe delimiter declare pipes. Inside a pipe the
//! `middleware` key holds the pipe middleware and every other key is a
//! member route. Top-level and member entries are validated alike.
//! Declaration order is kept: it is the order routes are matched in.

use crate::collection::RouteCollection;
use crate::config::LoaderConfig;
use crate::error::{Error, Result};
use crate::middleware::{Middleware, MiddlewareList};
use crate::registry::PatternTypes;
use crate::route::{PipeDefinition, RouteDefinition};
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};

/// Source of route definitions
pub trait Loader {
    /// Load the routes stored at `path`
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if the source is missing or malformed, and
    /// `Error::BadRoute` if an entry lacks its path or handler.
    fn load(&self, path: &Path) -> Result<RouteCollection>;
}

/// `"GET"` or `["GET", "POST"]`
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMethods {
    One(String),
    Many(Vec<String>),
}

/// `"Auth"`, `{"name": "Auth"}` or a list of either
#[derive(Deserialize)]
#[serde(untagged)]
enum RawMiddleware {
    Many(MiddlewareList),
    One(Middleware),
}

impl From<RawMiddleware> for MiddlewareList {
    fn from(raw: RawMiddleware) -> Self {
        match raw {
            RawMiddleware::Many(list) => list,
            RawMiddleware::One(middleware) => std::iter::once(middleware).collect(),
        }
    }
}

#[derive(Deserialize)]
struct RawRoute {
    #[serde(default)]
    method: Option<RawMethods>,
    #[serde(default)]
    path: Option<String>,
    #[serde(default)]
    handler: Option<String>,
    #[serde(default)]
    middleware: Option<RawMiddleware>,
}

/// Loads routes from JSON
#[derive(Debug, Clone)]
pub struct JsonLoader {
    config: LoaderConfig,
    types: Arc<PatternTypes>,
}

impl Default for JsonLoader {
    fn default() -> Self {
        Self::new(Arc::new(PatternTypes::default()))
    }
}

impl JsonLoader {
    /// Create a loader compiling routes against `types`
    #[must_use]
    pub fn new(types: Arc<PatternTypes>) -> Self {
        Self {
            config: LoaderConfig::default(),
            types,
        }
    }

    /// Replace the loader configuration
    #[must_use]
    pub fn with_config(mut self, config: LoaderConfig) -> Self {
        self.config = config;
        self
    }

    /// Loader configuration
    #[must_use]
    pub const fn config(&self) -> &LoaderConfig {
        &self.config
    }

    /// Load routes from a JSON string
    ///
    /// # Errors
    ///
    /// See [`Loader::load`].
    pub fn load_str(&self, source: &str) -> Result<RouteCollection> {
        let value: Value = serde_json::from_str(source)
            .map_err(|e| Error::parse(format!("Malformed route source: {e}")))?;
        let mut collection = RouteCollection::new(Arc::clone(&self.types));
        self.build(value, &mut collection)?;
        Ok(collection)
    }

    /// Add every entry of a parsed source to `collection`
    ///
    /// # Errors
    ///
    /// Returns `Error::Parse` if the source is not an object, plus any
    /// validation, compilation or uniqueness error from the entries.
    pub fn build(&self, source: Value, collection: &mut RouteCollection) -> Result<()> {
        let Value::Object(entries) = source else {
            return Err(Error::parse("Route source must be an object."));
        };

        for (name, entry) in entries {
            if self.config.is_pipe(&name) {
                let pipe = self.pipe_definition(name, entry)?;
                collection.add_pipe(pipe)?;
            } else {
                let route = self.route_definition(name, entry)?;
                collection.add_route(route)?;
            }
        }

        info!(routes = collection.len(), "Routes loaded");
        Ok(())
    }

    fn pipe_definition(&self, name: String, entry: Value) -> Result<PipeDefinition> {
        let Value::Object(members) = entry else {
            return Err(Error::bad_route(&name, "Pipe must be an object."));
        };

        let mut pipe = PipeDefinition::new(name);
        for (key, member) in members {
            if key == "middleware" {
                pipe.middleware = parse_middleware(&pipe.name, member)?;
            } else {
                pipe.routes.push(self.route_definition(key, member)?);
            }
        }
        debug!(pipe = %pipe.name, routes = pipe.routes.len(), "Pipe parsed");
        Ok(pipe)
    }

    fn route_definition(&self, name: String, entry: Value) -> Result<RouteDefinition> {
        if !entry.is_object() {
            return Err(Error::bad_route(&name, "Route must be an object."));
        }
        let raw: RawRoute = serde_json::from_value(entry)
            .map_err(|e| Error::bad_route(&name, format!("Malformed route: {e}")))?;

        let methods = match raw.method {
            None => vec![self.config.default_method.clone()],
            Some(RawMethods::One(method)) => vec![method],
            Some(RawMethods::Many(methods)) => methods,
        };
        let definition = RouteDefinition {
            name,
            methods,
            path: raw.path.unwrap_or_default(),
            handler: raw.handler.unwrap_or_default().into(),
            middleware: raw.middleware.map(Into::into).unwrap_or_default(),
        };
        definition.validate()?;
        Ok(definition)
    }
}

impl Loader for JsonLoader {
    fn load(&self, path: &Path) -> Result<RouteCollection> {
        if !path.exists() {
            return Err(Error::parse(format!(
                "File \"{}\" does not exist.",
                crate::error::escape(&path.display().to_string())
            )));
        }
        let source = std::fs::read_to_string(path)?;
        debug!(path = %path.display(), bytes = source.len(), "Route source read");
        self.load_str(&source)
    }
}

fn parse_middleware(owner: &str, value: Value) -> Result<MiddlewareList> {
    serde_json::from_value::<RawMiddleware>(value)
        .map(Into::into)
        .map_err(|e| Error::bad_route(owner, format!("Malformed middleware: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collection::Entry;

    const SOURCE: &str = r#"{
        "home": { "path": "/", "handler": "Home::index" },
        "user": {
            "method": ["GET", "POST"],
            "path": "/user/<id:int>",
            "handler": "User::show",
            "middleware": ["Auth", { "name": "Throttle", "args": ["60"] }]
        },
        "admin/": {
            "middleware": "Admin",
            "dashboard": { "path": "dashboard", "handler": "Admin::dashboard" },
            "users": { "method": "DELETE", "path": "users/<id:int>", "handler": "Admin::delete" }
        },
        "about": { "path": "/about", "handler": "Page::about" }
    }"#;

    #[test]
    fn test_load_str() {
        let routes = JsonLoader::default().load_str(SOURCE).unwrap();

        assert_eq!(routes.len(), 5);
        let user = routes.get("user").unwrap();
        assert_eq!(user.methods(), ["GET", "POST"]);
        assert_eq!(user.middleware().names(), vec!["Auth", "Throttle"]);

        let delete = routes.get("admin/users").unwrap();
        assert_eq!(delete.methods(), ["DELETE"]);
        assert_eq!(delete.path(), "/admin/users/<id:int>");

        let pipe = routes.get_pipe("admin/").unwrap();
        assert_eq!(pipe.middleware().names(), vec!["Admin"]);
        assert_eq!(routes.get("home").unwrap().methods(), ["GET"]);
    }

    #[test]
    fn test_declaration_order_is_kept() {
        let routes = JsonLoader::default().load_str(SOURCE).unwrap();
        let kinds: Vec<&str> = routes
            .entries()
            .iter()
            .map(|entry| match entry {
                Entry::Route(route) => route.name(),
                Entry::Pipe(pipe) => pipe.name(),
            })
            .collect();
        assert_eq!(kinds, vec!["home", "user", "admin/", "about"]);
    }

    #[test]
    fn test_default_method_from_config() {
        let loader = JsonLoader::default()
            .with_config(LoaderConfig::default().with_default_method("POST"));
        let routes = loader
            .load_str(r#"{"submit": {"path": "/submit", "handler": "Form::submit"}}"#)
            .unwrap();
        assert_eq!(routes.get("submit").unwrap().methods(), ["POST"]);
    }

    #[test]
    fn test_missing_path_or_handler() {
        let loader = JsonLoader::default();
        let err = loader
            .load_str(r#"{"a": {"handler": "A::b"}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::BadRoute { .. }));
        assert!(err.to_string().contains("path is undefined"));

        let err = loader.load_str(r#"{"a": {"path": "/a"}}"#).unwrap_err();
        assert!(err.to_string().contains("handler is undefined"));
    }

    #[test]
    fn test_pipe_members_are_validated() {
        let err = JsonLoader::default()
            .load_str(r#"{"admin/": {"dashboard": {"path": "dashboard"}}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::BadRoute { .. }));
        assert!(err.to_string().contains("dashboard"));
    }

    #[test]
    fn test_malformed_source() {
        let loader = JsonLoader::default();
        assert!(matches!(loader.load_str("{ not json").unwrap_err(), Error::Parse { .. }));
        assert!(matches!(loader.load_str("[]").unwrap_err(), Error::Parse { .. }));
        assert!(matches!(
            loader.load_str(r#"{"a": "nope"}"#).unwrap_err(),
            Error::BadRoute { .. }
        ));
    }

    #[test]
    fn test_missing_file() {
        let err = JsonLoader::default()
            .load(Path::new("/definitely/not/here/routes.json"))
            .unwrap_err();
        assert!(matches!(err, Error::Parse { .. }));
        assert!(err.to_string().contains("does not exist"));
    }

    #[test]
    fn test_unknown_type_in_source() {
        let err = JsonLoader::default()
            .load_str(r#"{"a": {"path": "/a/<id:uuid>", "handler": "A::b"}}"#)
            .unwrap_err();
        assert!(matches!(err, Error::UndefinedParameter { .. }));
    }
}
