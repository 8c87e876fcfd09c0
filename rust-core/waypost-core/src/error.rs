//! # Error Handling
//!
//! Centralized error types for Waypost core.
//! Uses `thiserror` for ergonomic error definitions.
//!
//! "No route matched" is never an error here: dispatch and matching
//! report it as `None`/`false`. Everything below is a configuration or
//! programmer error that aborts route building or URL generation.

use thiserror::Error;

/// Result type alias for Waypost operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error types for the Waypost routing engine
#[derive(Error, Debug)]
pub enum Error {
    /// URL generation was asked for a route that is not in the collection
    #[error("The route \"{name}\" is not available to generate the URL.")]
    RouteNotFound {
        /// The (escaped) route name
        name: String,
    },

    /// A placeholder names a type tag that is not registered
    #[error("The route \"{placeholder}\" parameter could not be resolved for the \"{route}\" route.")]
    UndefinedParameter {
        /// The (escaped) placeholder, e.g. `<id:uuid>`
        placeholder: String,
        /// The (escaped) route name or path being processed
        route: String,
    },

    /// A route definition is missing its name, path or handler
    #[error("Bad route \"{name}\": {reason}")]
    BadRoute {
        /// The (escaped) route name, empty if the name itself is missing
        name: String,
        /// What is wrong with the definition
        reason: String,
    },

    /// Route source could not be read or parsed
    #[error("Parse error: {message}")]
    Parse {
        /// Description of the failure
        message: String,
    },

    /// An API was called with an argument it cannot accept
    #[error("Invalid argument: {message}")]
    InvalidArgument {
        /// Description of the failure
        message: String,
    },

    /// A compiled path template or rewrite rule is not a valid regular expression
    #[error("Invalid route pattern: {pattern}: {source}")]
    InvalidPattern {
        /// The (escaped) offending pattern
        pattern: String,
        /// The regex compilation error
        #[source]
        source: regex::Error,
    },

    /// A route or pipe name is already registered in the collection
    #[error("The route name \"{name}\" is already registered.")]
    DuplicateRoute {
        /// The (escaped) duplicated name
        name: String,
    },

    /// Not enough positional arguments were supplied to generate a URL
    #[error("The \"{route}\" route expects {expected} argument(s), {given} given.")]
    MissingArgument {
        /// The (escaped) route name
        route: String,
        /// Number of placeholders in the template
        expected: usize,
        /// Number of arguments supplied
        given: usize,
    },

    /// A generation argument does not satisfy its placeholder type
    #[error("The value \"{value}\" is not valid for the \"{placeholder}\" parameter of the \"{route}\" route.")]
    InvalidParameterValue {
        /// The (escaped) placeholder
        placeholder: String,
        /// The (escaped) formatted value
        value: String,
        /// The (escaped) route name
        route: String,
    },

    /// No localized path is registered for a route and locale
    #[error("The route \"{name}\" has no translation for locale \"{locale}\".")]
    TranslationNotFound {
        /// The (escaped) route name
        name: String,
        /// The (escaped) locale
        locale: String,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Build a `RouteNotFound` error for `name`
    pub fn route_not_found(name: &str) -> Self {
        Self::RouteNotFound { name: escape(name) }
    }

    /// Build an `UndefinedParameter` error for `placeholder` within `route`
    pub fn undefined_parameter(placeholder: &str, route: &str) -> Self {
        Self::UndefinedParameter {
            placeholder: escape(placeholder),
            route: escape(route),
        }
    }

    /// Build a `BadRoute` error
    pub fn bad_route(name: &str, reason: impl Into<String>) -> Self {
        Self::BadRoute {
            name: escape(name),
            reason: reason.into(),
        }
    }

    /// Build a `Parse` error
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse {
            message: message.into(),
        }
    }

    /// Build an `InvalidArgument` error
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::InvalidArgument {
            message: message.into(),
        }
    }

    /// Build an `InvalidPattern` error
    pub fn invalid_pattern(pattern: &str, source: regex::Error) -> Self {
        Self::InvalidPattern {
            pattern: escape(pattern),
            source,
        }
    }

    /// Build a `DuplicateRoute` error
    pub fn duplicate_route(name: &str) -> Self {
        Self::DuplicateRoute { name: escape(name) }
    }
}

/// Escape a user-supplied string for safe display in HTML
///
/// Every route name, placeholder and value placed in a message passes
/// through here.
#[must_use]
pub fn escape(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#039;"),
            _ => out.push(c),
        }
    }
    out
}
