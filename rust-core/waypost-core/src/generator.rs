//! # URL Generator
//!
//! Inverse of matching: builds a URL from a route name and positional
//! arguments. Each argument is formatted by its placeholder's type and
//! checked against the type's fragment, so a generated URL always matches
//! the route it was generated from.

use crate::collection::RouteCollection;
use crate::error::{escape, Error, Result};
use crate::pattern::{format_segments, parse_segments};
use crate::types::ParamValue;
use tracing::trace;

/// Generates URLs from the routes of a collection
#[derive(Debug, Clone, Copy)]
pub struct Generator<'a> {
    collection: &'a RouteCollection,
}

impl<'a> Generator<'a> {
    /// Create a generator over `collection`
    #[must_use]
    pub const fn new(collection: &'a RouteCollection) -> Self {
        Self { collection }
    }

    /// Generate the URL of route `name`
    ///
    /// Arguments fill the placeholders in template order. With a
    /// `locale`, the route's localized template (registered through
    /// [`RouteCollection::add_translation`]) is used instead of its path;
    /// placeholder types of that template are resolved here.
    ///
    /// # Errors
    ///
    /// - `Error::RouteNotFound` if no route is named `name`;
    /// - `Error::TranslationNotFound` if `locale` has no template;
    /// - `Error::UndefinedParameter` if a placeholder type is unknown;
    /// - `Error::MissingArgument` / `Error::InvalidParameterValue` for
    ///   missing or ill-typed arguments.
    pub fn generate(&self, name: &str, args: &[ParamValue], locale: Option<&str>) -> Result<String> {
        let route = self
            .collection
            .get(name)
            .ok_or_else(|| Error::route_not_found(name))?;

        let url = match locale {
            None => route.pattern().format(args, name)?,
            Some(locale) => {
                let template = self.collection.translate_path(name, locale).ok_or_else(|| {
                    Error::TranslationNotFound {
                        name: escape(name),
                        locale: escape(locale),
                    }
                })?;
                let segments = parse_segments(template, self.collection.types(), name)?;
                format_segments(&segments, args, name)?
            }
        };

        trace!(route = %name, locale = ?locale, %url, "URL generated");
        Ok(url)
    }
}
