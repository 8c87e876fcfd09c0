//! # Path Pattern Compiler
//!
//! Turns a path template such as `/users/<id:int>/<title:slug>` into:
//!
//! - an anchored regex with one named group per placeholder
//!   (`^/users/(?P<id>[0-9]+)/(?P<title>[\w-]+)$`), used for matching;
//! - an ordered list of [`Segment`]s, used to format URLs back out.
//!
//! Templates without placeholders skip the regex entirely and match by
//! string equality. Leading and trailing slashes are normalized away on
//! both the template and the request path, so `/a/b/` and `a/b` match
//! the same routes as `/a/b`.

use crate::error::{Error, Result};
use crate::registry::PatternTypes;
use crate::types::{parse_placeholder, ParamValue, PatternType};
use regex::Regex;
use std::fmt;
use std::sync::Arc;
use tracing::trace;

/// Compiled-pattern interface used by the matcher and the router
///
/// Keeps the matching engine swappable: anything that can test a path
/// and report its capture names can stand in for [`CompiledPattern`].
pub trait PathMatcher: Send + Sync + fmt::Debug {
    /// Match `path`, returning captured arguments in left-to-right order
    fn match_path(&self, path: &str) -> Option<Vec<String>>;

    /// Names of the capture groups, in template order
    fn capture_names(&self) -> Vec<&str>;

    /// Source of the pattern as matched (regex or normalized path)
    fn as_str(&self) -> &str;
}

/// Normalize a path: exactly one leading slash, no trailing slash
///
/// The root path normalizes to `/`.
#[must_use]
pub fn normalize(path: &str) -> String {
    format!("/{}", path.trim_matches('/'))
}

/// A typed placeholder inside a template
#[derive(Debug, Clone)]
pub struct Param {
    /// Capture group name (`id` in `<id:int>`)
    pub name: String,
    /// The placeholder as written (`<id:int>`)
    pub placeholder: String,
    /// Resolved placeholder type
    pub pattern_type: Arc<dyn PatternType>,
    /// Anchored type fragment used to validate generated values
    validator: Regex,
}

impl Param {
    /// Check a formatted URL value against the type fragment
    #[must_use]
    pub fn accepts(&self, text: &str) -> bool {
        self.validator.is_match(text)
    }
}

/// One `/`-delimited piece of a template
#[derive(Debug, Clone)]
pub enum Segment {
    /// Plain text, matched literally and emitted verbatim
    Literal(String),
    /// Typed placeholder
    Param(Param),
}

/// Parse a template into segments, resolving every placeholder type
///
/// `route` is the route name (or path) quoted in error messages.
///
/// # Errors
///
/// Returns `Error::UndefinedParameter` if a placeholder names an
/// unregistered type tag, and `Error::InvalidPattern` if a type fragment
/// is not a valid regex.
pub fn parse_segments(template: &str, types: &PatternTypes, route: &str) -> Result<Vec<Segment>> {
    let body = template.trim_matches('/');
    if body.is_empty() {
        return Ok(Vec::new());
    }

    body.split('/')
        .map(|part| match parse_placeholder(part) {
            Some((name, tag)) => {
                let pattern_type = types.resolve(tag, part, route)?;
                let source = format!("^(?:{})$", pattern_type.regex());
                let validator =
                    Regex::new(&source).map_err(|e| Error::invalid_pattern(&source, e))?;
                Ok(Segment::Param(Param {
                    name: name.to_string(),
                    placeholder: part.to_string(),
                    pattern_type: Arc::clone(pattern_type),
                    validator,
                }))
            }
            None => Ok(Segment::Literal(part.to_string())),
        })
        .collect()
}

/// Format segments into a URL with positional arguments
///
/// Arguments are consumed in template order; surplus arguments are
/// ignored. The result has a leading slash and no trailing slash.
///
/// # Errors
///
/// Returns `Error::MissingArgument` when fewer arguments than
/// placeholders are given, and `Error::InvalidParameterValue` when a
/// formatted value does not satisfy its placeholder type.
pub fn format_segments(segments: &[Segment], args: &[ParamValue], route: &str) -> Result<String> {
    let expected = segments
        .iter()
        .filter(|s| matches!(s, Segment::Param(_)))
        .count();
    if args.len() < expected {
        return Err(Error::MissingArgument {
            route: crate::error::escape(route),
            expected,
            given: args.len(),
        });
    }

    let mut args = args.iter();
    let mut parts = Vec::with_capacity(segments.len());
    for segment in segments {
        match segment {
            Segment::Literal(text) => parts.push(text.clone()),
            Segment::Param(param) => {
                let Some(arg) = args.next() else {
                    break;
                };
                let text = param.pattern_type.to_url(arg);
                if !param.accepts(&text) {
                    return Err(Error::InvalidParameterValue {
                        placeholder: crate::error::escape(&param.placeholder),
                        value: crate::error::escape(&text),
                        route: crate::error::escape(route),
                    });
                }
                parts.push(text);
            }
        }
    }

    Ok(normalize(&parts.join("/")))
}

/// A path template compiled for matching and generation
#[derive(Debug, Clone)]
pub struct CompiledPattern {
    /// Template as written
    template: String,
    /// Normalized template, compared directly when there are no params
    path: String,
    /// Anchored regex, `None` for placeholder-free templates
    regex: Option<Regex>,
    segments: Vec<Segment>,
}

impl CompiledPattern {
    /// Compile `template`, resolving placeholder types from `types`
    ///
    /// # Errors
    ///
    /// Returns `Error::UndefinedParameter` for unknown type tags and
    /// `Error::InvalidPattern` if the assembled regex does not compile
    /// (for example two placeholders sharing a name).
    pub fn compile(template: &str, types: &PatternTypes, route: &str) -> Result<Self> {
        let segments = parse_segments(template, types, route)?;
        let path = normalize(template);

        let has_params = segments.iter().any(|s| matches!(s, Segment::Param(_)));
        let regex = if has_params {
            let body: Vec<String> = segments
                .iter()
                .map(|segment| match segment {
                    Segment::Literal(text) => regex::escape(text),
                    Segment::Param(param) => {
                        format!("(?P<{}>{})", param.name, param.pattern_type.regex())
                    }
                })
                .collect();
            let source = format!("^/{}$", body.join("/"));
            Some(Regex::new(&source).map_err(|e| Error::invalid_pattern(&source, e))?)
        } else {
            None
        };

        Ok(Self {
            template: template.to_string(),
            path,
            regex,
            segments,
        })
    }

    /// Template as written
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Normalized template path
    #[must_use]
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Template segments in order
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Placeholders in template order
    pub fn params(&self) -> impl Iterator<Item = &Param> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Param(param) => Some(param),
            Segment::Literal(_) => None,
        })
    }

    /// Whether the template has no placeholders
    #[must_use]
    pub const fn is_static(&self) -> bool {
        self.regex.is_none()
    }

    /// Format-string view of the template, placeholders as `%s`
    #[must_use]
    pub fn format_template(&self) -> String {
        let parts: Vec<&str> = self
            .segments
            .iter()
            .map(|segment| match segment {
                Segment::Literal(text) => text.as_str(),
                Segment::Param(_) => "%s",
            })
            .collect();
        normalize(&parts.join("/"))
    }

    /// Convert captured arguments to named typed values
    ///
    /// # Errors
    ///
    /// Returns the conversion error of the first argument its type rejects.
    pub fn typed_params(&self, args: &[String]) -> Result<Vec<(String, ParamValue)>> {
        self.params()
            .zip(args)
            .map(|(param, raw)| {
                param
                    .pattern_type
                    .to_value(raw)
                    .map(|value| (param.name.clone(), value))
            })
            .collect()
    }

    /// Match `path` and convert the captures in one step
    ///
    /// A capture its type cannot convert (an out-of-range integer, say)
    /// makes the whole path a non-match.
    #[must_use]
    pub fn match_params(&self, path: &str) -> Option<(Vec<String>, Vec<(String, ParamValue)>)> {
        let path = normalize(path);
        let Some(regex) = &self.regex else {
            return (path == self.path).then(|| (Vec::new(), Vec::new()));
        };

        let captures = regex.captures(&path)?;
        let arguments: Vec<String> = captures
            .iter()
            .skip(1)
            .map(|m| m.map_or_else(String::new, |m| m.as_str().to_string()))
            .collect();
        match self.typed_params(&arguments) {
            Ok(params) => Some((arguments, params)),
            Err(e) => {
                trace!(pattern = %regex.as_str(), %path, error = %e, "Capture rejected by its type");
                None
            }
        }
    }

    /// Format a URL for this template
    ///
    /// # Errors
    ///
    /// See [`format_segments`].
    pub fn format(&self, args: &[ParamValue], route: &str) -> Result<String> {
        format_segments(&self.segments, args, route)
    }
}

impl PathMatcher for CompiledPattern {
    fn match_path(&self, path: &str) -> Option<Vec<String>> {
        self.match_params(path).map(|(arguments, _)| arguments)
    }

    fn capture_names(&self) -> Vec<&str> {
        self.params().map(|param| param.name.as_str()).collect()
    }

    fn as_str(&self) -> &str {
        self.regex.as_ref().map_or(self.path.as_str(), Regex::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn compile(template: &str) -> CompiledPattern {
        CompiledPattern::compile(template, &PatternTypes::default(), template).unwrap()
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("/a/b/"), "/a/b");
        assert_eq!(normalize("a/b"), "/a/b");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize(""), "/");
    }

    #[test]
    fn test_static_pattern() {
        let pattern = compile("/users/");
        assert!(pattern.is_static());
        assert_eq!(pattern.as_str(), "/users");
        assert_eq!(pattern.match_path("/users"), Some(vec![]));
        assert_eq!(pattern.match_path("/users/"), Some(vec![]));
        assert_eq!(pattern.match_path("/users/1"), None);
    }

    #[test]
    fn test_static_pattern_escapes_regex_chars() {
        let pattern = compile("/files/a.b");
        assert_eq!(pattern.match_path("/files/a.b"), Some(vec![]));
        assert_eq!(pattern.match_path("/files/aXb"), None);
    }

    #[test]
    fn test_int_placeholder() {
        let pattern = compile("/user/<id:int>");
        assert_eq!(pattern.as_str(), "^/user/(?P<id>[0-9]+)$");
        assert_eq!(pattern.match_path("/user/42"), Some(vec!["42".to_string()]));
        assert_eq!(pattern.match_path("/user/42/"), Some(vec!["42".to_string()]));
        assert_eq!(pattern.match_path("/user/abc"), None);
    }

    #[test]
    fn test_int_placeholder_rejects_non_ascii_digits() {
        let pattern = compile("/user/<id:int>");
        assert_eq!(pattern.match_path("/user/\u{664}\u{662}"), None);
        assert_eq!(pattern.match_path("/user/\u{ff11}"), None);
    }

    #[test]
    fn test_unconvertible_capture_is_not_a_match() {
        let pattern = compile("/user/<id:int>");
        assert_eq!(pattern.match_path("/user/99999999999999999999"), None);
        assert!(pattern.match_params("/user/99999999999999999999").is_none());

        let (arguments, params) = pattern.match_params("/user/9223372036854775807").unwrap();
        assert_eq!(arguments, vec!["9223372036854775807"]);
        assert_eq!(params, vec![("id".to_string(), ParamValue::Int(i64::MAX))]);
    }

    #[test]
    fn test_typed_params_reports_conversion_failure() {
        let pattern = compile("/user/<id:int>");
        assert!(pattern.typed_params(&["abc".to_string()]).is_err());
    }

    #[test]
    fn test_literal_segment_is_escaped_next_to_params() {
        let pattern = compile("/v1.0/<id:int>");
        assert!(pattern.match_path("/v1.0/3").is_some());
        assert!(pattern.match_path("/v1x0/3").is_none());
    }

    #[test]
    fn test_multiple_placeholders_in_order() {
        let pattern = compile("/blog/<year:year>/<month:month>/<title:slug>");
        let args = pattern.match_path("/blog/2024/03/hello-world").unwrap();
        assert_eq!(args, vec!["2024", "03", "hello-world"]);
        assert_eq!(pattern.capture_names(), vec!["year", "month", "title"]);

        let typed = pattern.typed_params(&args).unwrap();
        assert_eq!(typed[0], ("year".to_string(), ParamValue::Int(2024)));
        assert_eq!(typed[1], ("month".to_string(), ParamValue::Int(3)));
        assert_eq!(typed[2], ("title".to_string(), ParamValue::String("hello-world".to_string())));
    }

    #[test]
    fn test_alternation_type_stays_anchored() {
        let pattern = compile("/flag/<on:bool>");
        assert!(pattern.match_path("/flag/true").is_some());
        assert!(pattern.match_path("/flag/1").is_some());
        assert!(pattern.match_path("/flag/truex").is_none());
        assert!(pattern.match_path("/flag/x1").is_none());
    }

    #[test]
    fn test_unknown_type_names_placeholder() {
        let err = CompiledPattern::compile("/user/<id:uuid>", &PatternTypes::default(), "user")
            .unwrap_err();
        assert!(matches!(err, Error::UndefinedParameter { .. }));
        assert!(err.to_string().contains("&lt;id:uuid&gt;"));
    }

    #[test]
    fn test_duplicate_names_fail() {
        let err = CompiledPattern::compile("/<a:int>/<a:int>", &PatternTypes::default(), "dup")
            .unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }

    #[test]
    fn test_format_template() {
        assert_eq!(compile("/user/<id:int>/posts/").format_template(), "/user/%s/posts");
    }

    #[test]
    fn test_format() {
        let pattern = compile("/user/<id:int>/posts");
        assert_eq!(pattern.format(&[42.into()], "user").unwrap(), "/user/42/posts");
    }

    #[test]
    fn test_format_rejects_invalid_value() {
        let pattern = compile("/user/<id:int>");
        let err = pattern.format(&["abc".into()], "user").unwrap_err();
        assert!(matches!(err, Error::InvalidParameterValue { .. }));
    }

    #[test]
    fn test_format_missing_argument() {
        let pattern = compile("/user/<id:int>/<name:str>");
        let err = pattern.format(&[1.into()], "user").unwrap_err();
        assert!(matches!(err, Error::MissingArgument { expected: 2, given: 1, .. }));
    }

    #[test]
    fn test_root() {
        let pattern = compile("/");
        assert!(pattern.segments().is_empty());
        assert!(pattern.match_path("/").is_some());
        assert!(pattern.match_path("").is_some());
        assert_eq!(pattern.format(&[], "home").unwrap(), "/");
    }
}
