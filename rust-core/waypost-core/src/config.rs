//! # Loader Configuration

use serde::Deserialize;

/// Route source loading options
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct LoaderConfig {
    /// Method applied to entries that do not declare one (default: `GET`)
    pub default_method: String,
    /// A top-level key containing this character declares a pipe (default: `/`)
    pub pipe_delimiter: char,
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            default_method: "GET".to_string(),
            pipe_delimiter: '/',
        }
    }
}

impl LoaderConfig {
    /// Set the default method
    #[must_use]
    pub fn with_default_method(mut self, method: impl Into<String>) -> Self {
        self.default_method = method.into();
        self
    }

    /// Set the pipe delimiter
    #[must_use]
    pub const fn with_pipe_delimiter(mut self, delimiter: char) -> Self {
        self.pipe_delimiter = delimiter;
        self
    }

    /// Whether a top-level key declares a pipe
    #[must_use]
    pub fn is_pipe(&self, key: &str) -> bool {
        key.contains(self.pipe_delimiter)
    }
}
