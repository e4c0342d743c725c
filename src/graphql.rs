//! graphql types
//!
//! the response envelope and the error entries it carries.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// graphql response wrapper
///
/// `data` and `errors` are independent: a 2xx response may carry both
/// (partial success), only `errors`, or only `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GraphQlResponse<T> {
    /// response data, absent if execution failed entirely
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    /// graphql errors array
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<GraphQlError>>,
    /// server-defined extensions payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl<T> GraphQlResponse<T> {
    /// true if the response contains graphql errors
    pub fn has_errors(&self) -> bool {
        self.errors.as_ref().is_some_and(|errors| !errors.is_empty())
    }

    /// true if both data and errors are present
    pub fn is_partial(&self) -> bool {
        self.data.is_some() && self.has_errors()
    }

    /// error entries, empty if none were returned
    pub fn errors(&self) -> &[GraphQlError] {
        self.errors.as_deref().unwrap_or(&[])
    }

    /// first error entry
    pub fn first_error(&self) -> Option<&GraphQlError> {
        self.errors().first()
    }

    /// all error messages joined with `; `
    pub fn error_message(&self) -> Option<String> {
        if !self.has_errors() {
            return None;
        }
        Some(
            self.errors()
                .iter()
                .map(|err| err.message.as_str())
                .collect::<Vec<_>>()
                .join("; "),
        )
    }

    /// take the data, dropping errors and extensions
    pub fn into_data(self) -> Option<T> {
        self.data
    }
}

/// graphql error entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphQlError {
    /// error message
    pub message: String,
    /// error locations in the query
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locations: Option<Vec<GraphQlLocation>>,
    /// response path
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<Vec<PathSegment>>,
    /// optional extensions payload
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extensions: Option<Map<String, Value>>,
}

impl GraphQlError {
    /// error with only a message
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            locations: None,
            path: None,
            extensions: None,
        }
    }
}

impl fmt::Display for GraphQlError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)?;
        if let Some(path) = self.path.as_ref().filter(|path| !path.is_empty()) {
            write!(f, " (at ")?;
            for (i, segment) in path.iter().enumerate() {
                match segment {
                    PathSegment::Field(name) if i == 0 => write!(f, "{name}")?,
                    PathSegment::Field(name) => write!(f, ".{name}")?,
                    PathSegment::Index(idx) => write!(f, "[{idx}]")?,
                }
            }
            write!(f, ")")?;
        }
        Ok(())
    }
}

/// graphql error location
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphQlLocation {
    /// line number (1-based)
    pub line: u32,
    /// column number (1-based)
    pub column: u32,
}

/// one step in an error path
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    /// object field name
    Field(String),
    /// list index
    Index(u64),
}
