//! request building
//!
//! turns a [`GraphQlRequest`] into an [`HttpRequest`] ready for a
//! [`crate::Transport`]. nothing here touches the network.

use crate::config::SerializerOptions;
use crate::error::{Error, Result};
use crate::naming::FieldNaming;
use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use reqwest::Method;
use serde::Serialize;
use serde_json::{Map, Value};
use url::Url;

/// operation variables
///
/// `Typed` values go through serde and have their struct field names renamed
/// with the configured convention. `Untyped` maps are sent exactly as given.
#[derive(Debug, Clone, PartialEq)]
pub enum Variables<V> {
    /// caller-defined serializable type
    Typed(V),
    /// dynamic map with caller-owned keys
    Untyped(Map<String, Value>),
}

/// anything that can be encoded as the `variables` member of a request
pub trait EncodeVariables {
    /// encode to a json value using `naming` for typed field names
    fn encode(&self, naming: FieldNaming) -> Result<Value>;
}

impl<V: Serialize> EncodeVariables for Variables<V> {
    fn encode(&self, naming: FieldNaming) -> Result<Value> {
        match self {
            Variables::Typed(value) => Ok(naming.to_value(value)?),
            Variables::Untyped(map) => Ok(Value::Object(map.clone())),
        }
    }
}

/// a graphql operation to send
///
/// the document is opaque text; it is never parsed or validated here.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphQlRequest<V = Value> {
    document: String,
    variables: Option<Variables<V>>,
    operation_name: Option<String>,
}

impl<V> GraphQlRequest<V> {
    /// create a request with no variables
    pub fn new(document: impl Into<String>) -> Self {
        Self {
            document: document.into(),
            variables: None,
            operation_name: None,
        }
    }

    /// attach typed variables
    pub fn with_variables(mut self, variables: V) -> Self {
        self.variables = Some(Variables::Typed(variables));
        self
    }

    /// attach an untyped variables map, sent without renaming
    pub fn with_untyped_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = Some(Variables::Untyped(variables));
        self
    }

    /// select an operation when the document defines several
    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    /// graphql document text
    pub fn document(&self) -> &str {
        &self.document
    }

    /// variables, if any
    pub fn variables(&self) -> Option<&Variables<V>> {
        self.variables.as_ref()
    }

    /// operation name, if any
    pub fn operation_name(&self) -> Option<&str> {
        self.operation_name.as_deref()
    }
}

impl GraphQlRequest<Value> {
    /// set a single untyped variable
    ///
    /// typed object variables already present are folded into the
    /// untyped map first. typed variables that are not an object (or null)
    /// are kept as they are and the new variable is ignored, so
    /// [`build_request`] still rejects them.
    pub fn variable(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        let mut map = match self.variables.take() {
            None | Some(Variables::Typed(Value::Null)) => Map::new(),
            Some(Variables::Untyped(map)) | Some(Variables::Typed(Value::Object(map))) => map,
            Some(typed) => {
                self.variables = Some(typed);
                return self;
            }
        };
        map.insert(name.into(), value.into());
        self.variables = Some(Variables::Untyped(map));
        self
    }
}

/// an http request produced by [`build_request`]
#[derive(Debug, Clone)]
pub struct HttpRequest {
    /// http method, always `POST`
    pub method: Method,
    /// target url
    pub url: Url,
    /// request headers
    pub headers: HeaderMap,
    /// encoded json body
    pub body: Bytes,
}

#[derive(Serialize)]
struct RequestBody<'a> {
    query: &'a str,
    variables: Value,
    #[serde(rename = "operationName", skip_serializing_if = "Option::is_none")]
    operation_name: Option<&'a str>,
}

/// build the http request for a graphql operation
///
/// the body is `{"query": ..., "variables": ...}` with `variables` set to
/// `null` when absent, plus `operationName` when one was given.
pub fn build_request<V: Serialize>(
    endpoint: &Url,
    request: &GraphQlRequest<V>,
    options: &SerializerOptions,
) -> Result<HttpRequest> {
    if request.document.trim().is_empty() {
        return Err(Error::InvalidOperation("graphql document is empty".to_string()));
    }

    let variables = match &request.variables {
        Some(variables) => variables.encode(options.request_naming)?,
        None => Value::Null,
    };
    if !matches!(variables, Value::Object(_) | Value::Null) {
        return Err(Error::InvalidOperation(
            "variables must encode to a json object".to_string(),
        ));
    }

    let body = serde_json::to_vec(&RequestBody {
        query: &request.document,
        variables,
        operation_name: request.operation_name.as_deref(),
    })?;

    let mut headers = HeaderMap::new();
    headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

    Ok(HttpRequest {
        method: Method::POST,
        url: endpoint.clone(),
        headers,
        body: Bytes::from(body),
    })
}
