//! client configuration
//!
//! build a [`ClientConfig`] with the graphql endpoint and optional overrides,
//! then pass it to [`crate::Client::new`]. the config is frozen once the
//! client is created; there is no way to change the endpoint of a live
//! client, so in-flight requests always see a consistent target.

use crate::error::{Error, Result};
use crate::naming::FieldNaming;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// json naming options for requests and responses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerializerOptions {
    /// convention applied to typed variable field names
    ///
    /// default: [`FieldNaming::CamelCase`]
    pub request_naming: FieldNaming,
    /// convention applied to `data` keys before typed deserialization
    ///
    /// default: [`FieldNaming::Preserve`]
    pub response_naming: FieldNaming,
}

impl Default for SerializerOptions {
    fn default() -> Self {
        Self {
            request_naming: FieldNaming::CamelCase,
            response_naming: FieldNaming::Preserve,
        }
    }
}

/// configuration for the graphql client
#[derive(Clone)]
pub struct ClientConfig {
    /// original endpoint input
    pub(crate) raw_endpoint: String,

    /// parsed endpoint, `None` if the input was not an absolute url
    pub(crate) endpoint: Option<Url>,

    /// json naming options
    pub(crate) serializer: SerializerOptions,

    /// optional bearer token sent as `Authorization`
    pub(crate) token: Option<String>,

    /// request timeout duration
    pub(crate) timeout: Duration,

    /// user agent string
    pub(crate) user_agent: String,

    /// whether to verify ssl certificates
    pub(crate) verify_ssl: bool,

    /// additional headers to send with every request
    pub(crate) extra_headers: HeaderMap,

    /// prebuilt http client (takes precedence over http_client_builder)
    pub(crate) http_client: Option<reqwest::Client>,

    /// callback to customize the http client builder before building
    pub(crate) http_client_builder:
        Option<Arc<dyn Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync>>,
}

impl ClientConfig {
    /// create a new client configuration
    ///
    /// # arguments
    ///
    /// * `endpoint` - absolute url of the graphql endpoint
    ///
    /// # example
    ///
    /// ```
    /// use graphql_http::ClientConfig;
    ///
    /// let config = ClientConfig::new("https://api.example.com/graphql");
    /// ```
    pub fn new(endpoint: impl AsRef<str>) -> Self {
        let raw = endpoint.as_ref().trim();

        Self {
            raw_endpoint: raw.to_string(),
            endpoint: Url::parse(raw).ok(),
            serializer: SerializerOptions::default(),
            token: None,
            timeout: Duration::from_secs(30),
            user_agent: format!("graphql-http-rs/{} (Rust)", env!("CARGO_PKG_VERSION")),
            verify_ssl: true,
            extra_headers: HeaderMap::new(),
            http_client: None,
            http_client_builder: None,
        }
    }

    /// set the naming convention for typed variables
    ///
    /// default: lower camel case
    pub fn with_field_naming(mut self, naming: FieldNaming) -> Self {
        self.serializer.request_naming = naming;
        self
    }

    /// set the naming convention applied to response `data` keys
    ///
    /// default: keys are left as the server sent them
    pub fn with_response_naming(mut self, naming: FieldNaming) -> Self {
        self.serializer.response_naming = naming;
        self
    }

    /// replace both naming options at once
    pub fn with_serializer_options(mut self, options: SerializerOptions) -> Self {
        self.serializer = options;
        self
    }

    /// send `Authorization: Bearer <token>` with every request
    pub fn with_bearer_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    /// set the request timeout
    ///
    /// default: 30 seconds
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// set a custom user agent string
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// disable ssl certificate verification (not recommended for production)
    ///
    /// default: enabled
    pub fn with_ssl_verification(mut self, verify: bool) -> Self {
        self.verify_ssl = verify;
        self
    }

    /// add a header to every request
    pub fn with_header(mut self, name: HeaderName, value: HeaderValue) -> Self {
        self.extra_headers.insert(name, value);
        self
    }

    /// add a set of headers to every request
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.extra_headers.extend(headers);
        self
    }

    /// access extra headers configured on this client
    pub fn extra_headers(&self) -> &HeaderMap {
        &self.extra_headers
    }

    /// json naming options
    pub fn serializer_options(&self) -> SerializerOptions {
        self.serializer
    }

    /// inject a prebuilt http client.
    ///
    /// when set, this client is used as-is and takes precedence over
    /// `with_http_client_builder`. all transport configuration (auth
    /// headers, tls, timeouts, ssl verification, user agent) comes from the
    /// prebuilt client; the corresponding `ClientConfig` fields are ignored.
    pub fn with_http_client(mut self, http_client: reqwest::Client) -> Self {
        self.http_client = Some(http_client);
        self
    }

    /// customize the http client builder before the client is created.
    ///
    /// the callback receives a builder that already has the auth header,
    /// extra headers, user agent, timeout, and ssl settings applied.
    /// use this to add proxy config, custom tls roots, or pool tuning
    /// without reimplementing the defaults.
    ///
    /// ignored if `with_http_client` is also set.
    pub fn with_http_client_builder<F>(mut self, f: F) -> Self
    where
        F: Fn(reqwest::ClientBuilder) -> reqwest::ClientBuilder + Send + Sync + 'static,
    {
        self.http_client_builder = Some(Arc::new(f));
        self
    }

    /// validate the configuration and return the endpoint
    pub(crate) fn validate(&self) -> Result<Url> {
        let endpoint = self.endpoint.clone().ok_or_else(|| {
            Error::Config(format!("invalid endpoint url: {}", self.raw_endpoint))
        })?;

        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            return Err(Error::Config(format!(
                "invalid url scheme: {}. must be http or https",
                endpoint.scheme()
            )));
        }

        if matches!(&self.token, Some(token) if token.is_empty()) {
            return Err(Error::Config("bearer token cannot be empty".to_string()));
        }

        Ok(endpoint)
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("endpoint", &self.raw_endpoint)
            .field("serializer", &self.serializer)
            .field("timeout", &self.timeout)
            .field("user_agent", &self.user_agent)
            .field("verify_ssl", &self.verify_ssl)
            .field("extra_headers", &self.extra_headers.len())
            .field("http_client", &self.http_client.is_some())
            .field("http_client_builder", &self.http_client_builder.is_some())
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}
