//! http transport
//!
//! [`Transport`] is the seam between the pipeline and the network.
//! [`ReqwestTransport`] is the default implementation, backed by a pooled
//! `reqwest::Client`; tests and callers with special needs can plug in
//! their own.

use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::request::HttpRequest;
use bytes::Bytes;
use futures_util::{stream, Stream, StreamExt};
use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION};
use reqwest::StatusCode;
use std::fmt;
use std::future::Future;
use std::pin::Pin;

/// boxed future returned by transports
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// response body as a stream of chunks
pub type BodyStream = Pin<Box<dyn Stream<Item = Result<Bytes>> + Send>>;

/// an http response whose body has not been read yet
///
/// dropping it drops the body stream, which hands the underlying
/// connection back to its pool.
pub struct HttpResponse {
    /// http status code
    pub status: StatusCode,
    /// response headers
    pub headers: HeaderMap,
    /// response body
    pub body: BodyStream,
}

impl HttpResponse {
    /// response with a streaming body
    pub fn new(status: StatusCode, headers: HeaderMap, body: BodyStream) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// response with a fully buffered body
    pub fn from_bytes(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        let body: Bytes = body.into();
        Self::new(status, headers, Box::pin(stream::iter([Ok::<_, Error>(body)])))
    }
}

impl fmt::Debug for HttpResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HttpResponse")
            .field("status", &self.status)
            .field("headers", &self.headers)
            .finish_non_exhaustive()
    }
}

/// sends built requests and returns raw responses
///
/// implementations must fail with [`Error::Transport`] (or another
/// transport-stage error) when no response could be obtained, and return
/// non-2xx responses as ordinary [`HttpResponse`] values.
pub trait Transport: Send + Sync {
    /// send one request
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse>>;
}

/// transport backed by a pooled `reqwest::Client`
#[derive(Debug, Clone)]
pub struct ReqwestTransport {
    http: reqwest::Client,
}

impl ReqwestTransport {
    /// wrap an existing reqwest client
    pub fn new(http: reqwest::Client) -> Self {
        Self { http }
    }

    /// build the reqwest client described by `config`
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        if let Some(http) = &config.http_client {
            return Ok(Self::new(http.clone()));
        }

        let mut headers = HeaderMap::new();
        if let Some(token) = &config.token {
            let mut value = HeaderValue::from_str(&format!("Bearer {token}"))
                .map_err(|err| Error::Config(format!("invalid bearer token header value: {err}")))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        headers.extend(config.extra_headers.clone());

        let mut builder = reqwest::Client::builder()
            .default_headers(headers)
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .danger_accept_invalid_certs(!config.verify_ssl);

        if let Some(customize) = &config.http_client_builder {
            builder = customize(builder);
        }

        let http = builder
            .build()
            .map_err(|err| Error::Config(format!("failed to build http client: {err}")))?;
        Ok(Self::new(http))
    }

    /// the underlying reqwest client
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http
    }
}

impl Transport for ReqwestTransport {
    fn send(&self, request: HttpRequest) -> BoxFuture<'_, Result<HttpResponse>> {
        Box::pin(async move {
            let response = self
                .http
                .request(request.method, request.url)
                .headers(request.headers)
                .body(request.body)
                .send()
                .await?;

            let status = response.status();
            let headers = response.headers().clone();
            let body = response
                .bytes_stream()
                .map(|chunk| chunk.map_err(Error::from));

            Ok(HttpResponse::new(status, headers, Box::pin(body)))
        })
    }
}
