//! main client
//!
//! composes request building, transport, and response interpretation, and
//! owns the transport for the lifetime of the client.

use crate::cancel::CancellationToken;
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use crate::graphql::GraphQlResponse;
use crate::operation::{Operation, OperationKind};
use crate::request::{build_request, GraphQlRequest};
use crate::response::interpret;
use crate::transport::{ReqwestTransport, Transport};
use parking_lot::Mutex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::sync::Arc;
use url::Url;

/// graphql-over-http client
///
/// cheap to clone; clones share one transport and one lifecycle, so
/// disposing any clone disposes them all.
///
/// the endpoint and serializer options are fixed at construction.
#[derive(Clone)]
pub struct Client {
    inner: Arc<ClientInner>,
}

struct ClientInner {
    config: ClientConfig,
    endpoint: Url,
    lifecycle: Mutex<Lifecycle>,
    closed: CancellationToken,
}

enum Lifecycle {
    Open(Arc<dyn Transport>),
    Disposed,
}

impl Client {
    /// create a new client backed by a pooled reqwest transport
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport = ReqwestTransport::from_config(&config)?;
        Self::with_transport(config, transport)
    }

    /// create a client that sends through a caller-supplied transport
    ///
    /// transport settings on `config` (headers, timeout, tls) are not
    /// applied; the transport is used as-is.
    pub fn with_transport(config: ClientConfig, transport: impl Transport + 'static) -> Result<Self> {
        let endpoint = config.validate()?;
        Ok(Self {
            inner: Arc::new(ClientInner {
                config,
                endpoint,
                lifecycle: Mutex::new(Lifecycle::Open(Arc::new(transport))),
                closed: CancellationToken::new(),
            }),
        })
    }

    /// access the client configuration
    pub fn config(&self) -> &ClientConfig {
        &self.inner.config
    }

    /// graphql endpoint every request is sent to
    pub fn endpoint(&self) -> &Url {
        &self.inner.endpoint
    }

    /// send a query with typed variables
    pub async fn send_query<V, R>(
        &self,
        request: &GraphQlRequest<V>,
        cancel: Option<&CancellationToken>,
    ) -> Result<GraphQlResponse<R>>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        self.dispatch(OperationKind::Query, request, cancel).await
    }

    /// send a query whose variables are untyped json
    pub async fn send_untyped_query<R: DeserializeOwned>(
        &self,
        request: &GraphQlRequest,
        cancel: Option<&CancellationToken>,
    ) -> Result<GraphQlResponse<R>> {
        self.dispatch(OperationKind::Query, request, cancel).await
    }

    /// send a mutation with typed variables
    ///
    /// mutations travel the same pipeline as queries; the document alone
    /// tells the server what to do.
    pub async fn send_mutation<V, R>(
        &self,
        request: &GraphQlRequest<V>,
        cancel: Option<&CancellationToken>,
    ) -> Result<GraphQlResponse<R>>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        self.dispatch(OperationKind::Mutation, request, cancel).await
    }

    /// execute a raw graphql document with untyped variables
    pub async fn execute_raw(
        &self,
        query: &str,
        variables: Option<Value>,
        cancel: Option<&CancellationToken>,
    ) -> Result<GraphQlResponse<Value>> {
        let mut request = GraphQlRequest::new(query);
        match variables {
            Some(Value::Object(map)) => request = request.with_untyped_variables(map),
            Some(Value::Null) | None => {}
            Some(other) => request = request.with_variables(other),
        }
        self.send_untyped_query(&request, cancel).await
    }

    /// execute a statically described operation
    pub async fn execute_operation<O: Operation>(
        &self,
        variables: Option<O::Variables>,
        cancel: Option<&CancellationToken>,
    ) -> Result<GraphQlResponse<O::Response>> {
        let request = O::request(variables);
        self.dispatch(O::KIND, &request, cancel).await
    }

    /// release the transport
    ///
    /// later sends fail with [`Error::ClientClosed`] before touching the
    /// network, and sends still in flight are abandoned with the same
    /// error. calling this again is a no-op.
    pub fn dispose(&self) {
        let previous = std::mem::replace(&mut *self.inner.lifecycle.lock(), Lifecycle::Disposed);
        if let Lifecycle::Open(transport) = previous {
            self.inner.closed.cancel();
            drop(transport);
            tracing::debug!(endpoint = %self.inner.endpoint, "graphql client disposed");
        }
    }

    /// true once [`dispose`](Self::dispose) has been called
    pub fn is_disposed(&self) -> bool {
        matches!(*self.inner.lifecycle.lock(), Lifecycle::Disposed)
    }

    fn transport(&self) -> Result<Arc<dyn Transport>> {
        match &*self.inner.lifecycle.lock() {
            Lifecycle::Open(transport) => Ok(transport.clone()),
            Lifecycle::Disposed => Err(Error::ClientClosed),
        }
    }

    async fn dispatch<V, R>(
        &self,
        kind: OperationKind,
        request: &GraphQlRequest<V>,
        cancel: Option<&CancellationToken>,
    ) -> Result<GraphQlResponse<R>>
    where
        V: Serialize,
        R: DeserializeOwned,
    {
        let transport = self.transport()?;
        let options = self.inner.config.serializer;
        let http_request = build_request(&self.inner.endpoint, request, &options)?;

        tracing::debug!(
            kind = kind.as_str(),
            endpoint = %self.inner.endpoint,
            operation = request.operation_name().unwrap_or("<anonymous>"),
            body_bytes = http_request.body.len(),
            "sending graphql request"
        );

        let pipeline = async {
            let response = transport.send(http_request).await?;
            tracing::debug!(status = response.status.as_u16(), "received graphql response");
            interpret::<R>(response, &options).await
        };

        let cancelled = async {
            match cancel {
                Some(token) => token.cancelled().await,
                None => std::future::pending::<()>().await,
            }
        };

        tokio::select! {
            biased;
            _ = self.inner.closed.cancelled() => {
                tracing::debug!(kind = kind.as_str(), "graphql request abandoned: client disposed");
                Err(Error::ClientClosed)
            }
            _ = cancelled => {
                tracing::debug!(kind = kind.as_str(), "graphql request cancelled");
                Err(Error::Cancelled)
            }
            result = pipeline => result,
        }
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("endpoint", &self.inner.endpoint.as_str())
            .field("disposed", &self.is_disposed())
            .finish()
    }
}
