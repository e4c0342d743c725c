//! graphql over http
//!
//! this crate provides a small, typed client for sending graphql queries and
//! mutations over http. start with [`Client`] and [`ClientConfig`], build a
//! [`GraphQlRequest`], and read the [`GraphQlResponse`] that comes back.
//!
//! a send either fails with an [`Error`] (the request never completed, the
//! server answered non-2xx, the body was not json, or the client was
//! disposed) or returns an envelope whose `errors` field carries graphql
//! execution errors next to any partial `data`.
//!
//! ## quick start
//!
//! ```no_run
//! use graphql_http::{Client, ClientConfig, GraphQlRequest};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Serialize)]
//! struct Vars {
//!     user_id: String,
//! }
//!
//! #[derive(Debug, Deserialize)]
//! struct Data {
//!     user: Option<serde_json::Value>,
//! }
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::new(ClientConfig::new("http://localhost:4000/graphql"))?;
//! let request = GraphQlRequest::new("query($userId: ID!) { user(id: $userId) { name } }")
//!     .with_variables(Vars { user_id: "1".to_string() });
//!
//! let response = client.send_query::<_, Data>(&request, None).await?;
//! if response.has_errors() {
//!     eprintln!("partial: {:?}", response.errors());
//! }
//! println!("{:?}", response.data);
//!
//! client.dispose();
//! # Ok(())
//! # }
//! ```
//!
//! ## custom transports
//!
//! implement [`Transport`] and pass it to [`Client::with_transport`] to route
//! requests through something other than the built-in reqwest pool.

mod cancel;
mod client;
mod config;
mod error;
mod graphql;
mod naming;
mod operation;
mod request;
mod response;
mod transport;

pub use cancel::CancellationToken;
pub use client::Client;
pub use config::{ClientConfig, SerializerOptions};
pub use error::{Error, Result, Stage};
pub use graphql::{GraphQlError, GraphQlLocation, GraphQlResponse, PathSegment};
pub use naming::FieldNaming;
pub use operation::{Operation, OperationKind};
pub use request::{build_request, EncodeVariables, GraphQlRequest, HttpRequest, Variables};
pub use response::interpret;
pub use transport::{BodyStream, BoxFuture, HttpResponse, ReqwestTransport, Transport};
