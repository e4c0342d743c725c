//! static operation helper
//!
//! operation trait for types that describe one fixed graphql document.

use crate::request::GraphQlRequest;
use serde::de::DeserializeOwned;
use serde::Serialize;

/// kind of graphql operation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationKind {
    /// read-only query
    Query,
    /// mutation
    Mutation,
}

impl OperationKind {
    /// lowercase name, as used in logs
    pub fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
        }
    }
}

/// graphql operation contract for statically described operations
///
/// ```
/// use graphql_http::{Operation, OperationKind};
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Serialize)]
/// struct Vars { user_id: String }
///
/// #[derive(Deserialize)]
/// struct Data { user: Option<serde_json::Value> }
///
/// struct GetUser;
///
/// impl Operation for GetUser {
///     const DOCUMENT: &'static str = "query GetUser($userId: ID!) { user(id: $userId) { id } }";
///     const OPERATION_NAME: Option<&'static str> = Some("GetUser");
///     type Variables = Vars;
///     type Response = Data;
/// }
///
/// assert_eq!(GetUser::KIND, OperationKind::Query);
/// ```
pub trait Operation {
    /// graphql query or mutation string
    const DOCUMENT: &'static str;
    /// operation name sent alongside the document
    const OPERATION_NAME: Option<&'static str> = None;
    /// query or mutation
    const KIND: OperationKind = OperationKind::Query;
    /// variables payload type
    type Variables: Serialize;
    /// response payload type
    type Response: DeserializeOwned;

    /// build the request for this operation
    fn request(variables: Option<Self::Variables>) -> GraphQlRequest<Self::Variables> {
        let mut request = GraphQlRequest::new(Self::DOCUMENT);
        if let Some(variables) = variables {
            request = request.with_variables(variables);
        }
        if let Some(name) = Self::OPERATION_NAME {
            request = request.with_operation_name(name);
        }
        request
    }
}
