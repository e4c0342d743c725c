//! response interpretation
//!
//! classifies an [`HttpResponse`] and decodes 2xx bodies into a
//! [`GraphQlResponse`]. graphql errors inside a 2xx body are returned as
//! data, never as an [`Error`].

use crate::config::SerializerOptions;
use crate::error::{Error, Result};
use crate::graphql::GraphQlResponse;
use crate::naming::FieldNaming;
use crate::transport::{BodyStream, HttpResponse};
use futures_util::StreamExt;
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// interpret a raw http response
///
/// non-2xx statuses fail with [`Error::Http`] carrying the raw body; the
/// body is not parsed because gateways and proxies rarely answer with a
/// graphql envelope. 2xx bodies are always parsed as an envelope.
pub async fn interpret<T: DeserializeOwned>(
    response: HttpResponse,
    options: &SerializerOptions,
) -> Result<GraphQlResponse<T>> {
    let HttpResponse {
        status,
        headers,
        body,
    } = response;

    if !status.is_success() {
        let body = match read_body(body).await {
            Ok(bytes) => String::from_utf8_lossy(&bytes).into_owned(),
            Err(err) => {
                tracing::debug!(error = %err, "failed to read error response body");
                String::new()
            }
        };

        if status.is_client_error() {
            tracing::warn!(status = status.as_u16(), response = %body, "graphql client error (4xx)");
        } else {
            tracing::warn!(status = status.as_u16(), response = %body, "graphql http error");
        }

        return Err(Error::Http {
            status: status.as_u16(),
            body,
            headers,
        });
    }

    let bytes = read_body(body).await?;
    decode_envelope(status, &bytes, options.response_naming)
}

async fn read_body(mut body: BodyStream) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    while let Some(chunk) = body.next().await {
        buf.extend_from_slice(&chunk?);
    }
    Ok(buf)
}

fn decode_envelope<T: DeserializeOwned>(
    status: StatusCode,
    bytes: &[u8],
    naming: FieldNaming,
) -> Result<GraphQlResponse<T>> {
    let decoded = if naming == FieldNaming::Preserve {
        serde_json::from_slice::<GraphQlResponse<T>>(bytes)
    } else {
        serde_json::from_slice::<GraphQlResponse<Value>>(bytes).and_then(|raw| {
            let data = raw
                .data
                .map(|data| naming.from_value::<T>(data))
                .transpose()?;
            Ok(GraphQlResponse {
                data,
                errors: raw.errors,
                extensions: raw.extensions,
            })
        })
    };

    decoded.map_err(|source| {
        let body = String::from_utf8_lossy(bytes).into_owned();
        tracing::warn!(
            status = status.as_u16(),
            error = %source,
            response = %body,
            "failed to deserialize graphql response"
        );
        Error::Deserialization {
            status: status.as_u16(),
            body,
            source,
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;
    use futures_util::stream;
    use reqwest::header::{HeaderMap, HeaderValue};
    use serde::Deserialize;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    fn response(status: StatusCode, body: &'static str) -> HttpResponse {
        HttpResponse::from_bytes(status, HeaderMap::new(), body)
    }

    fn chunked(status: StatusCode, chunks: Vec<&'static str>) -> HttpResponse {
        let chunks = chunks
            .into_iter()
            .map(|chunk| Ok::<_, Error>(Bytes::from_static(chunk.as_bytes())))
            .collect::<Vec<_>>();
        HttpResponse::new(status, HeaderMap::new(), Box::pin(stream::iter(chunks)))
    }

    async fn run<T: DeserializeOwned>(response: HttpResponse) -> Result<GraphQlResponse<T>> {
        interpret(response, &SerializerOptions::default()).await
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_data_only() {
        let parsed = run::<Value>(response(StatusCode::OK, r#"{"data":{"x":1}}"#))
            .await
            .unwrap();
        assert_eq!(parsed.data.unwrap()["x"], 1);
        assert!(parsed.errors.is_none());
        assert!(parsed.extensions.is_none());
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_errors_only_is_not_a_failure() {
        let parsed = run::<Value>(response(StatusCode::OK, r#"{"errors":[{"message":"boom"}]}"#))
            .await
            .unwrap();
        assert!(parsed.data.is_none());
        let errors = parsed.errors.unwrap();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "boom");
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_partial_success_keeps_both() {
        #[derive(Debug, Deserialize)]
        struct Data {
            user: Option<String>,
            count: i64,
        }

        let parsed = run::<Data>(response(
            StatusCode::OK,
            r#"{"data":{"user":null,"count":2},"errors":[{"message":"user hidden","path":["user"]}]}"#,
        ))
        .await
        .unwrap();
        assert!(parsed.is_partial());
        let data = parsed.data.unwrap();
        assert_eq!(data.count, 2);
        assert!(data.user.is_none());
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_empty_object_is_valid_envelope() {
        let parsed = run::<Value>(response(StatusCode::OK, "{}")).await.unwrap();
        assert!(parsed.data.is_none());
        assert!(parsed.errors.is_none());
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_non_success_keeps_raw_body() {
        let mut headers = HeaderMap::new();
        headers.insert("x-request-id", HeaderValue::from_static("abc"));
        // a graphql-shaped body is still not parsed on a 500
        let response = HttpResponse::from_bytes(
            StatusCode::INTERNAL_SERVER_ERROR,
            headers,
            r#"{"data":{"x":1}}"#,
        );

        let err = run::<Value>(response).await.unwrap_err();
        match err {
            Error::Http {
                status,
                body,
                headers,
            } => {
                assert_eq!(status, 500);
                assert_eq!(body, r#"{"data":{"x":1}}"#);
                assert_eq!(headers["x-request-id"], "abc");
            }
            other => panic!("expected http error, got {other:?}"),
        }
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_non_success_with_non_json_body() {
        let err = run::<Value>(response(StatusCode::BAD_GATEWAY, "<html>bad gateway</html>"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Http { status: 502, .. }));
        assert!(!err.is_auth_error());

        let err = run::<Value>(response(StatusCode::UNAUTHORIZED, "denied"))
            .await
            .unwrap_err();
        assert!(err.is_auth_error());
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_invalid_json_is_deserialization_error() {
        let err = run::<Value>(response(StatusCode::OK, "not json"))
            .await
            .unwrap_err();
        match err {
            Error::Deserialization { status, body, .. } => {
                assert_eq!(status, 200);
                assert_eq!(body, "not json");
            }
            other => panic!("expected deserialization error, got {other:?}"),
        }

        let err = run::<Value>(response(StatusCode::OK, "")).await.unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_shape_mismatch_is_deserialization_error() {
        #[derive(Debug, Deserialize)]
        #[allow(dead_code)]
        struct Data {
            value: i64,
        }

        let err = run::<Data>(response(StatusCode::OK, r#"{"data":{"value":"seven"}}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));

        let err = run::<Value>(response(StatusCode::OK, r#"{"errors":"nope"}"#))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_chunked_body_is_joined() {
        let parsed = run::<Value>(chunked(
            StatusCode::OK,
            vec![r#"{"data":"#, r#"{"x":"#, r#"1}}"#],
        ))
        .await
        .unwrap();
        assert_eq!(parsed.data.unwrap()["x"], 1);
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_body_read_failure_is_transport_error() {
        let body = stream::iter(vec![
            Ok(Bytes::from_static(b"{\"data\"")),
            Err(Error::Cancelled),
        ]);
        let response = HttpResponse::new(StatusCode::OK, HeaderMap::new(), Box::pin(body));
        let err = run::<Value>(response).await.unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_body_released_on_error_exit() {
        struct Released(Arc<AtomicBool>);

        impl Drop for Released {
            fn drop(&mut self) {
                self.0.store(true, Ordering::SeqCst);
            }
        }

        let released = Arc::new(AtomicBool::new(false));
        let guard = Released(released.clone());
        let body = stream::iter(vec![Ok::<_, Error>(Bytes::from_static(b"garbage"))]).map(move |chunk| {
            let _ = &guard;
            chunk
        });
        let response = HttpResponse::new(StatusCode::OK, HeaderMap::new(), Box::pin(body));

        let err = run::<Value>(response).await.unwrap_err();
        assert!(matches!(err, Error::Deserialization { .. }));
        assert!(released.load(Ordering::SeqCst));
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_response_naming_renames_data_keys() {
        #[derive(Debug, Deserialize)]
        struct Data {
            current_user: User,
        }

        #[derive(Debug, Deserialize)]
        struct User {
            display_name: String,
        }

        let options = SerializerOptions {
            response_naming: FieldNaming::SnakeCase,
            ..SerializerOptions::default()
        };
        let parsed: GraphQlResponse<Data> = interpret(
            response(
                StatusCode::OK,
                r#"{"data":{"currentUser":{"displayName":"ada"}},"extensions":{"traceId":"t"}}"#,
            ),
            &options,
        )
        .await
        .unwrap();

        assert_eq!(parsed.data.unwrap().current_user.display_name, "ada");
        // only data is renamed
        assert_eq!(parsed.extensions.unwrap()["traceId"], "t");
    }

    #[cfg_attr(miri, ignore)]
    #[tokio::test]
    async fn test_response_naming_leaves_map_keys() {
        #[derive(Debug, Deserialize)]
        struct Data {
            totals_by_team: std::collections::HashMap<String, u32>,
        }

        let options = SerializerOptions {
            response_naming: FieldNaming::SnakeCase,
            ..SerializerOptions::default()
        };
        let parsed: GraphQlResponse<Data> = interpret(
            response(StatusCode::OK, r#"{"data":{"totalsByTeam":{"coreTeam":3}}}"#),
            &options,
        )
        .await
        .unwrap();
        assert_eq!(parsed.data.unwrap().totals_by_team["coreTeam"], 3);

        let err = interpret::<Data>(
            response(StatusCode::OK, r#"{"data":{"totalsByTeam":{},"totals_by_team":{}}}"#),
            &options,
        )
        .await
        .unwrap_err();
        assert!(matches!(err, Error::Deserialization { status: 200, .. }));
    }
}
