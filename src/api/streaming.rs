//! Plain-text relay of streamed completion fragments.
//!
//! Fragments are written to the response body exactly as the provider emits
//! them: no delimiters, no event framing, no reordering. The body is pulled by
//! hyper, so the upstream is only read as fast as the client consumes.

use crate::api::disconnect::DisconnectStream;
use crate::core::cancel::{StreamCancelHandle, StreamOutcome};
use crate::core::{get_metrics, get_request_id};
use crate::services::provider::FragmentStream;
use axum::{
    body::{Body, Bytes},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use futures::stream::StreamExt;
use std::io;

pub const TEXT_PLAIN_UTF8: &str = "text/plain; charset=utf-8";

/// Build a streaming `text/plain` response from a fragment stream.
///
/// A mid-stream upstream failure is turned into a body error, which makes
/// hyper abort the chunked transfer so the client can tell the text is
/// truncated.
///
/// `model_label` tags the fragment counter and the relay's log lines. Pass a
/// bounded value such as [`ModelCatalog::metric_label`], never raw client input.
///
/// [`ModelCatalog::metric_label`]: crate::services::catalog::ModelCatalog::metric_label
pub fn relay_fragments(fragments: FragmentStream, model_label: String) -> Response {
    relay_fragments_with_handle(fragments, model_label, StreamCancelHandle::new())
}

/// Same as [`relay_fragments`], with a caller-supplied handle that records
/// how the stream ended.
pub fn relay_fragments_with_handle(
    fragments: FragmentStream,
    model_label: String,
    cancel_handle: StreamCancelHandle,
) -> Response {
    let request_id = get_request_id();
    let completion_handle = cancel_handle.clone();
    let log_request_id = request_id.clone();

    let body_stream = async_stream::stream! {
        let mut fragments = fragments;
        let mut relayed: u64 = 0;
        let fragment_counter = get_metrics().stream_fragments.with_label_values(&[&model_label]);

        while let Some(item) = fragments.next().await {
            match item {
                Ok(fragment) => {
                    relayed += 1;
                    fragment_counter.inc();
                    yield Ok::<Bytes, io::Error>(Bytes::from(fragment));
                }
                Err(e) => {
                    completion_handle.settle(StreamOutcome::Failed);
                    tracing::error!(
                        request_id = %log_request_id,
                        model = %model_label,
                        fragments = relayed,
                        error = %e,
                        "Upstream stream failed mid-response; aborting body"
                    );
                    get_metrics().upstream_errors.with_label_values(&["stream"]).inc();
                    yield Err(io::Error::new(io::ErrorKind::Other, e.to_string()));
                    return;
                }
            }
        }

        completion_handle.settle(StreamOutcome::Completed);
        tracing::debug!(
            request_id = %log_request_id,
            model = %model_label,
            fragments = relayed,
            "Stream completed"
        );
    };

    let stream = DisconnectStream {
        stream: Box::pin(body_stream),
        cancel_handle,
        request_id,
    };

    (
        StatusCode::OK,
        [
            (header::CONTENT_TYPE, TEXT_PLAIN_UTF8),
            (header::CACHE_CONTROL, "no-cache"),
        ],
        Body::from_stream(stream),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::UpstreamError;
    use std::time::Duration;

    fn fragments(items: Vec<Result<&'static str, UpstreamError>>) -> FragmentStream {
        Box::pin(futures::stream::iter(
            items.into_iter().map(|item| item.map(str::to_string)),
        ))
    }

    #[tokio::test]
    async fn test_relay_concatenates_in_order() {
        let response = relay_fragments(fragments(vec![Ok("Hel"), Ok("lo")]), "m".to_string());

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(response.headers()[header::CONTENT_TYPE], TEXT_PLAIN_UTF8);

        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&body[..], b"Hello");
    }

    #[tokio::test]
    async fn test_relay_empty_stream() {
        let response = relay_fragments(fragments(vec![]), "m".to_string());
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert!(body.is_empty());
    }

    #[tokio::test]
    async fn test_relay_mid_stream_error_aborts_body() {
        let response = relay_fragments(
            fragments(vec![
                Ok("partial"),
                Err(UpstreamError::Stream("connection reset".to_string())),
                Ok("never"),
            ]),
            "m".to_string(),
        );

        let result = axum::body::to_bytes(response.into_body(), usize::MAX).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_mid_stream_error_is_not_a_disconnect() {
        let handle = StreamCancelHandle::new();
        let response = relay_fragments_with_handle(
            fragments(vec![Err(UpstreamError::Stream("reset".to_string()))]),
            "m".to_string(),
            handle.clone(),
        );

        let _ = axum::body::to_bytes(response.into_body(), usize::MAX).await;

        assert_eq!(handle.outcome(), StreamOutcome::Failed);
    }

    #[tokio::test]
    async fn test_completed_stream_is_not_a_disconnect() {
        let handle = StreamCancelHandle::new();
        let response = relay_fragments_with_handle(
            fragments(vec![Ok("a"), Ok("b")]),
            "m".to_string(),
            handle.clone(),
        );

        let _ = axum::body::to_bytes(response.into_body(), usize::MAX).await;

        assert_eq!(handle.outcome(), StreamOutcome::Completed);
    }

    #[tokio::test]
    async fn test_dropping_body_cancels_and_stops_upstream() {
        let handle = StreamCancelHandle::new();
        let (tx, rx) = tokio::sync::mpsc::channel::<Result<String, UpstreamError>>(4);
        let upstream: FragmentStream = Box::pin(futures::stream::unfold(rx, |mut rx| async move {
            rx.recv().await.map(|item| (item, rx))
        }));

        let response = relay_fragments_with_handle(upstream, "m".to_string(), handle.clone());
        let mut body = response.into_body().into_data_stream();

        tx.send(Ok("first".to_string())).await.unwrap();
        let first = body.next().await.unwrap().unwrap();
        assert_eq!(&first[..], b"first");

        // Client goes away mid-stream
        drop(body);

        assert_eq!(handle.outcome(), StreamOutcome::Disconnected);

        // The upstream receiver was dropped with the body, so sends now fail
        tokio::time::sleep(Duration::from_millis(10)).await;
        assert!(tx.send(Ok("late".to_string())).await.is_err());
    }
}
