use crate::core::cancel::{StreamCancelHandle, StreamOutcome};
use crate::core::get_metrics;
use futures::stream::{BoxStream, Stream};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Response body that notices when hyper drops it.
///
/// hyper drops the body as soon as the client goes away. If the relay has not
/// settled the stream by then, the drop is recorded as a disconnect and the
/// upstream stream held inside is released with it.
pub struct DisconnectStream<T> {
    pub stream: BoxStream<'static, T>,
    pub cancel_handle: StreamCancelHandle,
    pub request_id: String,
}

impl<T> Stream for DisconnectStream<T> {
    type Item = T;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<T>> {
        self.stream.as_mut().poll_next(cx)
    }
}

impl<T> Drop for DisconnectStream<T> {
    fn drop(&mut self) {
        if self.cancel_handle.settle(StreamOutcome::Disconnected) {
            tracing::info!(
                request_id = %self.request_id,
                "Client disconnected before stream completed; upstream stream dropped"
            );
            get_metrics().stream_disconnects.inc();
        } else {
            tracing::debug!(
                request_id = %self.request_id,
                outcome = ?self.cancel_handle.outcome(),
                "Stream body released"
            );
        }
    }
}
