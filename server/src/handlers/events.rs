/// Live-delivery endpoint
///
/// One `text/event-stream` response per connected client, fed by the
/// process-local connection registry. Closing the stream drops its
/// registry entry; nothing is replayed on reconnect.
use actix_web::web::Bytes;
use actix_web::{web, HttpResponse};
use futures::Stream;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::Result;
use crate::middleware::AuthUser;
use crate::realtime::{ConnectionManager, LiveEvent};
use crate::state::AppState;

struct SseStream {
    user_id: Uuid,
    connection_id: u64,
    rx: mpsc::UnboundedReceiver<LiveEvent>,
    manager: ConnectionManager,
}

impl Stream for SseStream {
    type Item = std::result::Result<Bytes, actix_web::Error>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        match self.get_mut().rx.poll_recv(cx) {
            Poll::Ready(Some(event)) => {
                Poll::Ready(Some(Ok(Bytes::from(event.to_sse_frame()))))
            }
            Poll::Ready(None) => Poll::Ready(None),
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for SseStream {
    fn drop(&mut self) {
        let manager = self.manager.clone();
        let (user_id, connection_id) = (self.user_id, self.connection_id);
        tokio::spawn(async move {
            manager.unregister(user_id, connection_id).await;
        });
    }
}

pub async fn stream(state: web::Data<AppState>, user: AuthUser) -> Result<HttpResponse> {
    let (connection_id, rx) = state.live.register(user.0).await;
    tracing::debug!(user_id = %user.0, connection_id, "live channel opened");

    Ok(HttpResponse::Ok()
        .content_type("text/event-stream")
        .insert_header(("Cache-Control", "no-cache"))
        .streaming(SseStream {
            user_id: user.0,
            connection_id,
            rx,
            manager: state.live.clone(),
        }))
}
