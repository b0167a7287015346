//! SSE subscription plumbing: broadcast receivers bridged onto per-client
//! channels and rendered as an axum event stream.

use std::convert::Infallible;
use std::time::Duration;

use axum::response::sse::{Event, KeepAlive, KeepAliveStream, Sse};
use tokio::sync::{broadcast, mpsc};
use tokio_stream::wrappers::ReceiverStream;
use tracing::{debug, warn};

use crate::{
    dto::sse::{Handshake, ServerEvent},
    state::SharedState,
};

const CLIENT_BUFFER: usize = 8;
const KEEP_ALIVE_SECS: u64 = 15;

/// Concrete response type of the SSE endpoints: a per-client channel with
/// keep-alive comments attached.
pub type EventStream = Sse<KeepAliveStream<ReceiverStream<Result<Event, Infallible>>>>;

/// Which of the two streams a client subscribed to.
#[derive(Clone, Copy, Debug)]
pub enum StreamKind {
    /// The participant-facing stream.
    Public,
    /// The host-facing stream.
    Admin,
}

impl StreamKind {
    fn name(self) -> &'static str {
        match self {
            StreamKind::Public => "public",
            StreamKind::Admin => "admin",
        }
    }
}

/// Subscribe a client to the public stream.
pub async fn subscribe_public(state: &SharedState) -> EventStream {
    let receiver = state.public_sse().subscribe();
    stream(state, receiver, StreamKind::Public).await
}

/// Subscribe a client to the admin stream.
pub async fn subscribe_admin(state: &SharedState) -> EventStream {
    let receiver = state.admin_sse().subscribe();
    stream(state, receiver, StreamKind::Admin).await
}

async fn stream(
    state: &SharedState,
    mut receiver: broadcast::Receiver<ServerEvent>,
    kind: StreamKind,
) -> EventStream {
    let handshake = Handshake {
        stream: kind.name().to_string(),
        message: "subscribed".to_string(),
        degraded: state.is_degraded().await,
    };

    let (tx, rx) = mpsc::channel::<Result<Event, Infallible>>(CLIENT_BUFFER);
    tokio::spawn(async move {
        let hello = Event::default()
            .event("handshake")
            .data(serde_json::to_string(&handshake).unwrap_or_default());
        if tx.send(Ok(hello)).await.is_err() {
            return;
        }

        loop {
            match receiver.recv().await {
                Ok(server_event) => {
                    let mut event = Event::default().data(server_event.data);
                    if let Some(name) = server_event.event {
                        event = event.event(name);
                    }
                    if tx.send(Ok(event)).await.is_err() {
                        debug!(stream = kind.name(), "SSE client went away");
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    // Every event is a full snapshot, so a lagging client
                    // catches up with the next delivery.
                    warn!(stream = kind.name(), skipped, "SSE client lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    debug!(stream = kind.name(), "SSE hub closed");
                    break;
                }
            }
        }
    });

    Sse::new(ReceiverStream::new(rx))
        .keep_alive(KeepAlive::new().interval(Duration::from_secs(KEEP_ALIVE_SECS)))
}
