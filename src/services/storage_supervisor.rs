//! Store lifecycle supervisor.
//!
//! Connects (and reconnects) the document store, installs the handle into the
//! shared state, and probes it periodically. While no store is installed the
//! application runs degraded: reads and writes fail with 503 but the process
//! stays up and SSE clients stay connected.

use std::{sync::Arc, time::Duration};

use futures::future::BoxFuture;
use tracing::{info, warn};

use crate::{
    state::SharedState,
    store::document::{DocumentStore, StoreResult},
};

const INITIAL_BACKOFF: Duration = Duration::from_secs(1);
const MAX_BACKOFF: Duration = Duration::from_secs(30);
const HEALTH_INTERVAL: Duration = Duration::from_secs(10);

/// Factory producing a connected store handle.
pub type ConnectFn =
    Box<dyn Fn() -> BoxFuture<'static, StoreResult<Arc<dyn DocumentStore>>> + Send + Sync>;

/// Drive the store lifecycle until the process shuts down.
pub async fn run(state: SharedState, connect: ConnectFn) {
    let mut backoff = INITIAL_BACKOFF;

    loop {
        let store = match connect().await {
            Ok(store) => {
                backoff = INITIAL_BACKOFF;
                store
            }
            Err(err) => {
                warn!(error = %err, delay_secs = backoff.as_secs(), "store connection failed");
                tokio::time::sleep(backoff).await;
                backoff = (backoff * 2).min(MAX_BACKOFF);
                continue;
            }
        };

        state.install_store(store.clone()).await;
        info!("store installed; leaving degraded mode");

        supervise(&store).await;

        state.clear_store().await;
        warn!("store lost; entering degraded mode");
    }
}

/// Probe the installed store until a health check fails.
async fn supervise(store: &Arc<dyn DocumentStore>) {
    loop {
        tokio::time::sleep(HEALTH_INTERVAL).await;
        if let Err(err) = store.health_check().await {
            warn!(error = %err, "store health check failed");
            return;
        }
    }
}
