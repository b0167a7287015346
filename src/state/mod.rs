//! Shared application state: the installed store handle, SSE hubs, the
//! degraded-mode flag, and the gate serializing admin commands.

pub mod machine;

use std::sync::Arc;

use tokio::sync::{Mutex, RwLock, broadcast, watch};

use crate::{
    config::AppConfig,
    dto::sse::ServerEvent,
    error::ServiceError,
    store::document::DocumentStore,
};

/// Cheap-to-clone handle on the central application state.
pub type SharedState = Arc<AppState>;

/// Central application state shared by every route and background task.
pub struct AppState {
    store: RwLock<Option<Arc<dyn DocumentStore>>>,
    sse: SseState,
    degraded: watch::Sender<bool>,
    command_gate: Mutex<()>,
    config: AppConfig,
}

impl AppState {
    /// Construct a new [`AppState`] wrapped in an [`Arc`].
    ///
    /// The application starts in degraded mode until a store is installed.
    pub fn new(config: AppConfig) -> SharedState {
        let (degraded_tx, _rx) = watch::channel(true);
        let capacity = config.sse_capacity();
        Arc::new(Self {
            store: RwLock::new(None),
            sse: SseState::new(capacity),
            degraded: degraded_tx,
            command_gate: Mutex::new(()),
            config,
        })
    }

    /// Immutable runtime configuration.
    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    /// Obtain a handle to the current store, if one is installed.
    pub async fn store(&self) -> Option<Arc<dyn DocumentStore>> {
        let guard = self.store.read().await;
        guard.as_ref().cloned()
    }

    /// Obtain the store handle or fail with [`ServiceError::Degraded`].
    pub async fn require_store(&self) -> Result<Arc<dyn DocumentStore>, ServiceError> {
        self.store().await.ok_or(ServiceError::Degraded)
    }

    /// Install a store implementation and leave degraded mode.
    pub async fn install_store(&self, store: Arc<dyn DocumentStore>) {
        {
            let mut guard = self.store.write().await;
            *guard = Some(store);
        }
        self.update_degraded(false);
    }

    /// Remove the current store and enter degraded mode.
    pub async fn clear_store(&self) {
        {
            let mut guard = self.store.write().await;
            guard.take();
        }
        self.update_degraded(true);
    }

    /// Current degraded flag.
    pub async fn is_degraded(&self) -> bool {
        let guard = self.store.read().await;
        guard.is_none()
    }

    /// Subscribe to degraded mode updates.
    pub fn degraded_watcher(&self) -> watch::Receiver<bool> {
        self.degraded.subscribe()
    }

    /// Broadcast hub for the public SSE stream.
    pub fn public_sse(&self) -> &SseHub {
        &self.sse.public
    }

    /// Broadcast hub for the admin SSE stream.
    pub fn admin_sse(&self) -> &SseHub {
        &self.sse.admin
    }

    /// Mutex every admin command takes for its whole read-validate-write
    /// span, so concurrent admin commands from one process cannot interleave
    /// their store writes.
    pub fn command_gate(&self) -> &Mutex<()> {
        &self.command_gate
    }

    fn update_degraded(&self, value: bool) {
        let _ = self.degraded.send_if_modified(|current| {
            let changed = *current != value;
            *current = value;
            changed
        });
    }
}

/// SSE sub-state holding the two broadcast hubs.
struct SseState {
    public: SseHub,
    admin: SseHub,
}

impl SseState {
    fn new(capacity: usize) -> Self {
        Self {
            public: SseHub::new(capacity),
            admin: SseHub::new(capacity),
        }
    }
}

/// Simple broadcast hub wrapper used by the SSE services.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a hub backed by a Tokio broadcast channel.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}
