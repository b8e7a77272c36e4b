//! Open chat sessions, one controller per widget.
//!
//! A closed widget sends nothing, so sessions that see no input for
//! [`SESSION_IDLE_TIMEOUT`] are swept out by [`SessionRegistry::spawn_sweeper`].

use std::collections::HashMap;
use std::sync::{Arc, Weak};
use std::time::Duration;

use tokio::sync::{Mutex, RwLock};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tracing::{debug, info};
use uuid::Uuid;

use super::controller::ChatController;
use crate::error::ChatError;
use crate::lead::LeadSink;

/// Sessions untouched for this long are dropped: 30 minutes.
pub const SESSION_IDLE_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// How often the sweeper looks for idle sessions.
pub const SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Handle to one session. The mutex serializes inputs, so a pending sink
/// call holds off further transitions of that session only.
pub type SessionHandle = Arc<Mutex<ChatController>>;

struct Entry {
    handle: SessionHandle,
    last_active: Instant,
}

/// Registry of open sessions sharing one lead sink.
pub struct SessionRegistry {
    sessions: RwLock<HashMap<Uuid, Entry>>,
    sink: Arc<dyn LeadSink>,
    idle_timeout: Duration,
}

impl SessionRegistry {
    pub fn new(sink: Arc<dyn LeadSink>) -> Arc<Self> {
        Self::with_idle_timeout(sink, SESSION_IDLE_TIMEOUT)
    }

    pub fn with_idle_timeout(sink: Arc<dyn LeadSink>, idle_timeout: Duration) -> Arc<Self> {
        Arc::new(Self {
            sessions: RwLock::new(HashMap::new()),
            sink,
            idle_timeout,
        })
    }

    /// Open a new widget session.
    pub async fn open(&self) -> (Uuid, SessionHandle) {
        let controller = ChatController::new(Arc::clone(&self.sink));
        let id = controller.id();
        let handle = Arc::new(Mutex::new(controller));
        self.sessions.write().await.insert(
            id,
            Entry {
                handle: Arc::clone(&handle),
                last_active: Instant::now(),
            },
        );
        info!(session_id = %id, "Chat session opened");
        (id, handle)
    }

    /// Look up a session and mark it active.
    pub async fn get(&self, id: Uuid) -> Result<SessionHandle, ChatError> {
        let mut sessions = self.sessions.write().await;
        let entry = sessions.get_mut(&id).ok_or(ChatError::SessionNotFound(id))?;
        entry.last_active = Instant::now();
        Ok(Arc::clone(&entry.handle))
    }

    /// Close the widget. Returns false if the session was unknown.
    pub async fn close(&self, id: Uuid) -> bool {
        let removed = self.sessions.write().await.remove(&id).is_some();
        if removed {
            info!(session_id = %id, "Chat session closed");
        }
        removed
    }

    /// Drop sessions idle for longer than the timeout.
    ///
    /// A session whose controller is locked has an input in flight and is
    /// kept regardless of age. Returns the number of sessions dropped.
    pub async fn evict_idle(&self) -> usize {
        let now = Instant::now();
        let mut sessions = self.sessions.write().await;
        let before = sessions.len();
        sessions.retain(|id, entry| {
            let idle = now.duration_since(entry.last_active) >= self.idle_timeout;
            let busy = entry.handle.try_lock().is_err();
            if idle && !busy {
                debug!(session_id = %id, "Idle chat session dropped");
                return false;
            }
            true
        });
        let evicted = before - sessions.len();
        if evicted > 0 {
            info!(count = evicted, remaining = sessions.len(), "Evicted idle chat sessions");
        }
        evicted
    }

    /// Spawn the background sweep. The task ends once the registry is dropped.
    pub fn spawn_sweeper(self: &Arc<Self>) -> JoinHandle<()> {
        let registry: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            info!(
                "Chat session sweeper started (idle timeout: {}s)",
                SESSION_IDLE_TIMEOUT.as_secs()
            );
            let mut tick = tokio::time::interval(SWEEP_INTERVAL);
            loop {
                tick.tick().await;
                let Some(registry) = registry.upgrade() else {
                    break;
                };
                registry.evict_idle().await;
            }
        })
    }

    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}
