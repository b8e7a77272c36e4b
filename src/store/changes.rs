//! Change feed: per-entity "something changed" signals with broadcast
//! fan-out to observers and WebSocket clients.
//!
//! Delivery is at-least-once. A receiver that falls behind gets one
//! synthetic signal for its entity instead of the missed events, and is
//! expected to re-query the whole collection either way.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use super::model::Entity;

/// Default broadcast channel capacity.
const DEFAULT_BROADCAST_CAPACITY: usize = 256;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeOp {
    Insert,
    Update,
    Delete,
}

/// One mutation of an entity table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ChangeEvent {
    pub entity: Entity,
    pub op: ChangeOp,
}

/// Callback invoked whenever the subscribed entity changes.
pub trait ChangeObserver: Send + Sync + 'static {
    fn on_change(&self, entity: Entity);
}

impl<F> ChangeObserver for F
where
    F: Fn(Entity) + Send + Sync + 'static,
{
    fn on_change(&self, entity: Entity) {
        self(entity)
    }
}

/// Broadcast channel carrying change events for every entity.
pub struct ChangeFeed {
    tx: broadcast::Sender<ChangeEvent>,
}

impl ChangeFeed {
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_BROADCAST_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        let (tx, _rx) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Signal a change. Having no listeners is fine.
    pub fn publish(&self, entity: Entity, op: ChangeOp) {
        debug!(entity = %entity, op = ?op, "Change published");
        let _ = self.tx.send(ChangeEvent { entity, op });
    }

    /// Raw receiver over all entities. Each WS client calls this.
    pub fn receiver(&self) -> broadcast::Receiver<ChangeEvent> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }

    /// Deliver changes of `entity` to `observer` until the returned
    /// handle is dropped or unsubscribed. Must be called inside a Tokio
    /// runtime.
    pub fn subscribe(&self, entity: Entity, observer: Arc<dyn ChangeObserver>) -> Subscription {
        let mut rx = self.tx.subscribe();
        let task = tokio::spawn(async move {
            loop {
                match rx.recv().await {
                    Ok(event) if event.entity == entity => observer.on_change(entity),
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(n)) => {
                        warn!(entity = %entity, skipped = n, "Change observer lagged");
                        observer.on_change(entity);
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
        debug!(entity = %entity, "Change observer subscribed");
        Subscription {
            entity,
            task: Some(task),
        }
    }
}

impl Default for ChangeFeed {
    fn default() -> Self {
        Self::new()
    }
}

/// Live subscription. Delivery stops when this is dropped.
pub struct Subscription {
    entity: Entity,
    task: Option<JoinHandle<()>>,
}

impl Subscription {
    pub fn entity(&self) -> Entity {
        self.entity
    }

    pub fn unsubscribe(mut self) {
        self.stop();
    }

    fn stop(&mut self) {
        if let Some(task) = self.task.take() {
            task.abort();
            debug!(entity = %self.entity, "Change observer unsubscribed");
        }
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;

    fn counter() -> (Arc<AtomicUsize>, Arc<dyn ChangeObserver>) {
        let count = Arc::new(AtomicUsize::new(0));
        let observed = Arc::clone(&count);
        let observer: Arc<dyn ChangeObserver> = Arc::new(move |_entity: Entity| {
            observed.fetch_add(1, Ordering::SeqCst);
        });
        (count, observer)
    }

    async fn settle() {
        tokio::time::sleep(Duration::from_millis(20)).await;
    }

    #[tokio::test]
    async fn observer_sees_only_its_entity() {
        let feed = ChangeFeed::new();
        let (count, observer) = counter();
        let _sub = feed.subscribe(Entity::Contacts, observer);

        feed.publish(Entity::Contacts, ChangeOp::Insert);
        feed.publish(Entity::BlogPosts, ChangeOp::Insert);
        feed.publish(Entity::Contacts, ChangeOp::Delete);
        settle().await;

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn dropping_subscription_stops_delivery() {
        let feed = ChangeFeed::new();
        let (count, observer) = counter();
        let sub = feed.subscribe(Entity::Announcements, observer);

        feed.publish(Entity::Announcements, ChangeOp::Update);
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);

        drop(sub);
        settle().await;
        feed.publish(Entity::Announcements, ChangeOp::Update);
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 1);
        assert_eq!(feed.receiver_count(), 0);
    }

    #[tokio::test]
    async fn explicit_unsubscribe() {
        let feed = ChangeFeed::new();
        let (count, observer) = counter();
        let sub = feed.subscribe(Entity::Careers, observer);
        assert_eq!(sub.entity(), Entity::Careers);
        sub.unsubscribe();
        settle().await;

        feed.publish(Entity::Careers, ChangeOp::Insert);
        settle().await;
        assert_eq!(count.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn lagged_observer_still_gets_a_signal() {
        let feed = ChangeFeed::with_capacity(2);
        let mut rx = feed.receiver();
        for _ in 0..5 {
            feed.publish(Entity::Contacts, ChangeOp::Insert);
        }
        assert!(matches!(
            rx.recv().await,
            Err(broadcast::error::RecvError::Lagged(_))
        ));
        let next = rx.recv().await.unwrap();
        assert_eq!(next.entity, Entity::Contacts);
    }

    #[test]
    fn publish_without_listeners_is_fine() {
        let feed = ChangeFeed::new();
        feed.publish(Entity::AdminUsers, ChangeOp::Delete);
        assert_eq!(feed.receiver_count(), 0);
    }
}
