use crate::snapshot::ConfigSnapshot;
use std::sync::Arc;
use tokio::sync::{RwLock, watch};

/// 最新配置快照；订阅方按顺序逐个处理，未处理的中间快照会被最新值覆盖
#[derive(Clone)]
pub struct SnapshotStore {
    current: Arc<RwLock<ConfigSnapshot>>,
    tx: watch::Sender<ConfigSnapshot>,
}

impl SnapshotStore {
    pub fn new(snapshot: ConfigSnapshot) -> (Self, watch::Receiver<ConfigSnapshot>) {
        let (tx, rx) = watch::channel(snapshot.clone());
        let store = Self {
            current: Arc::new(RwLock::new(snapshot)),
            tx,
        };
        (store, rx)
    }

    pub async fn apply(&self, snapshot: ConfigSnapshot) {
        *self.current.write().await = snapshot.clone();
        // 没有订阅方时丢弃通知
        self.tx.send_replace(snapshot);
    }

    pub async fn current(&self) -> ConfigSnapshot {
        self.current.read().await.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn apply_notifies_subscriber_and_updates_current() {
        let (store, mut rx) = SnapshotStore::new(ConfigSnapshot::default());
        let snapshot = ConfigSnapshot::new().with("gatewayID", "custom");

        store.apply(snapshot.clone()).await;

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), snapshot);
        assert_eq!(store.current().await, snapshot);
    }

    #[tokio::test]
    async fn pending_snapshots_coalesce_to_latest() {
        let (store, mut rx) = SnapshotStore::new(ConfigSnapshot::default());
        store.apply(ConfigSnapshot::new().with("customID", "a")).await;
        store.apply(ConfigSnapshot::new().with("customID", "b")).await;

        rx.changed().await.unwrap();
        assert_eq!(
            rx.borrow_and_update().string("customID").unwrap(),
            Some("b")
        );
        assert!(!rx.has_changed().unwrap());
    }
}
