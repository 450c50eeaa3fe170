//! Asset readiness notifications.
//!
//! The host loads models however it likes and reports each outcome through
//! an [`AssetNotifier`]. The simulation drains the channel without blocking
//! at the start of every tick. Obstacles whose asset never reports stay
//! absent; failures are logged and never retried.

use crate::error::Error;
use crate::world::ObstacleId;

/// Outcome of one asset load.
#[derive(Clone, Debug, PartialEq)]
pub enum AssetEvent {
    /// The asset behind this obstacle (or the agent) is in the scene.
    Ready(ObstacleId),
    /// The loader gave up on this asset.
    Failed(ObstacleId, Error),
}

impl AssetEvent {
    /// The id the event refers to.
    #[must_use]
    pub fn id(&self) -> &ObstacleId {
        match self {
            AssetEvent::Ready(id) | AssetEvent::Failed(id, _) => id,
        }
    }
}

/// Sending half, handed to the asset loader.
#[derive(Clone, Debug)]
pub struct AssetNotifier {
    tx: async_channel::Sender<AssetEvent>,
}

impl AssetNotifier {
    /// Report that an asset finished loading.
    pub fn ready(&self, id: ObstacleId) {
        self.send(AssetEvent::Ready(id));
    }

    /// Report that an asset failed to load.
    pub fn failed(&self, id: ObstacleId, message: impl Into<String>) {
        let error = Error::LoadFailure {
            asset: id.to_string(),
            message: message.into(),
        };
        self.send(AssetEvent::Failed(id, error));
    }

    fn send(&self, event: AssetEvent) {
        if let Err(e) = self.tx.try_send(event) {
            tracing::warn!("Dropped asset event for '{}': channel closed", e.into_inner().id());
        }
    }
}

/// Receiving half, owned by the simulation.
#[derive(Debug)]
pub struct AssetChannel {
    tx: async_channel::Sender<AssetEvent>,
    rx: async_channel::Receiver<AssetEvent>,
}

impl Default for AssetChannel {
    fn default() -> Self {
        let (tx, rx) = async_channel::unbounded();
        Self { tx, rx }
    }
}

impl AssetChannel {
    /// Create a new channel.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// A sender for the loader. May be cloned freely.
    #[must_use]
    pub fn notifier(&self) -> AssetNotifier {
        AssetNotifier {
            tx: self.tx.clone(),
        }
    }

    /// Take every event delivered so far without waiting.
    pub fn drain(&self) -> Vec<AssetEvent> {
        let mut events = Vec::new();
        while let Ok(event) = self.rx.try_recv() {
            events.push(event);
        }
        events
    }
}
