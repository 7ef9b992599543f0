//! # World Events
//!
//! Collaborators (renderer, networking, persistence) learn about changes
//! through unbounded channels. Publishing never blocks; receivers that
//! have been dropped are pruned on the next publish.

use crossbeam_channel::{unbounded, Receiver, Sender};
use parking_lot::Mutex;

use hexvale_shared::{ChunkCoords, Position};

use crate::block::BlockType;

/// A change in the world.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum WorldEvent {
    /// A block's type was written.
    BlockPlaced {
        /// Where.
        position: Position,
        /// Type written (after water substitution).
        block_type: BlockType,
        /// Type it replaced.
        old_type: BlockType,
    },
    /// Chunks whose contents changed. Sorted, no duplicates.
    ChunksChanged(Vec<ChunkCoords>),
}

/// Fan-out of world events to every live subscriber.
#[derive(Debug, Default)]
pub(crate) struct EventBus {
    senders: Mutex<Vec<Sender<WorldEvent>>>,
}

impl EventBus {
    pub(crate) fn subscribe(&self) -> Receiver<WorldEvent> {
        let (tx, rx) = unbounded();
        self.senders.lock().push(tx);
        rx
    }

    pub(crate) fn publish(&self, event: &WorldEvent) {
        let mut senders = self.senders.lock();
        if senders.is_empty() {
            return;
        }
        senders.retain(|tx| tx.send(event.clone()).is_ok());
    }

    pub(crate) fn subscriber_count(&self) -> usize {
        self.senders.lock().len()
    }
}
