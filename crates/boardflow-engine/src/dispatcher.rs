use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::debug;

use boardflow_domain::{GroupId, ItemId, SortKey};

use crate::protocol::CorrelationId;

/// A coalesced move queued for dispatch: origin fields from the first
/// scheduled move of the burst, destination fields from the last.
#[derive(Debug, Clone, PartialEq)]
pub struct PendingMove {
    pub correlation_id: CorrelationId,
    pub item_id: ItemId,
    pub from_group_id: GroupId,
    pub to_group_id: GroupId,
    pub to_index: usize,
    pub from_sort_key: SortKey,
    pub to_sort_key: SortKey,
}

/// Debounces outbound move requests.
///
/// Rapid moves of the same item within the window collapse into one
/// `PendingMove` carrying only the final destination; intermediate
/// positions are discarded. The timer is a cancellable token owned
/// here, so rollback can deterministically prevent a superseded
/// dispatch from ever firing.
///
/// When the window elapses the pending move is emitted on the receiver
/// returned by [`MoveDebouncer::new`]; the engine drains that receiver
/// on its next turn. `flush` (pointer-up) bypasses the window.
#[derive(Debug)]
pub struct MoveDebouncer {
    window: Duration,
    slot: Arc<Mutex<Option<PendingMove>>>,
    fired_tx: mpsc::UnboundedSender<PendingMove>,
    timer: Option<JoinHandle<()>>,
}

impl MoveDebouncer {
    pub fn new(window: Duration) -> (Self, mpsc::UnboundedReceiver<PendingMove>) {
        let (fired_tx, fired_rx) = mpsc::unbounded_channel();
        (
            Self {
                window,
                slot: Arc::new(Mutex::new(None)),
                fired_tx,
                timer: None,
            },
            fired_rx,
        )
    }

    pub fn schedule(&mut self, mv: PendingMove) {
        {
            let mut slot = self.slot.lock().expect("debouncer lock poisoned");
            match slot.as_mut() {
                Some(pending) if pending.item_id == mv.item_id => {
                    debug!(item_id = %mv.item_id, to_index = mv.to_index, "coalescing move");
                    pending.to_group_id = mv.to_group_id;
                    pending.to_index = mv.to_index;
                    pending.to_sort_key = mv.to_sort_key;
                }
                Some(_) => {
                    // a different item: the previous burst is final,
                    // emit it now rather than lose it
                    let previous = slot.take().expect("just matched Some");
                    let _ = self.fired_tx.send(previous);
                    *slot = Some(mv);
                }
                None => {
                    *slot = Some(mv);
                }
            }
        }
        self.restart_timer();
    }

    /// Force immediate dispatch of whatever is pending. Called on
    /// pointer-up.
    pub fn flush(&mut self) -> Option<PendingMove> {
        self.stop_timer();
        self.slot.lock().expect("debouncer lock poisoned").take()
    }

    /// Drop the pending move without dispatching. A cancelled dispatch
    /// can never fire afterwards.
    pub fn cancel(&mut self) {
        self.stop_timer();
        if self
            .slot
            .lock()
            .expect("debouncer lock poisoned")
            .take()
            .is_some()
        {
            debug!("cancelled pending move dispatch");
        }
    }

    pub fn has_pending(&self) -> bool {
        self.slot.lock().expect("debouncer lock poisoned").is_some()
    }

    fn restart_timer(&mut self) {
        self.stop_timer();
        let slot = Arc::clone(&self.slot);
        let fired_tx = self.fired_tx.clone();
        let window = self.window;
        self.timer = Some(tokio::spawn(async move {
            tokio::time::sleep(window).await;
            let pending = slot.lock().expect("debouncer lock poisoned").take();
            if let Some(mv) = pending {
                let _ = fired_tx.send(mv);
            }
        }));
    }

    fn stop_timer(&mut self) {
        if let Some(timer) = self.timer.take() {
            timer.abort();
        }
    }
}

impl Drop for MoveDebouncer {
    fn drop(&mut self) {
        self.stop_timer();
    }
}
