//! Holder of the one live [`StateSnapshot`].
//!
//! The snapshot sits behind an `Arc` in a watch channel: readers clone the `Arc`
//! without locking, the scheduler swaps in a complete new snapshot per sweep.

use alloc::sync::Arc;

use hostwatch_common::StateSnapshot;
use tokio::sync::watch;

#[derive(Clone)]
pub struct StateStore {
    tx: watch::Sender<Arc<StateSnapshot>>,
}

impl Default for StateStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StateStore {
    /// An empty store at sweep 0.
    #[must_use]
    pub fn new() -> Self {
        let (tx, _) = watch::channel(Arc::new(StateSnapshot::default()));
        Self { tx }
    }

    /// The latest fully swapped-in snapshot.
    #[must_use]
    pub fn current(&self) -> Arc<StateSnapshot> {
        self.tx.borrow().clone()
    }

    /// Replaces the snapshot with one derived from the current one, in a single step.
    ///
    /// `derive` runs while the write side is locked, so no other replacement can
    /// interleave between reading the previous snapshot and installing the next.
    pub fn replace_with<T>(
        &self,
        derive: impl FnOnce(&StateSnapshot) -> (StateSnapshot, T),
    ) -> (Arc<StateSnapshot>, T) {
        let mut produced = None;
        self.tx.send_modify(|current| {
            let (next, extra) = derive(current);
            let next = Arc::new(next);
            *current = next.clone();
            produced = Some((next, extra));
        });
        let Some(produced) = produced else {
            unreachable!("send_modify always runs the closure");
        };
        produced
    }
}
