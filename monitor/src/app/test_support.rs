//! Scripted prober used to drive the engine in tests.

use alloc::sync::Arc;
use core::{
    sync::atomic::{AtomicUsize, Ordering},
    time::Duration,
};
use std::{collections::HashMap, sync::Mutex};

use futures::{FutureExt as _, future::BoxFuture};
use hostwatch_common::{Host, ProbeResult};

use crate::app::Prober;

/// Answers from a per-address table (unknown addresses are online) after a fixed delay.
pub(crate) struct ScriptedProber {
    delay: Duration,
    online: Mutex<HashMap<String, bool>>,
    calls: AtomicUsize,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

impl ScriptedProber {
    pub(crate) fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            delay,
            online: Mutex::new(HashMap::new()),
            calls: AtomicUsize::new(0),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        })
    }

    pub(crate) fn set(&self, address: &str, online: bool) {
        self.online
            .lock()
            .unwrap()
            .insert(address.to_string(), online);
    }

    pub(crate) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Prober for ScriptedProber {
    fn probe<'a>(&'a self, host: &'a Host, _timeout: Duration) -> BoxFuture<'a, ProbeResult> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);

            tokio::time::sleep(self.delay).await;
            let online = self
                .online
                .lock()
                .unwrap()
                .get(&host.address)
                .copied()
                .unwrap_or(true);

            self.in_flight.fetch_sub(1, Ordering::SeqCst);
            if online {
                ProbeResult::online(host, 1)
            } else {
                ProbeResult::offline(host, "Request timed out")
            }
        }
        .boxed()
    }
}
