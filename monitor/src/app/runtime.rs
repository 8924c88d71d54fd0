//! The monitoring service: periodic and on-demand sweeps over all hosts.

use alloc::sync::Arc;
use core::sync::atomic::{AtomicBool, Ordering};

use futures::{StreamExt as _, stream};
use hostwatch_common::{Classification, ProbeResult, StateSnapshot, detect};
use serde::Serialize;
use tokio::{
    sync::{Mutex, mpsc, watch},
    task::JoinHandle,
    time::{Instant, MissedTickBehavior, interval},
};
use tracing::{Instrument as _, debug, info, warn};

use crate::{
    app::{Broadcaster, HostRegistry, Prober, RegistryError, StateStore, SubscriberId, Subscription},
    config::MonitorConfig,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SchedulerState {
    Idle,
    Running,
}

/// What became of an on-demand sweep request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SweepRequest {
    /// A sweep will start as soon as the scheduler is free.
    Queued,
    /// A sweep was already pending; this request is folded into it.
    Coalesced,
    /// Monitoring has been stopped.
    Stopped,
}

/// Process-wide monitoring service.
///
/// Sweeps only ever run on the scheduler task, which is what keeps them from
/// overlapping. Timer ticks and on-demand requests both feed that one task; the
/// on-demand path goes through a queue of depth one.
pub struct Monitor {
    registry: Arc<HostRegistry>,
    prober: Arc<dyn Prober>,
    store: StateStore,
    broadcaster: Broadcaster,
    settings: MonitorConfig,
    trigger_tx: mpsc::Sender<()>,
    trigger_rx: Mutex<Option<mpsc::Receiver<()>>>,
    active: watch::Sender<bool>,
    running: AtomicBool,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl Monitor {
    #[must_use]
    pub fn new(
        registry: Arc<HostRegistry>,
        prober: Arc<dyn Prober>,
        settings: MonitorConfig,
    ) -> Arc<Self> {
        let store = StateStore::new();
        let broadcaster = Broadcaster::new(store.clone(), settings.subscriber_queue);
        let (trigger_tx, trigger_rx) = mpsc::channel(1);
        let (active, _) = watch::channel(false);
        Arc::new(Self {
            registry,
            prober,
            store,
            broadcaster,
            settings,
            trigger_tx,
            trigger_rx: Mutex::new(Some(trigger_rx)),
            active,
            running: AtomicBool::new(false),
            task: Mutex::new(None),
        })
    }

    /// Spawns the scheduler task. The first sweep starts immediately.
    ///
    /// A monitor can be started once; later calls are ignored.
    pub async fn start(self: &Arc<Self>) {
        let Some(trigger_rx) = self.trigger_rx.lock().await.take() else {
            warn!("Monitor already started, ignoring start request");
            return;
        };
        self.active.send_replace(true);
        info!(
            hosts = self.registry.len(),
            interval = ?self.settings.interval(),
            "Monitoring started"
        );
        let this = Arc::clone(self);
        let handle = tokio::spawn(this.run(trigger_rx).in_current_span());
        *self.task.lock().await = Some(handle);
    }

    /// Stops scheduling new sweeps and waits for an in-flight sweep to finish.
    pub async fn stop(&self) {
        self.active.send_replace(false);
        let handle = self.task.lock().await.take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            warn!("Scheduler task ended abnormally: {e}");
        }
    }

    /// Asks for a full sweep outside the regular schedule.
    pub fn request_sweep(&self) -> SweepRequest {
        use mpsc::error::TrySendError as E;
        match self.trigger_tx.try_send(()) {
            Ok(()) => SweepRequest::Queued,
            Err(E::Full(())) => {
                debug!("Sweep already pending, coalescing request");
                SweepRequest::Coalesced
            }
            Err(E::Closed(())) => SweepRequest::Stopped,
        }
    }

    /// Probes one host right away, outside of any sweep. The stored state is not touched.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::NotFound`] if `name` is not a configured host.
    pub async fn probe_host(&self, name: &str) -> Result<ProbeResult, RegistryError> {
        let host = self.registry.lookup(name)?;
        Ok(self.prober.probe(host, self.settings.probe_timeout()).await)
    }

    #[must_use]
    pub fn snapshot(&self) -> Arc<StateSnapshot> {
        self.store.current()
    }

    #[must_use]
    pub fn state(&self) -> SchedulerState {
        if self.running.load(Ordering::Acquire) {
            SchedulerState::Running
        } else {
            SchedulerState::Idle
        }
    }

    pub async fn subscribe(&self) -> Subscription {
        self.broadcaster.subscribe().await
    }

    pub async fn unsubscribe(&self, id: SubscriberId) -> bool {
        self.broadcaster.unsubscribe(id).await
    }

    pub async fn subscriber_count(&self) -> usize {
        self.broadcaster.subscriber_count().await
    }

    async fn run(self: Arc<Self>, mut trigger_rx: mpsc::Receiver<()>) {
        let mut active_rx = self.active.subscribe();
        let mut ticker = interval(self.settings.interval());
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                biased;
                _ = active_rx.wait_for(|active| !*active) => break,
                _ = ticker.tick() => debug!("Scheduled sweep"),
                Some(()) = trigger_rx.recv() => debug!("On-demand sweep"),
            }

            let started = Instant::now();
            self.sweep().await;
            if started.elapsed() >= self.settings.interval() {
                warn!(
                    elapsed = ?started.elapsed(),
                    "Sweep took longer than the interval, skipping the missed tick"
                );
                ticker.reset();
            }
        }
        info!("Monitoring stopped");
    }

    /// Probes every host, swaps in the new snapshot and publishes the outcome.
    async fn sweep(&self) -> Arc<StateSnapshot> {
        self.running.store(true, Ordering::Release);
        let started = Instant::now();
        let timeout = self.settings.probe_timeout();

        let results: Vec<ProbeResult> = stream::iter(self.registry.list())
            .map(|host| self.prober.probe(host, timeout))
            .buffer_unordered(self.settings.max_concurrent_probes.max(1))
            .collect()
            .await;

        let (snapshot, transitions) = self.store.replace_with(|previous| {
            let transitions: Vec<_> = results
                .iter()
                .filter_map(|current| detect(previous.get(&current.host), current))
                .collect();
            (StateSnapshot::new(previous.sweep + 1, results), transitions)
        });
        self.running.store(false, Ordering::Release);

        for event in transitions {
            match event.classification {
                Classification::Down => warn!(host = %event.host, address = %event.address, "Host went down"),
                Classification::Recovered => info!(host = %event.host, address = %event.address, "Host recovered"),
            }
            self.broadcaster.publish_transition(snapshot.sweep, event).await;
        }
        let delivered = self.broadcaster.publish_snapshot(snapshot.clone()).await;

        info!(
            sweep = snapshot.sweep,
            hosts = snapshot.len(),
            online = snapshot.hosts.values().filter(|r| r.online).count(),
            subscribers = delivered,
            elapsed = ?started.elapsed(),
            "Sweep completed"
        );
        snapshot
    }
}
