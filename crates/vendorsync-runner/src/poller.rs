/*
[INPUT]:  StatusSource gateway, poll period, CancellationToken
[OUTPUT]: Periodic job-status snapshots until the job goes inactive
[POS]:    Polling layer - long-running job progress watcher
[UPDATE]: When changing tick sequencing or teardown guarantees
*/

use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use vendorsync_gateway::{StatusEntry, StatusSource};

/// Latest known progress of the watched remote job
#[derive(Debug, Clone, PartialEq)]
pub struct PollSnapshot {
    pub active: bool,
    pub entries: Vec<StatusEntry>,
}

impl PollSnapshot {
    pub fn activated(entries: Vec<StatusEntry>) -> Self {
        Self {
            active: true,
            entries,
        }
    }
}

/// Re-fetches job status at a fixed period while the job reports itself
/// active.
///
/// Ticks are strictly sequential: a tick's fetch is awaited before the next
/// tick can fire, so in-flight polls never overlap. A failed fetch keeps the
/// previous snapshot and polling continues.
pub struct StatusPoller<S> {
    source: S,
    period: Duration,
    params: Vec<(String, String)>,
}

impl<S: StatusSource + 'static> StatusPoller<S> {
    pub fn new(source: S, period: Duration) -> Self {
        Self {
            source,
            period,
            params: Vec::new(),
        }
    }

    /// Query parameters forwarded on every status fetch
    pub fn with_params(mut self, params: Vec<(String, String)>) -> Self {
        self.params = params;
        self
    }

    /// Start polling. `initial` is the activating snapshot the caller
    /// obtained from its own status fetch.
    pub fn spawn(self, initial: PollSnapshot) -> PollerHandle {
        let (snapshot_tx, snapshot_rx) = watch::channel(initial);
        let shutdown = CancellationToken::new();
        let token = shutdown.clone();
        let handle = tokio::spawn(async move { self.run(snapshot_tx, token).await });

        PollerHandle {
            shutdown,
            handle: Some(handle),
            snapshot_rx,
        }
    }

    async fn run(self, snapshot_tx: watch::Sender<PollSnapshot>, shutdown: CancellationToken) {
        let mut ticker = tokio::time::interval(self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
        // interval fires immediately; the first refresh follows one period
        // after activation.
        ticker.tick().await;

        loop {
            tokio::select! {
                _ = shutdown.cancelled() => {
                    tracing::debug!("status poller cancelled");
                    return;
                }
                _ = ticker.tick() => {}
            }

            match self.source.fetch_status(&self.params).await {
                Ok(status) => {
                    let active = status.running;
                    snapshot_tx.send_replace(PollSnapshot {
                        active,
                        entries: status.status,
                    });
                    if !active {
                        tracing::info!("job reported inactive; polling stopped");
                        return;
                    }
                }
                Err(err) => {
                    tracing::warn!(error = %err, "status fetch failed; keeping last snapshot");
                }
            }
        }
    }
}

/// Owner handle for a spawned poller. Dropping it cancels the polling loop
/// unconditionally.
pub struct PollerHandle {
    shutdown: CancellationToken,
    handle: Option<JoinHandle<()>>,
    snapshot_rx: watch::Receiver<PollSnapshot>,
}

impl PollerHandle {
    pub fn snapshot(&self) -> PollSnapshot {
        self.snapshot_rx.borrow().clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<PollSnapshot> {
        self.snapshot_rx.clone()
    }

    /// True once the loop exited (job inactive or cancelled)
    pub fn is_finished(&self) -> bool {
        self.handle.as_ref().is_none_or(|handle| handle.is_finished())
    }

    /// Cancel polling and wait for the loop to exit
    pub async fn stop(mut self) {
        self.shutdown.cancel();
        let Some(handle) = self.handle.take() else {
            return;
        };
        // The loop only awaits cancellable points, so the join is prompt.
        if let Err(err) = handle.await {
            if !err.is_cancelled() {
                tracing::warn!(error = %err, "status poller join failed");
            }
        }
    }
}

impl Drop for PollerHandle {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}
