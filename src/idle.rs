use rand::seq::SliceRandom;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

pub const IDLE_MESSAGES: &[&str] = &[
    "Standing by.",
    "Idle mode active.",
    "Awaiting input.",
    "Listening...",
];

const POLL_INTERVAL: Duration = Duration::from_secs(1);

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// Wall-clock time of the last user input, shared between the REPL and the
/// idle watcher.
#[derive(Clone, Debug)]
pub struct ActivityClock {
    last_input_ms: Arc<AtomicI64>,
}

impl ActivityClock {
    pub fn new() -> Self {
        Self {
            last_input_ms: Arc::new(AtomicI64::new(now_millis())),
        }
    }

    pub fn touch(&self) {
        self.last_input_ms.store(now_millis(), Ordering::Relaxed);
    }

    pub fn last_input_ms(&self) -> i64 {
        self.last_input_ms.load(Ordering::Relaxed)
    }

    pub fn idle_for(&self) -> Duration {
        let elapsed = now_millis().saturating_sub(self.last_input_ms());
        Duration::from_millis(elapsed.max(0) as u64)
    }
}

impl Default for ActivityClock {
    fn default() -> Self {
        Self::new()
    }
}

/// Background task printing one notice per idle period.
///
/// It only reads the activity clock; it never touches the history or the
/// network.
pub struct IdleWatcher {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl IdleWatcher {
    /// Spawn the watcher. `notify` runs on the watcher task with the chosen message.
    pub fn spawn<F>(clock: ActivityClock, threshold: Duration, notify: F) -> Self
    where
        F: Fn(&str) + Send + 'static,
    {
        Self::spawn_with_interval(clock, threshold, POLL_INTERVAL, notify)
    }

    pub fn spawn_with_interval<F>(
        clock: ActivityClock,
        threshold: Duration,
        poll: Duration,
        notify: F,
    ) -> Self
    where
        F: Fn(&str) + Send + 'static,
    {
        let cancel = CancellationToken::new();
        let token = cancel.clone();
        let handle = tokio::spawn(async move {
            let mut interval = tokio::time::interval(poll);
            // Input timestamp for which a notice was already shown.
            let mut notified_for: Option<i64> = None;
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = interval.tick() => {
                        let last = clock.last_input_ms();
                        if notified_for != Some(last) && clock.idle_for() >= threshold {
                            let message = IDLE_MESSAGES
                                .choose(&mut rand::thread_rng())
                                .copied()
                                .unwrap_or("Standing by.");
                            notify(message);
                            notified_for = Some(last);
                        }
                    }
                }
            }
        });

        Self { cancel, handle }
    }

    /// Stop the watcher and wait for it to finish.
    pub async fn shutdown(self) {
        self.cancel.cancel();
        let _ = self.handle.await;
    }
}
