//! Serialized dissemination of ownership changes to registered listeners.
//!
//! One background worker processes ownership updates strictly in order. Each
//! round takes the newest requested set, diffs it against the published one,
//! fans the change out to every listener in parallel under the notification
//! deadline, and then swaps the published snapshot. Rapid publishes coalesce:
//! a round always disseminates the newest value at the time it runs, and a
//! request whose value was superseded completes without dispatching anything.
//!
//! Nothing in the dissemination path escapes to the publisher: listener
//! panics and deadline overruns are logged and the round continues.

use crate::metrics::PartitionMetrics;
use crate::partition::events::{PartitionChange, PartitionListener};
use crate::types::Partition;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeSet, HashMap};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use std::time::Duration;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Registration state guarded by the engine lock.
struct Registry {
    listeners: HashMap<u64, Arc<dyn PartitionListener>>,
    /// Newest requested ownership set, not yet disseminated. `None` once the
    /// latest request has been consumed by a round.
    pending: Option<BTreeSet<Partition>>,
}

struct Shared {
    members: u32,
    notification_timeout: Duration,
    registry: Mutex<Registry>,
    /// The snapshot listeners have been told about. Swapped wholesale at the
    /// end of a round; readers clone the `Arc` and never hold the registry
    /// lock.
    published: RwLock<Arc<BTreeSet<Partition>>>,
    next_subscription: AtomicU64,
    metrics: Arc<PartitionMetrics>,
}

/// One queued request to run a dissemination round.
struct Round {
    ack: oneshot::Sender<()>,
}

/// The dissemination engine behind [`Partitioner`](super::Partitioner).
pub(crate) struct PartitionPublisher {
    shared: Arc<Shared>,
    rounds: mpsc::UnboundedSender<Round>,
}

impl PartitionPublisher {
    /// Create the publisher and spawn its worker task. Must be called from
    /// within a Tokio runtime.
    pub(crate) fn new(
        members: u32,
        notification_timeout: Duration,
        listeners: Vec<Arc<dyn PartitionListener>>,
        metrics: Arc<PartitionMetrics>,
    ) -> Self {
        let listeners: HashMap<u64, Arc<dyn PartitionListener>> = listeners
            .into_iter()
            .enumerate()
            .map(|(id, listener)| (id as u64, listener))
            .collect();
        let next_subscription = AtomicU64::new(listeners.len() as u64);

        let shared = Arc::new(Shared {
            members,
            notification_timeout,
            registry: Mutex::new(Registry {
                listeners,
                pending: None,
            }),
            published: RwLock::new(Arc::new(BTreeSet::new())),
            next_subscription,
            metrics,
        });

        let (rounds, queue) = mpsc::unbounded_channel();
        tokio::spawn(run_worker(queue, Arc::clone(&shared)));

        Self { shared, rounds }
    }

    /// The currently published ownership snapshot.
    pub(crate) fn published(&self) -> Arc<BTreeSet<Partition>> {
        self.shared.published.read().clone()
    }

    /// Number of registered listeners.
    pub(crate) fn listener_count(&self) -> usize {
        self.shared.registry.lock().listeners.len()
    }

    /// Request dissemination of a new ownership set and wait for that round,
    /// bounded by the notification timeout. Never fails: a timed-out wait is
    /// logged and the round left to finish on its own.
    pub(crate) async fn publish(&self, partitions: BTreeSet<Partition>) {
        self.shared.registry.lock().pending = Some(partitions);

        let (ack, done) = oneshot::channel();
        if self.rounds.send(Round { ack }).is_err() {
            warn!("dissemination worker is gone, dropping ownership update");
            return;
        }

        match tokio::time::timeout(self.shared.notification_timeout, done).await {
            Ok(Ok(())) => {}
            Ok(Err(_)) => warn!("dissemination worker dropped an in-flight round"),
            Err(_) => warn!(
                timeout_ms = self.shared.notification_timeout.as_millis() as u64,
                "timed out waiting for partition dissemination round"
            ),
        }
    }

    /// Register a listener and synchronously bring it up to date with the
    /// currently published set. Returns the handle that cancels the
    /// registration.
    pub(crate) fn add_listener(&self, listener: Arc<dyn PartitionListener>) -> Subscription {
        let id = self.shared.next_subscription.fetch_add(1, Ordering::Relaxed);
        self.shared
            .registry
            .lock()
            .listeners
            .insert(id, Arc::clone(&listener));

        // Catch-up happens outside the registry lock so a listener that turns
        // around and calls back into the engine cannot deadlock.
        let published = self.published();
        let change = PartitionChange::catch_up(&published, self.shared.members);
        if catch_unwind(AssertUnwindSafe(|| listener.on_partitions_changed(&change))).is_err() {
            self.shared.metrics.listener_failures.inc();
            warn!(subscription = id, "Partition listener panicked during catch-up");
        }

        Subscription {
            shared: Arc::downgrade(&self.shared),
            id,
        }
    }
}

/// Cancellation handle for a registered [`PartitionListener`].
///
/// Dropping the handle does not unregister the listener; call
/// [`Subscription::cancel`].
pub struct Subscription {
    shared: Weak<Shared>,
    id: u64,
}

impl Subscription {
    /// Remove the listener from the registry. It receives no further events.
    pub fn cancel(self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.registry.lock().listeners.remove(&self.id);
        }
    }
}

async fn run_worker(mut queue: mpsc::UnboundedReceiver<Round>, shared: Arc<Shared>) {
    while let Some(round) = queue.recv().await {
        run_round(&shared).await;
        // The requester may have stopped waiting; that is fine.
        let _ = round.ack.send(());
    }
    debug!("dissemination worker stopped");
}

/// One dissemination round: diff, fan out under the deadline, swap.
async fn run_round(shared: &Shared) {
    let (next, change, listeners) = {
        let mut registry = shared.registry.lock();
        // A previous round may already have consumed this request (coalesced
        // publishes), and an unchanged set needs no dispatch.
        let Some(next) = registry.pending.take() else {
            return;
        };
        let published = shared.published.read().clone();
        let Some(change) = PartitionChange::diff(&published, &next, shared.members) else {
            return;
        };
        let listeners: Vec<Arc<dyn PartitionListener>> =
            registry.listeners.values().cloned().collect();
        (next, Arc::new(change), listeners)
    };

    debug!(
        added = change.added.len(),
        removed = change.removed.len(),
        listeners = listeners.len(),
        "Disseminating partition change"
    );
    shared.metrics.rounds.inc();

    let mut tasks = JoinSet::new();
    for listener in listeners {
        let change = Arc::clone(&change);
        tasks.spawn_blocking(move || listener.on_partitions_changed(&change));
    }

    let deadline = tokio::time::Instant::now() + shared.notification_timeout;
    loop {
        match tokio::time::timeout_at(deadline, tasks.join_next()).await {
            Ok(None) => break,
            Ok(Some(Ok(()))) => {}
            Ok(Some(Err(err))) => {
                shared.metrics.listener_failures.inc();
                warn!(error = %err, "Partition listener failed during notification");
            }
            Err(_) => {
                shared.metrics.round_timeouts.inc();
                warn!(
                    timeout_ms = shared.notification_timeout.as_millis() as u64,
                    abandoned = tasks.len(),
                    "Partition listeners failed to complete in time, abandoning the stragglers"
                );
                break;
            }
        }
    }
    // Dropping the set aborts tasks that have not started; already-running
    // listeners finish detached.
    drop(tasks);

    // Swap to exactly the set this round diffed and disseminated. A newer
    // pending value that arrived mid-round is handled by its own queued
    // round.
    let assigned = next.len();
    *shared.published.write() = Arc::new(next);
    shared.metrics.partitions_assigned.set(assigned as i64);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn partitions(ids: &[u32]) -> BTreeSet<Partition> {
        ids.iter().copied().map(Partition::new).collect()
    }

    fn publisher_with(
        listeners: Vec<Arc<dyn PartitionListener>>,
        timeout: Duration,
    ) -> (PartitionPublisher, Arc<PartitionMetrics>) {
        let metrics = Arc::new(PartitionMetrics::new());
        let publisher = PartitionPublisher::new(1, timeout, listeners, Arc::clone(&metrics));
        (publisher, metrics)
    }

    async fn wait_until_published(publisher: &PartitionPublisher, expected: &BTreeSet<Partition>) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while *publisher.published() != *expected {
            assert!(
                Instant::now() < deadline,
                "published set never became {expected:?}"
            );
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    }

    #[derive(Default)]
    struct RecordingListener {
        events: Mutex<Vec<PartitionChange>>,
    }

    impl RecordingListener {
        fn events(&self) -> Vec<PartitionChange> {
            self.events.lock().clone()
        }
    }

    impl PartitionListener for RecordingListener {
        fn on_partitions_changed(&self, change: &PartitionChange) {
            self.events.lock().push(change.clone());
        }
    }

    struct PanickingListener;

    impl PartitionListener for PanickingListener {
        fn on_partitions_changed(&self, _change: &PartitionChange) {
            panic!("listener blew up");
        }
    }

    struct SlowListener {
        delay: Duration,
    }

    impl PartitionListener for SlowListener {
        fn on_partitions_changed(&self, _change: &PartitionChange) {
            std::thread::sleep(self.delay);
        }
    }

    #[test_log::test(tokio::test)]
    async fn test_publish_swaps_published_snapshot() {
        let (publisher, metrics) = publisher_with(vec![], Duration::from_secs(5));
        assert!(publisher.published().is_empty());

        publisher.publish(partitions(&[1, 2, 3])).await;
        assert_eq!(*publisher.published(), partitions(&[1, 2, 3]));
        assert_eq!(metrics.snapshot().partitions_assigned, 3);
    }

    #[test_log::test(tokio::test)]
    async fn test_republishing_same_set_dispatches_nothing() {
        let listener = Arc::new(RecordingListener::default());
        let (publisher, metrics) = publisher_with(
            vec![listener.clone() as Arc<dyn PartitionListener>],
            Duration::from_secs(5),
        );

        publisher.publish(partitions(&[1, 2])).await;
        publisher.publish(partitions(&[1, 2])).await;

        assert_eq!(listener.events().len(), 1);
        assert_eq!(metrics.snapshot().rounds, 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_change_event_carries_delta_and_total() {
        let listener = Arc::new(RecordingListener::default());
        let (publisher, _) = publisher_with(
            vec![listener.clone() as Arc<dyn PartitionListener>],
            Duration::from_secs(5),
        );

        publisher.publish(partitions(&[1, 2, 3])).await;
        publisher.publish(partitions(&[2, 3, 4])).await;

        let events = listener.events();
        assert_eq!(events.len(), 2);
        assert_eq!(events[1].added, BTreeSet::from([4]));
        assert_eq!(events[1].removed, BTreeSet::from([1]));
        assert_eq!(events[1].partitions, partitions(&[2, 3, 4]));
    }

    #[test_log::test(tokio::test)]
    async fn test_late_listener_is_caught_up_synchronously() {
        let (publisher, _) = publisher_with(vec![], Duration::from_secs(5));
        publisher.publish(partitions(&[3, 7])).await;

        let listener = Arc::new(RecordingListener::default());
        let subscription = publisher.add_listener(listener.clone());

        // The catch-up event is delivered before add_listener returns.
        let events = listener.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].added, BTreeSet::from([3, 7]));
        assert!(events[0].removed.is_empty());
        assert_eq!(events[0].partitions, partitions(&[3, 7]));

        subscription.cancel();
        assert_eq!(publisher.listener_count(), 0);
    }

    #[test_log::test(tokio::test)]
    async fn test_cancelled_listener_receives_no_further_events() {
        let listener = Arc::new(RecordingListener::default());
        let (publisher, _) = publisher_with(vec![], Duration::from_secs(5));

        let subscription = publisher.add_listener(listener.clone());
        subscription.cancel();

        publisher.publish(partitions(&[1])).await;
        // Only the catch-up event from registration.
        assert_eq!(listener.events().len(), 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_panicking_listener_does_not_starve_others() {
        let healthy = Arc::new(RecordingListener::default());
        let (publisher, metrics) = publisher_with(
            vec![
                Arc::new(PanickingListener) as Arc<dyn PartitionListener>,
                healthy.clone(),
            ],
            Duration::from_secs(5),
        );

        publisher.publish(partitions(&[1, 2])).await;

        let events = healthy.events();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].partitions, partitions(&[1, 2]));
        assert_eq!(metrics.snapshot().listener_failures, 1);
        assert_eq!(*publisher.published(), partitions(&[1, 2]));
    }

    #[test_log::test(tokio::test)]
    async fn test_panicking_listener_during_catch_up_is_contained() {
        let (publisher, metrics) = publisher_with(vec![], Duration::from_secs(5));
        publisher.publish(partitions(&[1])).await;

        // add_listener must survive the panic and still register the listener.
        let subscription = publisher.add_listener(Arc::new(PanickingListener));
        assert_eq!(publisher.listener_count(), 1);
        assert_eq!(metrics.snapshot().listener_failures, 1);
        subscription.cancel();
    }

    #[test_log::test(tokio::test)]
    async fn test_slow_listener_does_not_block_publisher() {
        let healthy = Arc::new(RecordingListener::default());
        let timeout = Duration::from_millis(100);
        let (publisher, metrics) = publisher_with(
            vec![
                Arc::new(SlowListener {
                    delay: Duration::from_secs(3),
                }) as Arc<dyn PartitionListener>,
                healthy.clone(),
            ],
            timeout,
        );

        let target = partitions(&[1, 2, 3]);
        let started = Instant::now();
        publisher.publish(target.clone()).await;
        assert!(
            started.elapsed() < Duration::from_secs(2),
            "publish must unblock near the notification timeout"
        );

        // The round still completes: the healthy listener was notified and
        // the snapshot swapped even though the slow listener was abandoned.
        wait_until_published(&publisher, &target).await;
        assert_eq!(healthy.events().len(), 1);
        assert_eq!(metrics.snapshot().round_timeouts, 1);
    }

    #[test_log::test(tokio::test)]
    async fn test_rapid_publishes_converge_to_latest() {
        let listener = Arc::new(RecordingListener::default());
        let (publisher, _) = publisher_with(
            vec![listener.clone() as Arc<dyn PartitionListener>],
            Duration::from_secs(5),
        );

        for i in 1..=5u32 {
            publisher.publish(partitions(&[i])).await;
        }

        assert_eq!(*publisher.published(), partitions(&[5]));
        let events = listener.events();
        // Every disseminated event described the current total state, ending
        // at the latest set.
        assert_eq!(events.last().unwrap().partitions, partitions(&[5]));
        for event in &events {
            assert!(!event.partitions.is_empty());
        }
    }
}
