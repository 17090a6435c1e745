//! Tokio-backed fan-out worker.

use std::{
    sync::{
        Arc,
        atomic::{AtomicU64, Ordering},
    },
    time::Duration,
};

use bazaar_types::{Notification, NotifyConfig};
use parking_lot::Mutex;
use tokio::{
    sync::mpsc,
    task::{JoinHandle, JoinSet},
};
use tracing::{debug, info, warn};

use crate::{NotificationSink, NotifyError, Transport};

/// Delivery outcome counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DispatchStats {
    pub delivered: u64,
    pub failed: u64,
}

#[derive(Debug, Default)]
struct Counters {
    delivered: AtomicU64,
    failed: AtomicU64,
}

/// Queues notifications and delivers each one on its own task.
///
/// [`Dispatcher::notify`] never blocks and never fails: it pushes onto an
/// unbounded channel and returns. A background worker pulls from the
/// channel and spawns one delivery per notification, bounded by
/// `NotifyConfig::delivery_timeout_ms`.
pub struct Dispatcher {
    queue: Mutex<Option<mpsc::UnboundedSender<Notification>>>,
    worker: Mutex<Option<JoinHandle<()>>>,
    counters: Arc<Counters>,
}

impl Dispatcher {
    /// Start the worker on the current tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn(transport: Arc<dyn Transport>, config: &NotifyConfig) -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        let counters = Arc::new(Counters::default());
        let timeout = Duration::from_millis(config.delivery_timeout_ms);
        let worker = tokio::spawn(run(rx, transport, timeout, Arc::clone(&counters)));
        info!(timeout_ms = config.delivery_timeout_ms, "Notification dispatcher started");
        Arc::new(Self {
            queue: Mutex::new(Some(tx)),
            worker: Mutex::new(Some(worker)),
            counters,
        })
    }

    /// Snapshot of the delivery counters.
    pub fn stats(&self) -> DispatchStats {
        DispatchStats {
            delivered: self.counters.delivered.load(Ordering::Relaxed),
            failed: self.counters.failed.load(Ordering::Relaxed),
        }
    }

    /// Stop accepting notifications and wait for every queued and
    /// in-flight delivery to finish or time out.
    pub async fn shutdown(&self) {
        drop(self.queue.lock().take());
        let worker = self.worker.lock().take();
        let Some(worker) = worker else {
            return;
        };
        if let Err(e) = worker.await {
            warn!(error = %e, "Notification worker aborted");
        }
        let stats = self.stats();
        info!(
            delivered = stats.delivered,
            failed = stats.failed,
            "Notification dispatcher stopped"
        );
    }
}

impl NotificationSink for Dispatcher {
    fn notify(&self, notification: Notification) {
        let queue = self.queue.lock();
        let Some(tx) = queue.as_ref() else {
            warn!(
                recipient = %notification.recipient,
                kind = %notification.kind,
                error = %NotifyError::Closed,
                "Notification dropped"
            );
            self.counters.failed.fetch_add(1, Ordering::Relaxed);
            return;
        };
        if let Err(mpsc::error::SendError(n)) = tx.send(notification) {
            warn!(recipient = %n.recipient, kind = %n.kind, "Notification worker gone, dropped");
            self.counters.failed.fetch_add(1, Ordering::Relaxed);
        }
    }
}

async fn run(
    mut rx: mpsc::UnboundedReceiver<Notification>,
    transport: Arc<dyn Transport>,
    timeout: Duration,
    counters: Arc<Counters>,
) {
    let mut in_flight = JoinSet::new();
    loop {
        tokio::select! {
            received = rx.recv() => match received {
                Some(notification) => {
                    in_flight.spawn(deliver(
                        Arc::clone(&transport),
                        notification,
                        timeout,
                        Arc::clone(&counters),
                    ));
                }
                None => break,
            },
            Some(_) = in_flight.join_next(), if !in_flight.is_empty() => {}
        }
    }
    while in_flight.join_next().await.is_some() {}
}

async fn deliver(
    transport: Arc<dyn Transport>,
    notification: Notification,
    timeout: Duration,
    counters: Arc<Counters>,
) {
    let recipient = notification.recipient;
    let kind = notification.kind;
    let job = tokio::task::spawn_blocking(move || transport.deliver(&notification));

    let outcome = match tokio::time::timeout(timeout, job).await {
        Ok(Ok(result)) => result,
        Ok(Err(join_err)) => Err(NotifyError::Aborted(join_err.to_string())),
        Err(_) => Err(NotifyError::Timeout {
            timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
        }),
    };

    match outcome {
        Ok(()) => {
            counters.delivered.fetch_add(1, Ordering::Relaxed);
            debug!(recipient = %recipient, kind = %kind, "Notification delivered");
        }
        Err(e) => {
            counters.failed.fetch_add(1, Ordering::Relaxed);
            warn!(recipient = %recipient, kind = %kind, error = %e, "Notification delivery failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_types::{ActorId, EventKind, Listing, NewListing, Subject};
    use rust_decimal::Decimal;

    #[derive(Debug, Default)]
    struct Collecting {
        delivered: Mutex<Vec<ActorId>>,
    }

    impl Transport for Collecting {
        fn deliver(&self, n: &Notification) -> Result<(), NotifyError> {
            self.delivered.lock().push(n.recipient);
            Ok(())
        }
    }

    /// Fails for one recipient, stalls for another, succeeds otherwise.
    #[derive(Debug, Default)]
    struct Flaky {
        delivered: Mutex<Vec<ActorId>>,
    }

    impl Transport for Flaky {
        fn deliver(&self, n: &Notification) -> Result<(), NotifyError> {
            match n.recipient {
                ActorId(13) => Err(NotifyError::delivery("chat blocked the bot")),
                ActorId(14) => {
                    std::thread::sleep(Duration::from_millis(300));
                    Ok(())
                }
                other => {
                    self.delivered.lock().push(other);
                    Ok(())
                }
            }
        }
    }

    fn note(recipient: i64) -> Notification {
        let listing = Listing::new(ActorId(1), NewListing::dummy(Decimal::new(5, 0)));
        Notification::new(
            ActorId(recipient),
            EventKind::ListingSubmitted,
            Subject::Listing(listing),
        )
    }

    #[tokio::test]
    async fn delivers_everything_before_shutdown_returns() {
        let transport = Arc::new(Collecting::default());
        let dispatcher = Dispatcher::spawn(transport.clone(), &NotifyConfig::default());
        for id in 0..10 {
            dispatcher.notify(note(id));
        }
        dispatcher.shutdown().await;

        let mut got = transport.delivered.lock().clone();
        got.sort();
        assert_eq!(got, (0..10).map(ActorId).collect::<Vec<_>>());
        assert_eq!(dispatcher.stats(), DispatchStats { delivered: 10, failed: 0 });
    }

    #[tokio::test]
    async fn one_bad_recipient_does_not_affect_others() {
        let transport = Arc::new(Flaky::default());
        let config = NotifyConfig {
            delivery_timeout_ms: 50,
        };
        let dispatcher = Dispatcher::spawn(transport.clone(), &config);
        for id in [13, 14, 1, 2, 3] {
            dispatcher.notify(note(id));
        }
        dispatcher.shutdown().await;

        let mut got = transport.delivered.lock().clone();
        got.sort();
        assert_eq!(got, vec![ActorId(1), ActorId(2), ActorId(3)]);
        assert_eq!(dispatcher.stats(), DispatchStats { delivered: 3, failed: 2 });
    }

    #[tokio::test]
    async fn notify_after_shutdown_is_dropped() {
        let transport = Arc::new(Collecting::default());
        let dispatcher = Dispatcher::spawn(transport.clone(), &NotifyConfig::default());
        dispatcher.shutdown().await;

        dispatcher.notify(note(1));
        assert!(transport.delivered.lock().is_empty());
        assert_eq!(dispatcher.stats().failed, 1);
    }

    #[tokio::test]
    async fn usable_as_dyn_sink() {
        let transport = Arc::new(Collecting::default());
        let dispatcher = Dispatcher::spawn(transport.clone(), &NotifyConfig::default());
        let sink: Arc<dyn NotificationSink> = dispatcher.clone();
        sink.notify(note(7));
        dispatcher.shutdown().await;
        assert_eq!(*transport.delivered.lock(), vec![ActorId(7)]);
    }
}
