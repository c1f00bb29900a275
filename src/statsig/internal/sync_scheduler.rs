//! Periodic background loops that keep the store fresh.
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use futures::FutureExt;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::statsig::statsig_error::{Result, StatsigError};
use crate::statsig::statsig_error_sink::StatsigErrorSink;

/// Spawns sync loops that share one shutdown signal.
///
/// A loop only looks at the signal while it is waiting for its next cycle, so a cycle that
/// already started always runs to completion before the loop exits.
pub struct SyncScheduler {
    shutdown_sender: watch::Sender<bool>,
    handles: Mutex<Vec<JoinHandle<()>>>,
    error_sink: Arc<dyn StatsigErrorSink>,
}

impl SyncScheduler {
    pub fn new(error_sink: Arc<dyn StatsigErrorSink>) -> SyncScheduler {
        let (shutdown_sender, _) = watch::channel(false);
        SyncScheduler {
            shutdown_sender,
            handles: Mutex::new(vec![]),
            error_sink,
        }
    }

    /// Runs `sync` every `interval` until [`SyncScheduler::shutdown`] is called.
    ///
    /// Errors and panics from a cycle are reported and the loop carries on.
    pub fn spawn<F, Fut>(&self, name: &'static str, interval: Duration, sync: F)
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<()>> + Send + 'static,
    {
        let mut shutdown = self.shutdown_sender.subscribe();
        let error_sink = self.error_sink.clone();

        let handle = tokio::spawn(async move {
            loop {
                if *shutdown.borrow() {
                    break;
                }

                tokio::select! {
                    changed = shutdown.changed() => {
                        // An error means the scheduler was dropped, which is also a stop.
                        if changed.is_err() {
                            break;
                        }
                        continue;
                    }
                    _ = tokio::time::sleep(interval) => {}
                }

                log::debug!(target: "statsig", "running {} sync", name);
                match AssertUnwindSafe(async { sync().await }).catch_unwind().await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => error_sink.report(&e),
                    Err(_) => error_sink.report(&StatsigError::SyncTaskPanicked(name)),
                }
            }
            log::debug!(target: "statsig", "{} sync loop received stop command", name);
        });

        match self.handles.lock() {
            Ok(mut handles) => handles.push(handle),
            Err(poisoned) => poisoned.into_inner().push(handle),
        }
    }

    /// Signals every loop to stop and waits for all of them to exit.
    pub async fn shutdown(&self) -> Result<()> {
        self.shutdown_sender.send_replace(true);

        let handles = match self.handles.lock() {
            Ok(mut handles) => std::mem::take(&mut *handles),
            Err(poisoned) => std::mem::take(&mut *poisoned.into_inner()),
        };

        let mut result = Ok(());
        for handle in handles {
            if handle.await.is_err() {
                result = Err(StatsigError::ShutdownFailure);
            }
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::statsig::internal::test_helpers::RecordingErrorSink;

    fn counting_sync(counter: &Arc<AtomicUsize>) -> impl Fn() -> futures::future::Ready<Result<()>> + Send + Sync + 'static {
        let counter = counter.clone();
        move || {
            counter.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Ok(()))
        }
    }

    #[tokio::test]
    async fn runs_until_shutdown() {
        let errors = Arc::new(RecordingErrorSink::default());
        let scheduler = SyncScheduler::new(errors.clone());
        let counter = Arc::new(AtomicUsize::new(0));

        scheduler.spawn("test", Duration::from_millis(10), counting_sync(&counter));
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.shutdown().await.unwrap();

        let runs = counter.load(Ordering::SeqCst);
        assert!(runs >= 2, "expected several runs, got {runs}");

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert_eq!(counter.load(Ordering::SeqCst), runs);
    }

    #[tokio::test]
    async fn shutdown_does_not_wait_for_interval() {
        let scheduler = SyncScheduler::new(Arc::new(RecordingErrorSink::default()));
        let counter = Arc::new(AtomicUsize::new(0));

        scheduler.spawn("slow", Duration::from_secs(3600), counting_sync(&counter));
        tokio::time::timeout(Duration::from_secs(5), scheduler.shutdown())
            .await
            .expect("shutdown should not wait for the interval")
            .unwrap();

        assert_eq!(counter.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn in_flight_cycle_finishes_before_exit() {
        let scheduler = SyncScheduler::new(Arc::new(RecordingErrorSink::default()));
        let finished = Arc::new(AtomicUsize::new(0));
        let started = Arc::new(tokio::sync::Notify::new());

        let cycle_finished = finished.clone();
        let cycle_started = started.clone();
        scheduler.spawn("long", Duration::from_millis(5), move || {
            let finished = cycle_finished.clone();
            let started = cycle_started.clone();
            async move {
                started.notify_one();
                tokio::time::sleep(Duration::from_millis(50)).await;
                finished.fetch_add(1, Ordering::SeqCst);
                Ok::<(), StatsigError>(())
            }
        });

        started.notified().await;
        scheduler.shutdown().await.unwrap();

        assert_eq!(finished.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn reports_errors_and_keeps_running() {
        let errors = Arc::new(RecordingErrorSink::default());
        let scheduler = SyncScheduler::new(errors.clone());
        let counter = Arc::new(AtomicUsize::new(0));

        let runs = counter.clone();
        scheduler.spawn("failing", Duration::from_millis(10), move || {
            runs.fetch_add(1, Ordering::SeqCst);
            futures::future::ready(Err::<(), _>(StatsigError::RequestFailed {
                endpoint: "download_config_specs".to_string(),
                status: 500,
            }))
        });
        tokio::time::sleep(Duration::from_millis(100)).await;
        scheduler.shutdown().await.unwrap();

        assert!(counter.load(Ordering::SeqCst) >= 2);
        assert_eq!(errors.count(), counter.load(Ordering::SeqCst));
    }

    #[tokio::test]
    async fn reports_panicking_cycle() {
        let errors = Arc::new(RecordingErrorSink::default());
        let scheduler = SyncScheduler::new(errors.clone());

        scheduler.spawn("panicking", Duration::from_millis(10), || async {
            if true {
                panic!("boom");
            }
            Ok::<(), StatsigError>(())
        });
        tokio::time::sleep(Duration::from_millis(50)).await;
        scheduler.shutdown().await.unwrap();

        assert!(errors.count() >= 1);
        assert!(errors.errors.lock().unwrap()[0].contains("panicking"));
    }
}
