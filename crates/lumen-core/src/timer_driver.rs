//! Tokio integration: fire scheduled tasks on time.
//!
//! A [`TimerDriver`] is a background task that sleeps until the earliest
//! deadline of a [`SharedTaskScheduler`], runs whatever is due, and goes back
//! to sleep. Scheduling or cancelling work wakes it so it can re-evaluate the
//! next deadline.
//!
//! # Feature Flag
//!
//! This module requires the `tokio` feature (enabled by default).
//!
//! # Clock
//!
//! The driver sleeps on Tokio's timer, so the scheduler should be built on
//! [`TokioClock`](crate::TokioClock) (or [`SystemClock`](crate::SystemClock)
//! when time is never paused). A [`ManualClock`](crate::ManualClock) is driven
//! by calling `process_ready` directly instead.
//!
//! # Example
//!
//! ```no_run
//! use lumen_core::{SharedTaskScheduler, TimerDriver, TokioClock};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn demo() {
//! let scheduler = Arc::new(SharedTaskScheduler::with_clock(TokioClock));
//! let _driver = TimerDriver::spawn(scheduler.clone());
//!
//! scheduler.schedule_once(Duration::from_secs(3), || {
//!     println!("three seconds later");
//! });
//! # }
//! ```

use std::sync::Arc;

use tokio::sync::Notify;
use tokio::task::JoinHandle;

use crate::scheduler::SharedTaskScheduler;
use crate::signal::ConnectionId;

/// Handle to a running timer driver. Dropping it stops the driver.
pub struct TimerDriver {
    scheduler: Arc<SharedTaskScheduler>,
    wake_connection: ConnectionId,
    task: JoinHandle<()>,
}

impl TimerDriver {
    /// Spawn a driver for `scheduler` on the current Tokio runtime.
    ///
    /// # Panics
    ///
    /// Panics if called outside of a Tokio runtime.
    pub fn spawn(scheduler: Arc<SharedTaskScheduler>) -> Self {
        Self::spawn_on(&tokio::runtime::Handle::current(), scheduler)
    }

    /// Spawn a driver for `scheduler` on a specific runtime.
    pub fn spawn_on(runtime: &tokio::runtime::Handle, scheduler: Arc<SharedTaskScheduler>) -> Self {
        let wake = Arc::new(Notify::new());

        let wake_slot = wake.clone();
        let wake_connection = scheduler.schedule_changed().connect(move |_| {
            wake_slot.notify_one();
        });

        let task = runtime.spawn(run(scheduler.clone(), wake));
        tracing::debug!(target: "lumen_core::timer", "timer driver started");

        Self {
            scheduler,
            wake_connection,
            task,
        }
    }

    /// Whether the driver task is still running.
    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }
}

impl Drop for TimerDriver {
    fn drop(&mut self) {
        self.scheduler.schedule_changed().disconnect(self.wake_connection);
        self.task.abort();
        tracing::debug!(target: "lumen_core::timer", "timer driver stopped");
    }
}

async fn run(scheduler: Arc<SharedTaskScheduler>, wake: Arc<Notify>) {
    loop {
        match scheduler.next_deadline() {
            Some(deadline) => {
                let deadline = tokio::time::Instant::from_std(deadline);
                tokio::select! {
                    () = tokio::time::sleep_until(deadline) => {
                        let fired = scheduler.process_ready();
                        tracing::trace!(target: "lumen_core::timer", fired, "timer driver tick");
                    }
                    () = wake.notified() => {}
                }
            }
            None => wake.notified().await,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use super::*;
    use crate::clock::TokioClock;

    #[tokio::test(start_paused = true)]
    async fn test_driver_fires_on_deadline() {
        let scheduler = Arc::new(SharedTaskScheduler::with_clock(TokioClock));
        let driver = TimerDriver::spawn(scheduler.clone());
        let executed = Arc::new(AtomicUsize::new(0));

        let executed_clone = executed.clone();
        scheduler.schedule_once(Duration::from_secs(3), move || {
            executed_clone.fetch_add(1, Ordering::SeqCst);
        });

        tokio::time::sleep(Duration::from_millis(2_990)).await;
        assert_eq!(executed.load(Ordering::SeqCst), 0);

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert_eq!(executed.load(Ordering::SeqCst), 1);
        assert!(driver.is_running());
    }

    #[tokio::test(start_paused = true)]
    async fn test_driver_picks_up_earlier_deadline() {
        let scheduler = Arc::new(SharedTaskScheduler::with_clock(TokioClock));
        let _driver = TimerDriver::spawn(scheduler.clone());
        let order = Arc::new(parking_lot::Mutex::new(Vec::new()));

        let late = order.clone();
        scheduler.schedule_once(Duration::from_secs(9), move || late.lock().push("late"));
        tokio::task::yield_now().await;

        let early = order.clone();
        scheduler.schedule_once(Duration::from_secs(1), move || early.lock().push("early"));

        tokio::time::sleep(Duration::from_millis(1_010)).await;
        assert_eq!(*order.lock(), vec!["early"]);

        tokio::time::sleep(Duration::from_secs(9)).await;
        assert_eq!(*order.lock(), vec!["early", "late"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancelled_task_never_fires() {
        let scheduler = Arc::new(SharedTaskScheduler::with_clock(TokioClock));
        let _driver = TimerDriver::spawn(scheduler.clone());
        let executed = Arc::new(AtomicUsize::new(0));

        let executed_clone = executed.clone();
        let id = scheduler.schedule_once(Duration::from_secs(1), move || {
            executed_clone.fetch_add(1, Ordering::SeqCst);
        });
        scheduler.cancel(id).unwrap();

        tokio::time::sleep(Duration::from_secs(2)).await;
        assert_eq!(executed.load(Ordering::SeqCst), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_driver_disconnects_wakeup() {
        let scheduler = Arc::new(SharedTaskScheduler::with_clock(TokioClock));
        let driver = TimerDriver::spawn(scheduler.clone());
        assert_eq!(scheduler.schedule_changed().connection_count(), 1);

        drop(driver);
        assert_eq!(scheduler.schedule_changed().connection_count(), 0);
    }
}
