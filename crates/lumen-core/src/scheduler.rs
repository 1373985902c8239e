//! Cancellable delayed work.
//!
//! The scheduler defers one-shot tasks to a point in time. A task runs at
//! most once; cancelling it before it runs guarantees it never runs.
//!
//! Nothing here sleeps. Due tasks are executed by whoever calls
//! [`SharedTaskScheduler::process_ready`]: the Tokio-backed
//! [`TimerDriver`](crate::TimerDriver) in applications, or the test itself
//! after advancing a [`ManualClock`](crate::ManualClock).
//!
//! # Example
//!
//! ```
//! use lumen_core::{ManualClock, SharedTaskScheduler};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicBool, Ordering};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let scheduler = SharedTaskScheduler::with_clock(clock.clone());
//! let fired = Arc::new(AtomicBool::new(false));
//!
//! let flag = fired.clone();
//! scheduler.schedule_once(Duration::from_secs(5), move || {
//!     flag.store(true, Ordering::SeqCst);
//! });
//!
//! clock.advance(Duration::from_secs(5));
//! assert_eq!(scheduler.process_ready(), 1);
//! assert!(fired.load(Ordering::SeqCst));
//! ```

use std::cmp::Ordering;
use std::collections::BinaryHeap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::clock::{Clock, SystemClock};
use crate::error::{Result, SchedulerError};
use crate::signal::Signal;

new_key_type! {
    /// A unique identifier for a scheduled task.
    pub struct ScheduledTaskId;
}

/// A boxed task closure.
pub type BoxedScheduledTask = Box<dyn FnOnce() + Send + 'static>;

/// An entry in the scheduler queue (min-heap by execution time, then by
/// insertion order).
#[derive(Debug, Clone, Copy)]
struct SchedulerQueueEntry {
    id: ScheduledTaskId,
    run_time: Instant,
    seq: u64,
}

impl PartialEq for SchedulerQueueEntry {
    fn eq(&self, other: &Self) -> bool {
        self.run_time == other.run_time && self.seq == other.seq
    }
}

impl Eq for SchedulerQueueEntry {}

impl PartialOrd for SchedulerQueueEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for SchedulerQueueEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        // Reverse order for min-heap (BinaryHeap is max-heap by default).
        other
            .run_time
            .cmp(&self.run_time)
            .then_with(|| other.seq.cmp(&self.seq))
    }
}

/// Manages scheduled one-shot tasks.
///
/// The scheduler keeps a priority queue ordered by execution time. Tasks due
/// at the same instant run in the order they were scheduled.
pub struct TaskScheduler {
    /// All pending tasks.
    tasks: SlotMap<ScheduledTaskId, BoxedScheduledTask>,
    /// Priority queue of pending executions. May hold stale entries for
    /// cancelled tasks; they are skipped lazily.
    queue: BinaryHeap<SchedulerQueueEntry>,
    /// Insertion counter for stable ordering.
    next_seq: u64,
    /// Time source.
    clock: Arc<dyn Clock>,
}

impl TaskScheduler {
    /// Create a new task scheduler on the system clock.
    pub fn new() -> Self {
        Self::with_clock(SystemClock)
    }

    /// Create a new task scheduler on a custom clock.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self {
            tasks: SlotMap::with_key(),
            queue: BinaryHeap::new(),
            next_seq: 0,
            clock: Arc::new(clock),
        }
    }

    /// The scheduler's notion of "now".
    pub fn now(&self) -> Instant {
        self.clock.now()
    }

    /// Schedule a one-shot task to execute after the specified delay.
    ///
    /// Returns the task ID that can be used to cancel the task.
    pub fn schedule_once<F>(&mut self, delay: Duration, task: F) -> ScheduledTaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let run_time = self.now() + delay;
        self.schedule_at(run_time, task)
    }

    /// Schedule a task to execute at a specific instant.
    ///
    /// If the instant is in the past, the task will execute on the next
    /// processing cycle.
    pub fn schedule_at<F>(&mut self, instant: Instant, task: F) -> ScheduledTaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.tasks.insert(Box::new(task));
        self.push_entry(id, instant);
        id
    }

    /// Cancel and remove a scheduled task.
    ///
    /// Returns an error if the task is unknown, has already run, or was
    /// already cancelled.
    pub fn cancel(&mut self, id: ScheduledTaskId) -> Result<()> {
        self.tasks
            .remove(id)
            .map(|_| ())
            .ok_or_else(|| SchedulerError::InvalidTaskId.into())
    }

    /// The instant the earliest pending task is due, if any.
    pub fn next_deadline(&mut self) -> Option<Instant> {
        self.discard_stale_head();
        self.queue.peek().map(|entry| entry.run_time)
    }

    /// Get the duration until the next task should execute, if any.
    pub fn time_until_next(&mut self) -> Option<Duration> {
        let now = self.now();
        self.next_deadline()
            .map(|deadline| deadline.saturating_duration_since(now))
    }

    /// Remove every due task from the scheduler and hand them back in
    /// execution order, without running them.
    pub fn take_ready(&mut self) -> Vec<(ScheduledTaskId, BoxedScheduledTask)> {
        let now = self.now();
        let mut ready = Vec::new();

        while let Some(entry) = self.queue.peek().copied() {
            if entry.run_time > now {
                break;
            }
            self.queue.pop();

            if let Some(task) = self.tasks.remove(entry.id) {
                ready.push((entry.id, task));
            }
        }

        ready
    }

    /// Get the number of pending tasks.
    pub fn active_count(&self) -> usize {
        self.tasks.len()
    }

    fn push_entry(&mut self, id: ScheduledTaskId, run_time: Instant) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(SchedulerQueueEntry { id, run_time, seq });
    }

    fn discard_stale_head(&mut self) {
        while let Some(entry) = self.queue.peek() {
            if self.tasks.contains_key(entry.id) {
                break;
            }
            self.queue.pop();
        }
    }
}

impl Default for TaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

/// A thread-safe scheduler shared between the components that schedule work
/// and the driver that fires it.
///
/// Tasks run outside the internal lock, so a task may schedule or cancel
/// other tasks. [`schedule_changed`](Self::schedule_changed) fires whenever
/// the set of pending tasks changes so a driver can re-evaluate its sleep.
pub struct SharedTaskScheduler {
    inner: Mutex<TaskScheduler>,
    schedule_changed: Signal<()>,
}

impl SharedTaskScheduler {
    /// Create a shared scheduler on the system clock.
    pub fn new() -> Self {
        Self::from_scheduler(TaskScheduler::new())
    }

    /// Create a shared scheduler on a custom clock.
    pub fn with_clock(clock: impl Clock + 'static) -> Self {
        Self::from_scheduler(TaskScheduler::with_clock(clock))
    }

    fn from_scheduler(scheduler: TaskScheduler) -> Self {
        Self {
            inner: Mutex::new(scheduler),
            schedule_changed: Signal::new(),
        }
    }

    /// Emitted after a task is scheduled or cancelled.
    pub fn schedule_changed(&self) -> &Signal<()> {
        &self.schedule_changed
    }

    pub fn now(&self) -> Instant {
        self.inner.lock().now()
    }

    pub fn schedule_once<F>(&self, delay: Duration, task: F) -> ScheduledTaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.inner.lock().schedule_once(delay, task);
        self.schedule_changed.emit(());
        id
    }

    pub fn schedule_at<F>(&self, instant: Instant, task: F) -> ScheduledTaskId
    where
        F: FnOnce() + Send + 'static,
    {
        let id = self.inner.lock().schedule_at(instant, task);
        self.schedule_changed.emit(());
        id
    }

    pub fn cancel(&self, id: ScheduledTaskId) -> Result<()> {
        let result = self.inner.lock().cancel(id);
        if result.is_ok() {
            self.schedule_changed.emit(());
        }
        result
    }

    pub fn next_deadline(&self) -> Option<Instant> {
        self.inner.lock().next_deadline()
    }

    pub fn time_until_next(&self) -> Option<Duration> {
        self.inner.lock().time_until_next()
    }

    /// Run every due task. The lock is released before the first task runs.
    #[tracing::instrument(skip(self), target = "lumen_core::scheduler", level = "trace")]
    pub fn process_ready(&self) -> usize {
        let ready = self.inner.lock().take_ready();
        let count = ready.len();
        for (id, task) in ready {
            tracing::trace!(target: "lumen_core::scheduler", ?id, "executing scheduled task");
            task();
        }
        count
    }

    pub fn active_count(&self) -> usize {
        self.inner.lock().active_count()
    }

}

impl Default for SharedTaskScheduler {
    fn default() -> Self {
        Self::new()
    }
}

static_assertions::assert_impl_all!(SharedTaskScheduler: Send, Sync);
