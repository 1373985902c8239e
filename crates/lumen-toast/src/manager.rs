//! Toast queue and lifecycle management.
//!
//! The [`ToastManager`] shows one toast at a time. Requests wait in a FIFO
//! queue; the head is promoted as soon as the active slot is free, and its
//! display timer starts at that moment. A toast leaves the slot when its
//! timer fires or when it is dismissed by id.
//!
//! # Serialization
//!
//! Every mutation (`show`, `dismiss`, timer expiry, `suspend`, `resume`,
//! `clear`) runs under one re-entrant lock. Observers are notified while
//! that lock is still held but after the state itself has been released, so
//! a slot may call back into the manager. Notifications raised by such a
//! nested call are delivered after the current round of notifications
//! finishes, so observers always see changes in the order they happened.
//!
//! # Timers
//!
//! Each active toast owns exactly one scheduled task. The task carries the
//! request id and a timer epoch; expiry is ignored unless both still match
//! the active slot, so a late or cancelled task can never dismiss a toast it
//! was not scheduled for.
//!
//! Scheduling and cancelling are queued while the state is borrowed and
//! applied once it is released. The scheduler notifies its own observers
//! synchronously, and those may query the manager.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::sync::{Arc, Weak};
use std::time::{Duration, Instant};

use lumen_core::{Property, ReadOnlyProperty, ScheduledTaskId, SharedTaskScheduler, Signal};
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use slotmap::SlotMap;

use crate::error::Result;
use crate::request::{RequestId, ToastLabel, ToastOptions, ToastRequest, Voice};

/// Why a toast left the active slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DismissReason {
    /// Its display window elapsed.
    Timeout,
    /// [`ToastManager::dismiss`] was called with its id.
    Dismissed,
    /// The user swiped it away ([`ToastManager::dismiss_by_user`]).
    UserDismissed,
    /// [`ToastManager::clear`] was called.
    Cleared,
}

/// Lifecycle notifications, emitted on [`ToastManager::events`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToastEvent {
    /// A request entered the queue.
    Queued(RequestId),
    /// A request became the active toast.
    Shown(RequestId),
    /// The active toast left the slot.
    Dismissed { id: RequestId, reason: DismissReason },
    /// A queued request was removed before it was ever shown.
    Withdrawn(RequestId),
}

#[derive(Debug, Clone, Copy)]
enum TimerState {
    Running {
        /// `None` until the queued start has been applied.
        task: Option<ScheduledTaskId>,
        deadline: Instant,
    },
    Suspended {
        remaining: Duration,
    },
}

#[derive(Debug, Clone, Copy)]
enum TimerOp {
    Start {
        id: RequestId,
        epoch: u64,
        deadline: Instant,
    },
    Cancel {
        id: RequestId,
        task: ScheduledTaskId,
    },
}

#[derive(Debug)]
struct ActiveToast {
    id: RequestId,
    /// Identifies the live timer; bumped whenever the timer is replaced.
    epoch: u64,
    timer: TimerState,
}

#[derive(Default)]
struct QueueState {
    /// Queued and active requests. Removed once gone.
    requests: SlotMap<RequestId, ToastRequest>,
    /// Waiting requests, oldest first.
    queue: VecDeque<RequestId>,
    active: Option<ActiveToast>,
    next_epoch: u64,
    suspended: bool,
    /// Scheduler calls not yet made.
    timer_ops: VecDeque<TimerOp>,
    /// Events not yet delivered to observers.
    pending_events: Vec<ToastEvent>,
    /// Last value delivered on `current_changed`.
    last_published: Option<ToastRequest>,
    /// Set while observers are being notified.
    publishing: bool,
}

impl QueueState {
    fn current_request(&self) -> Option<ToastRequest> {
        self.active
            .as_ref()
            .and_then(|active| self.requests.get(active.id))
            .cloned()
    }

    fn take_epoch(&mut self) -> u64 {
        let epoch = self.next_epoch;
        self.next_epoch += 1;
        epoch
    }

    /// Arm a timer for the active toast. The scheduler is called later.
    fn start_timer(&mut self, id: RequestId, epoch: u64, deadline: Instant) -> TimerState {
        self.timer_ops.push_back(TimerOp::Start {
            id,
            epoch,
            deadline,
        });
        TimerState::Running {
            task: None,
            deadline,
        }
    }

    /// The task slot of a running timer still waiting for its start.
    fn unarmed_timer(
        &mut self,
        id: RequestId,
        epoch: u64,
    ) -> Option<&mut Option<ScheduledTaskId>> {
        match self.active.as_mut() {
            Some(ActiveToast {
                id: active_id,
                epoch: active_epoch,
                timer: TimerState::Running { task, .. },
            }) if *active_id == id && *active_epoch == epoch && task.is_none() => Some(task),
            _ => None,
        }
    }
}

/// Clears `publishing` once delivery ends, also when an observer panics.
struct PublishingScope<'a, 'g> {
    guard: &'a StateGuard<'g>,
}

impl Drop for PublishingScope<'_, '_> {
    fn drop(&mut self) {
        if let Ok(mut state) = self.guard.try_borrow_mut() {
            state.publishing = false;
        }
    }
}

type StateGuard<'a> = ReentrantMutexGuard<'a, RefCell<QueueState>>;

/// Serializes toast presentation.
///
/// Construct one per application and hand the `Arc` to whatever needs to
/// raise toasts and to the rendering surface.
///
/// # Example
///
/// ```
/// use lumen_core::{ManualClock, SharedTaskScheduler};
/// use lumen_toast::{ToastDuration, ToastLabel, ToastManager, ToastOptions};
/// use std::sync::Arc;
/// use std::time::Duration;
///
/// let clock = ManualClock::new();
/// let scheduler = Arc::new(SharedTaskScheduler::with_clock(clock.clone()));
/// let toasts = ToastManager::new(scheduler.clone());
///
/// let saved = ToastOptions::success(ToastLabel::new("Saved")?).duration(ToastDuration::Short);
/// let id = toasts.show(saved);
/// assert_eq!(toasts.current_toast().map(|t| t.id()), Some(id));
///
/// clock.advance(Duration::from_secs(3));
/// scheduler.process_ready();
/// assert!(toasts.current_toast().is_none());
/// # Ok::<(), lumen_toast::Error>(())
/// ```
pub struct ToastManager {
    state: ReentrantMutex<RefCell<QueueState>>,
    current: Property<Option<ToastRequest>>,
    current_changed: Arc<Signal<Option<ToastRequest>>>,
    events: Arc<Signal<ToastEvent>>,
    scheduler: Arc<SharedTaskScheduler>,
    this: Weak<ToastManager>,
}

impl ToastManager {
    /// Create a manager whose display timers run on `scheduler`.
    pub fn new(scheduler: Arc<SharedTaskScheduler>) -> Arc<Self> {
        Arc::new_cyclic(|this| Self {
            state: ReentrantMutex::new(RefCell::new(QueueState::default())),
            current: Property::new(None),
            current_changed: Arc::new(Signal::new()),
            events: Arc::new(Signal::new()),
            scheduler,
            this: this.clone(),
        })
    }

    /// Enqueue a toast and return its id.
    ///
    /// If nothing is showing, the toast becomes active immediately and its
    /// display timer starts now.
    pub fn show(&self, options: ToastOptions) -> RequestId {
        let guard = self.state.lock();
        let id = {
            let mut state = guard.borrow_mut();
            let created_at = self.scheduler.now();
            let id = state
                .requests
                .insert_with_key(|id| ToastRequest::new(id, options, created_at));
            state.queue.push_back(id);
            state.pending_events.push(ToastEvent::Queued(id));
            tracing::debug!(
                target: "lumen_toast::manager",
                ?id,
                queued = state.queue.len(),
                "toast queued"
            );
            self.promote_next(&mut state);
            self.sync_current(&state);
            id
        };
        self.apply_timer_ops(&guard);
        self.publish(&guard);
        id
    }

    /// Validate `label` and enqueue a toast with default duration and
    /// dismissibility.
    ///
    /// An empty label is rejected with [`Error::EmptyLabel`](crate::Error::EmptyLabel)
    /// and nothing is enqueued.
    pub fn show_message(&self, label: &str, voice: Voice) -> Result<RequestId> {
        let label = ToastLabel::new(label)?;
        Ok(self.show(ToastOptions::new(label, voice)))
    }

    /// Dismiss the toast with this id.
    ///
    /// - Active: its timer is cancelled and the next queued toast is promoted.
    /// - Queued: it is removed and will never be shown.
    /// - Anything else (already gone, unknown): no-op.
    ///
    /// Returns whether the call had an effect.
    pub fn dismiss(&self, id: RequestId) -> bool {
        self.mutate(|manager, state| manager.remove(state, id, DismissReason::Dismissed))
    }

    /// Dismiss a toast on the user's behalf (swipe).
    ///
    /// Behaves like [`dismiss`](Self::dismiss) but is refused when the
    /// request is not dismissible.
    pub fn dismiss_by_user(&self, id: RequestId) -> bool {
        self.mutate(|manager, state| {
            let Some(request) = state.requests.get(id) else {
                return false;
            };
            if !request.is_dismissible() {
                tracing::trace!(target: "lumen_toast::manager", ?id, "user dismissal refused");
                return false;
            }
            manager.remove(state, id, DismissReason::UserDismissed)
        })
    }

    /// Pause the display timer, e.g. while the application is in the
    /// background.
    ///
    /// The active toast keeps its slot and the time it had left. Requests
    /// shown while suspended still queue; one promoted into a free slot
    /// starts its timer on [`resume`](Self::resume).
    pub fn suspend(&self) {
        self.mutate(|manager, state| {
            if state.suspended {
                return;
            }
            state.suspended = true;

            let now = manager.scheduler.now();
            let epoch = state.take_epoch();
            if let Some(active) = state.active.as_mut() {
                if let TimerState::Running { task, deadline } = active.timer {
                    // A task already taken by the driver is neutralised by the
                    // epoch bump.
                    if let Some(task) = task {
                        state.timer_ops.push_back(TimerOp::Cancel {
                            id: active.id,
                            task,
                        });
                    }
                    let remaining = deadline.saturating_duration_since(now);
                    active.timer = TimerState::Suspended { remaining };
                    active.epoch = epoch;
                    tracing::debug!(
                        target: "lumen_toast::manager",
                        id = ?active.id,
                        ?remaining,
                        "toast timer suspended"
                    );
                }
            }
        });
    }

    /// Restart the display timer with exactly the time it had left.
    pub fn resume(&self) {
        self.mutate(|manager, state| {
            if !state.suspended {
                return;
            }
            state.suspended = false;

            let epoch = state.take_epoch();
            let now = manager.scheduler.now();
            if let Some(active) = state.active.as_mut() {
                if let TimerState::Suspended { remaining } = active.timer {
                    let deadline = now + remaining;
                    active.epoch = epoch;
                    active.timer = TimerState::Running {
                        task: None,
                        deadline,
                    };
                    state.timer_ops.push_back(TimerOp::Start {
                        id: active.id,
                        epoch,
                        deadline,
                    });
                    tracing::debug!(
                        target: "lumen_toast::manager",
                        id = ?active.id,
                        ?remaining,
                        "toast timer resumed"
                    );
                }
            }
        });
    }

    /// Drop every queued request and dismiss the active toast.
    pub fn clear(&self) {
        self.mutate(|manager, state| {
            let queued: Vec<RequestId> = state.queue.drain(..).collect();
            for id in queued {
                state.requests.remove(id);
                state.pending_events.push(ToastEvent::Withdrawn(id));
            }
            if state.active.is_some() {
                manager.finish_active(state, DismissReason::Cleared);
            }
        });
    }

    /// The toast the rendering surface should currently draw.
    pub fn current_toast(&self) -> Option<ToastRequest> {
        self.current.get()
    }

    /// Read-only view of the current toast.
    pub fn current(&self) -> ReadOnlyProperty<'_, Option<ToastRequest>> {
        ReadOnlyProperty::new(&self.current)
    }

    /// Emitted whenever [`current_toast`](Self::current_toast) changes.
    pub fn current_changed(&self) -> &Arc<Signal<Option<ToastRequest>>> {
        &self.current_changed
    }

    /// Emitted for every lifecycle transition.
    pub fn events(&self) -> &Arc<Signal<ToastEvent>> {
        &self.events
    }

    /// Requests waiting behind the active toast, oldest first.
    pub fn pending(&self) -> Vec<ToastRequest> {
        let guard = self.state.lock();
        let state = guard.borrow();
        state
            .queue
            .iter()
            .filter_map(|id| state.requests.get(*id))
            .cloned()
            .collect()
    }

    pub fn queued_count(&self) -> usize {
        self.state.lock().borrow().queue.len()
    }

    /// Nothing showing and nothing queued.
    pub fn is_idle(&self) -> bool {
        let guard = self.state.lock();
        let state = guard.borrow();
        state.active.is_none() && state.queue.is_empty()
    }

    pub fn is_suspended(&self) -> bool {
        self.state.lock().borrow().suspended
    }

    /// Time the active toast has left on screen.
    pub fn remaining(&self) -> Option<Duration> {
        let guard = self.state.lock();
        let state = guard.borrow();
        state.active.as_ref().map(|active| match active.timer {
            TimerState::Running { deadline, .. } => {
                deadline.saturating_duration_since(self.scheduler.now())
            }
            TimerState::Suspended { remaining } => remaining,
        })
    }

    /// Run `f` against the state, then notify observers.
    fn mutate<R>(&self, f: impl FnOnce(&Self, &mut QueueState) -> R) -> R {
        let guard = self.state.lock();
        let result = {
            let mut state = guard.borrow_mut();
            let result = f(self, &mut *state);
            self.sync_current(&state);
            result
        };
        self.apply_timer_ops(&guard);
        self.publish(&guard);
        result
    }

    /// Run `f` with every mutation held off, so the state it observes cannot
    /// change before it returns. `f` may call back into the manager.
    pub(crate) fn serialized<R>(&self, f: impl FnOnce() -> R) -> R {
        let _guard = self.state.lock();
        f()
    }

    /// Timer callback. Only acts if `id` and `epoch` still name the live timer.
    fn expire(&self, id: RequestId, epoch: u64) {
        self.mutate(|manager, state| {
            let is_live = state
                .active
                .as_ref()
                .is_some_and(|active| active.id == id && active.epoch == epoch);
            if !is_live {
                tracing::trace!(target: "lumen_toast::manager", ?id, epoch, "stale toast timer ignored");
                return;
            }
            manager.finish_active(state, DismissReason::Timeout);
        });
    }

    fn remove(&self, state: &mut QueueState, id: RequestId, reason: DismissReason) -> bool {
        if state.active.as_ref().is_some_and(|active| active.id == id) {
            self.finish_active(state, reason);
            return true;
        }

        if state.requests.remove(id).is_some() {
            state.queue.retain(|queued| *queued != id);
            state.pending_events.push(ToastEvent::Withdrawn(id));
            tracing::debug!(target: "lumen_toast::manager", ?id, "queued toast withdrawn");
            return true;
        }

        tracing::trace!(target: "lumen_toast::manager", ?id, "dismiss for unknown or finished toast ignored");
        false
    }

    /// Clear the active slot and promote the next request.
    fn finish_active(&self, state: &mut QueueState, reason: DismissReason) {
        let Some(active) = state.active.take() else {
            return;
        };

        if let TimerState::Running {
            task: Some(task), ..
        } = active.timer
        {
            if reason != DismissReason::Timeout {
                state.timer_ops.push_back(TimerOp::Cancel {
                    id: active.id,
                    task,
                });
            }
        }

        state.requests.remove(active.id);
        state.pending_events.push(ToastEvent::Dismissed {
            id: active.id,
            reason,
        });
        tracing::debug!(target: "lumen_toast::manager", id = ?active.id, ?reason, "toast dismissed");

        self.promote_next(state);
    }

    fn promote_next(&self, state: &mut QueueState) {
        if state.active.is_some() {
            return;
        }
        let Some(id) = state.queue.pop_front() else {
            return;
        };
        let Some(duration) = state.requests.get(id).map(|r| r.duration().as_duration()) else {
            return;
        };

        let epoch = state.take_epoch();
        let timer = if state.suspended {
            TimerState::Suspended {
                remaining: duration,
            }
        } else {
            state.start_timer(id, epoch, self.scheduler.now() + duration)
        };
        state.active = Some(ActiveToast { id, epoch, timer });
        state.pending_events.push(ToastEvent::Shown(id));
        tracing::debug!(target: "lumen_toast::manager", ?id, ?duration, "toast shown");
    }

    /// Make the scheduler calls queued by the last mutation. Runs with the
    /// lock held and the state released.
    fn apply_timer_ops(&self, guard: &StateGuard<'_>) {
        loop {
            let op = guard.borrow_mut().timer_ops.pop_front();
            let Some(op) = op else {
                break;
            };

            match op {
                TimerOp::Cancel { id, task } => {
                    if let Err(error) = self.scheduler.cancel(task) {
                        tracing::trace!(
                            target: "lumen_toast::manager",
                            ?id,
                            %error,
                            "toast timer already fired"
                        );
                    }
                }
                TimerOp::Start {
                    id,
                    epoch,
                    deadline,
                } => {
                    if guard.borrow_mut().unarmed_timer(id, epoch).is_none() {
                        tracing::trace!(
                            target: "lumen_toast::manager",
                            ?id,
                            epoch,
                            "superseded toast timer not started"
                        );
                        continue;
                    }

                    let this = self.this.clone();
                    let task = self.scheduler.schedule_at(deadline, move || {
                        if let Some(manager) = this.upgrade() {
                            manager.expire(id, epoch);
                        }
                    });

                    let stored = guard
                        .borrow_mut()
                        .unarmed_timer(id, epoch)
                        .map(|slot| *slot = Some(task))
                        .is_some();
                    if !stored {
                        // Finished while the scheduler was notifying.
                        if let Err(error) = self.scheduler.cancel(task) {
                            tracing::trace!(
                                target: "lumen_toast::manager",
                                ?id,
                                %error,
                                "toast timer already fired"
                            );
                        }
                    }
                }
            }
        }
    }

    fn sync_current(&self, state: &QueueState) {
        self.current.set(state.current_request());
    }

    /// Deliver pending notifications. Re-entrant calls return immediately;
    /// the outermost call keeps delivering until nothing is left.
    fn publish(&self, guard: &StateGuard<'_>) {
        {
            let mut state = guard.borrow_mut();
            if state.publishing {
                return;
            }
            state.publishing = true;
        }
        let _scope = PublishingScope { guard };

        loop {
            let (current, events) = {
                let mut state = guard.borrow_mut();
                let current = state.current_request();
                let current = (current != state.last_published).then(|| {
                    state.last_published = current.clone();
                    current
                });
                (current, std::mem::take(&mut state.pending_events))
            };

            if current.is_none() && events.is_empty() {
                break;
            }
            if let Some(current) = current {
                self.current_changed.emit(current);
            }
            for event in events {
                self.events.emit(event);
            }
        }
    }
}

impl Drop for ToastManager {
    fn drop(&mut self) {
        let state = self.state.get_mut().get_mut();
        if let Some(ActiveToast {
            id,
            timer: TimerState::Running {
                task: Some(task), ..
            },
            ..
        }) = state.active
        {
            if let Err(error) = self.scheduler.cancel(task) {
                tracing::trace!(target: "lumen_toast::manager", ?id, %error, "toast timer already fired");
            }
        }
    }
}

static_assertions::assert_impl_all!(ToastManager: Send, Sync);
