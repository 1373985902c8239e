//! Scheduler, signal and clock working together.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use lumen_core::{ManualClock, Property, SharedTaskScheduler, Signal};
use parking_lot::Mutex;

#[test]
fn tasks_may_schedule_follow_up_work() {
    let clock = ManualClock::new();
    let scheduler = Arc::new(SharedTaskScheduler::with_clock(clock.clone()));
    let log = Arc::new(Mutex::new(Vec::new()));

    let inner_scheduler = Arc::downgrade(&scheduler);
    let inner_log = log.clone();
    scheduler.schedule_once(Duration::from_secs(1), move || {
        inner_log.lock().push("first");
        if let Some(scheduler) = inner_scheduler.upgrade() {
            let follow_up_log = inner_log.clone();
            scheduler.schedule_once(Duration::from_secs(1), move || {
                follow_up_log.lock().push("second");
            });
        }
    });

    clock.advance(Duration::from_secs(1));
    assert_eq!(scheduler.process_ready(), 1);
    assert_eq!(*log.lock(), vec!["first"]);
    assert_eq!(scheduler.active_count(), 1);

    clock.advance(Duration::from_secs(1));
    assert_eq!(scheduler.process_ready(), 1);
    assert_eq!(*log.lock(), vec!["first", "second"]);
}

#[test]
fn schedule_changed_tracks_every_mutation() {
    let clock = ManualClock::new();
    let scheduler = SharedTaskScheduler::with_clock(clock.clone());
    let changes = Arc::new(AtomicUsize::new(0));

    let changes_clone = changes.clone();
    scheduler.schedule_changed().connect(move |_| {
        changes_clone.fetch_add(1, Ordering::SeqCst);
    });

    scheduler.schedule_once(Duration::from_secs(5), || {});
    let b = scheduler.schedule_once(Duration::from_secs(1), || {});
    scheduler.cancel(b).unwrap();
    assert!(scheduler.cancel(b).is_err());

    assert_eq!(changes.load(Ordering::SeqCst), 3);
    assert_eq!(scheduler.time_until_next(), Some(Duration::from_secs(5)));
}

#[test]
fn property_driven_notifications_fire_once_per_change() {
    let clock = ManualClock::new();
    let scheduler = SharedTaskScheduler::with_clock(clock.clone());
    let value = Arc::new(Property::new(0));
    let changed = Arc::new(Signal::<i32>::new());
    let seen = Arc::new(Mutex::new(Vec::new()));

    let seen_clone = seen.clone();
    let _guard = Signal::connect_scoped(&changed, move |v| seen_clone.lock().push(*v));

    for (delay, next) in [(1, 1), (2, 1), (3, 2)] {
        let value = value.clone();
        let changed = changed.clone();
        scheduler.schedule_once(Duration::from_secs(delay), move || {
            if value.set(next) {
                changed.emit(next);
            }
        });
    }

    clock.advance(Duration::from_secs(3));
    assert_eq!(scheduler.process_ready(), 3);
    assert_eq!(*seen.lock(), vec![1, 2]);
}
