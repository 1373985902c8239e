//! Core systems for Lumen.
//!
//! This crate provides the reactive and timing building blocks the Lumen
//! design-system controllers are written against:
//!
//! - **Signal/Slot System**: Type-safe publish/subscribe ([`Signal`])
//! - **Property System**: Observable values with change detection ([`Property`])
//! - **Clocks**: Swappable time sources ([`SystemClock`], [`ManualClock`])
//! - **Scheduler**: Cancellable one-shot delayed tasks ([`SharedTaskScheduler`])
//! - **Timer Driver**: A Tokio task that fires due work ([`TimerDriver`])
//!
//! # Observable Value Example
//!
//! ```
//! use lumen_core::{Property, Signal};
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI32, Ordering};
//!
//! let value = Property::new(0);
//! let value_changed = Signal::<i32>::new();
//!
//! let seen = Arc::new(AtomicI32::new(0));
//! let seen_clone = seen.clone();
//! value_changed.connect(move |&v| seen_clone.store(v, Ordering::SeqCst));
//!
//! if value.set(7) {
//!     value_changed.emit(7);
//! }
//! assert_eq!(seen.load(Ordering::SeqCst), 7);
//! ```
//!
//! # Delayed Task Example
//!
//! ```
//! use lumen_core::{ManualClock, SharedTaskScheduler};
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let scheduler = SharedTaskScheduler::with_clock(clock.clone());
//!
//! let id = scheduler.schedule_once(Duration::from_secs(3), || println!("fired"));
//! scheduler.cancel(id).unwrap();
//!
//! clock.advance(Duration::from_secs(3));
//! assert_eq!(scheduler.process_ready(), 0);
//! ```

mod clock;
mod error;
pub mod logging;
pub mod property;
pub mod scheduler;
pub mod signal;
#[cfg(feature = "tokio")]
mod timer_driver;

#[cfg(feature = "tokio")]
pub use clock::TokioClock;
pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{CoreError, Result, SchedulerError, SignalError};
pub use property::{Property, ReadOnlyProperty};
pub use scheduler::{BoxedScheduledTask, ScheduledTaskId, SharedTaskScheduler, TaskScheduler};
pub use signal::{ConnectionGuard, ConnectionId, Signal};
#[cfg(feature = "tokio")]
pub use timer_driver::TimerDriver;
