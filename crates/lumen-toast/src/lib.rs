//! Toast notifications for Lumen.
//!
//! A toast is a short-lived banner at the bottom of the window. This crate
//! owns everything except the drawing:
//!
//! - **Requests**: [`ToastOptions`] in, [`ToastRequest`] out, identified by [`RequestId`]
//! - **Queue**: [`ToastManager`] shows one toast at a time, in request order
//! - **Surface**: [`SurfaceBridge`] forwards the current toast and keyboard
//!   placement to a [`ToastSurface`] supplied by the renderer
//! - **Configuration**: [`ToastConfig`], loaded from TOML
//!
//! Display timers run on a [`lumen_core::SharedTaskScheduler`]. In an
//! application that scheduler is driven by a [`lumen_core::TimerDriver`];
//! in tests it can run on a [`lumen_core::ManualClock`] and be stepped with
//! `process_ready`.
//!
//! # Example
//!
//! ```
//! use lumen_core::{ManualClock, SharedTaskScheduler};
//! use lumen_toast::{ToastEvent, ToastManager, Voice};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! let clock = ManualClock::new();
//! let scheduler = Arc::new(SharedTaskScheduler::with_clock(clock.clone()));
//! let toasts = ToastManager::new(scheduler.clone());
//!
//! toasts.events().connect(|event| {
//!     if let ToastEvent::Dismissed { reason, .. } = event {
//!         println!("toast gone: {reason:?}");
//!     }
//! });
//!
//! let first = toasts.show_message("Copied", Voice::Neutral)?;
//! let second = toasts.show_message("Upload failed", Voice::Error)?;
//! assert_eq!(toasts.current_toast().map(|t| t.id()), Some(first));
//!
//! toasts.dismiss(first);
//! assert_eq!(toasts.current_toast().map(|t| t.id()), Some(second));
//!
//! clock.advance(Duration::from_secs(6));
//! scheduler.process_ready();
//! assert!(toasts.is_idle());
//! # Ok::<(), lumen_toast::Error>(())
//! ```

mod config;
mod error;
mod manager;
mod request;
mod surface;

pub use config::{PlacementConfig, ToastConfig, ToastDefaults};
pub use error::{Error, Result};
pub use manager::{DismissReason, ToastEvent, ToastManager};
pub use request::{IconRef, RequestId, ToastDuration, ToastLabel, ToastOptions, ToastRequest, Voice};
pub use surface::{KeyboardVisibility, Placement, SurfaceBridge, ToastSurface};
