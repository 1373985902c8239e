//! Seam between the toast queue and whatever draws the banner.
//!
//! The manager only publishes which toast is current. A [`SurfaceBridge`]
//! listens to that, tracks on-screen keyboard visibility, and drives a
//! [`ToastSurface`] implementation supplied by the rendering layer.

use std::sync::Arc;

use lumen_core::{ConnectionGuard, Property, Signal};
use parking_lot::Mutex;

use crate::config::PlacementConfig;
use crate::manager::ToastManager;
use crate::request::{RequestId, ToastRequest};

/// On-screen keyboard state as reported by the platform.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum KeyboardVisibility {
    #[default]
    Hidden,
    /// Visible, covering `height` logical px at the bottom of the window.
    Visible { height: f32 },
}

/// Where the banner is drawn, measured from the bottom edge of the window.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    pub bottom_offset: f32,
}

impl Placement {
    /// Placement for the given keyboard state.
    pub fn compute(config: &PlacementConfig, keyboard: KeyboardVisibility) -> Self {
        let bottom_offset = match keyboard {
            KeyboardVisibility::Hidden => config.margin,
            KeyboardVisibility::Visible { height } => {
                config.margin + height.max(0.0) + config.keyboard_gap
            }
        };
        Self { bottom_offset }
    }
}

/// Implemented by the rendering layer.
///
/// Calls arrive on whichever thread changed the manager's state, so
/// implementations should hand work off to their UI thread as needed.
pub trait ToastSurface: Send + Sync {
    /// Draw `toast` at `placement`. Replaces nothing: the bridge always
    /// withdraws the previous toast first.
    fn present(&self, toast: &ToastRequest, placement: Placement);

    /// Remove the toast with this id from screen.
    fn withdraw(&self, id: RequestId);

    /// Move the visible toast.
    fn reposition(&self, placement: Placement);
}

struct BridgeState {
    surface: Arc<dyn ToastSurface>,
    config: PlacementConfig,
    keyboard: Property<KeyboardVisibility>,
    presented: Mutex<Option<RequestId>>,
}

impl BridgeState {
    fn placement(&self) -> Placement {
        Placement::compute(&self.config, self.keyboard.get())
    }

    fn sync(&self, current: Option<&ToastRequest>) {
        let next = current.map(ToastRequest::id);
        let previous = {
            let mut presented = self.presented.lock();
            if *presented == next {
                return;
            }
            std::mem::replace(&mut *presented, next)
        };

        if let Some(previous) = previous {
            tracing::trace!(target: "lumen_toast::surface", id = ?previous, "withdrawing toast");
            self.surface.withdraw(previous);
        }
        if let Some(toast) = current {
            let placement = self.placement();
            tracing::trace!(target: "lumen_toast::surface", id = ?toast.id(), ?placement, "presenting toast");
            self.surface.present(toast, placement);
        }
    }
}

/// Connects a [`ToastManager`] to a [`ToastSurface`].
///
/// Dropping the bridge disconnects it; the surface receives no further
/// calls.
pub struct SurfaceBridge {
    manager: Arc<ToastManager>,
    state: Arc<BridgeState>,
    _connection: ConnectionGuard<Option<ToastRequest>>,
}

impl SurfaceBridge {
    /// Start forwarding `manager`'s current toast to `surface`.
    ///
    /// A toast that is already showing is presented immediately. Attaching
    /// while other threads drive the manager never leaves the surface
    /// showing a stale toast.
    pub fn attach(
        manager: Arc<ToastManager>,
        surface: Arc<dyn ToastSurface>,
        config: PlacementConfig,
    ) -> Self {
        let state = Arc::new(BridgeState {
            surface,
            config,
            keyboard: Property::default(),
            presented: Mutex::new(None),
        });

        // No change may land between connecting and the first sync.
        let connection = manager.serialized(|| {
            let slot_state = Arc::clone(&state);
            let connection = Signal::connect_scoped(manager.current_changed(), move |current| {
                slot_state.sync(current.as_ref());
            });
            state.sync(manager.current_toast().as_ref());
            connection
        });

        Self {
            manager,
            state,
            _connection: connection,
        }
    }

    /// Update keyboard visibility and move the visible toast out of its way.
    ///
    /// Only placement changes; the manager's queue and timers are untouched.
    /// Returns the placement now in effect.
    pub fn keyboard_changed(&self, keyboard: KeyboardVisibility) -> Placement {
        let placement = Placement::compute(&self.state.config, keyboard);
        if !self.state.keyboard.set(keyboard) {
            return placement;
        }

        tracing::debug!(target: "lumen_toast::surface", ?keyboard, ?placement, "keyboard visibility changed");
        if self.state.presented.lock().is_some() {
            self.state.surface.reposition(placement);
        }
        placement
    }

    /// The user swiped the toast away.
    pub fn swipe(&self, id: RequestId) -> bool {
        self.manager.dismiss_by_user(id)
    }

    pub fn keyboard(&self) -> KeyboardVisibility {
        self.state.keyboard.get()
    }

    /// Placement for the current keyboard state.
    pub fn placement(&self) -> Placement {
        self.state.placement()
    }

    /// The toast the surface is currently showing.
    pub fn presented(&self) -> Option<RequestId> {
        *self.state.presented.lock()
    }
}

static_assertions::assert_impl_all!(SurfaceBridge: Send, Sync);
