//! Toast request data model.
//!
//! A [`ToastRequest`] is created every time a caller asks for a toast. Its
//! [`RequestId`] is the only handle a caller needs to withdraw or dismiss
//! that exact toast later.

use std::fmt;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

use crate::error::{Error, Result};

new_key_type! {
    /// Opaque identifier of one toast request.
    ///
    /// Ids are generational: once a request has been shown and dismissed (or
    /// withdrawn), its id never matches a later request, even one that reuses
    /// the same storage slot.
    pub struct RequestId;
}

/// Semantic tone of a toast.
///
/// The rendering surface derives color and the implied icon from the voice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Voice {
    /// Informational. The only voice that accepts a caller-supplied icon.
    #[default]
    Neutral,
    /// Operation completed successfully.
    Success,
    /// Operation failed.
    Error,
}

impl Voice {
    /// The icon implied by this voice, if any.
    pub fn implied_icon(self) -> Option<IconRef> {
        match self {
            Voice::Neutral => None,
            Voice::Success => Some(IconRef::new("checkmark")),
            Voice::Error => Some(IconRef::new("error")),
        }
    }

    /// Whether a caller-supplied icon is honoured for this voice.
    pub fn accepts_custom_icon(self) -> bool {
        matches!(self, Voice::Neutral)
    }
}

/// How long a toast stays on screen once it becomes active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToastDuration {
    /// 3 seconds.
    Short,
    /// 6 seconds.
    #[default]
    Medium,
    /// 9 seconds.
    Long,
}

impl ToastDuration {
    /// The wall-clock display window.
    pub const fn as_duration(self) -> Duration {
        match self {
            ToastDuration::Short => Duration::from_secs(3),
            ToastDuration::Medium => Duration::from_secs(6),
            ToastDuration::Long => Duration::from_secs(9),
        }
    }
}

impl From<ToastDuration> for Duration {
    fn from(duration: ToastDuration) -> Self {
        duration.as_duration()
    }
}

/// Reference to an icon asset owned by the rendering surface.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IconRef(String);

impl IconRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Toast message text. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ToastLabel(String);

impl ToastLabel {
    /// Validate a label.
    ///
    /// Returns [`Error::EmptyLabel`] for an empty or whitespace-only string.
    pub fn new(text: impl Into<String>) -> Result<Self> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(Error::EmptyLabel);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<&str> for ToastLabel {
    type Error = Error;

    fn try_from(text: &str) -> Result<Self> {
        Self::new(text)
    }
}

impl TryFrom<String> for ToastLabel {
    type Error = Error;

    fn try_from(text: String) -> Result<Self> {
        Self::new(text)
    }
}

impl fmt::Display for ToastLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What a caller asks for. Turned into a [`ToastRequest`] by
/// [`ToastManager::show`](crate::ToastManager::show).
#[derive(Debug, Clone, PartialEq)]
pub struct ToastOptions {
    label: ToastLabel,
    voice: Voice,
    icon: Option<IconRef>,
    duration: ToastDuration,
    dismissible: bool,
}

impl ToastOptions {
    /// Options with the default duration (`Medium`) and `dismissible = true`.
    pub fn new(label: ToastLabel, voice: Voice) -> Self {
        Self {
            label,
            voice,
            icon: None,
            duration: ToastDuration::default(),
            dismissible: true,
        }
    }

    /// Options seeded from configured defaults.
    pub fn from_config(label: ToastLabel, voice: Voice, config: &crate::ToastConfig) -> Self {
        Self {
            duration: config.defaults.duration,
            dismissible: config.defaults.dismissible,
            ..Self::new(label, voice)
        }
    }

    /// Neutral toast.
    pub fn neutral(label: ToastLabel) -> Self {
        Self::new(label, Voice::Neutral)
    }

    /// Success toast.
    pub fn success(label: ToastLabel) -> Self {
        Self::new(label, Voice::Success)
    }

    /// Error toast.
    pub fn error(label: ToastLabel) -> Self {
        Self::new(label, Voice::Error)
    }

    /// Attach a custom icon. Only honoured for [`Voice::Neutral`].
    #[must_use]
    pub fn icon(mut self, icon: IconRef) -> Self {
        self.icon = Some(icon);
        self
    }

    #[must_use]
    pub fn duration(mut self, duration: ToastDuration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub fn dismissible(mut self, dismissible: bool) -> Self {
        self.dismissible = dismissible;
        self
    }
}

/// A toast as seen by the queue and the rendering surface.
#[derive(Debug, Clone, PartialEq)]
pub struct ToastRequest {
    id: RequestId,
    label: ToastLabel,
    voice: Voice,
    icon: Option<IconRef>,
    duration: ToastDuration,
    dismissible: bool,
    created_at: Instant,
}

impl ToastRequest {
    pub(crate) fn new(id: RequestId, options: ToastOptions, created_at: Instant) -> Self {
        let ToastOptions {
            label,
            voice,
            icon,
            duration,
            dismissible,
        } = options;

        let icon = if voice.accepts_custom_icon() {
            icon
        } else {
            if icon.is_some() {
                tracing::debug!(
                    target: "lumen_toast::manager",
                    ?voice,
                    "custom icon ignored, voice implies its own icon"
                );
            }
            voice.implied_icon()
        };

        Self {
            id,
            label,
            voice,
            icon,
            duration,
            dismissible,
            created_at,
        }
    }

    pub fn id(&self) -> RequestId {
        self.id
    }

    pub fn label(&self) -> &str {
        self.label.as_str()
    }

    pub fn voice(&self) -> Voice {
        self.voice
    }

    /// The icon to draw: the caller's icon for neutral toasts, the implied
    /// icon for success and error.
    pub fn icon(&self) -> Option<&IconRef> {
        self.icon.as_ref()
    }

    pub fn duration(&self) -> ToastDuration {
        self.duration
    }

    /// Whether the user may dismiss this toast before it times out.
    pub fn is_dismissible(&self) -> bool {
        self.dismissible
    }

    /// When `show` was called. Queue wait does not count against the
    /// display window.
    pub fn created_at(&self) -> Instant {
        self.created_at
    }
}
