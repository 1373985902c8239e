//! Logging facilities for Lumen.
//!
//! Lumen uses the `tracing` crate for instrumentation. To see logs, install a
//! tracing subscriber in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter(lumen_core::logging::directive(tracing::Level::DEBUG))
//!         .init();
//! }
//! ```
//!
//! Every event is emitted under one of the [`targets`] below, so a subsystem
//! can be silenced or amplified on its own.

use tracing::Level;

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core crate target.
    pub const CORE: &str = "lumen_core";
    /// Signal/slot system target.
    pub const SIGNAL: &str = "lumen_core::signal";
    /// Scheduler target.
    pub const SCHEDULER: &str = "lumen_core::scheduler";
    /// Timer driver target.
    pub const TIMER: &str = "lumen_core::timer";
    /// Toast crate target.
    pub const TOAST: &str = "lumen_toast";
    /// Toast queue and lifecycle target.
    pub const TOAST_MANAGER: &str = "lumen_toast::manager";
    /// Rendering surface bridge target.
    pub const TOAST_SURFACE: &str = "lumen_toast::surface";
}

/// Build a filter directive enabling every Lumen target at `level`.
///
/// ```
/// use lumen_core::logging::directive;
///
/// assert_eq!(directive(tracing::Level::DEBUG), "lumen_core=debug,lumen_toast=debug");
/// ```
pub fn directive(level: Level) -> String {
    let level = level.as_str().to_ascii_lowercase();
    format!("{}={level},{}={level}", targets::CORE, targets::TOAST)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_subsystem_targets_are_nested_under_crate_targets() {
        for target in [targets::SIGNAL, targets::SCHEDULER, targets::TIMER] {
            assert!(target.starts_with(targets::CORE));
        }
        for target in [targets::TOAST_MANAGER, targets::TOAST_SURFACE] {
            assert!(target.starts_with(targets::TOAST));
        }
    }

    #[test]
    fn test_directive_lowercases_level() {
        assert_eq!(directive(Level::TRACE), "lumen_core=trace,lumen_toast=trace");
    }
}
