//! Collaborator seams for the two platform widgets.
//!
//! The reconciler never talks to a real browser view or video surface; it
//! drives these traits. The widget wiring implements them and feeds page
//! lifecycle callbacks back as [`PageEvent`]s. The `Log*` implementations are
//! what the shipped headless binary installs, so the control loop can be
//! soak-tested against a real backend with nothing but log output.

use tracing::info;

use crate::display::Overlay;

/// Lifecycle events for the embedded-page panel.
///
/// `LoadStart`/`LoadEnd`/`LoadError`/`HttpError` come from the page widget;
/// `ManualReload` from the on-screen reload control; `RetryElapsed` is emitted
/// internally by the reconciler's error-retry timer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageEvent {
    LoadStart,
    LoadEnd,
    /// Generic load failure with the widget's description of the problem.
    LoadError(String),
    /// The page itself answered with a non-success HTTP status.
    HttpError(u16),
    ManualReload,
    RetryElapsed,
}

/// Playback flags for the background video. The kiosk always loops muted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackOptions {
    pub looped: bool,
    pub muted: bool,
    pub autoplay: bool,
}

impl Default for PlaybackOptions {
    fn default() -> Self {
        Self {
            looped: true,
            muted: true,
            autoplay: true,
        }
    }
}

/// The embedded browser view.
pub trait PagePanel: Send {
    /// Tear the page down and recreate it at `url`. `reload_key` is the
    /// monotonic remount trigger; a repeated call with the same key is a
    /// plain navigation, a new key forces a full recreate.
    fn remount(&mut self, url: &str, reload_key: u64);

    /// Show or clear the status overlay over this panel only.
    fn set_overlay(&mut self, overlay: Option<&Overlay>);
}

/// The background video surface. Remount is keyed by the URL value itself.
pub trait VideoPanel: Send {
    fn set_source(&mut self, url: &str, playback: PlaybackOptions);
}

// ---------------------------------------------------------------------------
// Logging stand-ins used by the headless binary
// ---------------------------------------------------------------------------

/// Logs every page-panel action instead of driving a real browser view.
#[derive(Debug, Default)]
pub struct LogPagePanel;

impl PagePanel for LogPagePanel {
    fn remount(&mut self, url: &str, reload_key: u64) {
        info!(target: "panel", url, reload_key, "page remount");
    }

    fn set_overlay(&mut self, overlay: Option<&Overlay>) {
        match overlay {
            Some(o) => {
                info!(target: "panel", title = %o.title, detail = ?o.detail, "overlay shown")
            }
            None => info!(target: "panel", "overlay cleared"),
        }
    }
}

/// Logs every video-panel action instead of driving a real player.
#[derive(Debug, Default)]
pub struct LogVideoPanel;

impl VideoPanel for LogVideoPanel {
    fn set_source(&mut self, url: &str, playback: PlaybackOptions) {
        info!(
            target: "panel",
            url,
            looped = playback.looped,
            muted = playback.muted,
            "video source set"
        );
    }
}
