//! The display reconciler.
//!
//! One task owns the whole `DisplayConfig` and reacts to four inputs:
//! the poll interval, completed poll results, the hard-refresh interval, and
//! page lifecycle events (including the one-shot error-retry timer). Polls
//! run as detached tasks so a slow backend can never stall the display;
//! overlapping polls are independent and last-applied-wins.
//!
//! State snapshots are published whole over a `watch` channel, so the view
//! layer can never observe a torn update.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use statig::prelude::*;

use crate::config_client::{ConfigSource, PollError};
use crate::display::{DisplayConfig, LayoutMode, Overlay, UiState};
use crate::panel::{PageEvent, PagePanel, PlaybackOptions, VideoPanel};
use crate::protocol::RemoteConfig;
use crate::settings::Settings;
use crate::state_machine::PageHealth;
use crate::state_machine::page_sm::State as PageState;

/// Cloneable-enough entry points into a running reconciler: feed page events,
/// watch state snapshots, trigger a manual reload, tear the loop down.
///
/// Dropping the handle also tears the reconciler down.
pub struct ReconcilerHandle {
    events_tx: mpsc::UnboundedSender<PageEvent>,
    state_rx: watch::Receiver<DisplayConfig>,
    shutdown_tx: watch::Sender<bool>,
}

impl ReconcilerHandle {
    /// Sender for page lifecycle events from the embedded-page widget.
    pub fn page_events(&self) -> mpsc::UnboundedSender<PageEvent> {
        self.events_tx.clone()
    }

    /// The user-visible "Reload" escape hatch. Never required for
    /// correctness; every failure mode also self-heals on a timer.
    pub fn reload(&self) {
        let _ = self.events_tx.send(PageEvent::ManualReload);
    }

    /// Watch receiver for whole-state snapshots.
    pub fn state(&self) -> watch::Receiver<DisplayConfig> {
        self.state_rx.clone()
    }

    /// The latest published snapshot.
    pub fn current(&self) -> DisplayConfig {
        self.state_rx.borrow().clone()
    }

    /// Stop the reconciler: all timers cease, and any in-flight poll result
    /// is discarded instead of being applied. Idempotent.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(true);
    }
}

/// Spawn the reconciler task. The panels are mounted immediately from the
/// compiled-in fallbacks; the first poll fires right away, then every
/// `settings.poll_interval`.
pub fn spawn(
    settings: Settings,
    source: Arc<dyn ConfigSource>,
    page: Box<dyn PagePanel>,
    video: Box<dyn VideoPanel>,
) -> (ReconcilerHandle, JoinHandle<()>) {
    let state = DisplayConfig::with_fallbacks(&settings);
    let (state_tx, state_rx) = watch::channel(state.clone());
    let (events_tx, events_rx) = mpsc::unbounded_channel();
    let (poll_tx, poll_rx) = mpsc::unbounded_channel();
    let (shutdown_tx, shutdown_rx) = watch::channel(false);

    let reconciler = Reconciler {
        settings,
        source,
        page,
        video,
        state,
        machine: PageHealth::default().state_machine(),
        retry_at: None,
        last_overlay: None,
        state_tx,
        poll_tx,
    };
    let join = tokio::spawn(reconciler.run(events_rx, poll_rx, shutdown_rx));

    (
        ReconcilerHandle {
            events_tx,
            state_rx,
            shutdown_tx,
        },
        join,
    )
}

struct Reconciler {
    settings: Settings,
    source: Arc<dyn ConfigSource>,
    page: Box<dyn PagePanel>,
    video: Box<dyn VideoPanel>,
    state: DisplayConfig,
    machine: StateMachine<PageHealth>,
    /// Deadline of the armed error-retry one-shot, if any.
    retry_at: Option<Instant>,
    last_overlay: Option<Overlay>,
    state_tx: watch::Sender<DisplayConfig>,
    poll_tx: mpsc::UnboundedSender<Result<RemoteConfig, PollError>>,
}

impl Reconciler {
    async fn run(
        mut self,
        mut events_rx: mpsc::UnboundedReceiver<PageEvent>,
        mut poll_rx: mpsc::UnboundedReceiver<Result<RemoteConfig, PollError>>,
        mut shutdown_rx: watch::Receiver<bool>,
    ) {
        // Mount both panels from the fallback state before anything else;
        // the video must be playing even if the backend never answers.
        self.video
            .set_source(&self.state.video_url, PlaybackOptions::default());
        self.page.remount(&self.state.web_url, self.state.reload_key);
        self.sync_overlay();
        self.publish();

        let mut poll_tick = time::interval(self.settings.poll_interval);
        poll_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        // The hard refresh must not fire at startup; the first mount just happened.
        let mut refresh_tick = time::interval_at(
            Instant::now() + self.settings.hard_refresh_interval,
            self.settings.hard_refresh_interval,
        );
        refresh_tick.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                // Fires on shutdown() and when the handle is dropped.
                _ = shutdown_rx.changed() => {
                    info!(target: "reconciler", "shutting down");
                    break;
                }
                _ = poll_tick.tick() => self.start_poll(),
                Some(result) = poll_rx.recv() => self.apply_poll_result(result),
                _ = refresh_tick.tick() => self.hard_refresh(),
                Some(event) = events_rx.recv() => self.on_page_event(event),
                _ = retry_sleep(self.retry_at) => {
                    self.retry_at = None;
                    self.on_page_event(PageEvent::RetryElapsed);
                }
            }
        }
        // poll_rx is dropped here; an in-flight fetch completes in the
        // background and its result send simply fails.
    }

    /// Launch one poll as a detached task. Completion order between
    /// overlapping polls is not tracked; results apply as they arrive.
    fn start_poll(&self) {
        let source = Arc::clone(&self.source);
        let tx = self.poll_tx.clone();
        tokio::spawn(async move {
            let _ = tx.send(source.fetch().await);
        });
    }

    fn apply_poll_result(&mut self, result: Result<RemoteConfig, PollError>) {
        let remote = match result {
            Ok(remote) => remote,
            Err(err) => {
                // Transient backend failure must never blank the display;
                // the next scheduled poll retries on its own.
                warn!(target: "reconciler", error = %err, "poll failed; keeping current config");
                return;
            }
        };

        let outcome = self.state.apply_remote(&remote);
        if outcome.web_url_changed {
            info!(target: "reconciler", url = %self.state.web_url, "web url changed; remounting page");
            self.bump_reload_key();
        }
        if outcome.video_url_changed {
            info!(target: "reconciler", url = %self.state.video_url, "video url changed");
            self.video
                .set_source(&self.state.video_url, PlaybackOptions::default());
        }
        if outcome.changed {
            debug!(
                target: "reconciler",
                layout = ?self.state.layout,
                split_ratio = self.state.split_ratio,
                "config applied"
            );
            self.publish();
        }
    }

    /// Unconditional page remount to recover a silently wedged page, except
    /// when no page is shown at all.
    fn hard_refresh(&mut self) {
        if self.state.layout == LayoutMode::VideoOnly {
            debug!(target: "reconciler", "hard refresh skipped; no page panel shown");
            return;
        }
        debug!(target: "reconciler", "hard refresh");
        self.bump_reload_key();
    }

    fn on_page_event(&mut self, event: PageEvent) {
        let was_error = matches!(self.machine.state(), PageState::Error { .. });
        self.machine.handle(&event);

        // Local recovery triggers force a remount on top of the transition.
        match event {
            PageEvent::ManualReload => {
                info!(target: "reconciler", "manual reload");
                self.bump_reload_key();
            }
            PageEvent::RetryElapsed if was_error => {
                info!(target: "reconciler", "error retry elapsed; remounting page");
                self.bump_reload_key();
            }
            _ => {}
        }

        self.sync_health();
    }

    /// Mirror the machine state into the published snapshot and arm or
    /// disarm the error-retry one-shot.
    fn sync_health(&mut self) {
        let (ui, err) = PageHealth::ui_state(self.machine.state());

        if ui == UiState::Error {
            // Arm only on entry; repeated error events keep the first deadline.
            if self.retry_at.is_none() {
                self.retry_at = Some(Instant::now() + self.settings.retry_delay);
            }
        } else {
            self.retry_at = None;
        }

        if ui != self.state.ui_state || err != self.state.last_error {
            if ui == UiState::Error {
                warn!(target: "reconciler", error = ?err, "page entered error state");
            }
            self.state.ui_state = ui;
            self.state.last_error = err;
            self.publish();
        }
        self.sync_overlay();
    }

    fn sync_overlay(&mut self) {
        let overlay = self.state.overlay();
        if overlay != self.last_overlay {
            self.page.set_overlay(overlay.as_ref());
            self.last_overlay = overlay;
        }
    }

    fn bump_reload_key(&mut self) {
        self.state.reload_key += 1;
        self.page.remount(&self.state.web_url, self.state.reload_key);
        self.publish();
    }

    fn publish(&self) {
        self.state_tx.send_replace(self.state.clone());
    }
}

/// Sleep until the retry deadline, or forever when none is armed.
async fn retry_sleep(at: Option<Instant>) {
    match at {
        Some(deadline) => time::sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
