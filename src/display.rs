//! Display state for the kiosk: the `DisplayConfig` record, the per-field
//! merge rules for remote configuration, and the geometry math that turns
//! layout parameters into concrete panel rectangles.
//!
//! `DisplayConfig` is owned by the reconciler task and published to the view
//! layer as whole snapshots, so every field update is atomic at the
//! state-update granularity.

use crate::protocol::RemoteConfig;
use crate::settings::Settings;

/// Range for `split_ratio` (percent of display space given to the video panel).
pub const SPLIT_RATIO_RANGE: (f64, f64) = (0.0, 100.0);

/// Range for `gap_px` and `padding_px`.
pub const SPACING_RANGE: (f64, f64) = (0.0, 200.0);

// ---------------------------------------------------------------------------
// Enums
// ---------------------------------------------------------------------------

/// Which panel(s) are visible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LayoutMode {
    #[default]
    Split,
    WebOnly,
    VideoOnly,
}

impl LayoutMode {
    /// Normalize a server-supplied layout string. Anything outside the known
    /// set degrades to `Split`.
    pub fn normalize(raw: &str) -> Self {
        match raw {
            "split" => Self::Split,
            "web_only" => Self::WebOnly,
            "video_only" => Self::VideoOnly,
            _ => Self::Split,
        }
    }
}

/// Axis along which the two panels are arranged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Orientation {
    #[default]
    Row,
    Column,
}

impl Orientation {
    /// Parse a server-supplied orientation string. Unlike `layout`, an
    /// unknown value is ignored and the previous orientation is retained.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "row" => Some(Self::Row),
            "column" => Some(Self::Column),
            _ => None,
        }
    }
}

/// Embedded-page health, driven only by local page events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UiState {
    #[default]
    Loading,
    Ready,
    Error,
}

// ---------------------------------------------------------------------------
// DisplayConfig
// ---------------------------------------------------------------------------

/// The whole display state for one kiosk session.
///
/// Created with compiled-in defaults at startup, mutated exclusively by the
/// poll-merge step and by local page events, discarded with the session.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayConfig {
    pub web_url: String,
    pub video_url: String,
    pub layout: LayoutMode,
    pub orientation: Orientation,
    /// Percent of display space allotted to the video panel, always in range.
    pub split_ratio: f64,
    pub gap_px: f64,
    pub padding_px: f64,
    /// Monotonic remount trigger for the embedded page. Only increases.
    pub reload_key: u64,
    pub ui_state: UiState,
    pub last_error: Option<String>,
}

/// What a merge actually changed, so the reconciler can decide which panel
/// needs a remount. Layout and geometry changes never remount anything.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeOutcome {
    pub web_url_changed: bool,
    pub video_url_changed: bool,
    pub changed: bool,
}

impl DisplayConfig {
    /// Initial state from the compiled-in fallbacks.
    pub fn with_fallbacks(settings: &Settings) -> Self {
        Self {
            web_url: settings.fallback_web_url.clone(),
            video_url: settings.fallback_video_url.clone(),
            layout: LayoutMode::Split,
            orientation: Orientation::Row,
            split_ratio: 50.0,
            gap_px: 0.0,
            padding_px: 0.0,
            reload_key: 0,
            ui_state: UiState::Loading,
            last_error: None,
        }
    }

    /// Apply one poll result, field by field. Absent or invalid fields leave
    /// prior state untouched; numeric fields are clamped into range before
    /// being stored. Does not touch `reload_key`, `ui_state`, or `last_error`
    /// — those are driven by local triggers only.
    pub fn apply_remote(&mut self, remote: &RemoteConfig) -> MergeOutcome {
        let mut outcome = MergeOutcome::default();

        if let Some(url) = remote.web_url.as_deref()
            && !url.is_empty()
            && url != self.web_url
        {
            self.web_url = url.to_string();
            outcome.web_url_changed = true;
        }

        if let Some(url) = remote.video_url.as_deref()
            && !url.is_empty()
            && url != self.video_url
        {
            self.video_url = url.to_string();
            outcome.video_url_changed = true;
        }

        if let Some(raw) = remote.layout.as_deref() {
            let layout = LayoutMode::normalize(raw);
            if layout != self.layout {
                self.layout = layout;
                outcome.changed = true;
            }
        }

        if let Some(screen) = &remote.screen {
            if let Some(raw) = screen.orientation.as_deref()
                && let Some(orientation) = Orientation::parse(raw)
                && orientation != self.orientation
            {
                self.orientation = orientation;
                outcome.changed = true;
            }
            if let Some(ratio) = screen.split_ratio {
                let clamped = ratio.clamp(SPLIT_RATIO_RANGE.0, SPLIT_RATIO_RANGE.1);
                if clamped != self.split_ratio {
                    self.split_ratio = clamped;
                    outcome.changed = true;
                }
            }
            if let Some(gap) = screen.gap_px {
                let clamped = gap.clamp(SPACING_RANGE.0, SPACING_RANGE.1);
                if clamped != self.gap_px {
                    self.gap_px = clamped;
                    outcome.changed = true;
                }
            }
            if let Some(padding) = screen.padding_px {
                let clamped = padding.clamp(SPACING_RANGE.0, SPACING_RANGE.1);
                if clamped != self.padding_px {
                    self.padding_px = clamped;
                    outcome.changed = true;
                }
            }
        }

        outcome.changed |= outcome.web_url_changed || outcome.video_url_changed;
        outcome
    }

    /// Overlay to draw over the embedded-page panel, or `None` when the page
    /// is healthy. The video panel is never obscured.
    pub fn overlay(&self) -> Option<Overlay> {
        match self.ui_state {
            UiState::Ready => None,
            UiState::Loading => Some(Overlay {
                title: "Loading...".to_string(),
                detail: self.last_error.clone(),
            }),
            UiState::Error => Some(Overlay {
                title: "Connection error".to_string(),
                detail: self.last_error.clone(),
            }),
        }
    }

    /// Resolve the current layout parameters into panel rectangles for a
    /// display of the given size. A hidden panel resolves to `None`.
    pub fn geometry(&self, width: f64, height: f64) -> PanelGeometry {
        let pad = self.padding_px;
        let inner_w = (width - 2.0 * pad).max(0.0);
        let inner_h = (height - 2.0 * pad).max(0.0);
        let full = Rect {
            x: pad,
            y: pad,
            width: inner_w,
            height: inner_h,
        };

        match self.layout {
            LayoutMode::VideoOnly => PanelGeometry {
                video: Some(full),
                page: None,
            },
            LayoutMode::WebOnly => PanelGeometry {
                video: None,
                page: Some(full),
            },
            LayoutMode::Split => {
                let ratio = self.split_ratio / 100.0;
                match self.orientation {
                    Orientation::Row => {
                        let usable = (inner_w - self.gap_px).max(0.0);
                        let video_w = usable * ratio;
                        let page_w = usable - video_w;
                        PanelGeometry {
                            video: Some(Rect {
                                x: pad,
                                y: pad,
                                width: video_w,
                                height: inner_h,
                            }),
                            page: Some(Rect {
                                x: pad + video_w + self.gap_px,
                                y: pad,
                                width: page_w,
                                height: inner_h,
                            }),
                        }
                    }
                    Orientation::Column => {
                        let usable = (inner_h - self.gap_px).max(0.0);
                        let video_h = usable * ratio;
                        let page_h = usable - video_h;
                        PanelGeometry {
                            video: Some(Rect {
                                x: pad,
                                y: pad,
                                width: inner_w,
                                height: video_h,
                            }),
                            page: Some(Rect {
                                x: pad,
                                y: pad + video_h + self.gap_px,
                                width: inner_w,
                                height: page_h,
                            }),
                        }
                    }
                }
            }
        }
    }
}

// ---------------------------------------------------------------------------
// View-facing value types
// ---------------------------------------------------------------------------

/// Overlay content shown over the embedded-page panel while it is not ready.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Overlay {
    pub title: String,
    pub detail: Option<String>,
}

/// An axis-aligned rectangle in display pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

/// Resolved positions of both panels; `None` means the panel is hidden.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelGeometry {
    pub video: Option<Rect>,
    pub page: Option<Rect>,
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protocol::{RemoteConfig, ScreenConfig};

    fn base() -> DisplayConfig {
        DisplayConfig::with_fallbacks(&Settings::default())
    }

    fn remote_with_screen(screen: ScreenConfig) -> RemoteConfig {
        RemoteConfig {
            screen: Some(screen),
            ..RemoteConfig::default()
        }
    }

    #[test]
    fn defaults_match_compiled_fallbacks() {
        let cfg = base();
        assert_eq!(cfg.layout, LayoutMode::Split);
        assert_eq!(cfg.orientation, Orientation::Row);
        assert_eq!(cfg.split_ratio, 50.0);
        assert_eq!(cfg.reload_key, 0);
        assert_eq!(cfg.ui_state, UiState::Loading);
        assert!(cfg.last_error.is_none());
    }

    #[test]
    fn empty_response_changes_nothing() {
        let mut cfg = base();
        let before = cfg.clone();
        let outcome = cfg.apply_remote(&RemoteConfig::default());
        assert_eq!(outcome, MergeOutcome::default());
        assert_eq!(cfg, before);
    }

    #[test]
    fn new_web_url_is_applied_and_flagged() {
        let mut cfg = base();
        let video_before = cfg.video_url.clone();
        let remote = RemoteConfig {
            web_url: Some("https://a".to_string()),
            ..RemoteConfig::default()
        };
        let outcome = cfg.apply_remote(&remote);
        assert!(outcome.web_url_changed);
        assert!(!outcome.video_url_changed);
        assert_eq!(cfg.web_url, "https://a");
        assert_eq!(cfg.video_url, video_before);
        assert_eq!(cfg.layout, LayoutMode::Split);
    }

    #[test]
    fn empty_and_identical_urls_are_ignored() {
        let mut cfg = base();
        let same = cfg.web_url.clone();
        let remote = RemoteConfig {
            web_url: Some(String::new()),
            video_url: Some(cfg.video_url.clone()),
            ..RemoteConfig::default()
        };
        let outcome = cfg.apply_remote(&remote);
        assert!(!outcome.web_url_changed);
        assert!(!outcome.video_url_changed);
        assert!(!outcome.changed);
        assert_eq!(cfg.web_url, same);
    }

    #[test]
    fn unknown_layout_normalizes_to_split() {
        let mut cfg = base();
        cfg.layout = LayoutMode::VideoOnly;
        let remote = RemoteConfig {
            layout: Some("mosaic".to_string()),
            ..RemoteConfig::default()
        };
        cfg.apply_remote(&remote);
        assert_eq!(cfg.layout, LayoutMode::Split);
    }

    #[test]
    fn unknown_orientation_is_retained_not_normalized() {
        let mut cfg = base();
        cfg.orientation = Orientation::Column;
        let remote = remote_with_screen(ScreenConfig {
            orientation: Some("diagonal".to_string()),
            ..ScreenConfig::default()
        });
        let outcome = cfg.apply_remote(&remote);
        assert_eq!(cfg.orientation, Orientation::Column);
        assert!(!outcome.changed);
    }

    #[test]
    fn split_ratio_is_clamped_into_range() {
        let mut cfg = base();
        let remote = remote_with_screen(ScreenConfig {
            split_ratio: Some(140.0),
            ..ScreenConfig::default()
        });
        cfg.apply_remote(&remote);
        assert_eq!(cfg.split_ratio, 100.0);

        let remote = remote_with_screen(ScreenConfig {
            split_ratio: Some(-5.0),
            ..ScreenConfig::default()
        });
        cfg.apply_remote(&remote);
        assert_eq!(cfg.split_ratio, 0.0);
    }

    #[test]
    fn spacing_is_clamped_into_range() {
        let mut cfg = base();
        let remote = remote_with_screen(ScreenConfig {
            gap_px: Some(1000.0),
            padding_px: Some(-1.0),
            ..ScreenConfig::default()
        });
        cfg.apply_remote(&remote);
        assert_eq!(cfg.gap_px, 200.0);
        assert_eq!(cfg.padding_px, 0.0);
    }

    #[test]
    fn merge_never_touches_local_triggers() {
        let mut cfg = base();
        cfg.reload_key = 7;
        cfg.ui_state = UiState::Error;
        cfg.last_error = Some("HTTP_404".to_string());
        let remote = RemoteConfig {
            web_url: Some("https://a".to_string()),
            ..RemoteConfig::default()
        };
        cfg.apply_remote(&remote);
        assert_eq!(cfg.reload_key, 7);
        assert_eq!(cfg.ui_state, UiState::Error);
        assert_eq!(cfg.last_error.as_deref(), Some("HTTP_404"));
    }

    #[test]
    fn overlapping_polls_are_last_applied_wins() {
        // Known non-guarantee: there is no ordering between overlapping poll
        // responses. If an older response is applied after a newer one, the
        // older value sticks until the next poll. `updatedAt` is carried on
        // the wire but deliberately does not gate the merge.
        let mut cfg = base();
        let newer = RemoteConfig {
            web_url: Some("https://new".to_string()),
            updated_at: Some(2000.0),
            ..RemoteConfig::default()
        };
        let older = RemoteConfig {
            web_url: Some("https://old".to_string()),
            updated_at: Some(1000.0),
            ..RemoteConfig::default()
        };
        cfg.apply_remote(&newer);
        cfg.apply_remote(&older);
        assert_eq!(cfg.web_url, "https://old");
    }

    #[test]
    fn overlay_tracks_ui_state() {
        let mut cfg = base();
        assert_eq!(cfg.overlay().unwrap().title, "Loading...");

        cfg.ui_state = UiState::Ready;
        assert!(cfg.overlay().is_none());

        cfg.ui_state = UiState::Error;
        cfg.last_error = Some("HTTP_404".to_string());
        let overlay = cfg.overlay().unwrap();
        assert_eq!(overlay.title, "Connection error");
        assert_eq!(overlay.detail.as_deref(), Some("HTTP_404"));
    }

    #[test]
    fn geometry_split_row_halves_the_display() {
        let cfg = base();
        let geo = cfg.geometry(1420.0, 1080.0);
        let video = geo.video.unwrap();
        let page = geo.page.unwrap();
        assert_eq!(video.width, 710.0);
        assert_eq!(page.width, 710.0);
        assert_eq!(page.x, 710.0);
        assert_eq!(video.height, 1080.0);
    }

    #[test]
    fn geometry_respects_ratio_gap_and_padding() {
        let mut cfg = base();
        cfg.split_ratio = 25.0;
        cfg.gap_px = 20.0;
        cfg.padding_px = 10.0;
        let geo = cfg.geometry(1420.0, 1080.0);
        let video = geo.video.unwrap();
        let page = geo.page.unwrap();
        // inner width 1400, usable 1380, video 345
        assert_eq!(video.x, 10.0);
        assert_eq!(video.width, 345.0);
        assert_eq!(page.x, 375.0);
        assert_eq!(page.width, 1035.0);
        assert_eq!(video.height, 1060.0);
    }

    #[test]
    fn geometry_column_splits_vertically() {
        let mut cfg = base();
        cfg.orientation = Orientation::Column;
        let geo = cfg.geometry(1000.0, 800.0);
        let video = geo.video.unwrap();
        let page = geo.page.unwrap();
        assert_eq!(video.height, 400.0);
        assert_eq!(page.y, 400.0);
        assert_eq!(video.width, 1000.0);
    }

    #[test]
    fn geometry_single_panel_modes() {
        let mut cfg = base();
        cfg.layout = LayoutMode::VideoOnly;
        let geo = cfg.geometry(1420.0, 1080.0);
        assert!(geo.page.is_none());
        assert_eq!(geo.video.unwrap().width, 1420.0);

        cfg.layout = LayoutMode::WebOnly;
        let geo = cfg.geometry(1420.0, 1080.0);
        assert!(geo.video.is_none());
        assert_eq!(geo.page.unwrap().height, 1080.0);
    }
}
