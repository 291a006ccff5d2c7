//! signage-kiosk: remote-controlled split-screen display core.
//!
//! A kiosk shows a looping background video next to an embedded web page (a
//! queue/POS display). This crate is the control core behind that screen: it
//! polls a backend for display configuration, merges it defensively into
//! local state, and keeps the embedded page alive through transient failures
//! with a hard-refresh timer and an error-retry timer. The actual browser
//! view and video player are platform widgets driven through the trait seams
//! in [`panel`].

pub mod config_client;
pub mod display;
pub mod logging;
pub mod panel;
pub mod protocol;
pub mod reconciler;
pub mod settings;
pub mod state_machine;

pub use config_client::{ClientError, ConfigSource, HttpConfigSource, PollError};
pub use display::{DisplayConfig, LayoutMode, Orientation, Overlay, PanelGeometry, Rect, UiState};
pub use panel::{LogPagePanel, LogVideoPanel, PageEvent, PagePanel, PlaybackOptions, VideoPanel};
pub use protocol::{RemoteConfig, ScreenConfig};
pub use reconciler::{ReconcilerHandle, spawn};
pub use settings::Settings;
