//! Compiled-in settings for the signage kiosk.
//!
//! The display has no CLI and no runtime configuration file: everything the
//! reconciler needs is baked in at build time and read once at startup. The
//! remote config endpoint can then override the display *content* (URLs,
//! layout, geometry) but never these schedule and identity constants.

use std::time::Duration;

/// Fallback embedded-page URL used until the config endpoint says otherwise.
pub const FALLBACK_WEB_URL: &str =
    "https://kiosk-pos.aicard.work/Queue?shopId=8445453f-23dd-4b39-baf0-124a01c86063&branchId=0f6ff938-1c40-4502-b234-85c7ef2b94d1";

/// Fallback background video played on loop until the config endpoint says otherwise.
pub const FALLBACK_VIDEO_URL: &str =
    "https://commondatastorage.googleapis.com/gtv-videos-bucket/sample/BigBuckBunny.mp4";

/// Process-wide constants read once at startup.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the signage backend; the config path is appended to this.
    pub endpoint_base: String,

    /// Device identifier sent as the `deviceId` query parameter.
    pub device_id: String,

    /// How often the remote configuration is polled.
    pub poll_interval: Duration,

    /// Unconditional embedded-page refresh period (recovers a wedged page
    /// that never surfaces an error event).
    pub hard_refresh_interval: Duration,

    /// Delay before an errored embedded page is reloaded automatically.
    pub retry_delay: Duration,

    /// Per-request timeout for the config poll.
    pub request_timeout: Duration,

    /// Target display resolution in pixels.
    pub target_width: f64,
    pub target_height: f64,

    /// Compiled-in fallback URLs for both panels.
    pub fallback_web_url: String,
    pub fallback_video_url: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            endpoint_base: "https://kiosk-pos.aicard.work/api".to_string(),
            device_id: "kiosk-01".to_string(),
            poll_interval: Duration::from_millis(5000),
            hard_refresh_interval: Duration::from_secs(5 * 60),
            retry_delay: Duration::from_millis(3000),
            request_timeout: Duration::from_secs(4),
            target_width: 1420.0,
            target_height: 1080.0,
            fallback_web_url: FALLBACK_WEB_URL.to_string(),
            fallback_video_url: FALLBACK_VIDEO_URL.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_constants() {
        let s = Settings::default();
        assert_eq!(s.poll_interval, Duration::from_millis(5000));
        assert_eq!(s.hard_refresh_interval, Duration::from_secs(300));
        assert_eq!(s.retry_delay, Duration::from_millis(3000));
        assert!(s.request_timeout < s.poll_interval);
    }

    #[test]
    fn default_target_resolution() {
        let s = Settings::default();
        assert_eq!(s.target_width, 1420.0);
        assert_eq!(s.target_height, 1080.0);
    }
}
