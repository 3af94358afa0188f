use std::time::Duration;

pub const API_BASE: &str = "/api";

/// Address used when no schedule entry covers the current hour.
pub const DEFAULT_CHANNEL_URL: &str = "https://www.twitch.tv/";

pub const POPUP_WINDOW_NAME: &str = "WebLurkPopup";
pub const POPUP_WINDOW_FEATURES: &str =
    "width=800,height=600,scrollbars=yes,resizable=yes,toolbar=no,menubar=no,location=no";
pub const TAB_WINDOW_TARGET: &str = "_blank";

pub const RANKING_PAGE_SIZE: usize = 10;
pub const HOURS_PER_DAY: u32 = 24;

pub const NOTIFICATION_VISIBLE_MS: u32 = 4_000;
pub const LOGIN_REDIRECT_DELAY_MS: u32 = 1_000;

pub const DEFAULT_ONLINE_REFRESH_SECS: u32 = 30;
pub const MIN_ONLINE_REFRESH_SECS: u32 = 10;

pub const MIN_CREDENTIAL_LEN: usize = 3;

pub const STORAGE_KEY_SETTINGS: &str = "weblurk_settings";

/// Every interval and delay the session controller schedules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorTimings {
    pub status_poll: Duration,
    pub schedule_reload: Duration,
    pub liveness_refresh: Duration,
    pub hour_check: Duration,
    pub reopen_delay: Duration,
    pub mode_switch_delay: Duration,
}

impl Default for MonitorTimings {
    fn default() -> Self {
        Self {
            status_poll: Duration::from_secs(30),
            schedule_reload: Duration::from_secs(60 * 60),
            liveness_refresh: Duration::from_secs(13 * 60),
            hour_check: Duration::from_secs(60),
            reopen_delay: Duration::from_secs(5),
            mode_switch_delay: Duration::from_millis(500),
        }
    }
}

/// Join an API path onto the configured base.
pub fn api_url(path: &str) -> String {
    format!("{API_BASE}{path}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_timings_match_the_published_intervals() {
        let timings = MonitorTimings::default();
        assert_eq!(timings.status_poll.as_secs(), 30);
        assert_eq!(timings.schedule_reload.as_secs(), 3600);
        assert_eq!(timings.liveness_refresh.as_secs(), 780);
        assert_eq!(timings.hour_check.as_secs(), 60);
        assert_eq!(timings.reopen_delay.as_secs(), 5);
        assert_eq!(timings.mode_switch_delay.as_millis(), 500);
    }

    #[test]
    fn api_url_prefixes_base() {
        assert_eq!(api_url("/status-lurk"), "/api/status-lurk");
    }
}
