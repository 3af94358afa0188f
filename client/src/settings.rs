use gloo_storage::Storage;
use serde::{Deserialize, Serialize};

use weblurk_shared::config::{
    DEFAULT_ONLINE_REFRESH_SECS, MIN_ONLINE_REFRESH_SECS, STORAGE_KEY_SETTINGS,
};

/// Per-browser preferences kept in local storage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub online_refresh_secs: u32,
    pub verbose_logging: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            online_refresh_secs: DEFAULT_ONLINE_REFRESH_SECS,
            verbose_logging: false,
        }
    }
}

impl Settings {
    pub fn load() -> Self {
        let mut saved: Settings =
            gloo_storage::LocalStorage::get(STORAGE_KEY_SETTINGS).unwrap_or_default();
        saved.online_refresh_secs = saved.online_refresh_secs.max(MIN_ONLINE_REFRESH_SECS);
        saved
    }

    pub fn save(&self) {
        if let Err(e) = gloo_storage::LocalStorage::set(STORAGE_KEY_SETTINGS, self) {
            tracing::warn!(error = %e, "could not persist settings");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings: Settings = serde_json::from_str(r#"{"verbose_logging": true}"#).unwrap();
        assert!(settings.verbose_logging);
        assert_eq!(settings.online_refresh_secs, DEFAULT_ONLINE_REFRESH_SECS);
    }
}
