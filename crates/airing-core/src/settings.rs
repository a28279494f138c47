//! User settings and field-by-field patching.

use serde::{Deserialize, Serialize};

use crate::{WatchError, WatchResult};

pub const DEFAULT_BEFORE_AIRING_SECS: i64 = 3600;
pub const DEFAULT_UPDATE_FREQUENCY_MINUTES: u32 = 30;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub enabled: bool,
    pub before_airing_seconds: i64,
    pub on_release: bool,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            before_airing_seconds: DEFAULT_BEFORE_AIRING_SECS,
            on_release: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DisplaySettings {
    pub theme: String,
    pub sort_by: String,
    pub group_by: String,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            sort_by: "nextEpisode".to_string(),
            group_by: "status".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchSettings {
    pub filter_latest_season: bool,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            filter_latest_season: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UpdateSettings {
    /// Refresh period in minutes
    pub frequency: u32,
    pub auto_update: bool,
}

impl Default for UpdateSettings {
    fn default() -> Self {
        Self {
            frequency: DEFAULT_UPDATE_FREQUENCY_MINUTES,
            auto_update: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Settings {
    pub notifications: NotificationSettings,
    pub display: DisplaySettings,
    pub search: SearchSettings,
    pub updates: UpdateSettings,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct NotificationSettingsPatch {
    pub enabled: Option<bool>,
    pub before_airing_seconds: Option<i64>,
    pub on_release: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct DisplaySettingsPatch {
    pub theme: Option<String>,
    pub sort_by: Option<String>,
    pub group_by: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SearchSettingsPatch {
    pub filter_latest_season: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct UpdateSettingsPatch {
    pub frequency: Option<u32>,
    pub auto_update: Option<bool>,
}

/// Partial settings update. Absent fields keep their current value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct SettingsPatch {
    pub notifications: Option<NotificationSettingsPatch>,
    pub display: Option<DisplaySettingsPatch>,
    pub search: Option<SearchSettingsPatch>,
    pub updates: Option<UpdateSettingsPatch>,
}

fn overlay<T: Clone>(target: &mut T, value: &Option<T>) {
    if let Some(v) = value {
        *target = v.clone();
    }
}

impl Settings {
    pub fn apply(&mut self, patch: &SettingsPatch) {
        if let Some(n) = &patch.notifications {
            overlay(&mut self.notifications.enabled, &n.enabled);
            overlay(&mut self.notifications.before_airing_seconds, &n.before_airing_seconds);
            overlay(&mut self.notifications.on_release, &n.on_release);
        }
        if let Some(d) = &patch.display {
            overlay(&mut self.display.theme, &d.theme);
            overlay(&mut self.display.sort_by, &d.sort_by);
            overlay(&mut self.display.group_by, &d.group_by);
        }
        if let Some(s) = &patch.search {
            overlay(&mut self.search.filter_latest_season, &s.filter_latest_season);
        }
        if let Some(u) = &patch.updates {
            overlay(&mut self.updates.frequency, &u.frequency);
            overlay(&mut self.updates.auto_update, &u.auto_update);
        }
    }

    /// Reject values the scheduler cannot act on.
    pub fn validate(&self) -> WatchResult<()> {
        if self.notifications.before_airing_seconds < 0 {
            return Err(WatchError::InvalidSettings(format!(
                "beforeAiringSeconds must not be negative (got {})",
                self.notifications.before_airing_seconds
            )));
        }
        if self.updates.frequency == 0 {
            return Err(WatchError::InvalidSettings(
                "update frequency must be at least 1 minute".to_string(),
            ));
        }
        Ok(())
    }
}
