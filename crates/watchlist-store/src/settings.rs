use std::sync::Arc;

use airing_core::{KeyValueStore, Settings, SettingsPatch, WatchError, WatchResult};
use serde_json::Value;
use tokio::sync::Mutex;

use crate::SETTINGS_KEY;

fn to_value(settings: &Settings) -> WatchResult<Value> {
    serde_json::to_value(settings).map_err(|e| WatchError::Storage(e.to_string()))
}

pub struct SettingsStore {
    kv: Arc<dyn KeyValueStore>,
    write_lock: Mutex<()>,
}

impl SettingsStore {
    pub fn new(kv: Arc<dyn KeyValueStore>) -> Self {
        Self {
            kv,
            write_lock: Mutex::new(()),
        }
    }

    /// Stored settings, or defaults when nothing has been written yet.
    pub async fn get(&self) -> WatchResult<Settings> {
        match self.kv.get(SETTINGS_KEY).await? {
            Some(value) => serde_json::from_value(value)
                .map_err(|e| WatchError::Storage(format!("corrupt settings: {e}"))),
            None => Ok(Settings::default()),
        }
    }

    /// First-run seeding. Returns true if defaults were written.
    pub async fn seed_defaults(&self) -> WatchResult<bool> {
        let _guard = self.write_lock.lock().await;
        if self.kv.get(SETTINGS_KEY).await?.is_some() {
            return Ok(false);
        }
        self.kv.set(SETTINGS_KEY, to_value(&Settings::default())?).await?;
        tracing::info!("Seeded default settings");
        Ok(true)
    }

    pub async fn update(&self, patch: &SettingsPatch) -> WatchResult<Settings> {
        let _guard = self.write_lock.lock().await;
        let mut settings = self.get().await?;
        settings.apply(patch);
        settings.validate()?;
        self.kv.set(SETTINGS_KEY, to_value(&settings)?).await?;
        Ok(settings)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryKvStore;
    use airing_core::{NotificationSettingsPatch, UpdateSettingsPatch};
    use serde_json::json;

    #[tokio::test]
    async fn test_get_defaults_when_absent() {
        let store = SettingsStore::new(Arc::new(MemoryKvStore::new()));
        assert_eq!(store.get().await.unwrap(), Settings::default());
    }

    #[tokio::test]
    async fn test_seed_only_when_absent() {
        let kv = Arc::new(MemoryKvStore::new());
        kv.set(SETTINGS_KEY, json!({ "updates": { "frequency": 60 } }))
            .await
            .unwrap();
        let store = SettingsStore::new(kv);

        assert!(!store.seed_defaults().await.unwrap());
        let settings = store.get().await.unwrap();
        assert_eq!(settings.updates.frequency, 60);
        assert!(settings.updates.auto_update);
    }

    #[tokio::test]
    async fn test_seed_writes_defaults() {
        let kv = Arc::new(MemoryKvStore::new());
        let store = SettingsStore::new(kv.clone());
        assert!(store.seed_defaults().await.unwrap());
        assert!(kv.get(SETTINGS_KEY).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_update_merges_field_by_field() {
        let store = SettingsStore::new(Arc::new(MemoryKvStore::new()));
        let patch = SettingsPatch {
            notifications: Some(NotificationSettingsPatch {
                before_airing_seconds: Some(900),
                ..Default::default()
            }),
            updates: Some(UpdateSettingsPatch {
                auto_update: Some(false),
                ..Default::default()
            }),
            ..Default::default()
        };

        let updated = store.update(&patch).await.unwrap();
        assert_eq!(updated.notifications.before_airing_seconds, 900);
        assert!(updated.notifications.enabled);
        assert!(!updated.updates.auto_update);
        assert_eq!(updated.updates.frequency, 30);
        assert_eq!(store.get().await.unwrap(), updated);
    }

    #[tokio::test]
    async fn test_invalid_update_is_rejected_and_not_stored() {
        let store = SettingsStore::new(Arc::new(MemoryKvStore::new()));
        store.seed_defaults().await.unwrap();

        let patch = SettingsPatch {
            notifications: Some(NotificationSettingsPatch {
                before_airing_seconds: Some(-300),
                ..Default::default()
            }),
            ..Default::default()
        };
        let err = store.update(&patch).await.unwrap_err();
        assert!(matches!(err, WatchError::InvalidSettings(_)));

        let zero_frequency = SettingsPatch {
            updates: Some(UpdateSettingsPatch {
                frequency: Some(0),
                ..Default::default()
            }),
            ..Default::default()
        };
        assert!(store.update(&zero_frequency).await.is_err());

        assert_eq!(store.get().await.unwrap(), Settings::default());
    }
}
