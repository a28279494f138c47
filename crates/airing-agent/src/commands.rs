use std::sync::Arc;

use airing_core::{
    MediaDetails, MediaId, MediaSummary, NewTrackedItem, Settings, SettingsPatch, TrackedItem,
    WatchResult,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::engine::{RefreshOutcome, RefreshTrigger, WatchEngine};

/// Result envelope returned for every inbound command.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommandResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> CommandResponse<T> {
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn failure(error: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(error.into()),
        }
    }
}

impl<T> From<WatchResult<T>> for CommandResponse<T> {
    fn from(result: WatchResult<T>) -> Self {
        match result {
            Ok(data) => Self::success(data),
            Err(e) => Self::failure(e.to_string()),
        }
    }
}

/// Message-style command, tagged by `type`.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Command {
    SearchAnime { query: String },
    GetAnimeDetails { id: MediaId },
    AddToWatchlist { anime: NewTrackedItem },
    RemoveFromWatchlist { id: MediaId },
    GetWatchlist,
    UpdateSettings { settings: SettingsPatch },
    GetSettings,
    ForceUpdate,
    NotificationClicked { id: String },
}

/// Inbound command surface. Errors propagate to the caller.
pub struct CommandHandler {
    engine: Arc<WatchEngine>,
}

impl CommandHandler {
    pub fn new(engine: Arc<WatchEngine>) -> Self {
        Self { engine }
    }

    pub async fn search(&self, query: &str) -> WatchResult<Vec<MediaSummary>> {
        self.engine.client().search(query).await
    }

    pub async fn get_details(&self, id: MediaId) -> WatchResult<MediaDetails> {
        self.engine.client().get_details(id).await
    }

    /// Returns false when the id was already tracked.
    pub async fn add_to_watchlist(&self, item: NewTrackedItem) -> WatchResult<bool> {
        self.engine.watchlist().add(item).await
    }

    pub async fn remove_from_watchlist(&self, id: MediaId) -> WatchResult<bool> {
        self.engine.watchlist().remove(id).await
    }

    pub async fn get_watchlist(&self) -> WatchResult<Vec<TrackedItem>> {
        self.engine.watchlist().list().await
    }

    pub async fn update_settings(&self, patch: &SettingsPatch) -> WatchResult<Settings> {
        self.engine.settings().update(patch).await
    }

    pub async fn get_settings(&self) -> WatchResult<Settings> {
        self.engine.settings().get().await
    }

    pub async fn force_refresh(&self) -> WatchResult<RefreshOutcome> {
        self.engine.refresh_watchlist(RefreshTrigger::Forced).await
    }

    pub async fn notification_clicked(&self, id: &str) -> WatchResult<()> {
        self.engine.scheduler().handle_click(id).await
    }

    pub async fn dispatch(&self, command: Command) -> CommandResponse<Value> {
        match command {
            Command::SearchAnime { query } => envelope(self.search(&query).await),
            Command::GetAnimeDetails { id } => envelope(self.get_details(id).await),
            Command::AddToWatchlist { anime } => envelope(self.add_to_watchlist(anime).await),
            Command::RemoveFromWatchlist { id } => envelope(self.remove_from_watchlist(id).await),
            Command::GetWatchlist => envelope(self.get_watchlist().await),
            Command::UpdateSettings { settings } => {
                envelope(self.update_settings(&settings).await)
            }
            Command::GetSettings => envelope(self.get_settings().await),
            Command::ForceUpdate => envelope(self.force_refresh().await),
            Command::NotificationClicked { id } => envelope(self.notification_clicked(&id).await),
        }
    }

    /// Decode and run a raw message. Unknown or malformed messages fail in the envelope.
    pub async fn dispatch_value(&self, message: Value) -> CommandResponse<Value> {
        let kind = message
            .get("type")
            .and_then(|t| t.as_str())
            .unwrap_or("<missing>")
            .to_string();

        match serde_json::from_value::<Command>(message) {
            Ok(command) => {
                tracing::debug!(command = %kind, "Command received");
                self.dispatch(command).await
            }
            Err(e) => {
                tracing::warn!(command = %kind, "Rejected command: {}", e);
                CommandResponse::failure(format!("Unknown or malformed message {kind}: {e}"))
            }
        }
    }
}

fn envelope<T: Serialize>(result: WatchResult<T>) -> CommandResponse<Value> {
    if let Err(e) = &result {
        tracing::warn!("Command failed: {}", e);
    }
    let result = result.and_then(|data| Ok(serde_json::to_value(data)?));
    let mut response = CommandResponse::from(result);
    // Unit results carry no payload
    response.data = response.data.filter(|value| !value.is_null());
    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::Harness;
    use serde_json::json;

    async fn handler() -> (Harness, CommandHandler) {
        let h = Harness::new([21, 22]).await;
        let handler = CommandHandler::new(h.engine.clone());
        (h, handler)
    }

    #[tokio::test(start_paused = true)]
    async fn test_watchlist_commands_roundtrip() {
        let (_h, handler) = handler().await;

        let added = handler
            .dispatch_value(json!({
                "type": "ADD_TO_WATCHLIST",
                "anime": { "id": 21, "title": { "romaji": "Show 21" }, "status": "RELEASING" }
            }))
            .await;
        assert_eq!(added, CommandResponse::success(json!(true)));

        let again = handler
            .dispatch_value(json!({
                "type": "ADD_TO_WATCHLIST",
                "anime": { "id": 21, "status": "RELEASING" }
            }))
            .await;
        assert_eq!(again.data, Some(json!(false)));

        let list = handler.dispatch_value(json!({ "type": "GET_WATCHLIST" })).await;
        let items = list.data.unwrap();
        assert_eq!(items.as_array().unwrap().len(), 1);
        assert_eq!(items[0]["notificationsEnabled"], json!(true));

        let removed = handler
            .dispatch_value(json!({ "type": "REMOVE_FROM_WATCHLIST", "id": 21 }))
            .await;
        assert_eq!(removed.data, Some(json!(true)));
    }

    #[tokio::test(start_paused = true)]
    async fn test_not_found_is_reported_in_envelope() {
        let (_h, handler) = handler().await;
        let response = handler
            .dispatch(Command::GetAnimeDetails { id: 404 })
            .await;

        assert!(!response.success);
        assert_eq!(response.error.as_deref(), Some("Media 404 not found upstream"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_unknown_command_fails_in_envelope() {
        let (_h, handler) = handler().await;
        let response = handler.dispatch_value(json!({ "type": "SELF_DESTRUCT" })).await;

        assert!(!response.success);
        assert!(response.error.unwrap().contains("SELF_DESTRUCT"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_settings_commands() {
        let (_h, handler) = handler().await;
        let response = handler
            .dispatch_value(json!({
                "type": "UPDATE_SETTINGS",
                "settings": { "notifications": { "beforeAiringSeconds": 600 } }
            }))
            .await;
        assert!(response.success);

        let settings = handler.get_settings().await.unwrap();
        assert_eq!(settings.notifications.before_airing_seconds, 600);
        assert!(settings.notifications.on_release);
    }

    #[tokio::test(start_paused = true)]
    async fn test_force_update_and_click() {
        let (h, handler) = handler().await;
        handler
            .add_to_watchlist(crate::test_support::new_item(22, 1, 0))
            .await
            .unwrap();

        let refreshed = handler.dispatch(Command::ForceUpdate).await;
        assert_eq!(refreshed.data.unwrap()["outcome"], json!("completed"));

        let clicked = handler
            .dispatch(Command::NotificationClicked { id: "release_22_8".into() })
            .await;
        assert_eq!(clicked, CommandResponse { success: true, data: None, error: None });
        assert_eq!(h.display.cleared(), vec!["release_22_8".to_string()]);
    }

    #[test]
    fn test_envelope_serialization() {
        let ok = serde_json::to_value(CommandResponse::success(json!([1]))).unwrap();
        assert_eq!(ok, json!({ "success": true, "data": [1] }));

        let failed = serde_json::to_value(CommandResponse::<Value>::failure("boom")).unwrap();
        assert_eq!(failed, json!({ "success": false, "error": "boom" }));
    }

    #[test]
    fn test_result_converts_to_envelope() {
        let ok: CommandResponse<u32> = Ok(3).into();
        assert_eq!(ok, CommandResponse::success(3));

        let failed: CommandResponse<u32> = Err(airing_core::WatchError::NotFound(9)).into();
        assert_eq!(failed, CommandResponse::failure("Media 9 not found upstream"));
    }
}
