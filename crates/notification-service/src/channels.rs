use airing_core::{NotificationContent, NotificationDisplay, WatchError, WatchResult};
use async_trait::async_trait;

/// Writes notifications to the log. The handle is the notification id.
pub struct LogDisplay;

#[async_trait]
impl NotificationDisplay for LogDisplay {
    async fn create(&self, id: &str, content: &NotificationContent) -> WatchResult<String> {
        tracing::info!(
            notification_id = id,
            icon = %content.icon,
            "{}: {}",
            content.title,
            content.body
        );
        Ok(id.to_string())
    }

    async fn clear(&self, id: &str) -> WatchResult<()> {
        tracing::debug!(notification_id = id, "Notification cleared");
        Ok(())
    }

    fn name(&self) -> &str {
        "log"
    }
}

/// Discord webhook display. Webhook messages cannot be withdrawn, so `clear` is a no-op.
pub struct DiscordWebhookDisplay {
    webhook_url: String,
    client: reqwest::Client,
}

impl DiscordWebhookDisplay {
    pub fn new(webhook_url: impl Into<String>) -> Self {
        Self {
            webhook_url: webhook_url.into(),
            client: reqwest::Client::new(),
        }
    }

    fn payload(id: &str, content: &NotificationContent) -> serde_json::Value {
        let color = if id.starts_with("release_") {
            0x00ff00
        } else {
            0x0099ff
        };
        let mut embed = serde_json::json!({
            "title": content.title,
            "description": content.body,
            "color": color,
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "footer": { "text": id },
        });
        if content.icon.starts_with("http") {
            embed["thumbnail"] = serde_json::json!({ "url": content.icon });
        }
        serde_json::json!({ "embeds": [embed] })
    }
}

#[async_trait]
impl NotificationDisplay for DiscordWebhookDisplay {
    async fn create(&self, id: &str, content: &NotificationContent) -> WatchResult<String> {
        let response = self
            .client
            .post(&self.webhook_url)
            .json(&Self::payload(id, content))
            .send()
            .await
            .map_err(|e| WatchError::Display(format!("Discord webhook error: {e}")))?;

        if !response.status().is_success() {
            return Err(WatchError::Display(format!(
                "Discord webhook returned {}",
                response.status()
            )));
        }
        Ok(id.to_string())
    }

    async fn clear(&self, _id: &str) -> WatchResult<()> {
        Ok(())
    }

    fn name(&self) -> &str {
        "discord-webhook"
    }
}

/// Fans each notification out to every configured channel.
///
/// `create` succeeds if at least one channel accepted the notification.
pub struct DisplayChannels {
    channels: Vec<Box<dyn NotificationDisplay>>,
}

impl DisplayChannels {
    pub fn new(discord_webhook_url: Option<&str>) -> Self {
        let mut channels: Vec<Box<dyn NotificationDisplay>> = vec![Box::new(LogDisplay)];

        if let Some(url) = discord_webhook_url {
            channels.push(Box::new(DiscordWebhookDisplay::new(url)));
            tracing::info!("Discord webhook notifications enabled");
        }

        Self { channels }
    }

    pub fn from_channels(channels: Vec<Box<dyn NotificationDisplay>>) -> Self {
        Self { channels }
    }

    pub fn channel_names(&self) -> Vec<&str> {
        self.channels.iter().map(|c| c.name()).collect()
    }
}

#[async_trait]
impl NotificationDisplay for DisplayChannels {
    async fn create(&self, id: &str, content: &NotificationContent) -> WatchResult<String> {
        let mut handle = None;
        let mut last_err = None;

        for channel in &self.channels {
            match channel.create(id, content).await {
                Ok(h) => {
                    tracing::debug!("Sent notification via {}", channel.name());
                    handle.get_or_insert(h);
                }
                Err(e) => {
                    tracing::warn!("Failed to send notification via {}: {}", channel.name(), e);
                    last_err = Some(e);
                }
            }
        }

        match (handle, last_err) {
            (Some(h), _) => Ok(h),
            (None, Some(e)) => Err(e),
            (None, None) => Err(WatchError::Display("no notification channels configured".into())),
        }
    }

    async fn clear(&self, id: &str) -> WatchResult<()> {
        for channel in &self.channels {
            if let Err(e) = channel.clear(id).await {
                tracing::warn!("Failed to clear notification via {}: {}", channel.name(), e);
            }
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "fanout"
    }
}
