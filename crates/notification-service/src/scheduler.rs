use std::sync::Arc;

use airing_core::{
    Clock, NotificationContent, NotificationDisplay, NotificationSettings, TrackedItem, WatchResult,
};

use crate::ledger::{LedgerKey, NotificationKind, NotificationLedger};
use crate::templates::{release_content, upcoming_content, DEFAULT_FALLBACK_ICON};

/// Outcome of one evaluation pass.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EvaluationReport {
    /// Items with notifications enabled and a scheduled episode
    pub evaluated: usize,
    /// Notification ids shown this pass
    pub sent: Vec<String>,
    pub suppressed: usize,
    pub failed: usize,
}

pub struct NotificationScheduler {
    display: Arc<dyn NotificationDisplay>,
    ledger: NotificationLedger,
    clock: Arc<dyn Clock>,
    fallback_icon: String,
}

impl NotificationScheduler {
    pub fn new(display: Arc<dyn NotificationDisplay>, clock: Arc<dyn Clock>) -> Self {
        Self {
            display,
            ledger: NotificationLedger::default(),
            clock,
            fallback_icon: DEFAULT_FALLBACK_ICON.to_string(),
        }
    }

    pub fn with_fallback_icon(mut self, icon: impl Into<String>) -> Self {
        self.fallback_icon = icon.into();
        self
    }

    /// Decide and emit notifications for a watchlist snapshot.
    ///
    /// Items are independent: a display failure is logged and counted, and
    /// evaluation moves on to the next item.
    pub async fn evaluate(
        &self,
        items: &[TrackedItem],
        settings: &NotificationSettings,
    ) -> EvaluationReport {
        let mut report = EvaluationReport::default();
        if !settings.enabled {
            tracing::debug!("Notifications disabled, skipping evaluation");
            return report;
        }

        let now_millis = self.clock.now_millis();
        let now_secs = now_millis.div_euclid(1000);

        for item in items.iter().filter(|item| item.notifications_enabled) {
            let Some(next) = item.next_airing_episode else {
                continue;
            };
            report.evaluated += 1;
            let time_until = next.seconds_until(now_secs);

            if time_until > 0 && time_until <= settings.before_airing_seconds {
                let key = LedgerKey::new(NotificationKind::Upcoming, item.id, next.episode);
                let content =
                    upcoming_content(item, next.episode, time_until, &self.fallback_icon);
                self.emit(key, &content, now_millis, &mut report).await;
            }

            if settings.on_release && time_until <= 0 {
                let key = LedgerKey::new(NotificationKind::Release, item.id, next.episode);
                let content = release_content(item, next.episode, &self.fallback_icon);
                self.emit(key, &content, now_millis, &mut report).await;
            }
        }

        report
    }

    async fn emit(
        &self,
        key: LedgerKey,
        content: &NotificationContent,
        now_millis: i64,
        report: &mut EvaluationReport,
    ) {
        if self.ledger.recently_sent(&key, now_millis) {
            report.suppressed += 1;
            return;
        }

        let id = key.notification_id();
        match self.display.create(&id, content).await {
            Ok(handle) => {
                self.ledger.mark_sent(key, now_millis);
                tracing::info!(
                    notification_id = %id,
                    handle = %handle,
                    media_id = key.media_id,
                    episode = key.episode,
                    "Notification sent"
                );
                report.sent.push(id);
            }
            Err(e) => {
                tracing::warn!(
                    notification_id = %id,
                    media_id = key.media_id,
                    "Failed to display notification: {}",
                    e
                );
                report.failed += 1;
            }
        }
    }

    /// Click bookkeeping: acknowledge and dismiss.
    pub async fn handle_click(&self, notification_id: &str) -> WatchResult<()> {
        match LedgerKey::parse(notification_id) {
            Some(key) => tracing::info!(
                notification_id,
                media_id = key.media_id,
                episode = key.episode,
                "Notification clicked"
            ),
            None => tracing::info!(notification_id, "Notification clicked"),
        }
        self.display.clear(notification_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use airing_core::{ManualClock, MediaId, MediaStatus, MediaTitle, NextAiring, WatchError};
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::Mutex;

    const NOW_MS: i64 = 1_700_000_000_000;
    const NOW_SECS: i64 = NOW_MS / 1000;

    /// Records shown notifications; can be told to fail for specific ids.
    #[derive(Default)]
    struct RecordingDisplay {
        shown: Mutex<Vec<(String, NotificationContent)>>,
        cleared: Mutex<Vec<String>>,
        failing: Mutex<HashSet<String>>,
    }

    impl RecordingDisplay {
        fn shown_ids(&self) -> Vec<String> {
            self.shown.lock().unwrap().iter().map(|(id, _)| id.clone()).collect()
        }
    }

    #[async_trait]
    impl NotificationDisplay for RecordingDisplay {
        async fn create(&self, id: &str, content: &NotificationContent) -> WatchResult<String> {
            if self.failing.lock().unwrap().contains(id) {
                return Err(WatchError::Display("display unavailable".into()));
            }
            self.shown.lock().unwrap().push((id.to_string(), content.clone()));
            Ok(format!("handle-{id}"))
        }

        async fn clear(&self, id: &str) -> WatchResult<()> {
            self.cleared.lock().unwrap().push(id.to_string());
            Ok(())
        }

        fn name(&self) -> &str {
            "recording"
        }
    }

    fn item(id: MediaId, episode: u32, airing_at: i64) -> TrackedItem {
        TrackedItem {
            id,
            title: MediaTitle::romaji(format!("Show {id}")),
            cover_image: None,
            status: MediaStatus::Releasing,
            episodes: None,
            next_airing_episode: Some(NextAiring { episode, airing_at }),
            added_at: 0,
            last_checked_at: 0,
            notifications_enabled: true,
        }
    }

    fn scheduler() -> (Arc<RecordingDisplay>, Arc<ManualClock>, NotificationScheduler) {
        let display = Arc::new(RecordingDisplay::default());
        let clock = Arc::new(ManualClock::new(NOW_MS));
        let scheduler = NotificationScheduler::new(display.clone(), clock.clone());
        (display, clock, scheduler)
    }

    #[tokio::test]
    async fn test_upcoming_fires_once_within_quiet_period() {
        let (display, clock, scheduler) = scheduler();
        let items = vec![item(21, 5, NOW_SECS + 1800)];
        let settings = NotificationSettings::default();

        let first = scheduler.evaluate(&items, &settings).await;
        assert_eq!(first.sent, vec!["upcoming_21_5".to_string()]);

        clock.advance_secs(120);
        let second = scheduler.evaluate(&items, &settings).await;
        assert!(second.sent.is_empty());
        assert_eq!(second.suppressed, 1);

        let shown = display.shown.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].1.body, "Show 21 EP 5 airs in 30 minutes");
        assert_eq!(shown[0].1.icon, DEFAULT_FALLBACK_ICON);
    }

    #[tokio::test]
    async fn test_at_most_once_per_rolling_window() {
        let (display, clock, scheduler) = scheduler();
        // Released well before now so every pass is eligible for a release notification
        let items = vec![item(3, 1, NOW_SECS - 10)];
        let settings = NotificationSettings::default();

        // Every 5 minutes for 2 hours
        for _ in 0..24 {
            scheduler.evaluate(&items, &settings).await;
            clock.advance_secs(300);
        }

        // One send per 30-minute quiet period: t=0, 30, 60, 90 min
        assert_eq!(display.shown_ids().len(), 4);
    }

    #[tokio::test]
    async fn test_outside_window_does_not_fire() {
        let (display, _clock, scheduler) = scheduler();
        let items = vec![item(1, 1, NOW_SECS + 7200)];
        let report = scheduler.evaluate(&items, &NotificationSettings::default()).await;

        assert_eq!(report.evaluated, 1);
        assert!(display.shown_ids().is_empty());
    }

    #[tokio::test]
    async fn test_release_respects_on_release_toggle() {
        let (display, _clock, scheduler) = scheduler();
        let items = vec![item(1, 4, NOW_SECS)];
        let settings = NotificationSettings {
            on_release: false,
            ..NotificationSettings::default()
        };

        scheduler.evaluate(&items, &settings).await;
        assert!(display.shown_ids().is_empty());

        scheduler.evaluate(&items, &NotificationSettings::default()).await;
        assert_eq!(display.shown_ids(), vec!["release_1_4".to_string()]);
    }

    #[tokio::test]
    async fn test_global_and_item_toggles() {
        let (display, _clock, scheduler) = scheduler();
        let mut muted = item(1, 1, NOW_SECS + 60);
        muted.notifications_enabled = false;
        let mut unscheduled = item(2, 1, 0);
        unscheduled.next_airing_episode = None;
        let items = vec![muted, unscheduled, item(3, 1, NOW_SECS + 60)];

        let disabled = NotificationSettings {
            enabled: false,
            ..NotificationSettings::default()
        };
        assert_eq!(scheduler.evaluate(&items, &disabled).await, EvaluationReport::default());

        let report = scheduler.evaluate(&items, &NotificationSettings::default()).await;
        assert_eq!(report.evaluated, 1);
        assert_eq!(display.shown_ids(), vec!["upcoming_3_1".to_string()]);
    }

    #[tokio::test]
    async fn test_new_episode_resets_eligibility() {
        let (display, clock, scheduler) = scheduler();
        let settings = NotificationSettings::default();

        scheduler.evaluate(&[item(1, 1, NOW_SECS + 600)], &settings).await;
        clock.advance_secs(60);
        scheduler.evaluate(&[item(1, 2, NOW_SECS + 1200)], &settings).await;

        assert_eq!(
            display.shown_ids(),
            vec!["upcoming_1_1".to_string(), "upcoming_1_2".to_string()]
        );
    }

    #[tokio::test]
    async fn test_display_failure_does_not_block_other_items() {
        let (display, _clock, scheduler) = scheduler();
        display.failing.lock().unwrap().insert("upcoming_1_1".to_string());
        let items = vec![item(1, 1, NOW_SECS + 60), item(2, 1, NOW_SECS + 60)];
        let settings = NotificationSettings::default();

        let report = scheduler.evaluate(&items, &settings).await;
        assert_eq!(report.failed, 1);
        assert_eq!(report.sent, vec!["upcoming_2_1".to_string()]);

        // Failed sends are not recorded, so the next pass retries
        display.failing.lock().unwrap().clear();
        let retry = scheduler.evaluate(&items, &settings).await;
        assert_eq!(retry.sent, vec!["upcoming_1_1".to_string()]);
    }

    #[tokio::test]
    async fn test_click_clears_notification() {
        let (display, _clock, scheduler) = scheduler();
        scheduler.handle_click("release_1_4").await.unwrap();
        scheduler.handle_click("not-a-key").await.unwrap();
        assert_eq!(
            *display.cleared.lock().unwrap(),
            vec!["release_1_4".to_string(), "not-a-key".to_string()]
        );
    }
}
