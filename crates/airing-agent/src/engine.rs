use std::collections::HashMap;
use std::sync::Arc;

use airing_core::WatchResult;
use anilist_client::CatalogClient;
use notification_service::{EvaluationReport, NotificationScheduler};
use serde::Serialize;
use watchlist_store::{SettingsStore, WatchlistStore};

use crate::timers::TimerName;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshTrigger {
    /// Timer firing. Honors `settings.updates.autoUpdate`.
    Scheduled,
    /// User-requested. Always runs.
    Forced,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "camelCase")]
pub enum RefreshOutcome {
    AutoUpdateDisabled,
    EmptyWatchlist,
    Completed {
        requested: usize,
        returned: usize,
        updated: usize,
    },
}

/// Ties the catalog client, stores and scheduler into the two periodic cycles.
pub struct WatchEngine {
    client: Arc<CatalogClient>,
    watchlist: Arc<WatchlistStore>,
    settings: Arc<SettingsStore>,
    scheduler: Arc<NotificationScheduler>,
}

impl WatchEngine {
    pub fn new(
        client: Arc<CatalogClient>,
        watchlist: Arc<WatchlistStore>,
        settings: Arc<SettingsStore>,
        scheduler: Arc<NotificationScheduler>,
    ) -> Self {
        Self {
            client,
            watchlist,
            settings,
            scheduler,
        }
    }

    pub fn client(&self) -> &CatalogClient {
        &self.client
    }

    pub fn watchlist(&self) -> &WatchlistStore {
        &self.watchlist
    }

    pub fn settings(&self) -> &SettingsStore {
        &self.settings
    }

    pub fn scheduler(&self) -> &NotificationScheduler {
        &self.scheduler
    }

    /// Bulk-refresh every tracked id and merge the results.
    ///
    /// Ids missing from the response are left untouched.
    pub async fn refresh_watchlist(&self, trigger: RefreshTrigger) -> WatchResult<RefreshOutcome> {
        if trigger == RefreshTrigger::Scheduled && !self.settings.get().await?.updates.auto_update {
            tracing::debug!("Auto update disabled, skipping scheduled refresh");
            return Ok(RefreshOutcome::AutoUpdateDisabled);
        }

        let ids = self.watchlist.ids().await?;
        if ids.is_empty() {
            tracing::debug!("Watchlist is empty, skipping refresh");
            return Ok(RefreshOutcome::EmptyWatchlist);
        }

        let records = self.client.bulk_refresh(&ids).await?;
        let returned = records.len();
        let by_id: HashMap<_, _> = records.into_iter().map(|r| (r.id, r)).collect();
        let updated = self.watchlist.merge_refresh(&by_id).await?;
        self.watchlist.record_update().await?;

        tracing::info!(
            requested = ids.len(),
            returned,
            updated,
            ?trigger,
            "Watchlist refreshed"
        );
        Ok(RefreshOutcome::Completed {
            requested: ids.len(),
            returned,
            updated,
        })
    }

    pub async fn check_notifications(&self) -> WatchResult<EvaluationReport> {
        let settings = self.settings.get().await?;
        let items = self.watchlist.list().await?;
        let report = self.scheduler.evaluate(&items, &settings.notifications).await;

        if !report.sent.is_empty() || report.failed > 0 {
            tracing::info!(
                sent = report.sent.len(),
                suppressed = report.suppressed,
                failed = report.failed,
                "Notification check complete"
            );
        }
        Ok(report)
    }

    /// Run the cycle behind a timer. Errors are logged, never propagated.
    pub async fn run_cycle(&self, timer: TimerName) {
        tracing::debug!(timer = %timer, "Timer fired");
        let result = match timer {
            TimerName::RefreshWatchlist => self
                .refresh_watchlist(RefreshTrigger::Scheduled)
                .await
                .map(|_| ()),
            TimerName::CheckNotifications => self.check_notifications().await.map(|_| ()),
        };

        if let Err(e) = result {
            tracing::error!(timer = %timer, "Error in {} cycle: {}", timer, e);
        }
    }
}
