//! Deduplicating airing notifications.

mod channels;
mod ledger;
mod scheduler;
mod templates;

pub use channels::{DiscordWebhookDisplay, DisplayChannels, LogDisplay};
pub use ledger::{
    LedgerKey, NotificationKind, NotificationLedger, LEDGER_RETENTION_MS, QUIET_PERIOD_MS,
};
pub use scheduler::{EvaluationReport, NotificationScheduler};
pub use templates::{format_time_until, release_content, upcoming_content, DEFAULT_FALLBACK_ICON};
