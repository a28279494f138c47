use std::fmt;

use airing_core::MediaId;
use dashmap::DashMap;

/// No repeat for the same key inside this window.
pub const QUIET_PERIOD_MS: i64 = 30 * 60 * 1000;
/// Entries older than this are dropped on the next insert.
pub const LEDGER_RETENTION_MS: i64 = 24 * 60 * 60 * 1000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    Upcoming,
    Release,
}

impl NotificationKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            NotificationKind::Upcoming => "upcoming",
            NotificationKind::Release => "release",
        }
    }
}

/// Dedup key: one notification per (kind, item, episode).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LedgerKey {
    pub kind: NotificationKind,
    pub media_id: MediaId,
    pub episode: u32,
}

impl LedgerKey {
    pub fn new(kind: NotificationKind, media_id: MediaId, episode: u32) -> Self {
        Self { kind, media_id, episode }
    }

    /// Notification id handed to the display, e.g. `upcoming_21_1071`.
    pub fn notification_id(&self) -> String {
        self.to_string()
    }

    pub fn parse(id: &str) -> Option<Self> {
        let mut parts = id.splitn(3, '_');
        let kind = match parts.next()? {
            "upcoming" => NotificationKind::Upcoming,
            "release" => NotificationKind::Release,
            _ => return None,
        };
        let media_id = parts.next()?.parse().ok()?;
        let episode = parts.next()?.parse().ok()?;
        Some(Self::new(kind, media_id, episode))
    }
}

impl fmt::Display for LedgerKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}_{}", self.kind.as_str(), self.media_id, self.episode)
    }
}

/// Last-sent timestamps per key, in epoch millis.
pub struct NotificationLedger {
    sent: DashMap<LedgerKey, i64>,
    quiet_period_ms: i64,
    retention_ms: i64,
}

impl Default for NotificationLedger {
    fn default() -> Self {
        Self::new(QUIET_PERIOD_MS, LEDGER_RETENTION_MS)
    }
}

impl NotificationLedger {
    pub fn new(quiet_period_ms: i64, retention_ms: i64) -> Self {
        Self {
            sent: DashMap::new(),
            quiet_period_ms,
            retention_ms,
        }
    }

    pub fn recently_sent(&self, key: &LedgerKey, now_millis: i64) -> bool {
        self.sent
            .get(key)
            .map(|last| now_millis - *last < self.quiet_period_ms)
            .unwrap_or(false)
    }

    pub fn mark_sent(&self, key: LedgerKey, now_millis: i64) {
        self.sent.insert(key, now_millis);
        let retention = self.retention_ms;
        self.sent.retain(|_, sent_at| now_millis - *sent_at <= retention);
    }

    pub fn len(&self) -> usize {
        self.sent.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.is_empty()
    }
}
