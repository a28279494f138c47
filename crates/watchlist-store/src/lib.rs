//! Durable watchlist and settings persistence over a pluggable key-value store.

mod kv;
mod settings;
mod watchlist;

pub use kv::{MemoryKvStore, SqliteKvStore};
pub use settings::SettingsStore;
pub use watchlist::WatchlistStore;

/// Storage key holding the ordered watchlist.
pub const WATCHLIST_KEY: &str = "watchlist";
/// Storage key holding the settings document.
pub const SETTINGS_KEY: &str = "settings";
/// Storage key holding the last successful refresh stamp (epoch ms).
pub const LAST_UPDATE_KEY: &str = "lastUpdate";
