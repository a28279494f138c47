//! Periodic driver and control surface for the airing watcher.

pub mod commands;
pub mod config;
pub mod engine;
pub mod routes;
pub mod timers;

#[cfg(test)]
mod test_support;

pub use commands::{Command, CommandHandler, CommandResponse};
pub use config::AgentConfig;
pub use engine::{RefreshOutcome, RefreshTrigger, WatchEngine};
pub use routes::{router, AppState};
pub use timers::{TimerName, Timers};
