use airing_core::{NotificationContent, TrackedItem};

/// Icon used when an item carries no cover image.
pub const DEFAULT_FALLBACK_ICON: &str = "assets/icons/icon-128.png";

/// Human-readable countdown, e.g. "45 minutes", "2h 15m", "3d 4h".
pub fn format_time_until(seconds: i64) -> String {
    if seconds < 60 {
        return "less than a minute".to_string();
    }

    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes} minutes");
    }

    let hours = minutes / 60;
    let remaining_minutes = minutes % 60;
    if hours < 24 {
        return if remaining_minutes > 0 {
            format!("{hours}h {remaining_minutes}m")
        } else {
            format!("{hours} hours")
        };
    }

    let days = hours / 24;
    let remaining_hours = hours % 24;
    if remaining_hours > 0 {
        format!("{days}d {remaining_hours}h")
    } else {
        format!("{days} days")
    }
}

fn icon_for(item: &TrackedItem, fallback_icon: &str) -> String {
    item.icon().unwrap_or(fallback_icon).to_string()
}

pub fn upcoming_content(
    item: &TrackedItem,
    episode: u32,
    seconds_until: i64,
    fallback_icon: &str,
) -> NotificationContent {
    NotificationContent {
        title: "Episode airing soon".to_string(),
        body: format!(
            "{} EP {} airs in {}",
            item.display_title(),
            episode,
            format_time_until(seconds_until)
        ),
        icon: icon_for(item, fallback_icon),
    }
}

pub fn release_content(item: &TrackedItem, episode: u32, fallback_icon: &str) -> NotificationContent {
    NotificationContent {
        title: "New episode available!".to_string(),
        body: format!("{} EP {} is now available", item.display_title(), episode),
        icon: icon_for(item, fallback_icon),
    }
}
