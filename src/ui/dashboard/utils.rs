//! Dashboard utility functions
//!
//! Contains helper functions used across dashboard components

use crate::activity::Source;
use ratatui::prelude::Color;

/// Get a ratatui color for an activity source
pub fn get_source_color(source: &Source) -> Color {
    match source {
        Source::Session => Color::LightBlue,
        Source::Dashboard => Color::Cyan,
        Source::Events => Color::Magenta,
        Source::Teams => Color::Yellow,
        Source::Users => Color::Green,
        Source::Export => Color::LightCyan,
    }
}

/// Format compact timestamp with date and time from full timestamp
pub fn format_compact_timestamp(timestamp: &str) -> String {
    // Extract from "YYYY-MM-DD HH:MM:SS" format
    let mut parts = timestamp.split(' ');
    if let (Some(date_part), Some(time_part)) = (parts.next(), parts.next()) {
        if let (Some(month_day), Some(hour_min)) = (date_part.get(5..10), time_part.get(0..5)) {
            return format!("{} {}", month_day, hour_min);
        }
    }
    timestamp.to_string()
}

/// Rupee amount with thousands separators, e.g. `₹12,500`.
pub fn format_rupees(amount: u64) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("₹{}", grouped)
}

/// Uptime-style duration text.
pub fn format_elapsed(secs: u64) -> String {
    if secs >= 3600 {
        format!("{}h {}m", secs / 3600, (secs % 3600) / 60)
    } else if secs >= 60 {
        format!("{}m {}s", secs / 60, secs % 60)
    } else {
        format!("{}s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn compact_timestamp_keeps_month_day_and_minutes() {
        assert_eq!(format_compact_timestamp("2025-02-14 18:30:59"), "02-14 18:30");
        assert_eq!(format_compact_timestamp("garbled"), "garbled");
    }

    #[test]
    fn rupees_are_grouped_by_thousands() {
        assert_eq!(format_rupees(0), "₹0");
        assert_eq!(format_rupees(950), "₹950");
        assert_eq!(format_rupees(12500), "₹12,500");
        assert_eq!(format_rupees(1234567), "₹1,234,567");
    }

    #[test]
    fn elapsed_picks_largest_unit() {
        assert_eq!(format_elapsed(42), "42s");
        assert_eq!(format_elapsed(125), "2m 5s");
        assert_eq!(format_elapsed(7260), "2h 1m");
    }
}
