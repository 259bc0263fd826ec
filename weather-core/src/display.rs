//! Small presentation helpers shared by the prompt builder and the CLI.

use chrono::{Datelike, Days, NaiveDate};

const DEFAULT_ICON: &str = "🌤️";

// Checked in order; the first keyword contained in the condition wins.
const ICONS: &[(&str, &str)] = &[
    ("晴", "☀️"),
    ("多云", "⛅"),
    ("阴", "☁️"),
    ("小雨", "🌦️"),
    ("中雨", "🌧️"),
    ("大雨", "⛈️"),
    ("暴雨", "🌩️"),
    ("雷阵雨", "⛈️"),
    ("小雪", "🌨️"),
    ("中雪", "❄️"),
    ("大雪", "🌨️"),
    ("雾", "🌫️"),
    ("霾", "😷"),
    ("沙尘暴", "🌪️"),
];

/// Map a provider condition string to an emoji.
pub fn weather_icon(condition: &str) -> &'static str {
    ICONS
        .iter()
        .find(|(keyword, _)| condition.contains(keyword))
        .map_or(DEFAULT_ICON, |(_, icon)| *icon)
}

pub fn format_temperature(temp: f64) -> String {
    // Halves round toward +inf (-2.5 -> -2); `+ 0.0` turns -0 into 0.
    format!("{}°C", (temp + 0.5).floor() + 0.0)
}

/// `今天` / `明天` relative to `today`, otherwise `M/D`.
/// Strings that are not `YYYY-MM-DD` dates are returned unchanged.
pub fn format_date(date: &str, today: NaiveDate) -> String {
    let Ok(parsed) = NaiveDate::parse_from_str(date, "%Y-%m-%d") else {
        return date.to_string();
    };

    if parsed == today {
        "今天".to_string()
    } else if today.checked_add_days(Days::new(1)) == Some(parsed) {
        "明天".to_string()
    } else {
        format!("{}/{}", parsed.month(), parsed.day())
    }
}

/// The provider reports weekdays as `"1"` (Monday) through `"7"` (Sunday).
pub fn weekday_label(week: &str) -> String {
    let label = match week.trim() {
        "1" => "周一",
        "2" => "周二",
        "3" => "周三",
        "4" => "周四",
        "5" => "周五",
        "6" => "周六",
        "7" => "周日",
        other => return other.to_string(),
    };
    label.to_string()
}
