//! Human-readable output.

use std::fmt::Write as _;

use chrono::NaiveDate;
use weather_advisor_core::{
    CityRef, WeatherReport,
    display::{format_date, format_temperature, weather_icon, weekday_label},
};

pub fn cities(list: &[CityRef]) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{:<8} {:<8} {}", "Name", "Adcode", "Citycode");
    for city in list {
        let _ = writeln!(out, "{:<8} {:<8} {}", city.name, city.adcode, city.citycode);
    }
    out
}

pub fn report(report: &WeatherReport, today: NaiveDate) -> String {
    let weather = &report.weather;
    let current = &weather.current;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "{} {}  {}  {}",
        weather_icon(&current.weather),
        current.city,
        current.weather,
        format_temperature(current.temperature),
    );
    let _ = writeln!(
        out,
        "湿度 {}%  {}风 {}级  更新于 {}{}",
        current.humidity,
        current.wind_direction,
        current.wind_power,
        current.report_time,
        if report.from_cache { " (缓存)" } else { "" },
    );

    if !weather.forecast.is_empty() {
        let _ = writeln!(out);
        for day in &weather.forecast {
            let _ = writeln!(
                out,
                "{:<6} {:<4} {} {}/{}  {} ~ {}",
                format_date(&day.date, today),
                weekday_label(&day.week),
                weather_icon(&day.day_weather),
                day.day_weather,
                day.night_weather,
                format_temperature(day.night_temp),
                format_temperature(day.day_temp),
            );
        }
    }

    if let Some(advice) = &weather.ai_analysis {
        let _ = writeln!(out);
        let _ = writeln!(out, "👔 穿衣建议：{}", advice.clothing_advice);
        let _ = writeln!(out, "🚗 出行建议：{}", advice.travel_advice);
        let _ = writeln!(out, "🏃 活动推荐：{}", advice.activity_recommendation);
        let _ = writeln!(out, "💊 健康提示：{}", advice.health_tips);
        let _ = writeln!(out, "📝 总结：{}", advice.summary);
    }

    if let Some(err) = &report.advice_error {
        let _ = writeln!(out);
        let _ = writeln!(out, "⚠️  {err}");
    }

    out
}
