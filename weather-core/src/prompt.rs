//! Prompt construction for the advice request.

use std::fmt::Write as _;

use crate::{display::weekday_label, model::NormalizedWeather};

/// Number of forecast days included in the user block.
pub const PROMPT_FORECAST_DAYS: usize = 3;

const SYSTEM_PROMPT: &str = "\
你是一位专业的天气分析师和生活顾问，请基于用户提供的天气数据为用户提供个性化的生活建议。

## 分析要求
请从以下4个维度提供专业建议，每个维度控制在50-80字：

1. **穿衣建议**：根据温度、天气状况和风力，推荐合适的服装搭配
2. **出行建议**：基于天气条件，提供交通出行和时间安排建议
3. **活动推荐**：结合天气特点，推荐适合的室内外活动
4. **健康提示**：针对当前天气条件，提供健康防护建议

## 回复格式
请严格按照以下JSON格式回复：
{
  \"clothingAdvice\": \"穿衣建议内容\",
  \"travelAdvice\": \"出行建议内容\",
  \"activityRecommendation\": \"活动推荐内容\",
  \"healthTips\": \"健康提示内容\",
  \"summary\": \"综合天气分析总结（100字以内）\"
}

## 注意事项
- 建议要实用、具体、贴近生活
- 语言要亲切自然，避免过于专业的术语
- 考虑中国用户的生活习惯和文化背景
- 如遇极端天气，要特别强调安全提醒";

/// System and user blocks for a two-message chat exchange.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub system: String,
    pub user: String,
}

/// Render the advice prompt for `weather`. Pure; reads no clock.
pub fn build_prompt(weather: &NormalizedWeather) -> Prompt {
    let current = &weather.current;

    let mut user = String::new();
    let _ = writeln!(user, "## 天气数据");
    let _ = writeln!(user, "**当前天气（{}）：**", current.city);
    let _ = writeln!(user, "- 天气状况：{}", current.weather);
    let _ = writeln!(user, "- 温度：{}°C", current.temperature);
    let _ = writeln!(user, "- 湿度：{}%", current.humidity);
    let _ = writeln!(user, "- 风力：{}风 {}级", current.wind_direction, current.wind_power);
    let _ = writeln!(user, "- 更新时间：{}", current.report_time);
    let _ = writeln!(user);
    let _ = writeln!(user, "**未来{PROMPT_FORECAST_DAYS}天预报：**");

    for day in weather.forecast.iter().take(PROMPT_FORECAST_DAYS) {
        let _ = writeln!(
            user,
            "- {}（{}）：{}转{}，{}°C ~ {}°C，白天{}，夜间{}",
            day.date,
            weekday_label(&day.week),
            day.day_weather,
            day.night_weather,
            day.night_temp,
            day.day_temp,
            day.day_wind,
            day.night_wind,
        );
    }

    Prompt {
        system: SYSTEM_PROMPT.to_string(),
        user: user.trim_end().to_string(),
    }
}
