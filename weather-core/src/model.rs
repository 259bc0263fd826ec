use serde::{Deserialize, Serialize};

/// Envelope shared by both `weatherInfo` endpoints.
///
/// `lives` is populated for `extensions=base`, `forecasts` for `extensions=all`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AmapResponse {
    pub status: String,
    #[serde(default)]
    pub count: String,
    #[serde(default)]
    pub info: String,
    #[serde(default)]
    pub infocode: String,
    #[serde(default)]
    pub lives: Option<Vec<RawLiveWeather>>,
    #[serde(default)]
    pub forecasts: Option<Vec<RawForecast>>,
}

impl AmapResponse {
    /// The provider's success sentinel.
    pub const SUCCESS: &'static str = "1";

    pub fn is_success(&self) -> bool {
        self.status == Self::SUCCESS
    }
}

/// Live conditions as reported by the provider. Every field is a string.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawLiveWeather {
    #[serde(default)]
    pub province: String,
    pub city: String,
    #[serde(default)]
    pub adcode: String,
    pub weather: String,
    pub temperature: String,
    #[serde(default)]
    pub winddirection: String,
    #[serde(default)]
    pub windpower: String,
    pub humidity: String,
    #[serde(default)]
    pub reporttime: String,
    #[serde(default)]
    pub temperature_float: Option<String>,
    #[serde(default)]
    pub humidity_float: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawForecast {
    pub city: String,
    #[serde(default)]
    pub adcode: String,
    #[serde(default)]
    pub province: String,
    #[serde(default)]
    pub reporttime: String,
    #[serde(default)]
    pub casts: Vec<RawForecastCast>,
}

/// One forecast day.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawForecastCast {
    pub date: String,
    #[serde(default)]
    pub week: String,
    pub dayweather: String,
    pub nightweather: String,
    pub daytemp: String,
    pub nighttemp: String,
    #[serde(default)]
    pub daywind: String,
    #[serde(default)]
    pub nightwind: String,
    #[serde(default)]
    pub daypower: String,
    #[serde(default)]
    pub nightpower: String,
    #[serde(default)]
    pub daytemp_float: Option<String>,
    #[serde(default)]
    pub nighttemp_float: Option<String>,
}

/// Weather in the internal typed shape.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedWeather {
    pub current: CurrentWeather,
    pub forecast: Vec<ForecastDay>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ai_analysis: Option<AiAdvice>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentWeather {
    pub city: String,
    pub weather: String,
    pub temperature: f64,
    pub humidity: f64,
    pub wind_direction: String,
    pub wind_power: String,
    pub report_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForecastDay {
    pub date: String,
    pub week: String,
    pub day_weather: String,
    pub night_weather: String,
    pub day_temp: f64,
    pub night_temp: f64,
    pub day_wind: String,
    pub night_wind: String,
}

/// The five-field advice record produced by the LLM step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiAdvice {
    pub clothing_advice: String,
    pub travel_advice: String,
    pub activity_recommendation: String,
    pub health_tips: String,
    pub summary: String,
}

impl Default for AiAdvice {
    /// Generic advice used when a model reply cannot be interpreted.
    fn default() -> Self {
        Self {
            clothing_advice: "建议根据当前温度选择合适的服装，注意保暖或防晒。".to_string(),
            travel_advice: "出行前请关注天气变化，合理安排出行时间。".to_string(),
            activity_recommendation: "可根据天气情况选择适合的室内外活动。".to_string(),
            health_tips: "请注意天气变化对健康的影响，做好相应防护。".to_string(),
            summary: "请关注天气变化，合理安排生活和出行。".to_string(),
        }
    }
}

/// Static city lookup entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CityRef {
    pub name: &'static str,
    pub adcode: &'static str,
    pub citycode: &'static str,
}

pub const CITIES: &[CityRef] = &[
    CityRef {
        name: "西安市",
        adcode: "610100",
        citycode: "029",
    },
    CityRef {
        name: "北京市",
        adcode: "110000",
        citycode: "010",
    },
    CityRef {
        name: "上海市",
        adcode: "310000",
        citycode: "021",
    },
    CityRef {
        name: "广州市",
        adcode: "440100",
        citycode: "020",
    },
    CityRef {
        name: "深圳市",
        adcode: "440300",
        citycode: "0755",
    },
    CityRef {
        name: "杭州市",
        adcode: "330100",
        citycode: "0571",
    },
    CityRef {
        name: "成都市",
        adcode: "510100",
        citycode: "028",
    },
    CityRef {
        name: "重庆市",
        adcode: "500000",
        citycode: "023",
    },
];

impl CityRef {
    /// Find a built-in city by display name or adcode.
    pub fn lookup(query: &str) -> Option<&'static CityRef> {
        let query = query.trim();
        CITIES
            .iter()
            .find(|c| c.name == query || c.adcode == query)
    }
}
