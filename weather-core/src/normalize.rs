//! Conversion from the provider's string-typed records to [`NormalizedWeather`].

use crate::{
    error::WeatherError,
    model::{
        AmapResponse, CurrentWeather, ForecastDay, NormalizedWeather, RawForecastCast,
        RawLiveWeather,
    },
};

/// Build a [`NormalizedWeather`] from the two endpoint envelopes.
///
/// Both envelopes must carry the success status and their primary record;
/// nothing is normalized otherwise.
pub fn normalize(
    current: &AmapResponse,
    forecast: &AmapResponse,
) -> Result<NormalizedWeather, WeatherError> {
    for (label, response) in [("current", current), ("forecast", forecast)] {
        if !response.is_success() {
            return Err(WeatherError::Provider(format!(
                "{label} endpoint returned status {:?} ({} / {})",
                response.status, response.info, response.infocode
            )));
        }
    }

    let live = current
        .lives
        .as_deref()
        .and_then(<[_]>::first)
        .ok_or_else(|| WeatherError::Provider("current payload contained no live record".into()))?;

    let group = forecast
        .forecasts
        .as_deref()
        .and_then(<[_]>::first)
        .ok_or_else(|| WeatherError::Provider("forecast payload contained no forecast".into()))?;

    let forecast = group
        .casts
        .iter()
        .map(normalize_cast)
        .collect::<Result<Vec<_>, _>>()?;

    Ok(NormalizedWeather {
        current: normalize_live(live)?,
        forecast,
        ai_analysis: None,
    })
}

pub fn normalize_live(live: &RawLiveWeather) -> Result<CurrentWeather, WeatherError> {
    Ok(CurrentWeather {
        city: live.city.clone(),
        weather: live.weather.clone(),
        temperature: parse_number(
            "temperature",
            live.temperature_float.as_deref(),
            &live.temperature,
        )?,
        humidity: parse_number("humidity", live.humidity_float.as_deref(), &live.humidity)?,
        wind_direction: live.winddirection.clone(),
        wind_power: live.windpower.clone(),
        report_time: live.reporttime.clone(),
    })
}

pub fn normalize_cast(cast: &RawForecastCast) -> Result<ForecastDay, WeatherError> {
    Ok(ForecastDay {
        date: cast.date.clone(),
        week: cast.week.clone(),
        day_weather: cast.dayweather.clone(),
        night_weather: cast.nightweather.clone(),
        day_temp: parse_number("daytemp", cast.daytemp_float.as_deref(), &cast.daytemp)?,
        night_temp: parse_number("nighttemp", cast.nighttemp_float.as_deref(), &cast.nighttemp)?,
        day_wind: cast.daywind.clone(),
        night_wind: cast.nightwind.clone(),
    })
}

/// Prefer the `_float` variant when it parses; otherwise the plain field must.
fn parse_number(
    field: &'static str,
    float_variant: Option<&str>,
    plain: &str,
) -> Result<f64, WeatherError> {
    if let Some(value) = float_variant.and_then(parse_finite) {
        return Ok(value);
    }

    parse_finite(plain).ok_or_else(|| WeatherError::DataFormat {
        field,
        value: plain.to_string(),
    })
}

fn parse_finite(s: &str) -> Option<f64> {
    s.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}
