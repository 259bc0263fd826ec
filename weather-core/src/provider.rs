use async_trait::async_trait;
use std::fmt::Debug;

use crate::{error::WeatherError, model::NormalizedWeather};

pub mod amap;

pub use amap::AmapClient;

/// A source of normalized weather for a city.
#[async_trait]
pub trait WeatherProvider: Send + Sync + Debug {
    /// Fetch current conditions and forecast for `city` (name or adcode).
    async fn fetch_complete(&self, city: &str) -> Result<NormalizedWeather, WeatherError>;
}
