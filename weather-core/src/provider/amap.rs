use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

use crate::{
    config::Config,
    error::WeatherError,
    model::{AmapResponse, NormalizedWeather},
    normalize::normalize,
    text::truncate,
};

use super::WeatherProvider;

const REQUEST_TIMEOUT_SECS: u64 = 10;
const BODY_PREVIEW_LEN: usize = 200;

/// Client for the AMap `weatherInfo` endpoints.
#[derive(Debug, Clone)]
pub struct AmapClient {
    api_key: String,
    base_url: String,
    http: Client,
}

#[derive(Debug, Clone, Copy)]
enum Extensions {
    Base,
    All,
}

impl Extensions {
    fn as_str(self) -> &'static str {
        match self {
            Extensions::Base => "base",
            Extensions::All => "all",
        }
    }

    fn failure_message(self) -> &'static str {
        match self {
            Extensions::Base => "获取实时天气信息失败，请检查网络连接",
            Extensions::All => "获取天气预报信息失败，请检查网络连接",
        }
    }
}

impl AmapClient {
    pub fn new(api_key: String, base_url: impl Into<String>) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build weather HTTP client: {e}");
                WeatherError::Config("无法初始化天气服务客户端".to_string())
            })?;

        Ok(Self {
            api_key,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http,
        })
    }

    /// Construct a client from config; the API key must be present.
    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let api_key = config.amap_api_key().ok_or_else(|| {
            WeatherError::Config(
                "No AMap API key configured.\n\
                 Hint: run `weather-advisor configure` or set AMAP_KEY."
                    .to_string(),
            )
        })?;

        Self::new(api_key.to_owned(), config.amap.base_url.as_str())
    }

    /// Live conditions (`extensions=base`). The envelope is returned as-is,
    /// status included.
    pub async fn fetch_current(&self, city: &str) -> Result<AmapResponse, WeatherError> {
        self.fetch(city, Extensions::Base).await
    }

    /// Multi-day forecast (`extensions=all`).
    pub async fn fetch_forecast(&self, city: &str) -> Result<AmapResponse, WeatherError> {
        self.fetch(city, Extensions::All).await
    }

    async fn fetch(
        &self,
        city: &str,
        extensions: Extensions,
    ) -> Result<AmapResponse, WeatherError> {
        let url = format!("{}/weatherInfo", self.base_url);
        tracing::debug!(city, extensions = extensions.as_str(), "requesting weather");

        let res = self
            .http
            .get(&url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("city", city),
                ("extensions", extensions.as_str()),
            ])
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    city,
                    extensions = extensions.as_str(),
                    "weather request failed: {e}"
                );
                WeatherError::Network(extensions.failure_message().to_string())
            })?;

        let status = res.status();
        let body = res.text().await.map_err(|e| {
            tracing::error!(city, "failed to read weather response body: {e}");
            WeatherError::Network(extensions.failure_message().to_string())
        })?;

        if !status.is_success() {
            return Err(WeatherError::Provider(format!(
                "weatherInfo ({}) request failed with status {}: {}",
                extensions.as_str(),
                status,
                truncate(&body, BODY_PREVIEW_LEN),
            )));
        }

        serde_json::from_str(&body).map_err(|e| {
            WeatherError::Provider(format!(
                "Failed to parse weatherInfo ({}) JSON: {e}: {}",
                extensions.as_str(),
                truncate(&body, BODY_PREVIEW_LEN),
            ))
        })
    }
}

#[async_trait]
impl WeatherProvider for AmapClient {
    async fn fetch_complete(&self, city: &str) -> Result<NormalizedWeather, WeatherError> {
        let (current, forecast) =
            tokio::try_join!(self.fetch_current(city), self.fetch_forecast(city))?;

        normalize(&current, &forecast).inspect_err(|e| {
            tracing::warn!(city, "weather payload rejected: {e}");
        })
    }
}
