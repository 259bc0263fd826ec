//! End-to-end flow: cache → provider → optional advice → cache.

use std::sync::Arc;

use crate::{
    analysis::{AiServiceResult, Analyst},
    cache::{CacheEntry, WeatherCache},
    error::WeatherError,
    model::NormalizedWeather,
    provider::WeatherProvider,
};

/// Result of [`WeatherService::weather_for`].
#[derive(Debug, Clone)]
pub struct WeatherReport {
    pub weather: NormalizedWeather,
    pub from_cache: bool,
    /// Set when advice was requested but could not be produced.
    pub advice_error: Option<String>,
}

/// Orchestrates the injected provider, analyst and cache.
#[derive(Clone)]
pub struct WeatherService {
    provider: Arc<dyn WeatherProvider>,
    analyst: Option<Arc<dyn Analyst>>,
    cache: Option<Arc<dyn WeatherCache>>,
}

impl WeatherService {
    pub fn new(provider: Arc<dyn WeatherProvider>) -> Self {
        Self {
            provider,
            analyst: None,
            cache: None,
        }
    }

    pub fn with_analyst(mut self, analyst: Arc<dyn Analyst>) -> Self {
        self.analyst = Some(analyst);
        self
    }

    pub fn with_cache(mut self, cache: Arc<dyn WeatherCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Weather for `city`, from cache when fresh. With `with_advice`, a
    /// missing advice record is requested from the analyst; failure to get
    /// one is reported in [`WeatherReport::advice_error`] and never fails
    /// the call.
    pub async fn weather_for(
        &self,
        city: &str,
        with_advice: bool,
    ) -> Result<WeatherReport, WeatherError> {
        let cached = self.cache.as_ref().and_then(|c| c.get_entry(city));
        let from_cache = cached.is_some();

        // Write time of the snapshot; a cached one keeps its original age.
        let (mut weather, fetched_at) = match cached {
            Some(entry) => {
                tracing::debug!(city, "using cached weather");
                (entry.data, Some(entry.timestamp))
            }
            None => (self.provider.fetch_complete(city).await?, None),
        };

        let mut advice_error = None;
        let mut updated = !from_cache;

        if with_advice && weather.ai_analysis.is_none() {
            match &self.analyst {
                Some(analyst) => match analyst.request_analysis(&weather).await {
                    AiServiceResult::Success(payload) => {
                        weather.ai_analysis = Some(analyst.extract_advice(&payload));
                        updated = true;
                    }
                    AiServiceResult::Failure(message) => advice_error = Some(message),
                },
                None => advice_error = Some("未配置AI分析服务".to_string()),
            }
        }

        if let (true, Some(cache)) = (updated, &self.cache) {
            let mut entry = CacheEntry::new(weather.clone());
            if let Some(timestamp) = fetched_at {
                entry.timestamp = timestamp;
            }
            cache.put_entry(city, &entry);
        }

        Ok(WeatherReport {
            weather,
            from_cache,
            advice_error,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cache::{KeyValueStore, MemoryStore, TtlCache, cache_key},
        model::{AiAdvice, CurrentWeather},
    };
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn sample() -> NormalizedWeather {
        NormalizedWeather {
            current: CurrentWeather {
                city: "西安市".into(),
                weather: "晴".into(),
                temperature: 22.5,
                humidity: 40.0,
                wind_direction: "东北".into(),
                wind_power: "≤3".into(),
                report_time: "2024-01-01 10:00:00".into(),
            },
            forecast: vec![],
            ai_analysis: None,
        }
    }

    #[derive(Debug, Default)]
    struct CountingProvider {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl WeatherProvider for CountingProvider {
        async fn fetch_complete(&self, _city: &str) -> Result<NormalizedWeather, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(WeatherError::Provider("status 0".into()))
            } else {
                Ok(sample())
            }
        }
    }

    #[derive(Debug)]
    struct FixedAnalyst(AiServiceResult);

    #[async_trait]
    impl Analyst for FixedAnalyst {
        async fn request_analysis(&self, _weather: &NormalizedWeather) -> AiServiceResult {
            self.0.clone()
        }

        fn extract_advice(&self, _payload: &Value) -> AiAdvice {
            AiAdvice::default()
        }
    }

    #[tokio::test]
    async fn second_call_is_served_from_cache() {
        let provider = Arc::new(CountingProvider::default());
        let service = WeatherService::new(provider.clone())
            .with_cache(Arc::new(TtlCache::new(MemoryStore::new())));

        let first = service.weather_for("西安市", false).await.unwrap();
        let second = service.weather_for("西安市", false).await.unwrap();

        assert!(!first.from_cache);
        assert!(second.from_cache);
        assert_eq!(first.weather, second.weather);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn provider_error_propagates() {
        let provider = Arc::new(CountingProvider {
            fail: true,
            ..Default::default()
        });
        let service = WeatherService::new(provider);

        let err = service.weather_for("西安市", false).await.unwrap_err();
        assert!(matches!(err, WeatherError::Provider(_)));
    }

    #[tokio::test]
    async fn advice_failure_does_not_fail_weather() {
        let service = WeatherService::new(Arc::new(CountingProvider::default())).with_analyst(
            Arc::new(FixedAnalyst(AiServiceResult::Failure("unavailable".into()))),
        );

        let report = service.weather_for("西安市", true).await.unwrap();
        assert_eq!(report.weather.current.temperature, 22.5);
        assert!(report.weather.ai_analysis.is_none());
        assert_eq!(report.advice_error.as_deref(), Some("unavailable"));
    }

    #[tokio::test]
    async fn advice_is_merged_and_cached() {
        let cache = Arc::new(TtlCache::new(MemoryStore::new()));
        let service = WeatherService::new(Arc::new(CountingProvider::default()))
            .with_analyst(Arc::new(FixedAnalyst(AiServiceResult::Success(json!({})))))
            .with_cache(cache.clone());

        let report = service.weather_for("西安市", true).await.unwrap();
        assert_eq!(report.weather.ai_analysis, Some(AiAdvice::default()));
        assert!(report.advice_error.is_none());

        let cached = cache.get("西安市").unwrap();
        assert_eq!(cached.ai_analysis, Some(AiAdvice::default()));
    }

    #[tokio::test]
    async fn cached_snapshot_is_enriched_on_demand() {
        let cache = Arc::new(TtlCache::new(MemoryStore::new()));
        cache.put("西安市", &sample());
        let provider = Arc::new(CountingProvider::default());
        let service = WeatherService::new(provider.clone())
            .with_analyst(Arc::new(FixedAnalyst(AiServiceResult::Success(json!({})))))
            .with_cache(cache.clone());

        let report = service.weather_for("西安市", true).await.unwrap();
        assert!(report.from_cache);
        assert!(report.weather.ai_analysis.is_some());
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
        assert!(cache.get("西安市").unwrap().ai_analysis.is_some());
    }

    #[tokio::test]
    async fn enriching_cached_snapshot_keeps_its_age() {
        let cache = Arc::new(TtlCache::new(MemoryStore::new()));
        let fetched_at = Utc::now().timestamp_millis() - 540_000;
        let seeded = CacheEntry {
            data: sample(),
            timestamp: fetched_at,
        };
        cache
            .store()
            .set(&cache_key("西安市"), &serde_json::to_string(&seeded).unwrap())
            .unwrap();

        let service = WeatherService::new(Arc::new(CountingProvider::default()))
            .with_analyst(Arc::new(FixedAnalyst(AiServiceResult::Success(json!({})))))
            .with_cache(cache.clone());

        let report = service.weather_for("西安市", true).await.unwrap();
        assert!(report.from_cache);
        assert!(report.weather.ai_analysis.is_some());

        let raw = cache.store().get(&cache_key("西安市")).unwrap().unwrap();
        let stored: CacheEntry = serde_json::from_str(&raw).unwrap();
        assert_eq!(stored.timestamp, fetched_at);
        assert!(stored.data.ai_analysis.is_some());
    }

    #[tokio::test]
    async fn advice_without_analyst_reports_error() {
        let service = WeatherService::new(Arc::new(CountingProvider::default()));
        let report = service.weather_for("西安市", true).await.unwrap();
        assert!(report.advice_error.is_some());
    }
}
