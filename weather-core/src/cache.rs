//! Time-limited snapshot cache, one entry per city.
//!
//! Caching is best-effort: read problems look like a miss and write problems
//! are logged and dropped. Nothing here returns an error to the caller.

use chrono::Utc;
use parking_lot::Mutex;
use serde::{Deserialize, Serialize};
use std::{
    collections::HashMap,
    fs, io,
    path::{Path, PathBuf},
};

use crate::{error::CacheError, model::NormalizedWeather};

pub const CACHE_KEY_PREFIX: &str = "weather_cache";
/// Ten minutes.
pub const CACHE_TTL_MS: i64 = 10 * 60 * 1000;

/// A synchronous string key-value store.
pub trait KeyValueStore: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError>;
    fn set(&self, key: &str, value: &str) -> Result<(), CacheError>;
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// Weather snapshot cache seen by the service layer.
pub trait WeatherCache: Send + Sync {
    /// The fresh entry for `city`, write time included.
    fn get_entry(&self, city: &str) -> Option<CacheEntry>;

    /// Store `entry` as-is, keeping its timestamp.
    fn put_entry(&self, city: &str, entry: &CacheEntry);

    fn get(&self, city: &str) -> Option<NormalizedWeather> {
        self.get_entry(city).map(|entry| entry.data)
    }

    /// Store `data` stamped with the current time.
    fn put(&self, city: &str, data: &NormalizedWeather) {
        self.put_entry(city, &CacheEntry::new(data.clone()));
    }
}

/// What gets serialized into the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub data: NormalizedWeather,
    /// Write time in epoch milliseconds.
    pub timestamp: i64,
}

impl CacheEntry {
    pub fn new(data: NormalizedWeather) -> Self {
        Self {
            data,
            timestamp: Utc::now().timestamp_millis(),
        }
    }

    pub fn is_expired(&self, now_ms: i64) -> bool {
        now_ms - self.timestamp > CACHE_TTL_MS
    }
}

pub fn cache_key(city: &str) -> String {
    format!("{CACHE_KEY_PREFIX}_{city}")
}

/// [`WeatherCache`] with a fixed TTL, checked lazily on read.
#[derive(Debug)]
pub struct TtlCache<S> {
    store: S,
}

impl<S: KeyValueStore> TtlCache<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    fn read(&self, key: &str) -> Result<Option<CacheEntry>, CacheError> {
        let Some(raw) = self.store.get(key)? else {
            return Ok(None);
        };

        let entry: CacheEntry = serde_json::from_str(&raw)?;
        if entry.is_expired(Utc::now().timestamp_millis()) {
            tracing::debug!(key, "cache entry expired");
            self.store.remove(key)?;
            return Ok(None);
        }

        Ok(Some(entry))
    }
}

impl<S: KeyValueStore> WeatherCache for TtlCache<S> {
    fn get_entry(&self, city: &str) -> Option<CacheEntry> {
        let key = cache_key(city);
        match self.read(&key) {
            Ok(hit) => {
                tracing::debug!(key = %key, hit = hit.is_some(), "cache lookup");
                hit
            }
            Err(e) => {
                tracing::debug!(key = %key, "unreadable cache entry treated as miss: {e}");
                None
            }
        }
    }

    fn put_entry(&self, city: &str, entry: &CacheEntry) {
        let key = cache_key(city);
        let result = serde_json::to_string(entry)
            .map_err(CacheError::from)
            .and_then(|raw| self.store.set(&key, &raw));

        if let Err(e) = result {
            tracing::warn!(key = %key, "failed to cache weather data: {e}");
        }
    }
}

/// In-process store.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        Ok(self.entries.lock().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        self.entries.lock().insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.entries.lock().remove(key);
        Ok(())
    }
}

/// One JSON file per key under a directory.
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let name: String = key
            .chars()
            .map(|c| if c.is_alphanumeric() || c == '_' || c == '-' { c } else { '_' })
            .collect();
        self.dir.join(format!("{name}.json"))
    }
}

impl KeyValueStore for FileStore {
    fn get(&self, key: &str) -> Result<Option<String>, CacheError> {
        match fs::read_to_string(self.path_for(key)) {
            Ok(raw) => Ok(Some(raw)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), CacheError> {
        fs::create_dir_all(&self.dir)?;
        fs::write(self.path_for(key), value)?;
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        match fs::remove_file(self.path_for(key)) {
            Err(e) if e.kind() != io::ErrorKind::NotFound => Err(e.into()),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{CurrentWeather, ForecastDay};

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
            forecast: vec![ForecastDay {
                date: "2024-01-01".into(),
                week: "1".into(),
                day_weather: "晴".into(),
                night_weather: "多云".into(),
                day_temp: 25.0,
                night_temp: 10.0,
                day_wind: "东北".into(),
                night_wind: "东北".into(),
            }],
            ai_analysis: None,
        }
    }

    fn write_entry(store: &MemoryStore, city: &str, age_ms: i64) {
        let entry = CacheEntry {
            data: sample(),
            timestamp: Utc::now().timestamp_millis() - age_ms,
        };
        store
            .set(&cache_key(city), &serde_json::to_string(&entry).unwrap())
            .unwrap();
    }

    /// Store whose writes always fail, like a full disk.
    struct FullStore;

    impl KeyValueStore for FullStore {
        fn get(&self, _key: &str) -> Result<Option<String>, CacheError> {
            Ok(None)
        }
        fn set(&self, _key: &str, _value: &str) -> Result<(), CacheError> {
            Err(io::Error::other("quota exceeded").into())
        }
        fn remove(&self, _key: &str) -> Result<(), CacheError> {
            Ok(())
        }
    }

    #[test]
    fn key_is_prefixed() {
        assert_eq!(cache_key("西安市"), "weather_cache_西安市");
    }

    #[test]
    fn miss_when_never_written() {
        let cache = TtlCache::new(MemoryStore::new());
        assert!(cache.get("西安市").is_none());
    }

    #[test]
    fn put_then_get_roundtrip() {
        let cache = TtlCache::new(MemoryStore::new());
        cache.put("西安市", &sample());
        assert_eq!(cache.get("西安市"), Some(sample()));
        assert!(cache.get("北京市").is_none());
    }

    #[test]
    fn expired_entry_is_miss_and_removed() {
        let store = MemoryStore::new();
        write_entry(&store, "西安市", CACHE_TTL_MS + 1);
        let cache = TtlCache::new(store);

        assert!(cache.get("西安市").is_none());
        assert!(cache.store().get(&cache_key("西安市")).unwrap().is_none());
    }

    #[test]
    fn entry_within_ttl_is_hit() {
        let store = MemoryStore::new();
        write_entry(&store, "西安市", CACHE_TTL_MS - 60_000);
        let cache = TtlCache::new(store);

        assert_eq!(cache.get("西安市"), Some(sample()));
    }

    #[test]
    fn put_entry_keeps_original_timestamp() {
        let cache = TtlCache::new(MemoryStore::new());
        let entry = CacheEntry {
            data: sample(),
            timestamp: Utc::now().timestamp_millis() - 540_000,
        };

        cache.put_entry("西安市", &entry);
        let stored = cache.get_entry("西安市").unwrap();
        assert_eq!(stored.timestamp, entry.timestamp);
        assert_eq!(stored.data, sample());
    }

    #[test]
    fn corrupt_entry_is_miss() {
        let store = MemoryStore::new();
        store.set(&cache_key("西安市"), "{not json").unwrap();
        store.set(&cache_key("北京市"), r#"{"data": 1, "timestamp": 0}"#).unwrap();
        let cache = TtlCache::new(store);

        assert!(cache.get("西安市").is_none());
        assert!(cache.get("北京市").is_none());
    }

    #[test]
    fn write_failure_is_swallowed() {
        let cache = TtlCache::new(FullStore);
        cache.put("西安市", &sample());
        assert!(cache.get("西安市").is_none());
    }

    #[test]
    fn file_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let cache = TtlCache::new(FileStore::new(dir.path().join("nested")));

        cache.put("西安市", &sample());
        assert_eq!(cache.get("西安市"), Some(sample()));
        assert!(cache.store().dir().join("weather_cache_西安市.json").exists());
    }

    #[test]
    fn file_store_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path());

        store.set("weather_cache_../etc", "x").unwrap();
        assert_eq!(store.get("weather_cache_../etc").unwrap().as_deref(), Some("x"));
        assert!(dir.path().join("weather_cache____etc.json").exists());

        store.remove("weather_cache_../etc").unwrap();
        store.remove("weather_cache_../etc").unwrap();
        assert!(store.get("weather_cache_../etc").unwrap().is_none());
    }
}
