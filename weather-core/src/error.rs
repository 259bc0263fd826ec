//! Error types surfaced by the weather pipeline.

use thiserror::Error;

/// Errors returned by the weather acquisition path.
///
/// The AI enrichment path never produces these; it reports failures as
/// [`crate::analysis::AiServiceResult::Failure`] values instead.
#[derive(Error, Debug)]
pub enum WeatherError {
    /// The provider could not be reached. Carries a user-facing message only;
    /// the transport error is logged where it happens.
    #[error("Network error: {0}")]
    Network(String),

    /// The provider answered but signalled failure or returned an empty payload.
    #[error("Provider error: {0}")]
    Provider(String),

    /// A numeric field could not be parsed into a finite number.
    #[error("Malformed numeric field `{field}`: {value:?}")]
    DataFormat { field: &'static str, value: String },

    /// Required configuration is missing at call time.
    #[error("Configuration error: {0}")]
    Config(String),
}

impl WeatherError {
    /// User-friendly error message for display.
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(msg) => msg.clone(),
            Self::Provider(_) => "天气服务返回异常，请稍后重试".to_string(),
            Self::DataFormat { .. } => "天气数据格式错误".to_string(),
            Self::Config(msg) => msg.clone(),
        }
    }

    pub fn is_data_format(&self) -> bool {
        matches!(self, Self::DataFormat { .. })
    }
}

/// Failures inside a cache store. These stay behind the
/// [`crate::cache::WeatherCache`] boundary and are only logged.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("Cache I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Cache serialization error: {0}")]
    Serialize(#[from] serde_json::Error),
}
