//! LLM-backed advice generation.
//!
//! Advice is best-effort enrichment: every failure here is reported as an
//! [`AiServiceResult::Failure`] value so the weather itself can still be shown.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use std::fmt::Debug;

use crate::{
    advice::parse_advice,
    config::{Config, ResponseEnvelope},
    error::WeatherError,
    model::{AiAdvice, NormalizedWeather},
    prompt::build_prompt,
    text::truncate,
};

/// Message shown to users whenever advice could not be obtained.
pub const AI_UNAVAILABLE_MESSAGE: &str = "AI分析服务暂时不可用，请稍后重试";

/// Outcome of a single advice request.
#[derive(Debug, Clone, PartialEq)]
pub enum AiServiceResult {
    /// The provider's response body, untouched.
    Success(Value),
    /// A user-safe message; the cause has already been logged.
    Failure(String),
}

#[async_trait]
pub trait Analyst: Send + Sync + Debug {
    /// Ask the model for advice about `weather`. One attempt, no retry.
    async fn request_analysis(&self, weather: &NormalizedWeather) -> AiServiceResult;

    /// Interpret a successful response body as advice. Never fails.
    fn extract_advice(&self, payload: &Value) -> AiAdvice;
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
}

/// Client for an OpenAI-compatible chat-completions endpoint.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: Client,
    endpoint: String,
    api_key: String,
    model: String,
    envelope: ResponseEnvelope,
}

impl AnalysisClient {
    pub fn new(
        endpoint: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
        envelope: ResponseEnvelope,
    ) -> Self {
        Self {
            http: Client::new(),
            endpoint: endpoint.into(),
            api_key: api_key.into(),
            model: model.into(),
            envelope,
        }
    }

    pub fn from_config(config: &Config) -> Result<Self, WeatherError> {
        let api_key = config.llm_api_key().ok_or_else(|| {
            WeatherError::Config(
                "No LLM API key configured.\n\
                 Hint: run `weather-advisor configure` or set LLM_API_KEY."
                    .to_string(),
            )
        })?;

        Ok(Self::new(
            config.llm.endpoint.as_str(),
            api_key,
            config.llm.model.as_str(),
            config.llm.envelope,
        ))
    }

    async fn send(&self, weather: &NormalizedWeather) -> anyhow::Result<Value> {
        use anyhow::Context;

        let prompt = build_prompt(weather);
        let body = ChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: &prompt.system,
                },
                ChatMessage {
                    role: "user",
                    content: &prompt.user,
                },
            ],
        };

        let resp = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .context("LLM request failed")?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("LLM API error {}: {}", status, truncate(&text, 200));
        }

        resp.json().await.context("Failed to parse LLM response")
    }
}

#[async_trait]
impl Analyst for AnalysisClient {
    async fn request_analysis(&self, weather: &NormalizedWeather) -> AiServiceResult {
        match self.send(weather).await {
            Ok(payload) => AiServiceResult::Success(payload),
            Err(e) => {
                tracing::error!(city = %weather.current.city, "AI analysis failed: {e:#}");
                AiServiceResult::Failure(AI_UNAVAILABLE_MESSAGE.to_string())
            }
        }
    }

    fn extract_advice(&self, payload: &Value) -> AiAdvice {
        extract_advice(payload, self.envelope)
    }
}

/// Pull the advice out of a response body shaped per `envelope`.
pub fn extract_advice(payload: &Value, envelope: ResponseEnvelope) -> AiAdvice {
    match envelope {
        ResponseEnvelope::Flat => serde_json::from_value(payload.clone())
            .unwrap_or_else(|_| parse_advice(&payload.to_string())),
        ResponseEnvelope::ChatCompletions => {
            match payload.pointer("/choices/0/message/content") {
                Some(Value::String(text)) => parse_advice(text),
                Some(Value::Object(obj)) => match obj.get("responseContent") {
                    Some(Value::String(text)) => parse_advice(text),
                    Some(other) => parse_advice(&other.to_string()),
                    None => parse_advice(&Value::Object(obj.clone()).to_string()),
                },
                Some(other) => parse_advice(&other.to_string()),
                None => {
                    tracing::warn!("LLM response had no choices[0].message.content");
                    AiAdvice::default()
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn advice_json() -> Value {
        json!({
            "clothingAdvice": "穿薄外套",
            "travelAdvice": "适合骑行",
            "activityRecommendation": "户外散步",
            "healthTips": "注意补水",
            "summary": "晴朗舒适"
        })
    }

    #[test]
    fn chat_completions_string_content() {
        let payload = json!({
            "choices": [{
                "message": { "role": "assistant", "content": advice_json().to_string() }
            }]
        });
        let advice = extract_advice(&payload, ResponseEnvelope::ChatCompletions);
        assert_eq!(advice.clothing_advice, "穿薄外套");
        assert_eq!(advice.summary, "晴朗舒适");
    }

    #[test]
    fn chat_completions_nested_response_content() {
        let payload = json!({
            "choices": [{
                "message": { "content": { "responseContent": advice_json().to_string() } }
            }]
        });
        let advice = extract_advice(&payload, ResponseEnvelope::ChatCompletions);
        assert_eq!(advice.health_tips, "注意补水");
    }

    #[test]
    fn chat_completions_without_content_is_default() {
        let advice =
            extract_advice(&json!({ "error": "quota" }), ResponseEnvelope::ChatCompletions);
        assert_eq!(advice, AiAdvice::default());
    }

    #[test]
    fn flat_envelope() {
        let advice = extract_advice(&advice_json(), ResponseEnvelope::Flat);
        assert_eq!(advice.travel_advice, "适合骑行");
    }

    #[test]
    fn from_config_requires_api_key() {
        let err = AnalysisClient::from_config(&Config::default()).unwrap_err();
        assert!(err.to_string().contains("LLM_API_KEY"));
    }

    #[test]
    fn request_body_has_system_and_user_messages() {
        let body = ChatRequest {
            model: "m",
            messages: [
                ChatMessage {
                    role: "system",
                    content: "s",
                },
                ChatMessage {
                    role: "user",
                    content: "u",
                },
            ],
        };
        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["model"], "m");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["content"], "u");
    }
}
