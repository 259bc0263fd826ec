//! Core library for the `weather-advisor` CLI.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - The AMap weather client and normalization into typed models
//! - LLM advice: prompt building, request, and reply parsing
//! - A TTL snapshot cache behind an injectable interface
//!
//! It is used by `weather-advisor-cli`, but can also be reused by other binaries or services.

pub mod advice;
pub mod analysis;
pub mod cache;
pub mod config;
pub mod display;
pub mod error;
pub mod model;
pub mod normalize;
pub mod prompt;
pub mod provider;
pub mod service;
mod text;

pub use advice::parse_advice;
pub use analysis::{AiServiceResult, AnalysisClient, Analyst};
pub use cache::{FileStore, MemoryStore, TtlCache, WeatherCache};
pub use config::{Config, ResponseEnvelope};
pub use error::WeatherError;
pub use model::{AiAdvice, CITIES, CityRef, NormalizedWeather};
pub use prompt::{Prompt, build_prompt};
pub use provider::{AmapClient, WeatherProvider};
pub use service::{WeatherReport, WeatherService};
