use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use inquire::{Password, PasswordDisplayMode, Text};
use weather_advisor_core::{
    AmapClient, AnalysisClient, CITIES, CityRef, Config, FileStore, TtlCache, WeatherService,
};

use crate::render;

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "weather-advisor", version, about = "Weather with AI lifestyle advice")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Interactively store API keys and the model name.
    Configure,

    /// List the built-in cities.
    Cities,

    /// Show weather for a city.
    Show {
        /// City name (e.g. "西安市") or adcode (e.g. "610100").
        city: String,

        /// Ask the language model for clothing/travel/health advice.
        #[arg(long)]
        ai: bool,

        /// Bypass the local cache.
        #[arg(long)]
        no_cache: bool,

        /// Print the normalized data as JSON.
        #[arg(long)]
        json: bool,
    },
}

impl Cli {
    pub async fn run(self) -> Result<()> {
        match self.command {
            Command::Configure => configure(),
            Command::Cities => {
                print!("{}", render::cities(CITIES));
                Ok(())
            }
            Command::Show { city, ai, no_cache, json } => show(&city, ai, no_cache, json).await,
        }
    }
}

fn configure() -> Result<()> {
    let mut cfg = Config::load_file()?;

    let amap_key = Password::new("AMap API key:")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read AMap API key")?;
    if !amap_key.trim().is_empty() {
        cfg.amap.api_key = Some(amap_key.trim().to_string());
    }

    let llm_key = Password::new("LLM API key (leave empty to skip):")
        .with_display_mode(PasswordDisplayMode::Masked)
        .without_confirmation()
        .prompt()
        .context("Failed to read LLM API key")?;
    if !llm_key.trim().is_empty() {
        cfg.llm.api_key = Some(llm_key.trim().to_string());
    }

    let model = Text::new("LLM model:")
        .with_default(&cfg.llm.model)
        .prompt()
        .context("Failed to read model name")?;
    cfg.llm.model = model.trim().to_string();

    cfg.save()?;
    println!("Saved configuration to {}", Config::config_file_path()?.display());
    Ok(())
}

async fn show(city: &str, ai: bool, no_cache: bool, json: bool) -> Result<()> {
    let cfg = Config::load()?;

    // Built-in cities resolve to their adcode; anything else goes to the provider as typed.
    let city_id = CityRef::lookup(city).map_or(city, |c| c.adcode);

    let mut service = WeatherService::new(Arc::new(AmapClient::from_config(&cfg)?));

    if ai {
        match AnalysisClient::from_config(&cfg) {
            Ok(client) => service = service.with_analyst(Arc::new(client)),
            Err(e) => tracing::warn!("AI advice disabled: {e}"),
        }
    }

    if cfg.cache.enabled && !no_cache {
        let store = FileStore::new(cfg.cache_dir()?);
        service = service.with_cache(Arc::new(TtlCache::new(store)));
    }

    let report = service
        .weather_for(city_id, ai)
        .await
        .map_err(|e| {
            let message = e.user_message();
            anyhow::Error::new(e).context(message)
        })?;

    if json {
        println!("{}", serde_json::to_string_pretty(&report.weather)?);
    } else {
        let today = chrono::Local::now().date_naive();
        print!("{}", render::report(&report, today));
    }

    Ok(())
}
