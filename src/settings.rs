//! Runtime settings: layered defaults, an optional `phototag.toml` file, and
//! `PHOTOTAG_*` environment overrides. The API credential comes from the
//! process environment only and never from a file.

use crate::config::{DEFAULT_API_BASE, DEFAULT_MODEL};
use anyhow::{Context, Result};
use config::{Config, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    /// Base URL of the OpenAI-compatible completion API
    pub api_base: String,

    /// Vision-capable chat model to query
    pub model: String,

    /// Bearer credential, taken from `OPENAI_API_KEY`
    #[serde(skip)]
    pub api_key: String,
}

impl Settings {
    /// Load settings from defaults, `phototag.toml` (if present), and
    /// `PHOTOTAG_*` environment variables, then attach the API key from
    /// `OPENAI_API_KEY`.
    pub fn load() -> Result<Self> {
        let mut settings: Settings = Config::builder()
            .set_default("api_base", DEFAULT_API_BASE)?
            .set_default("model", DEFAULT_MODEL)?
            .add_source(File::with_name("phototag").required(false))
            .add_source(Environment::with_prefix("PHOTOTAG"))
            .build()?
            .try_deserialize()
            .context("invalid settings")?;

        settings.api_key = env::var("OPENAI_API_KEY")
            .context("OPENAI_API_KEY is not set in the environment")?;

        Ok(settings)
    }
}
