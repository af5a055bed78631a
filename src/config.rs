use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_QUOTE_API_URL: &str = "https://api.quotable.io/random";

/// Fixed card geometry. The canvas never grows with the quote; long quotes
/// overflow the bottom edge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardConfig {
    pub width: f32,
    pub height: f32,
    pub wrap_width: f32,
    pub line_gap: f32,
    pub attribution_offset: f32,
    pub attribution_shrink: f32,
    pub attribution_font_family: String,
    pub svg_font_family: String,
    pub svg_font_size: f32,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            width: 800.0,
            height: 300.0,
            wrap_width: 700.0,
            line_gap: 8.0,
            attribution_offset: 50.0,
            attribution_shrink: 4.0,
            attribution_font_family: crate::theme::SANS_FAMILY.to_string(),
            svg_font_family: "Arial".to_string(),
            svg_font_size: 20.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub bind: String,
    pub quote_api_url: String,
    pub fetch_timeout_ms: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "0.0.0.0:3000".to_string(),
            quote_api_url: DEFAULT_QUOTE_API_URL.to_string(),
            fetch_timeout_ms: 10_000,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct Config {
    pub server: ServerConfig,
    pub card: CardConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ConfigFile {
    bind: Option<String>,
    quote_api_url: Option<String>,
    fetch_timeout_ms: Option<u64>,
    card: Option<CardFile>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CardFile {
    width: Option<f32>,
    height: Option<f32>,
    wrap_width: Option<f32>,
    line_gap: Option<f32>,
    attribution_offset: Option<f32>,
}

pub fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    let Some(path) = path else {
        return Ok(Config::default());
    };
    let contents = std::fs::read_to_string(path)?;
    parse_config(&contents)
}

pub fn parse_config(contents: &str) -> anyhow::Result<Config> {
    let parsed: ConfigFile = serde_json::from_str(contents)?;
    let mut config = Config::default();

    if let Some(v) = parsed.bind {
        config.server.bind = v;
    }
    if let Some(v) = parsed.quote_api_url {
        config.server.quote_api_url = v;
    }
    if let Some(v) = parsed.fetch_timeout_ms {
        config.server.fetch_timeout_ms = v;
    }

    if let Some(card) = parsed.card {
        if let Some(v) = card.width {
            config.card.width = v;
        }
        if let Some(v) = card.height {
            config.card.height = v;
        }
        if let Some(v) = card.wrap_width {
            config.card.wrap_width = v;
        }
        if let Some(v) = card.line_gap {
            config.card.line_gap = v;
        }
        if let Some(v) = card.attribution_offset {
            config.card.attribution_offset = v;
        }
    }

    if config.card.width <= 0.0 || config.card.height <= 0.0 {
        return Err(anyhow::anyhow!(
            "card size must be positive, got {}x{}",
            config.card.width,
            config.card.height
        ));
    }

    Ok(config)
}
