#[cfg(feature = "cli")]
pub mod cli;
pub mod config;
pub mod error;
pub mod quote;
pub mod render;
#[cfg(feature = "server")]
pub mod server;
pub mod text;
pub mod text_metrics;
pub mod theme;

#[cfg(feature = "cli")]
pub use cli::run;
pub use config::{CardConfig, Config, ServerConfig, load_config};
pub use error::{QuoteFetchError, RenderError};
#[cfg(feature = "server")]
pub use quote::HttpQuoteProvider;
pub use quote::{Quote, QuoteParams, QuoteProvider, resolve_quote};
pub use render::{OutputFormat, RenderedImage, render_card_scene, render_quote, render_svg};
pub use text::{EstimatedMetrics, SystemFontMetrics, TextMeasure, wrap_text};
pub use theme::{FontChoice, Presentation, Theme, resolve_presentation};
