use crate::config::{Config, load_config};
use crate::quote::{HttpQuoteProvider, QuoteParams, resolve_quote};
use crate::render::{OutputFormat, render_quote, write_output};
use crate::server::{AppState, serve};
use crate::theme::resolve_presentation;
use anyhow::Result;
use clap::{Args as ClapArgs, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "quotecard", version, about = "Render quotations as PNG or SVG cards")]
pub struct Args {
    /// Config JSON file
    #[arg(short = 'c', long = "configFile", global = true)]
    pub config: Option<PathBuf>,

    /// Random-quote endpoint used when no text is given
    #[arg(long = "quote-url", global = true)]
    pub quote_url: Option<String>,

    /// Timeout for the quote fetch, in milliseconds
    #[arg(long = "timeout-ms", global = true)]
    pub timeout_ms: Option<u64>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run the HTTP service
    Serve {
        /// Address to listen on
        #[arg(short = 'b', long = "bind")]
        bind: Option<String>,
    },
    /// Render a single card
    Render(RenderArgs),
}

#[derive(ClapArgs, Debug)]
pub struct RenderArgs {
    /// Quote text. A random quote is fetched when omitted.
    #[arg(long)]
    pub text: Option<String>,

    #[arg(long)]
    pub author: Option<String>,

    /// light, dark or gradient
    #[arg(long, default_value = "light")]
    pub theme: String,

    /// sans, serif or mono
    #[arg(long, default_value = "sans")]
    pub font: String,

    /// sm, md, lg or xl
    #[arg(long, default_value = "md")]
    pub size: String,

    /// Text color override
    #[arg(long)]
    pub color: Option<String>,

    /// Background color override
    #[arg(long)]
    pub bg: Option<String>,

    /// Output format
    #[arg(short = 'e', long = "outputFormat", value_enum, default_value = "png")]
    pub output_format: CliFormat,

    /// Output file. Defaults to stdout for SVG if omitted.
    #[arg(short = 'o', long = "output")]
    pub output: Option<PathBuf>,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum CliFormat {
    Svg,
    Png,
}

impl From<CliFormat> for OutputFormat {
    fn from(format: CliFormat) -> Self {
        match format {
            CliFormat::Svg => OutputFormat::Svg,
            CliFormat::Png => OutputFormat::Png,
        }
    }
}

impl RenderArgs {
    fn to_params(&self) -> QuoteParams {
        QuoteParams {
            text: self.text.clone(),
            author: self.author.clone(),
            theme: Some(self.theme.clone()),
            font: Some(self.font.clone()),
            format: None,
            color: self.color.clone(),
            bg: self.bg.clone(),
            size: Some(self.size.clone()),
        }
    }
}

pub fn run() -> Result<()> {
    let args = Args::parse();
    init_tracing();

    let config = resolve_config(&args)?;
    let provider = HttpQuoteProvider::new(
        config.server.quote_api_url.clone(),
        Duration::from_millis(config.server.fetch_timeout_ms),
    )?;

    let runtime = tokio::runtime::Runtime::new()?;
    match args.command {
        Command::Serve { .. } => {
            let state = AppState::new(provider, config.card.clone());
            runtime.block_on(serve(&config.server.bind, state))
        }
        Command::Render(render_args) => {
            let params = render_args.to_params();
            let quote = runtime.block_on(resolve_quote(&params, &provider))?;
            let presentation = resolve_presentation(
                params.theme(),
                params.size(),
                params.font(),
                params.color.as_deref(),
                params.bg.as_deref(),
            );
            let image = render_quote(
                &quote,
                &presentation,
                render_args.output_format.into(),
                &config.card,
            )?;
            write_output(&image, render_args.output.as_deref())
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

/// Config file first, then command-line overrides.
fn resolve_config(args: &Args) -> Result<Config> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(url) = &args.quote_url {
        config.server.quote_api_url = url.clone();
    }
    if let Some(timeout) = args.timeout_ms {
        config.server.fetch_timeout_ms = timeout;
    }
    if let Command::Serve {
        bind: Some(bind), ..
    } = &args.command
    {
        config.server.bind = bind.clone();
    }
    Ok(config)
}
