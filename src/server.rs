use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get};
use axum::Router;
use thiserror::Error;
use tracing::{error, info};

use crate::config::CardConfig;
use crate::error::{QuoteFetchError, RenderError};
use crate::quote::{QuoteParams, QuoteProvider, resolve_quote};
use crate::render::{OutputFormat, RenderedImage, render_quote};
use crate::theme::resolve_presentation;

/// Shared, read-only per-process state.
pub struct AppState<P> {
    pub provider: Arc<P>,
    pub card: Arc<CardConfig>,
}

impl<P> AppState<P> {
    pub fn new(provider: P, card: CardConfig) -> Self {
        Self {
            provider: Arc::new(provider),
            card: Arc::new(card),
        }
    }
}

impl<P> Clone for AppState<P> {
    fn clone(&self) -> Self {
        Self {
            provider: Arc::clone(&self.provider),
            card: Arc::clone(&self.card),
        }
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Fetch(#[from] QuoteFetchError),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            AppError::Fetch(_) => (StatusCode::BAD_GATEWAY, "quote service unavailable"),
            AppError::Render(_) => (StatusCode::INTERNAL_SERVER_ERROR, "failed to render quote"),
        };
        error!("quote request failed: status={} error={}", status.as_u16(), self);
        (status, [(header::CACHE_CONTROL, "no-store")], message).into_response()
    }
}

pub fn router<P: QuoteProvider>(state: AppState<P>) -> Router {
    Router::new()
        .route("/health", get(|| async { "quotecard" }))
        .route("/", any(quote_handler::<P>))
        .route("/api/quote", any(quote_handler::<P>))
        .with_state(state)
}

async fn quote_handler<P: QuoteProvider>(
    State(state): State<AppState<P>>,
    Query(params): Query<QuoteParams>,
) -> Result<Response, AppError> {
    let format = OutputFormat::from_name(params.format());
    info!(
        "quote request: format={:?} theme={} size={} font={} custom_text={}",
        format,
        params.theme(),
        params.size(),
        params.font(),
        params.custom_text().is_some()
    );

    let quote = resolve_quote(&params, state.provider.as_ref()).await?;
    let presentation = resolve_presentation(
        params.theme(),
        params.size(),
        params.font(),
        params.color.as_deref(),
        params.bg.as_deref(),
    );

    let image = match format {
        OutputFormat::Svg => render_quote(&quote, &presentation, format, &state.card)?,
        OutputFormat::Png => {
            let card = Arc::clone(&state.card);
            tokio::task::spawn_blocking(move || {
                render_quote(&quote, &presentation, format, &card)
            })
            .await
            .map_err(|err| RenderError::Task(err.to_string()))??
        }
    };

    Ok(image_response(image))
}

fn image_response(image: RenderedImage) -> Response {
    let content_type = image.content_type();
    match image {
        RenderedImage::Svg(svg) => ([(header::CONTENT_TYPE, content_type)], svg).into_response(),
        RenderedImage::Png(bytes) => ([(header::CONTENT_TYPE, content_type)], bytes).into_response(),
    }
}

/// Binds `addr` and serves until Ctrl-C.
pub async fn serve<P: QuoteProvider>(addr: &str, state: AppState<P>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("listening on {}", listener.local_addr()?);
    axum::serve(listener, router(state))
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            info!("shutting down");
        })
        .await?;
    Ok(())
}
