use serde::Deserialize;
use std::future::Future;
use tracing::debug;

use crate::error::QuoteFetchError;

/// Caller-supplied options, all optional, as they arrive in the query string.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QuoteParams {
    pub text: Option<String>,
    pub author: Option<String>,
    pub theme: Option<String>,
    pub font: Option<String>,
    pub format: Option<String>,
    pub color: Option<String>,
    pub bg: Option<String>,
    pub size: Option<String>,
}

impl QuoteParams {
    pub fn theme(&self) -> &str {
        self.theme.as_deref().unwrap_or("light")
    }

    pub fn font(&self) -> &str {
        self.font.as_deref().unwrap_or("sans")
    }

    pub fn format(&self) -> &str {
        self.format.as_deref().unwrap_or("png")
    }

    pub fn size(&self) -> &str {
        self.size.as_deref().unwrap_or("md")
    }

    /// Quote text given by the caller; an empty value counts as missing.
    pub fn custom_text(&self) -> Option<&str> {
        self.text.as_deref().filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Quote {
    pub content: String,
    pub author: String,
}

/// Source of random quotes.
pub trait QuoteProvider: Send + Sync + 'static {
    fn random_quote(&self) -> impl Future<Output = Result<Quote, QuoteFetchError>> + Send;
}

/// Uses the caller's text when present; otherwise asks the provider once.
pub async fn resolve_quote<P: QuoteProvider>(
    params: &QuoteParams,
    provider: &P,
) -> Result<Quote, QuoteFetchError> {
    if let Some(text) = params.custom_text() {
        return Ok(Quote {
            content: text.to_string(),
            author: params.author.clone().unwrap_or_default(),
        });
    }
    debug!("no quote text supplied, fetching a random quote");
    provider.random_quote().await
}

#[cfg(feature = "server")]
pub use http::HttpQuoteProvider;

#[cfg(feature = "server")]
mod http {
    use std::time::Duration;

    use tracing::{info, warn};

    use super::{Quote, QuoteProvider};
    use crate::error::QuoteFetchError;

    /// Fetches from a random-quote endpoint answering `{"content", "author"}`.
    #[derive(Debug, Clone)]
    pub struct HttpQuoteProvider {
        client: reqwest::Client,
        url: String,
        timeout_ms: u64,
    }

    impl HttpQuoteProvider {
        pub fn new(url: impl Into<String>, timeout: Duration) -> Result<Self, QuoteFetchError> {
            let client = reqwest::Client::builder()
                .timeout(timeout)
                .user_agent(concat!("quotecard/", env!("CARGO_PKG_VERSION")))
                .build()
                .map_err(|err| QuoteFetchError::Request(err.to_string()))?;
            Ok(Self {
                client,
                url: url.into(),
                timeout_ms: timeout.as_millis() as u64,
            })
        }

        pub fn url(&self) -> &str {
            &self.url
        }

        fn map_error(&self, err: reqwest::Error) -> QuoteFetchError {
            if err.is_timeout() {
                QuoteFetchError::Timeout(self.timeout_ms)
            } else if err.is_decode() {
                QuoteFetchError::Decode(err.to_string())
            } else {
                QuoteFetchError::Request(err.to_string())
            }
        }
    }

    /// Most of an upstream error body kept for logs and error messages.
    pub(super) const ERROR_BODY_LIMIT: usize = 512;

    /// Reads at most `ERROR_BODY_LIMIT` bytes of an error body. A failed read
    /// is logged and yields whatever arrived before it.
    async fn read_error_excerpt(mut response: reqwest::Response) -> String {
        let mut buf: Vec<u8> = Vec::new();
        while buf.len() < ERROR_BODY_LIMIT {
            match response.chunk().await {
                Ok(Some(chunk)) => buf.extend_from_slice(&chunk),
                Ok(None) => break,
                Err(err) => {
                    warn!("failed to read quote service error body: {}", err);
                    break;
                }
            }
        }
        excerpt(&buf)
    }

    pub(super) fn excerpt(bytes: &[u8]) -> String {
        let end = bytes.len().min(ERROR_BODY_LIMIT);
        String::from_utf8_lossy(&bytes[..end]).into_owned()
    }

    impl QuoteProvider for HttpQuoteProvider {
        async fn random_quote(&self) -> Result<Quote, QuoteFetchError> {
            info!("fetching random quote: url={}", self.url);
            let response = self
                .client
                .get(&self.url)
                .send()
                .await
                .map_err(|err| self.map_error(err))?;

            let status = response.status();
            if !status.is_success() {
                let body = read_error_excerpt(response).await;
                warn!(
                    "quote service error: url={} status={} body={}",
                    self.url, status, body
                );
                return Err(QuoteFetchError::Status {
                    status: status.as_u16(),
                    body,
                });
            }

            let body = response.bytes().await.map_err(|err| self.map_error(err))?;
            let quote: Quote = serde_json::from_slice(&body)
                .map_err(|err| QuoteFetchError::Decode(err.to_string()))?;
            info!(
                "fetched quote: author={:?} chars={}",
                quote.author,
                quote.content.chars().count()
            );
            Ok(quote)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingProvider {
        calls: AtomicUsize,
    }

    impl QuoteProvider for CountingProvider {
        async fn random_quote(&self) -> Result<Quote, QuoteFetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Quote {
                content: "Fetched".to_string(),
                author: "Remote".to_string(),
            })
        }
    }

    #[tokio::test]
    async fn supplied_text_skips_the_provider() {
        let provider = CountingProvider::default();
        let params = QuoteParams {
            text: Some("Hello".to_string()),
            ..Default::default()
        };
        let quote = resolve_quote(&params, &provider).await.expect("quote");
        assert_eq!(quote.content, "Hello");
        assert_eq!(quote.author, "");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_text_fetches_exactly_once() {
        let provider = CountingProvider::default();
        let params = QuoteParams {
            author: Some("ignored".to_string()),
            ..Default::default()
        };
        let quote = resolve_quote(&params, &provider).await.expect("quote");
        assert_eq!(quote.content, "Fetched");
        assert_eq!(quote.author, "Remote");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_text_counts_as_missing() {
        let provider = CountingProvider::default();
        let params = QuoteParams {
            text: Some(String::new()),
            ..Default::default()
        };
        resolve_quote(&params, &provider).await.expect("quote");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[cfg(feature = "server")]
    #[test]
    fn error_body_excerpt_is_capped() {
        let long = vec![b'x'; 4096];
        assert_eq!(http::excerpt(&long).len(), http::ERROR_BODY_LIMIT);
        assert_eq!(http::excerpt(b"bad gateway"), "bad gateway");
        // A multi-byte character cut at the limit is replaced, not a panic.
        let mut cut = vec![b'a'; http::ERROR_BODY_LIMIT - 1];
        cut.extend_from_slice("\u{e9}".as_bytes());
        assert!(http::excerpt(&cut).ends_with('\u{fffd}'));
    }

    #[test]
    fn params_defaults() {
        let params = QuoteParams::default();
        assert_eq!(params.theme(), "light");
        assert_eq!(params.font(), "sans");
        assert_eq!(params.format(), "png");
        assert_eq!(params.size(), "md");
    }

    #[test]
    fn quote_payload_ignores_extra_fields() {
        let quote: Quote = serde_json::from_str(
            r#"{"_id":"x","content":"Be yourself.","author":"Oscar Wilde","tags":["famous"]}"#,
        )
        .expect("decode");
        assert_eq!(quote.content, "Be yourself.");
        assert_eq!(quote.author, "Oscar Wilde");
    }
}
