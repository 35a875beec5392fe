//! HTTP client for the Yahoo! Finance query API.

use std::time::Duration;

use reqwest::StatusCode;
use url::Url;

use crate::{
    query::{ChartQuery, Query, QuoteQuery},
    types::{ChartResponse, ChartResult, QuoteResponse},
    user_agent::get_user_agent,
    Error,
};

const QUOTE_PATH: &str = "/v7/finance/quote";
const CHART_PATH: &str = "/v8/finance/chart";

/// HTTP client for the Yahoo! Finance query API.
///
/// Sends requests with a randomized browser user agent. Each request builds a
/// fresh `reqwest::Client` with a 30-second timeout. Requests are never
/// retried.
#[derive(Clone, Debug)]
pub struct Client {
    /// Base URL for the API. Defaults to `https://query1.finance.yahoo.com`.
    base_api_url: String,
}

impl Default for Client {
    fn default() -> Self {
        Self::new()
    }
}

impl Client {
    /// Creates a new client pointing at the production Yahoo! Finance host.
    pub fn new() -> Self {
        Self {
            base_api_url: "https://query1.finance.yahoo.com".to_string(),
        }
    }

    /// Creates a new client with a custom base URL. Used for testing with wiremock.
    pub fn with_base_url(base_url: &str) -> Self {
        Self {
            base_api_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn get_url(&self, path: &str, segment: Option<&str>, query: &impl Query) -> Result<Url, Error> {
        let mut url = Url::parse(format!("{}{}", &self.base_api_url, path).as_str()).map_err(|e| {
            tracing::error!("Invalid URL constructed: {}", e);
            Error::RequestFailed
        })?;
        if let Some(segment) = segment {
            url.path_segments_mut()
                .map_err(|_| {
                    tracing::error!("Base URL cannot carry path segments: {}", self.base_api_url);
                    Error::RequestFailed
                })?
                .push(segment);
        }
        Ok(query.add_to_url(&url))
    }

    /// Sends a GET and returns the status with the raw body. Status handling is
    /// left to the caller: the chart endpoint reports failures in the body of
    /// non-success responses.
    async fn get(&self, url: Url) -> Result<(StatusCode, String), Error> {
        tracing::debug!("GET {}", url);
        let client = reqwest::Client::builder()
            .user_agent(get_user_agent())
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| {
                tracing::error!("Failed to build HTTP client: {}", e);
                Error::RequestFailed
            })?;
        let resp = client
            .get(url)
            .header("accept", "application/json, text/plain, */*")
            .header("accept-language", "en-US,en;q=0.9")
            .send()
            .await
            .map_err(|e| {
                tracing::error!("Failed to get resource: {}", e);
                Error::RequestFailed
            })?;

        let status = resp.status();
        let body = resp.text().await.map_err(|e| {
            tracing::error!("Failed to read response body: {}", e);
            Error::RequestFailed
        })?;
        Ok((status, body))
    }

    /// Fetches the quote snapshot for the symbols in `query`.
    pub async fn get_quote(&self, query: &QuoteQuery) -> Result<QuoteResponse, Error> {
        let url = self.get_url(QUOTE_PATH, None, query)?;
        let (status, body) = self.get(url).await?;

        if !status.is_success() {
            let snippet = truncate_body(&body);
            tracing::error!("Request failed with status {}: {}", status, snippet);
            return Err(Error::HttpStatus {
                status: status.as_u16(),
                body: snippet,
            });
        }

        serde_json::from_str::<QuoteResponse>(&body).map_err(|e| {
            let snippet = truncate_body(&body);
            tracing::error!("Failed to parse quote response: {} | body: {}", e, snippet);
            Error::MalformedResponse(e.to_string())
        })
    }

    /// Fetches chart data for one symbol and returns its first result.
    ///
    /// A populated `chart.error` fails with [`Error::Chart`] whatever the HTTP
    /// status; Yahoo answers unknown symbols with a 404 carrying that error.
    pub async fn get_chart(&self, symbol: &str, query: &ChartQuery) -> Result<ChartResult, Error> {
        let url = self.get_url(CHART_PATH, Some(symbol), query)?;
        let (status, body) = self.get(url).await?;

        let parsed = serde_json::from_str::<ChartResponse>(&body);
        match parsed {
            Ok(resp) => {
                if let Some(error) = resp.chart.error {
                    tracing::warn!("Chart request for {} failed: {}", symbol, error.description);
                    return Err(Error::Chart {
                        code: error.code,
                        description: error.description,
                    });
                }
                if !status.is_success() {
                    return Err(http_status_error(status, &body));
                }
                resp.chart
                    .result
                    .and_then(|results| results.into_iter().next())
                    .ok_or_else(|| {
                        tracing::error!("Chart response for {} has no result", symbol);
                        Error::MalformedResponse("chart.result is empty".to_string())
                    })
            }
            Err(_) if !status.is_success() => Err(http_status_error(status, &body)),
            Err(e) => {
                let snippet = truncate_body(&body);
                tracing::error!("Failed to parse chart response: {} | body: {}", e, snippet);
                Err(Error::MalformedResponse(e.to_string()))
            }
        }
    }
}

fn http_status_error(status: StatusCode, body: &str) -> Error {
    let snippet = truncate_body(body);
    tracing::error!("Request failed with status {}: {}", status, snippet);
    Error::HttpStatus {
        status: status.as_u16(),
        body: snippet,
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 2000;
    if body.len() <= MAX {
        body.to_string()
    } else {
        let mut end = MAX;
        while !body.is_char_boundary(end) {
            end -= 1;
        }
        format!("{}...[truncated]", &body[..end])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chart_url_includes_symbol_segment() {
        let client = Client::with_base_url("http://localhost:1234/");
        let url = client
            .get_url(CHART_PATH, Some("BRK-B"), &ChartQuery::default())
            .unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/BRK-B");
        assert!(url.query().unwrap().contains("range=1mo"));
    }

    #[test]
    fn chart_url_escapes_slashes_in_symbol() {
        let client = Client::new();
        let url = client
            .get_url(CHART_PATH, Some("A/B"), &ChartQuery::default())
            .unwrap();
        assert_eq!(url.path(), "/v8/finance/chart/A%2FB");
    }

    #[test]
    fn quote_url_has_symbols_param() {
        let client = Client::new();
        let url = client
            .get_url(QUOTE_PATH, None, &QuoteQuery::default().with_symbol("MSFT"))
            .unwrap();
        assert_eq!(url.as_str(), "https://query1.finance.yahoo.com/v7/finance/quote?symbols=MSFT");
    }

    #[test]
    fn truncate_body_short_passthrough() {
        assert_eq!(truncate_body("short"), "short");
    }

    #[test]
    fn truncate_body_long_is_cut() {
        let body = "x".repeat(2500);
        let out = truncate_body(&body);
        assert!(out.ends_with("...[truncated]"));
        assert_eq!(out.len(), 2000 + "...[truncated]".len());
    }
}
