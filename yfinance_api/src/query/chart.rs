//! Query builder for the `/v8/finance/chart/{symbol}` endpoint.

use url::Url;

use super::Query;

/// Event streams requested alongside every chart query.
const EVENTS: &str = "div,splits";

/// Time range selector for a chart request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ChartRange {
    /// A named relative period such as `1mo` or `ytd`, sent as `range`.
    Period(String),
    /// Explicit Unix-second bounds, sent as `period1` and `period2`.
    Span { period1: i64, period2: i64 },
}

impl Default for ChartRange {
    fn default() -> Self {
        ChartRange::Period("1mo".to_string())
    }
}

#[derive(Clone, Debug)]
pub struct ChartQuery {
    pub range: ChartRange,
    pub interval: String,
    pub include_pre_post: bool,
}

impl Default for ChartQuery {
    fn default() -> Self {
        Self {
            range: ChartRange::default(),
            interval: "1d".to_string(),
            include_pre_post: false,
        }
    }
}

impl Query for ChartQuery {
    fn add_to_url(&self, url: &Url) -> Url {
        let mut url = url.clone();
        match &self.range {
            ChartRange::Period(period) => {
                url.query_pairs_mut()
                    .append_pair("range", &period.to_lowercase());
            }
            ChartRange::Span { period1, period2 } => {
                url.query_pairs_mut()
                    .append_pair("period1", &period1.to_string())
                    .append_pair("period2", &period2.to_string());
            }
        }
        url.query_pairs_mut()
            .append_pair("interval", &self.interval.to_lowercase())
            .append_pair("includePrePost", &self.include_pre_post.to_string())
            .append_pair("events", EVENTS);
        url
    }
}

impl ChartQuery {
    pub fn with_period(mut self, period: &str) -> Self {
        self.range = ChartRange::Period(period.to_string());
        self
    }

    pub fn with_span(mut self, period1: i64, period2: i64) -> Self {
        self.range = ChartRange::Span { period1, period2 };
        self
    }

    pub fn with_interval(mut self, interval: &str) -> Self {
        self.interval = interval.to_string();
        self
    }

    pub fn with_pre_post(mut self, include_pre_post: bool) -> Self {
        self.include_pre_post = include_pre_post;
        self
    }
}
