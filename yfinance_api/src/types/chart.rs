//! Wire types for the `/v8/finance/chart/{symbol}` endpoint.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level envelope of a chart response.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChartResponse {
    pub chart: Chart,
}

/// Either a list of results or a populated `error`. Yahoo sends both keys and
/// nulls the unused one.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Chart {
    #[serde(default)]
    pub result: Option<Vec<ChartResult>>,
    #[serde(default)]
    pub error: Option<ChartError>,
}

/// Server-side failure, e.g. `Not Found` for an unknown symbol.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChartError {
    #[serde(default)]
    pub code: String,
    pub description: String,
}

/// One instrument's chart data.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct ChartResult {
    pub meta: ChartMeta,

    /// Bar open times in Unix seconds. Absent when the range holds no bars.
    #[serde(default)]
    pub timestamp: Vec<i64>,

    pub indicators: Indicators,

    /// Dividend and split events. Only present when the range contains any.
    #[serde(default)]
    pub events: Option<Events>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ChartMeta {
    /// Number of decimals prices are quoted with.
    pub price_hint: u32,

    /// IANA zone of the listing exchange, e.g. `America/New_York`.
    pub exchange_timezone_name: String,

    #[serde(default)]
    pub symbol: Option<String>,
    #[serde(default)]
    pub currency: Option<String>,
    #[serde(default)]
    pub instrument_type: Option<String>,
    #[serde(default)]
    pub data_granularity: Option<String>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Indicators {
    #[serde(default)]
    pub quote: Vec<QuoteIndicator>,
    #[serde(default)]
    pub adjclose: Option<Vec<AdjCloseIndicator>>,
}

/// Parallel OHLCV arrays, one slot per timestamp. Slots are `null` for bars
/// the exchange did not report.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct QuoteIndicator {
    #[serde(default)]
    pub open: Vec<Option<f64>>,
    #[serde(default)]
    pub high: Vec<Option<f64>>,
    #[serde(default)]
    pub low: Vec<Option<f64>>,
    #[serde(default)]
    pub close: Vec<Option<f64>>,
    #[serde(default)]
    pub volume: Vec<Option<i64>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct AdjCloseIndicator {
    #[serde(default)]
    pub adjclose: Vec<Option<f64>>,
}

/// Event maps keyed by the event's Unix timestamp rendered as a string.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct Events {
    #[serde(default)]
    pub dividends: Option<BTreeMap<String, DividendEvent>>,
    #[serde(default)]
    pub splits: Option<BTreeMap<String, SplitEvent>>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct DividendEvent {
    pub amount: f64,
    pub date: i64,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SplitEvent {
    pub date: i64,
    pub numerator: f64,
    pub denominator: f64,
    #[serde(default)]
    pub split_ratio: Option<String>,
}
