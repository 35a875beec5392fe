//! Single-instrument client with an in-memory history cache.

use std::str::FromStr;

use chrono::{DateTime, Duration, Local, NaiveDate, NaiveDateTime, TimeZone, Utc};
use polars::prelude::*;
use serde_json::{Map, Value as JsonValue};
use yfinance_api::{ChartQuery, ChartRange, Client, QuoteQuery};

use crate::error::YfinanceError;
use crate::history::{build_history, ACTION_COLUMNS};
use crate::table::{drop_columns, index_name, Field};

/// Start bound used when none is given: 1900-01-01T00:00:00Z.
pub const EARLIEST_START: i64 = -2_208_988_800;

/// Period that requests the full available history.
pub const MAX_PERIOD: &str = "max";

/// A start or end bound for an explicit history range.
///
/// Dates and naive date-times are read as local time, matching how a user
/// at this machine would read them. A wall-clock time skipped by a DST
/// transition resolves to the same time one hour later.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DateBound {
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Timestamp(i64),
}

impl DateBound {
    /// Unix seconds for this bound.
    pub fn to_unix(&self) -> Result<i64, YfinanceError> {
        let naive = match self {
            DateBound::Timestamp(secs) => return Ok(*secs),
            DateBound::Date(date) => date.and_time(chrono::NaiveTime::MIN),
            DateBound::DateTime(dt) => *dt,
        };
        wall_clock_to_unix(&Local, naive).ok_or_else(|| {
            YfinanceError::InvalidInput(format!("{} does not exist in the local timezone", naive))
        })
    }
}

/// Unix seconds of a wall-clock time in `tz`. Ambiguous times take the
/// earlier instant; times inside a DST gap are shifted forward past it.
fn wall_clock_to_unix<Tz: TimeZone>(tz: &Tz, naive: NaiveDateTime) -> Option<i64> {
    tz.from_local_datetime(&naive)
        .earliest()
        .or_else(|| tz.from_local_datetime(&(naive + Duration::hours(1))).earliest())
        .map(|dt| dt.timestamp())
}

impl FromStr for DateBound {
    type Err = YfinanceError;

    /// Parses a `YYYY-MM-DD` calendar date.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
            .map(DateBound::Date)
            .map_err(|_| YfinanceError::InvalidInput(format!("expected YYYY-MM-DD, got {:?}", s)))
    }
}

impl From<NaiveDate> for DateBound {
    fn from(date: NaiveDate) -> Self {
        DateBound::Date(date)
    }
}

impl From<NaiveDateTime> for DateBound {
    fn from(dt: NaiveDateTime) -> Self {
        DateBound::DateTime(dt)
    }
}

impl<Tz: TimeZone> From<DateTime<Tz>> for DateBound {
    fn from(dt: DateTime<Tz>) -> Self {
        DateBound::Timestamp(dt.timestamp())
    }
}

/// Parameters of a history request.
///
/// A named `period` and the explicit `start`/`end` bounds are mutually
/// exclusive: bounds are only used when `period` is unset or `max`.
#[derive(Clone, Debug, PartialEq)]
pub struct HistoryParams {
    /// Named range such as `1d`, `5d`, `1mo`, `ytd` or `max`.
    pub period: Option<String>,
    /// Range start. Defaults to [`EARLIEST_START`].
    pub start: Option<DateBound>,
    /// Range end. Defaults to now.
    pub end: Option<DateBound>,
    /// Bar size such as `1m`, `5m`, `1h`, `1d`, `1wk` or `1mo`.
    pub interval: String,
    /// Include pre- and post-market bars.
    pub prepost: bool,
    /// Keep the Dividends and Stock Splits columns in the returned table.
    pub actions: bool,
    /// Rescale OHLC through the Close / Adj Close ratio.
    pub auto_adjust: bool,
}

impl Default for HistoryParams {
    fn default() -> Self {
        Self {
            period: Some("1mo".to_string()),
            start: None,
            end: None,
            interval: "1d".to_string(),
            prepost: false,
            actions: true,
            auto_adjust: false,
        }
    }
}

impl HistoryParams {
    pub fn with_period(mut self, period: &str) -> Self {
        self.period = Some(period.to_string());
        self
    }

    /// Sets the range start and clears any named period.
    pub fn with_start(mut self, start: impl Into<DateBound>) -> Self {
        self.period = None;
        self.start = Some(start.into());
        self
    }

    /// Sets the range end and clears any named period.
    pub fn with_end(mut self, end: impl Into<DateBound>) -> Self {
        self.period = None;
        self.end = Some(end.into());
        self
    }

    pub fn with_interval(mut self, interval: &str) -> Self {
        self.interval = interval.to_string();
        self
    }

    pub fn with_prepost(mut self, prepost: bool) -> Self {
        self.prepost = prepost;
        self
    }

    pub fn with_actions(mut self, actions: bool) -> Self {
        self.actions = actions;
        self
    }

    pub fn with_auto_adjust(mut self, auto_adjust: bool) -> Self {
        self.auto_adjust = auto_adjust;
        self
    }

    /// Resolves the period or start/end bounds into the chart range to request.
    pub fn chart_range(&self) -> Result<ChartRange, YfinanceError> {
        match &self.period {
            Some(period) if !period.eq_ignore_ascii_case(MAX_PERIOD) => {
                Ok(ChartRange::Period(period.to_lowercase()))
            }
            _ => {
                let period1 = match &self.start {
                    Some(start) => start.to_unix()?,
                    None => EARLIEST_START,
                };
                let period2 = match &self.end {
                    Some(end) => end.to_unix()?,
                    None => Utc::now().timestamp(),
                };
                Ok(ChartRange::Span { period1, period2 })
            }
        }
    }

    pub fn chart_query(&self) -> Result<ChartQuery, YfinanceError> {
        Ok(ChartQuery {
            range: self.chart_range()?,
            interval: self.interval.to_lowercase(),
            include_pre_post: self.prepost,
        })
    }
}

/// Client for one instrument.
///
/// [`Ticker::history`] is the only operation that refreshes the cached
/// table, and it always replaces it. The derived accessors
/// ([`dividends`](Ticker::dividends), [`splits`](Ticker::splits),
/// [`actions`](Ticker::actions)) read the cache and perform a full-range
/// history fetch first when it is empty. If tickers are ever shared across
/// tasks, a derived read may observe a cache that a concurrent refresh is
/// about to replace.
pub struct Ticker {
    symbol: String,
    client: Client,
    history: Option<DataFrame>,
}

impl Ticker {
    /// Creates a ticker against the production API. The symbol is upper-cased.
    pub fn new(symbol: &str) -> Self {
        Self::with_client(symbol, Client::new())
    }

    pub fn with_client(symbol: &str, client: Client) -> Self {
        Self {
            symbol: symbol.trim().to_uppercase(),
            client,
            history: None,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    /// Metadata and current price snapshot. Empty when Yahoo has no result
    /// for the symbol.
    pub async fn info(&self) -> Result<Map<String, JsonValue>, YfinanceError> {
        let query = QuoteQuery::default().with_symbol(&self.symbol);
        let resp = self.client.get_quote(&query).await?;
        Ok(resp
            .quote_response
            .result
            .into_iter()
            .next()
            .unwrap_or_default())
    }

    /// Fetches and normalizes price history, replacing the cached table.
    ///
    /// The cache always keeps the action columns; the returned table drops
    /// them when `params.actions` is false. On error the cache is untouched.
    pub async fn history(&mut self, params: &HistoryParams) -> Result<DataFrame, YfinanceError> {
        let query = params.chart_query()?;
        let data = self.client.get_chart(&self.symbol, &query).await?;
        let history = build_history(&data, &query.interval, params.auto_adjust)?;

        tracing::debug!(
            "Cached {} rows of {} history for {}",
            history.height(),
            query.interval,
            self.symbol
        );
        self.history = Some(history.clone());

        if params.actions {
            Ok(history)
        } else {
            drop_columns(&history, &ACTION_COLUMNS)
        }
    }

    /// The table cached by the most recent successful [`Ticker::history`] call.
    pub fn cached_history(&self) -> Option<&DataFrame> {
        self.history.as_ref()
    }

    /// Returns the cached history, fetching the full range at the default
    /// interval when nothing is cached yet.
    async fn ensure_history(&mut self) -> Result<&DataFrame, YfinanceError> {
        if self.history.is_none() {
            tracing::debug!("No cached history for {}, fetching full range", self.symbol);
            self.history(&HistoryParams::default().with_period(MAX_PERIOD))
                .await?;
        }
        self.history
            .as_ref()
            .ok_or_else(|| YfinanceError::Malformed("history cache not populated".to_string()))
    }

    /// Non-zero dividend payments: the index and a Dividends column.
    pub async fn dividends(&mut self) -> Result<DataFrame, YfinanceError> {
        self.non_zero(Field::Dividends).await
    }

    /// Non-zero split ratios: the index and a Stock Splits column.
    pub async fn splits(&mut self) -> Result<DataFrame, YfinanceError> {
        self.non_zero(Field::StockSplits).await
    }

    async fn non_zero(&mut self, field: Field) -> Result<DataFrame, YfinanceError> {
        let history = self.ensure_history().await?;
        let index = index_name(history)?;
        Ok(history
            .clone()
            .lazy()
            .filter(col(field.name()).neq(lit(0.0)))
            .select([col(index), col(field.name())])
            .collect()?)
    }

    /// Dividends and Stock Splits for rows where at least one is non-zero.
    pub async fn actions(&mut self) -> Result<DataFrame, YfinanceError> {
        let history = self.ensure_history().await?;
        let index = index_name(history)?;
        let [dividends, splits] = ACTION_COLUMNS.map(|field| field.name());
        Ok(history
            .clone()
            .lazy()
            .filter(col(dividends).neq(lit(0.0)).or(col(splits).neq(lit(0.0))))
            .select([
                col(index),
                col(dividends).fill_null(lit(0.0)),
                col(splits).fill_null(lit(0.0)),
            ])
            .collect()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn named_period_is_forwarded_lowercased() {
        let params = HistoryParams::default().with_period("YTD");
        assert_eq!(params.chart_range().unwrap(), ChartRange::Period("ytd".to_string()));
    }

    #[test]
    fn max_period_resolves_to_full_span() {
        let params = HistoryParams::default().with_period("MAX");
        let before = Utc::now().timestamp();
        match params.chart_range().unwrap() {
            ChartRange::Span { period1, period2 } => {
                assert_eq!(period1, EARLIEST_START);
                assert!(period2 >= before);
            }
            other => panic!("expected span, got {:?}", other),
        }
    }

    #[test]
    fn start_clears_period() {
        let params = HistoryParams::default()
            .with_start(DateBound::Timestamp(1_000))
            .with_end(DateBound::Timestamp(2_000));
        assert_eq!(params.period, None);
        assert_eq!(
            params.chart_range().unwrap(),
            ChartRange::Span { period1: 1_000, period2: 2_000 }
        );
    }

    #[test]
    fn period_overrides_bounds() {
        let params = HistoryParams::default()
            .with_start(DateBound::Timestamp(1_000))
            .with_period("5d");
        assert_eq!(params.chart_range().unwrap(), ChartRange::Period("5d".to_string()));
    }

    #[test]
    fn date_string_uses_local_midnight() {
        let bound: DateBound = "2020-03-02".parse().unwrap();
        let expected = Local
            .from_local_datetime(
                &NaiveDate::from_ymd_opt(2020, 3, 2)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
            )
            .earliest()
            .unwrap()
            .timestamp();
        assert_eq!(bound.to_unix().unwrap(), expected);
    }

    #[test]
    fn bad_date_string_is_invalid_input() {
        let err = "03/02/2020".parse::<DateBound>().unwrap_err();
        assert!(matches!(err, YfinanceError::InvalidInput(_)));
    }

    #[test]
    fn dst_gap_shifts_forward() {
        let tz = chrono_tz::America::New_York;
        // 2024-03-10 02:30 does not exist in New York; 03:30 EDT is 07:30 UTC
        let skipped = NaiveDate::from_ymd_opt(2024, 3, 10)
            .unwrap()
            .and_hms_opt(2, 30, 0)
            .unwrap();
        assert_eq!(wall_clock_to_unix(&tz, skipped), Some(1_710_055_800));

        // 2024-11-03 01:30 happens twice; the EDT instant comes first
        let repeated = NaiveDate::from_ymd_opt(2024, 11, 3)
            .unwrap()
            .and_hms_opt(1, 30, 0)
            .unwrap();
        assert_eq!(wall_clock_to_unix(&tz, repeated), Some(1_730_611_800));
    }

    #[test]
    fn aware_datetime_keeps_instant() {
        let dt = DateTime::<Utc>::from_timestamp(1_700_000_000, 0).unwrap();
        assert_eq!(DateBound::from(dt).to_unix().unwrap(), 1_700_000_000);
    }

    #[test]
    fn chart_query_lowercases_interval() {
        let query = HistoryParams::default()
            .with_interval("1WK")
            .with_prepost(true)
            .chart_query()
            .unwrap();
        assert_eq!(query.interval, "1wk");
        assert!(query.include_pre_post);
    }

    #[test]
    fn ticker_symbol_is_uppercased() {
        let ticker = Ticker::new(" msft ");
        assert_eq!(ticker.symbol(), "MSFT");
        assert!(ticker.cached_history().is_none());
    }
}
