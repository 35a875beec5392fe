//! Batch history download for several instruments.

use std::str::FromStr;

use polars::prelude::*;
use yfinance_api::Client;

use crate::error::YfinanceError;
use crate::history::{axis_for, full_join};
use crate::progress::ProgressBar;
use crate::table::{column_names, group_key, Axis};
use crate::ticker::{HistoryParams, Ticker, MAX_PERIOD};

/// Column layout of a multi-instrument result.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum GroupBy {
    /// Columns named `Field/TICKER`, sorted by field name then ticker.
    #[default]
    Column,
    /// Columns named `TICKER/Field`, in request order.
    Ticker,
}

impl FromStr for GroupBy {
    type Err = YfinanceError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "column" => Ok(GroupBy::Column),
            "ticker" => Ok(GroupBy::Ticker),
            other => Err(YfinanceError::InvalidInput(format!(
                "group_by must be column or ticker, got {}",
                other
            ))),
        }
    }
}

/// Upper-cased ticker symbols in request order.
///
/// Repeats are dropped, so `"MSFT msft"` is a single instrument: it is
/// fetched once, counts once in the progress total and yields
/// [`Download::Single`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TickerList(Vec<String>);

impl TickerList {
    pub fn new<S: AsRef<str>>(symbols: impl IntoIterator<Item = S>) -> Self {
        let mut list: Vec<String> = Vec::new();
        for symbol in symbols {
            let symbol = symbol.as_ref().trim().to_uppercase();
            if !symbol.is_empty() && !list.contains(&symbol) {
                list.push(symbol);
            }
        }
        TickerList(list)
    }

    pub fn symbols(&self) -> &[String] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Whitespace-delimited symbols, e.g. `"SPY AAPL msft"`.
impl From<&str> for TickerList {
    fn from(s: &str) -> Self {
        TickerList::new(s.split_whitespace())
    }
}

impl From<Vec<String>> for TickerList {
    fn from(v: Vec<String>) -> Self {
        TickerList::new(v)
    }
}

impl From<Vec<&str>> for TickerList {
    fn from(v: Vec<&str>) -> Self {
        TickerList::new(v)
    }
}

impl From<&[&str]> for TickerList {
    fn from(v: &[&str]) -> Self {
        TickerList::new(v.iter())
    }
}

/// Parameters shared by every instrument in a batch.
#[derive(Clone, Debug, PartialEq)]
pub struct DownloadParams {
    pub history: HistoryParams,
    pub group_by: GroupBy,
    /// Draw a progress bar on stdout.
    pub progress: bool,
}

impl Default for DownloadParams {
    /// Full history of daily bars without actions.
    fn default() -> Self {
        Self {
            history: HistoryParams::default()
                .with_period(MAX_PERIOD)
                .with_actions(false),
            group_by: GroupBy::Column,
            progress: true,
        }
    }
}

impl DownloadParams {
    pub fn with_history(mut self, history: HistoryParams) -> Self {
        self.history = history;
        self
    }

    pub fn with_group_by(mut self, group_by: GroupBy) -> Self {
        self.group_by = group_by;
        self
    }

    pub fn with_progress(mut self, progress: bool) -> Self {
        self.progress = progress;
        self
    }
}

/// Result of [`download`]. Every table starts with the `Date` or
/// `Datetime` index column.
#[derive(Clone, Debug)]
pub enum Download {
    /// Exactly one ticker was requested: its table, columns un-prefixed.
    Single(DataFrame),
    /// Columns named by [`group_key`]`(ticker, field)`.
    ByTicker(DataFrame),
    /// Columns named by [`group_key`]`(field, ticker)`, sorted by field name
    /// then ticker.
    ByColumn(DataFrame),
}

impl Download {
    pub fn frame(&self) -> &DataFrame {
        match self {
            Download::Single(df) | Download::ByTicker(df) | Download::ByColumn(df) => df,
        }
    }

    pub fn len(&self) -> usize {
        self.frame().height()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Downloads history for every ticker from the production API.
pub async fn download(
    tickers: impl Into<TickerList>,
    params: &DownloadParams,
) -> Result<Download, YfinanceError> {
    download_with_client(&Client::new(), tickers, params).await
}

/// Downloads history for every ticker, one request at a time in list order.
/// The first failing ticker aborts the batch.
pub async fn download_with_client(
    client: &Client,
    tickers: impl Into<TickerList>,
    params: &DownloadParams,
) -> Result<Download, YfinanceError> {
    let tickers: TickerList = tickers.into();
    if tickers.is_empty() {
        return Err(YfinanceError::InvalidInput("no tickers given".to_string()));
    }

    let mut progress = params
        .progress
        .then(|| ProgressBar::new(tickers.len(), "downloaded"));

    let mut frames = Vec::with_capacity(tickers.len());
    for symbol in tickers.symbols() {
        let mut ticker = Ticker::with_client(symbol, client.clone());
        let history = ticker.history(&params.history).await?;
        tracing::debug!("Downloaded {} rows for {}", history.height(), symbol);
        frames.push((symbol.clone(), history));
        if let Some(bar) = progress.as_mut() {
            bar.animate();
        }
    }
    if let Some(bar) = progress.as_mut() {
        bar.completed();
    }

    if frames.len() == 1 {
        if let Some((_, history)) = frames.pop() {
            return Ok(Download::Single(history));
        }
    }

    combine(frames, axis_for(&params.history.interval), params.group_by)
}

/// Renames each ticker's columns to their grouped names and full-joins the
/// tables on the index. Rows are the sorted union of all tickers' stamps; a
/// stamp repeated within one ticker contributes only its first row.
fn combine(
    frames: Vec<(String, DataFrame)>,
    axis: Axis,
    group_by: GroupBy,
) -> Result<Download, YfinanceError> {
    let index = axis.name();
    let key = |symbol: &str, column: &str| match group_by {
        GroupBy::Ticker => group_key(symbol, column),
        GroupBy::Column => group_key(column, symbol),
    };

    // Intraday tables from exchanges in different timezones only join in UTC.
    let mut index_types = frames
        .iter()
        .filter_map(|(_, frame)| frame.column(index).ok().map(|c| c.dtype().clone()));
    let mixed = match index_types.next() {
        Some(first) => index_types.any(|dtype| dtype != first),
        None => false,
    };
    let utc = DataType::Datetime(TimeUnit::Milliseconds, Some("UTC".into()));

    let mut order: Vec<(String, String)> = Vec::new();
    let mut tables = Vec::with_capacity(frames.len());
    for (symbol, frame) in frames {
        let mut select = vec![if mixed {
            col(index).cast(utc.clone())
        } else {
            col(index)
        }];
        for column in column_names(&frame).into_iter().skip(1) {
            select.push(col(column.as_str()).alias(key(&symbol, &column)));
            order.push((column, symbol.clone()));
        }
        tables.push(
            frame
                .lazy()
                .unique_stable(Some(vec![index.into()]), UniqueKeepStrategy::First)
                .select(select),
        );
    }

    let mut tables = tables.into_iter();
    let Some(first) = tables.next() else {
        return Err(YfinanceError::InvalidInput("no tables to combine".to_string()));
    };
    let combined = tables
        .fold(first, |acc, next| {
            acc.join(next, [col(index)], [col(index)], full_join())
        })
        .sort([index], SortMultipleOptions::default().with_maintain_order(true))
        .collect()?;

    Ok(match group_by {
        GroupBy::Ticker => Download::ByTicker(combined),
        GroupBy::Column => {
            order.sort();
            let mut names = vec![index.to_string()];
            names.extend(order.iter().map(|(field, symbol)| key(symbol, field)));
            Download::ByColumn(combined.select(names)?)
        }
    })
}
