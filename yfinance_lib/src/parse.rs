//! Conversion of a chart result into quote and action tables.
//!
//! Tables produced here are keyed by a `timestamp` column of Unix seconds;
//! the named index column is only built later, once quotes and actions are
//! joined and moved into the exchange timezone.

use polars::prelude::*;
use yfinance_api::types::ChartResult;

use crate::error::YfinanceError;
use crate::table::Field;

/// Join key of the intermediate tables, in Unix seconds.
pub const TIMESTAMP: &str = "timestamp";

/// Columns of a freshly parsed quote table, after [`TIMESTAMP`].
pub const QUOTE_COLUMNS: [Field; 6] = [
    Field::Open,
    Field::High,
    Field::Low,
    Field::Close,
    Field::AdjClose,
    Field::Volume,
];

fn check_len<T>(name: &str, values: &[T], expected: usize) -> Result<(), YfinanceError> {
    if values.len() != expected {
        return Err(YfinanceError::Malformed(format!(
            "{} has {} entries for {} timestamps",
            name,
            values.len(),
            expected
        )));
    }
    Ok(())
}

fn sorted(df: DataFrame) -> Result<DataFrame, YfinanceError> {
    Ok(df
        .lazy()
        .sort([TIMESTAMP], SortMultipleOptions::default().with_maintain_order(true))
        .collect()?)
}

fn price_column(field: Field, values: &[Option<f64>]) -> Column {
    Column::new(field.name().into(), values.to_vec())
}

/// Builds the quote table from the parallel OHLCV arrays.
///
/// Adj Close comes from the separate `adjclose` indicator when Yahoo sends
/// one, otherwise it repeats Close. Rows are sorted ascending by timestamp;
/// `null` slots stay null.
pub fn parse_quotes(data: &ChartResult) -> Result<DataFrame, YfinanceError> {
    let timestamps = &data.timestamp;
    let n = timestamps.len();

    let Some(ohlc) = data.indicators.quote.first() else {
        if n == 0 {
            return empty_quotes();
        }
        return Err(YfinanceError::Malformed(
            "indicators.quote is empty".to_string(),
        ));
    };

    check_len("open", &ohlc.open, n)?;
    check_len("high", &ohlc.high, n)?;
    check_len("low", &ohlc.low, n)?;
    check_len("close", &ohlc.close, n)?;
    check_len("volume", &ohlc.volume, n)?;

    let adjclose = match data
        .indicators
        .adjclose
        .as_ref()
        .and_then(|adj| adj.first())
    {
        Some(adj) => {
            check_len("adjclose", &adj.adjclose, n)?;
            &adj.adjclose
        }
        None => &ohlc.close,
    };

    let df = DataFrame::new(vec![
        Column::new(TIMESTAMP.into(), timestamps.clone()),
        price_column(Field::Open, &ohlc.open),
        price_column(Field::High, &ohlc.high),
        price_column(Field::Low, &ohlc.low),
        price_column(Field::Close, &ohlc.close),
        price_column(Field::AdjClose, adjclose),
        Column::new(Field::Volume.name().into(), ohlc.volume.clone()),
    ])?;
    sorted(df)
}

fn empty_quotes() -> Result<DataFrame, YfinanceError> {
    let mut columns = vec![Column::new(TIMESTAMP.into(), Vec::<i64>::new())];
    for field in QUOTE_COLUMNS.iter() {
        columns.push(match field {
            Field::Volume => Column::new(field.name().into(), Vec::<Option<i64>>::new()),
            _ => price_column(*field, &[]),
        });
    }
    Ok(DataFrame::new(columns)?)
}

fn event_table(field: Field, events: Vec<(i64, f64)>) -> Result<DataFrame, YfinanceError> {
    let (stamps, values): (Vec<i64>, Vec<f64>) = events.into_iter().unzip();
    sorted(DataFrame::new(vec![
        Column::new(TIMESTAMP.into(), stamps),
        Column::new(field.name().into(), values),
    ])?)
}

/// Builds the dividend and split tables from the `events` block.
///
/// Each table has [`TIMESTAMP`] and a single value column (Dividends or
/// Stock Splits). A missing event kind yields an empty table with the
/// correct columns rather than an error. Split ratios are numerator divided
/// by denominator.
pub fn parse_actions(data: &ChartResult) -> Result<(DataFrame, DataFrame), YfinanceError> {
    let events = data.events.as_ref();

    let dividends: Vec<(i64, f64)> = events
        .and_then(|e| e.dividends.as_ref())
        .map(|d| d.values().map(|event| (event.date, event.amount)).collect())
        .unwrap_or_default();
    let splits: Vec<(i64, f64)> = events
        .and_then(|e| e.splits.as_ref())
        .map(|s| {
            s.values()
                .map(|event| (event.date, event.numerator / event.denominator))
                .collect()
        })
        .unwrap_or_default();

    Ok((
        event_table(Field::Dividends, dividends)?,
        event_table(Field::StockSplits, splits)?,
    ))
}
