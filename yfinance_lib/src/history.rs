//! Normalization of one chart result into a history table.
//!
//! Pipeline: parse quotes, optionally auto-adjust, round to the price hint,
//! zero-fill Volume, drop incomplete quote rows, full-join dividends and
//! splits, then move the index into the exchange timezone.

use chrono::DateTime;
use chrono_tz::Tz;
use polars::prelude::*;
use yfinance_api::types::ChartResult;

use crate::adjust;
use crate::error::YfinanceError;
use crate::parse::{parse_actions, parse_quotes, TIMESTAMP};
use crate::table::{days_from_date, has_column, Axis, Field};

/// Columns removed from the returned table when actions are not requested.
pub const ACTION_COLUMNS: [Field; 2] = [Field::Dividends, Field::StockSplits];

const PRICE_COLUMNS: [Field; 5] = [
    Field::Open,
    Field::High,
    Field::Low,
    Field::Close,
    Field::AdjClose,
];

/// True for minute-based intervals (`1m`, `5m`, `90m`, ...).
pub fn is_intraday(interval: &str) -> bool {
    interval.to_lowercase().ends_with('m')
}

/// Index axis used for tables fetched at `interval`.
pub fn axis_for(interval: &str) -> Axis {
    if is_intraday(interval) {
        Axis::Datetime
    } else {
        Axis::Date
    }
}

/// Full outer join that merges both key columns into one.
pub(crate) fn full_join() -> JoinArgs {
    JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns)
}

/// Builds the full history table, action columns included.
pub fn build_history(
    data: &ChartResult,
    interval: &str,
    auto_adjust: bool,
) -> Result<DataFrame, YfinanceError> {
    let mut quotes = parse_quotes(data)?;
    if auto_adjust {
        quotes = adjust::auto_adjust(quotes)?;
    }

    let decimals = data.meta.price_hint;
    let mut cleanup: Vec<Expr> = PRICE_COLUMNS
        .iter()
        .filter(|field| has_column(&quotes, field.name()))
        .map(|field| col(field.name()).round(decimals))
        .collect();
    cleanup.push(col(Field::Volume.name()).fill_null(lit(0i64)));
    let quotes = quotes
        .lazy()
        .with_columns(cleanup)
        .collect()?
        .drop_nulls::<String>(None)?;

    let (dividends, splits) = parse_actions(data)?;
    let zero_actions: Vec<Expr> = ACTION_COLUMNS
        .iter()
        .map(|field| col(field.name()).fill_null(lit(0.0)))
        .collect();
    let history = quotes
        .lazy()
        .join(dividends.lazy(), [col(TIMESTAMP)], [col(TIMESTAMP)], full_join())
        .join(splits.lazy(), [col(TIMESTAMP)], [col(TIMESTAMP)], full_join())
        .with_columns(zero_actions)
        .sort([TIMESTAMP], SortMultipleOptions::default().with_maintain_order(true))
        .collect()?;

    localize(history, &data.meta.exchange_timezone_name, interval)
}

/// Replaces the Unix-seconds key with the named index column in the
/// exchange timezone. Daily and coarser intervals are truncated to the local
/// calendar date.
fn localize(history: DataFrame, tz_name: &str, interval: &str) -> Result<DataFrame, YfinanceError> {
    let tz: Tz = tz_name
        .parse()
        .map_err(|_| YfinanceError::Malformed(format!("unknown exchange timezone {}", tz_name)))?;

    let seconds = history.column(TIMESTAMP)?.i64()?;
    let out_of_range = |secs: Option<i64>| {
        YfinanceError::Malformed(format!("timestamp {:?} is out of range", secs))
    };

    let index = match axis_for(interval) {
        Axis::Datetime => {
            let millis = seconds
                .into_iter()
                .map(|s| s.and_then(|v| v.checked_mul(1000)).ok_or_else(|| out_of_range(s)))
                .collect::<Result<Vec<i64>, _>>()?;
            Column::new(Axis::Datetime.name().into(), millis).cast(&DataType::Datetime(
                TimeUnit::Milliseconds,
                Some(tz.name().into()),
            ))?
        }
        Axis::Date => {
            let days = seconds
                .into_iter()
                .map(|s| {
                    s.and_then(|v| DateTime::from_timestamp(v, 0))
                        .map(|dt| days_from_date(dt.with_timezone(&tz).date_naive()))
                        .ok_or_else(|| out_of_range(s))
                })
                .collect::<Result<Vec<i32>, _>>()?;
            Column::new(Axis::Date.name().into(), days).cast(&DataType::Date)?
        }
    };

    let mut columns = vec![index];
    columns.extend(history.drop(TIMESTAMP)?.get_columns().iter().cloned());
    Ok(DataFrame::new(columns)?)
}
