//! Column names and read helpers for the history tables.
//!
//! Every table is a polars [`DataFrame`] whose first column is the index:
//! `Date` (`DataType::Date`) for daily and coarser intervals, or `Datetime`
//! (`DataType::Datetime` in the exchange timezone) for intraday ones. The
//! remaining columns are named after [`Field`], or after a [`group_key`] in
//! multi-ticker downloads.

use std::fmt;

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use chrono_tz::Tz;
use polars::prelude::*;

use crate::error::YfinanceError;

/// Days between 0001-01-01 and the Unix epoch.
const EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Separator between the two levels of a grouped column name.
pub const KEY_SEPARATOR: char = '/';

/// Name of the index column.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Axis {
    /// Calendar dates, used for daily and coarser intervals.
    Date,
    /// Full timestamps, used for intraday intervals.
    Datetime,
}

impl Axis {
    pub fn name(&self) -> &'static str {
        match self {
            Axis::Date => "Date",
            Axis::Datetime => "Datetime",
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Columns a history table can carry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Field {
    Open,
    High,
    Low,
    Close,
    AdjClose,
    Volume,
    Dividends,
    StockSplits,
}

impl Field {
    pub fn name(&self) -> &'static str {
        match self {
            Field::Open => "Open",
            Field::High => "High",
            Field::Low => "Low",
            Field::Close => "Close",
            Field::AdjClose => "Adj Close",
            Field::Volume => "Volume",
            Field::Dividends => "Dividends",
            Field::StockSplits => "Stock Splits",
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Two-level column name used by grouped downloads, e.g. `Close/AAPL`.
pub fn group_key(outer: &str, inner: &str) -> String {
    format!("{}{}{}", outer, KEY_SEPARATOR, inner)
}

/// Name of the index (first) column.
pub fn index_name(df: &DataFrame) -> Result<&str, YfinanceError> {
    df.get_columns()
        .first()
        .map(|c| c.name().as_str())
        .ok_or_else(|| YfinanceError::Malformed("table has no index column".to_string()))
}

pub fn column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names().iter().map(|n| n.to_string()).collect()
}

pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.column(name).is_ok()
}

/// Values of a float column, `None` where missing.
pub fn float_values(df: &DataFrame, name: &str) -> Result<Vec<Option<f64>>, YfinanceError> {
    Ok(df.column(name)?.f64()?.into_iter().collect())
}

/// Values of an integer column, `None` where missing.
pub fn int_values(df: &DataFrame, name: &str) -> Result<Vec<Option<i64>>, YfinanceError> {
    Ok(df.column(name)?.i64()?.into_iter().collect())
}

/// Keeps every column except `drop`, preserving order.
pub fn drop_columns(df: &DataFrame, drop: &[Field]) -> Result<DataFrame, YfinanceError> {
    let keep: Vec<String> = column_names(df)
        .into_iter()
        .filter(|name| !drop.iter().any(|f| f.name() == name))
        .collect();
    Ok(df.select(keep)?)
}

pub(crate) fn date_from_days(days: i32) -> Option<NaiveDate> {
    NaiveDate::from_num_days_from_ce_opt(days.checked_add(EPOCH_DAYS_FROM_CE)?)
}

pub(crate) fn days_from_date(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - EPOCH_DAYS_FROM_CE
}

fn instant(value: i64, unit: TimeUnit) -> Option<DateTime<Utc>> {
    match unit {
        TimeUnit::Milliseconds => DateTime::from_timestamp_millis(value),
        TimeUnit::Microseconds => DateTime::from_timestamp_micros(value),
        TimeUnit::Nanoseconds => Some(DateTime::from_timestamp_nanos(value)),
    }
}

/// Renders the index as `2024-01-10` or `2024-01-10 09:30:00-05:00`.
pub fn index_labels(df: &DataFrame) -> Result<Vec<String>, YfinanceError> {
    let index = df.column(index_name(df)?)?;
    let missing = || YfinanceError::Malformed("index has a missing or out-of-range value".to_string());

    match index.dtype() {
        DataType::Date => {
            let days = index.cast(&DataType::Int32)?;
            let labels = days
                .i32()?
                .into_iter()
                .map(|d| {
                    d.and_then(date_from_days)
                        .map(|date| date.format("%Y-%m-%d").to_string())
                        .ok_or_else(missing)
                })
                .collect();
            labels
        }
        DataType::Datetime(unit, tz) => {
            let tz: Tz = match tz.as_deref() {
                Some(name) => name
                    .parse()
                    .map_err(|_| YfinanceError::Malformed(format!("unknown timezone {}", name)))?,
                None => Tz::UTC,
            };
            let unit = *unit;
            let raw = index.cast(&DataType::Int64)?;
            let labels = raw
                .i64()?
                .into_iter()
                .map(|v| {
                    v.and_then(|v| instant(v, unit))
                        .map(|dt| dt.with_timezone(&tz).format("%Y-%m-%d %H:%M:%S%:z").to_string())
                        .ok_or_else(missing)
                })
                .collect();
            labels
        }
        other => Err(YfinanceError::Malformed(format!(
            "unsupported index type {}",
            other
        ))),
    }
}
