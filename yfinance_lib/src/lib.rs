//! Yahoo! Finance history downloader: price tables, corporate actions and
//! batch downloads on top of the `yfinance_api` HTTP client.
//!
//! A [`Ticker`] fetches one instrument's history and keeps the last table in
//! memory for its dividend, split and action accessors. [`download`] runs
//! the same fetch for several instruments in sequence and joins the tables.
//! Tables are polars [`DataFrame`]s; see [`table`] for their layout.

pub mod adjust;
pub mod download;
pub mod error;
pub mod history;
pub mod parse;
pub mod progress;
pub mod table;
pub mod ticker;

pub use yfinance_api;
pub use yfinance_api::types;
pub use yfinance_api::Client;

pub use polars;
pub use polars::prelude::DataFrame;

pub use download::{download, download_with_client, Download, DownloadParams, GroupBy, TickerList};
pub use error::YfinanceError;
pub use progress::ProgressBar;
pub use table::{
    column_names, float_values, group_key, index_labels, index_name, int_values, Axis, Field,
};
pub use ticker::{DateBound, HistoryParams, Ticker};
