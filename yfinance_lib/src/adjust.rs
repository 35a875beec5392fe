use polars::prelude::*;

use crate::error::YfinanceError;
use crate::parse::TIMESTAMP;
use crate::table::Field;

/// Column order of an auto-adjusted table, after the timestamp.
pub const ADJUSTED_COLUMNS: [Field; 5] = [
    Field::Open,
    Field::High,
    Field::Low,
    Field::Close,
    Field::Volume,
];

/// Rescales Open/High/Low by the Close / Adj Close ratio of each row and
/// promotes Adj Close to Close. Volume is carried unchanged.
///
/// A row missing Close or Adj Close gets null Open/High/Low. A NaN ratio
/// (both prices zero) also yields nulls, so the row is dropped with the
/// other incomplete bars.
pub fn auto_adjust(quotes: DataFrame) -> Result<DataFrame, YfinanceError> {
    let ratio = col(Field::Close.name()) / col(Field::AdjClose.name());
    let scaled = |field: Field| {
        (col(field.name()) / ratio.clone())
            .fill_nan(lit(NULL))
            .alias(field.name())
    };

    Ok(quotes
        .lazy()
        .select([
            col(TIMESTAMP),
            scaled(Field::Open),
            scaled(Field::High),
            scaled(Field::Low),
            col(Field::AdjClose.name()).alias(Field::Close.name()),
            col(Field::Volume.name()),
        ])
        .collect()?)
}
