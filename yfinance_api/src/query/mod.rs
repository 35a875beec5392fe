mod common;
pub use self::common::Query;

mod chart;
pub use self::chart::{ChartQuery, ChartRange};

mod quote;
pub use self::quote::QuoteQuery;
