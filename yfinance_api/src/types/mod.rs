mod chart;
pub use self::chart::{
    AdjCloseIndicator, Chart, ChartError, ChartMeta, ChartResponse, ChartResult, DividendEvent,
    Events, Indicators, QuoteIndicator, SplitEvent,
};

mod quote;
pub use self::quote::{QuoteResponse, QuoteResult};
