use yfinance_api::{ChartQuery, ChartRange, Query, QuoteQuery};
use url::Url;

fn base_url() -> Url {
    Url::parse("https://example.com").unwrap()
}

#[test]
fn chart_query_defaults() {
    let url = ChartQuery::default().add_to_url(&base_url());
    let query = url.query().unwrap();
    assert!(query.contains("range=1mo"));
    assert!(query.contains("interval=1d"));
    assert!(query.contains("includePrePost=false"));
    assert!(query.contains("events=div%2Csplits"));
    assert!(!query.contains("period1"));
}

#[test]
fn chart_query_lowercases_period_and_interval() {
    let url = ChartQuery::default()
        .with_period("YTD")
        .with_interval("1WK")
        .add_to_url(&base_url());
    let query = url.query().unwrap();
    assert!(query.contains("range=ytd"));
    assert!(query.contains("interval=1wk"));
}

#[test]
fn chart_query_with_span_replaces_range() {
    let query = ChartQuery::default().with_span(100, 200);
    assert_eq!(query.range, ChartRange::Span { period1: 100, period2: 200 });

    let url = query.with_pre_post(true).add_to_url(&base_url());
    let query = url.query().unwrap();
    assert!(query.contains("period1=100"));
    assert!(query.contains("period2=200"));
    assert!(query.contains("includePrePost=true"));
    assert!(!query.contains("range="));
}

#[test]
fn quote_query_joins_symbols() {
    let url = QuoteQuery::default()
        .with_symbol("MSFT")
        .with_symbol("AAPL")
        .add_to_url(&base_url());
    assert_eq!(url.query(), Some("symbols=MSFT%2CAAPL"));
}
