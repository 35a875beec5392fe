use yfinance_api::types::{ChartResponse, QuoteResponse};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

#[test]
fn deserialize_chart_full() {
    let json = load_fixture("chart_daily.json");
    let resp: ChartResponse = serde_json::from_str(&json).unwrap();
    assert!(resp.chart.error.is_none());

    let results = resp.chart.result.unwrap();
    assert_eq!(results.len(), 1);
    let result = &results[0];
    assert_eq!(result.meta.price_hint, 2);
    assert_eq!(result.meta.exchange_timezone_name, "America/New_York");
    assert_eq!(result.meta.symbol.as_deref(), Some("MSFT"));
    assert_eq!(result.timestamp, vec![1704983400, 1704897000, 1705069800]);

    let quote = &result.indicators.quote[0];
    assert_eq!(quote.open[0], Some(386.123));
    assert_eq!(quote.volume[2], None);

    let adj = result.indicators.adjclose.as_ref().unwrap();
    assert_eq!(adj[0].adjclose[1], Some(379.10));

    let events = result.events.as_ref().unwrap();
    let dividends = events.dividends.as_ref().unwrap();
    assert_eq!(dividends["1707834600"].amount, 0.75);
    let splits = events.splits.as_ref().unwrap();
    let split = &splits["1045488600"];
    assert_eq!(split.numerator, 2.0);
    assert_eq!(split.denominator, 1.0);
    assert_eq!(split.split_ratio.as_deref(), Some("2:1"));
}

#[test]
fn deserialize_chart_error() {
    let json = load_fixture("chart_error.json");
    let resp: ChartResponse = serde_json::from_str(&json).unwrap();
    assert!(resp.chart.result.is_none());
    let error = resp.chart.error.unwrap();
    assert_eq!(error.code, "Not Found");
    assert_eq!(error.description, "No data found, symbol may be delisted");
}

#[test]
fn deserialize_chart_without_bars() {
    let json = load_fixture("chart_empty_range.json");
    let resp: ChartResponse = serde_json::from_str(&json).unwrap();
    let result = &resp.chart.result.unwrap()[0];
    assert!(result.timestamp.is_empty());
    assert!(result.indicators.quote[0].close.is_empty());
    assert!(result.events.is_none());
}

#[test]
fn deserialize_quote_snapshot() {
    let json = load_fixture("quote.json");
    let resp: QuoteResponse = serde_json::from_str(&json).unwrap();
    assert_eq!(resp.quote_response.result.len(), 1);
    assert_eq!(resp.quote_response.result[0]["shortName"], "Microsoft Corporation");

    let json = load_fixture("quote_empty.json");
    let resp: QuoteResponse = serde_json::from_str(&json).unwrap();
    assert!(resp.quote_response.result.is_empty());
}

#[test]
fn deserialize_missing_meta_returns_error() {
    let json = r#"{"chart": {"result": [{"timestamp": [1], "indicators": {"quote": []}}], "error": null}}"#;
    let result = serde_json::from_str::<ChartResponse>(json);
    assert!(result.is_err());
}
