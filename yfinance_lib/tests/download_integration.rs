use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};
use yfinance_lib::{
    column_names, download_with_client, float_values, group_key, index_labels, Client, Download,
    DownloadParams, Field, GroupBy, HistoryParams, Ticker, YfinanceError,
};

fn load_fixture(name: &str) -> String {
    std::fs::read_to_string(format!("tests/fixtures/{}", name)).unwrap()
}

async fn mock_server() -> MockServer {
    let server = MockServer::start().await;
    for (symbol, fixture) in [
        ("MSFT", "chart_msft_daily.json"),
        ("AAPL", "chart_aapl_daily.json"),
    ] {
        Mock::given(method("GET"))
            .and(path(format!("/v8/finance/chart/{}", symbol)))
            .respond_with(ResponseTemplate::new(200).set_body_string(load_fixture(fixture)))
            .mount(&server)
            .await;
    }
    server
}

fn quiet() -> DownloadParams {
    DownloadParams::default().with_progress(false)
}

#[tokio::test]
async fn single_ticker_matches_direct_history() {
    let server = mock_server().await;
    let client = Client::with_base_url(&server.uri());
    let params = quiet().with_history(HistoryParams::default().with_period("1mo"));

    let result = download_with_client(&client, "msft", &params).await.unwrap();

    let mut ticker = Ticker::with_client("MSFT", client.clone());
    let direct = ticker.history(&params.history).await.unwrap();

    match result {
        Download::Single(frame) => assert!(frame.equals_missing(&direct)),
        other => panic!("expected a single table, got {:?}", other),
    }
}

#[tokio::test]
async fn two_tickers_grouped_by_column() {
    let server = mock_server().await;
    let client = Client::with_base_url(&server.uri());

    let result = download_with_client(&client, vec!["MSFT", "aapl"], &quiet())
        .await
        .unwrap();

    let Download::ByColumn(frame) = result else {
        panic!("expected column grouping");
    };

    let names = column_names(&frame);
    assert_eq!(names[0], "Date");
    let grouped = &names[1..];
    let mut sorted = grouped.to_vec();
    sorted.sort();
    assert_eq!(grouped, sorted.as_slice());
    assert_eq!(grouped.len(), 12);
    assert_eq!(grouped[0], group_key(Field::AdjClose.name(), "AAPL"));
    assert_eq!(grouped[1], "Adj Close/MSFT");
    assert!(grouped.contains(&"Open/MSFT".to_string()));
    assert!(grouped.contains(&"Volume/AAPL".to_string()));
    // actions are off by default for downloads
    assert!(!grouped.iter().any(|name| name.starts_with("Dividends")));

    // union of both instruments' dates
    assert_eq!(frame.height(), 6);
    assert_eq!(index_labels(&frame).unwrap()[0], "2003-02-17");
    let aapl_close = float_values(&frame, "Close/AAPL").unwrap();
    assert_eq!(aapl_close.iter().filter(|v| v.is_some()).count(), 3);
}

#[tokio::test]
async fn two_tickers_grouped_by_ticker() {
    let server = mock_server().await;
    let client = Client::with_base_url(&server.uri());
    let params = quiet().with_group_by(GroupBy::Ticker);

    let result = download_with_client(&client, "MSFT AAPL", &params).await.unwrap();

    let Download::ByTicker(frame) = result else {
        panic!("expected ticker grouping");
    };
    let names = column_names(&frame);
    assert_eq!(names.len(), 13);
    assert_eq!(names[1], "MSFT/Open");
    assert_eq!(names[7], "AAPL/Open");
    assert_eq!(names[12], "AAPL/Volume");
}

#[tokio::test]
async fn failing_ticker_aborts_batch() {
    let server = mock_server().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/ZZZZ"))
        .respond_with(ResponseTemplate::new(404).set_body_string(load_fixture("chart_error.json")))
        .mount(&server)
        .await;
    let client = Client::with_base_url(&server.uri());

    let err = download_with_client(&client, "MSFT ZZZZ", &quiet())
        .await
        .unwrap_err();
    assert!(matches!(err, YfinanceError::Api(_)));
    assert_eq!(err.to_string(), "No data found, symbol may be delisted");
}
