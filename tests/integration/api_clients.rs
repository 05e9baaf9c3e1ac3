//! HTTP client tests against mocked provider endpoints.

use assert_matches::assert_matches;
use pretty_assertions::assert_eq;
use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use holdings_scanner::api::{HoldingsProvider, NasdaqClient, QuoteProvider, YahooClient};
use holdings_scanner::engine::normalizer::normalize_table;
use holdings_scanner::error::ProviderError;
use holdings_scanner::models::HolderCategory;

#[test_log::test(tokio::test)]
async fn nasdaq_share_counts_become_percentages() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/company/AAA/institutional-holdings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": {
                "holdingsTransactions": { "table": { "rows": [
                    { "ownerName": "BLACKROCK INC.", "sharesHeld": "1,800,000", "date": "06/30/2026" },
                    { "ownerName": "VANGUARD GROUP INC", "sharesHeld": "1,600,000", "date": "06/30/2026" },
                    { "ownerName": "STATE STREET CORP", "sharesHeld": "900,000", "date": "06/30/2026" }
                ]}},
                "ownershipSummary": {
                    "ShareoutstandingTotal": { "label": "Total Shares Outstanding (MM)", "value": "40" }
                }
            },
            "status": { "rCode": 200 }
        })))
        .mount(&server)
        .await;

    let client = NasdaqClient::with_base_url(server.uri()).unwrap();
    let table = client.holder_table("AAA").await.unwrap().unwrap();

    assert_eq!(table.source, "nasdaq");
    assert_eq!(table.rows.len(), 3);

    // 40MM outstanding: 1.8M held is 4.5 points.
    let normalized = normalize_table(&table);
    assert_eq!(normalized.percent_for(HolderCategory::Blackrock), 4.5);
    assert_eq!(normalized.percent_for(HolderCategory::Vanguard), 4.0);
    assert_eq!(normalized.defaulted_rows, 0);
}

#[test_log::test(tokio::test)]
async fn nasdaq_unsuccessful_payload_is_unavailable_not_an_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api/company/ZZZ/institutional-holdings"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": null,
            "status": { "rCode": 400 }
        })))
        .mount(&server)
        .await;

    let client = NasdaqClient::with_base_url(server.uri()).unwrap();
    assert!(client.holder_table("ZZZ").await.unwrap().is_none());
}

#[test_log::test(tokio::test)]
async fn nasdaq_http_failure_surfaces_as_a_status_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(403))
        .mount(&server)
        .await;

    let client = NasdaqClient::with_base_url(server.uri()).unwrap();
    let err = client.holder_table("AAA").await.unwrap_err();
    assert_matches!(err, ProviderError::Status { status: 403, .. });
}

#[test_log::test(tokio::test)]
async fn yahoo_price_comes_from_the_chart_meta() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/AAA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": { "result": [ { "meta": { "regularMarketPrice": 1.23 } } ] }
        })))
        .mount(&server)
        .await;

    let client = YahooClient::with_base_url(server.uri()).unwrap();
    assert_eq!(client.latest_price("AAA").await.unwrap(), Some(1.23));
}

#[test_log::test(tokio::test)]
async fn yahoo_missing_price_is_none() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v8/finance/chart/NOPE"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "chart": { "result": [ { "meta": {} } ] }
        })))
        .mount(&server)
        .await;

    let client = YahooClient::with_base_url(server.uri()).unwrap();
    assert_eq!(client.latest_price("NOPE").await.unwrap(), None);
}

#[test_log::test(tokio::test)]
async fn yahoo_fractions_convert_to_percentage_points_at_ingestion() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/AAA"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quoteSummary": { "result": [ { "institutionOwnership": { "ownershipList": [
                {
                    "organization": "Blackrock Inc.",
                    "pctHeld": { "raw": 0.048, "fmt": "4.80%" },
                    "reportDate": { "raw": 1782864000, "fmt": "2026-06-30" }
                },
                {
                    "organization": "Vanguard Group, Inc. (The)",
                    "pctHeld": { "raw": 0.041, "fmt": "4.10%" },
                    "reportDate": { "fmt": "2026-06-30" }
                }
            ]}}]}
        })))
        .mount(&server)
        .await;

    let client = YahooClient::with_base_url(server.uri()).unwrap();
    let table = client.holder_table("AAA").await.unwrap().unwrap();
    assert_eq!(table.source, "yahoo");

    let normalized = normalize_table(&table);
    assert!((normalized.percent_for(HolderCategory::Blackrock) - 4.8).abs() < 1e-9);
    assert!((normalized.percent_for(HolderCategory::Vanguard) - 4.1).abs() < 1e-9);

    let record = normalized.record_for(HolderCategory::Blackrock).unwrap();
    assert_eq!(
        record.as_of_date,
        chrono::NaiveDate::from_ymd_opt(2026, 6, 30)
    );
}

#[test_log::test(tokio::test)]
async fn yahoo_empty_ownership_list_is_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v10/finance/quoteSummary/ZZZ"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "quoteSummary": { "result": [ { "institutionOwnership": { "ownershipList": [] } } ] }
        })))
        .mount(&server)
        .await;

    let client = YahooClient::with_base_url(server.uri()).unwrap();
    assert!(client.holder_table("ZZZ").await.unwrap().is_none());
}
