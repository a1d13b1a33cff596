//! Baserow client tests against a mock HTTP server
//!
//! Covers pagination fan-out, page-order reassembly, all-or-nothing fetch
//! failure, the settings PATCH payload mapping and per-table load results.

use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

use bot_dashboard::baserow::BaserowClient;
use bot_dashboard::config::{Config, TableIds};
use bot_dashboard::error::Error;
use bot_dashboard::models::{ClientRecord, SettingsUpdate};

fn test_config(base_url: &str) -> Config {
    Config {
        base_url: base_url.to_string(),
        token: "test-token".to_string(),
        tables: TableIds::default(),
        page_size: 100,
    }
}

fn client_rows(range: std::ops::RangeInclusive<i64>) -> Vec<serde_json::Value> {
    range
        .map(|i| json!({"id": i, "created on": "2024-01-01T00:00:00Z"}))
        .collect()
}

#[tokio::test]
async fn fetch_follows_pagination_130_records() {
    let server = MockServer::start_async().await;

    let page1 = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/683/")
                .query_param("user_field_names", "true")
                .query_param("size", "100")
                .query_param("page", "1")
                .header("Authorization", "Token test-token");
            then.status(200)
                .json_body(json!({"count": 130, "next": null, "previous": null, "results": client_rows(1..=100)}));
        })
        .await;
    let page2 = server
        .mock_async(|when, then| {
            when.method(GET).path("/683/").query_param("page", "2");
            then.status(200)
                .json_body(json!({"count": 130, "next": null, "previous": null, "results": client_rows(101..=130)}));
        })
        .await;

    let client = BaserowClient::new(&test_config(&server.base_url())).unwrap();
    let rows: Vec<ClientRecord> = client.fetch_all_rows(683).await.unwrap();

    assert_eq!(rows.len(), 130);
    assert_eq!(rows[0].id, 1);
    assert_eq!(rows[99].id, 100);
    assert_eq!(rows[100].id, 101);
    assert_eq!(rows[129].id, 130);

    page1.assert_async().await;
    page2.assert_async().await;
}

#[tokio::test]
async fn fetch_single_page_issues_one_request() {
    let server = MockServer::start_async().await;

    let page1 = server
        .mock_async(|when, then| {
            when.method(GET).path("/683/").query_param("page", "1");
            then.status(200)
                .json_body(json!({"count": 5, "next": null, "previous": null, "results": client_rows(1..=5)}));
        })
        .await;

    let client = BaserowClient::new(&test_config(&server.base_url())).unwrap();
    let rows: Vec<ClientRecord> = client.fetch_all_rows(683).await.unwrap();

    assert_eq!(rows.len(), 5);
    page1.assert_hits_async(1).await;
}

#[tokio::test]
async fn fetch_restores_page_order_when_pages_resolve_out_of_order() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/683/").query_param("page", "1");
            then.status(200)
                .json_body(json!({"count": 250, "next": null, "previous": null, "results": client_rows(1..=100)}));
        })
        .await;
    // Page 2 arrives after page 3
    server
        .mock_async(|when, then| {
            when.method(GET).path("/683/").query_param("page", "2");
            then.status(200)
                .delay(Duration::from_millis(200))
                .json_body(json!({"count": 250, "next": null, "previous": null, "results": client_rows(101..=200)}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/683/").query_param("page", "3");
            then.status(200)
                .json_body(json!({"count": 250, "next": null, "previous": null, "results": client_rows(201..=250)}));
        })
        .await;

    let client = BaserowClient::new(&test_config(&server.base_url())).unwrap();
    let rows: Vec<ClientRecord> = client.fetch_all_rows(683).await.unwrap();

    assert_eq!(rows.len(), 250);
    for (i, row) in rows.iter().enumerate() {
        assert_eq!(row.id, i as i64 + 1, "rows must read page 1, then 2, then 3");
    }
}

#[tokio::test]
async fn fetch_fails_whole_table_when_one_page_errors() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/683/").query_param("page", "1");
            then.status(200)
                .json_body(json!({"count": 130, "next": null, "previous": null, "results": client_rows(1..=100)}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/683/").query_param("page", "2");
            then.status(500);
        })
        .await;

    let client = BaserowClient::new(&test_config(&server.base_url())).unwrap();
    let err = client.fetch_all_rows::<ClientRecord>(683).await.unwrap_err();

    assert!(matches!(
        err,
        Error::ApiStatus {
            table: 683,
            status: 500
        }
    ));
}

#[tokio::test]
async fn fetch_propagates_unauthorized_status() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/683/");
            then.status(401);
        })
        .await;

    let client = BaserowClient::new(&test_config(&server.base_url())).unwrap();
    let err = client.fetch_all_rows::<ClientRecord>(683).await.unwrap_err();

    assert!(matches!(err, Error::ApiStatus { status: 401, .. }));
}

#[tokio::test]
async fn update_settings_sends_only_mapped_fields() {
    let server = MockServer::start_async().await;

    // Exact body match: any extra key would fail the mock
    let patch = server
        .mock_async(|when, then| {
            when.method(PATCH)
                .path("/686/1/")
                .query_param("user_field_names", "true")
                .header("Authorization", "Token test-token")
                .json_body(json!({"nomeBot": "Ana"}));
            then.status(200)
                .json_body(json!({"id": 1, "nomeBot": "Ana", "link": "", "Active": true}));
        })
        .await;

    let client = BaserowClient::new(&test_config(&server.base_url())).unwrap();
    let update = SettingsUpdate {
        bot_name: Some("Ana".to_string()),
        working_hours_start: Some("09:00".to_string()),
        ..Default::default()
    };
    let row = client.update_settings(686, 1, &update).await.unwrap();

    assert_eq!(row.bot_name.as_deref(), Some("Ana"));
    patch.assert_async().await;
}

#[tokio::test]
async fn update_settings_propagates_write_error() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(PATCH).path("/686/1/");
            then.status(400);
        })
        .await;

    let client = BaserowClient::new(&test_config(&server.base_url())).unwrap();
    let update = SettingsUpdate {
        auto_reply: Some(true),
        ..Default::default()
    };
    let err = client.update_settings(686, 1, &update).await.unwrap_err();

    assert!(matches!(err, Error::ApiStatus { status: 400, .. }));
}

#[tokio::test]
async fn load_dashboard_isolates_per_table_failures() {
    let server = MockServer::start_async().await;

    let empty = json!({"count": 0, "next": null, "previous": null, "results": []});
    server
        .mock_async(|when, then| {
            when.method(GET).path("/683/");
            then.status(500);
        })
        .await;
    for table in ["682", "685", "686"] {
        let body = empty.clone();
        server
            .mock_async(move |when, then| {
                when.method(GET).path(format!("/{}/", table));
                then.status(200).json_body(body);
            })
            .await;
    }

    let client = BaserowClient::new(&test_config(&server.base_url())).unwrap();
    let load = client.load_dashboard(&TableIds::default()).await;

    assert!(load.clients.is_err());
    assert!(load.interactions.is_ok());
    assert!(load.conversions.is_ok());
    assert!(load.settings.is_ok());

    let failures = load.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].0, "clients");

    // Collapsing reproduces the all-or-nothing dashboard behavior
    assert!(load.into_data().is_err());
}

#[tokio::test]
async fn load_dashboard_collects_all_tables() {
    let server = MockServer::start_async().await;

    server
        .mock_async(|when, then| {
            when.method(GET).path("/683/");
            then.status(200)
                .json_body(json!({"count": 2, "next": null, "previous": null, "results": client_rows(1..=2)}));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/682/");
            then.status(200).json_body(json!({
                "count": 1, "next": null, "previous": null,
                "results": [{"id": 7, "created on": "2024-01-02T10:00:00Z", "sessionId": "s1", "action": "message"}]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/685/");
            then.status(200).json_body(json!({
                "count": 1, "next": null, "previous": null,
                "results": [{"id": 9, "created on": "2024-01-03T10:00:00Z", "conversionType": "sale", "conversionValue": 49.9}]
            }));
        })
        .await;
    server
        .mock_async(|when, then| {
            when.method(GET).path("/686/");
            then.status(200).json_body(json!({
                "count": 1, "next": null, "previous": null,
                "results": [{"id": 1, "nomeBot": "Ana", "Active": false}]
            }));
        })
        .await;

    let client = BaserowClient::new(&test_config(&server.base_url())).unwrap();
    let data = client
        .load_dashboard(&TableIds::default())
        .await
        .into_data()
        .unwrap();

    assert_eq!(data.clients.len(), 2);
    assert_eq!(data.interactions.len(), 1);
    assert_eq!(data.interactions[0].session_id.as_deref(), Some("s1"));
    assert_eq!(data.conversions[0].conversion_value, Some(49.9));
    assert_eq!(data.settings[0].bot_name.as_deref(), Some("Ana"));
}
