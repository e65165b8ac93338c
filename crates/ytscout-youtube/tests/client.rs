//! Integration tests for `YoutubeClient` using wiremock HTTP mocks.

use serde_json::json;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use ytscout_youtube::{YoutubeClient, YoutubeError};

fn test_client(base_url: &str, budget: Option<u32>) -> YoutubeClient {
    YoutubeClient::with_base_url("test-key", 5, budget, base_url)
        .expect("client construction should not fail")
        .with_retry_policy(0, 0)
}

fn channel_json(id: &str, handle: &str, subs: &str) -> serde_json::Value {
    json!({
        "id": id,
        "snippet": {
            "title": format!("Channel {id}"),
            "customUrl": handle,
            "country": "US",
            "thumbnails": {"high": {"url": format!("https://img/{id}.jpg")}}
        },
        "statistics": {"subscriberCount": subs, "viewCount": "1000", "videoCount": "10"}
    })
}

#[tokio::test]
async fn search_channels_sends_expected_parameters() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("part", "snippet"))
        .and(query_param("q", "sourdough"))
        .and(query_param("type", "channel"))
        .and(query_param("maxResults", "50"))
        .and(query_param("order", "relevance"))
        .and(query_param("relevanceLanguage", "en"))
        .and(query_param("pageToken", "CDIQAA"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "nextPageToken": "CGQQAA",
            "items": [
                {"id": {"kind": "youtube#channel", "channelId": "UC1"}},
                {"id": {"kind": "youtube#channel", "channelId": "UC2"}},
                {"id": {"kind": "youtube#video", "videoId": "v1"}}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), None);
    let page = client
        .search_channels("sourdough", Some("CDIQAA"))
        .await
        .expect("search should succeed");

    assert_eq!(page.channel_ids(), vec!["UC1".to_owned(), "UC2".to_owned()]);
    assert_eq!(page.next_page_token.as_deref(), Some("CGQQAA"));

    let usage = client.usage();
    assert_eq!(usage.search_calls, 1);
    assert_eq!(usage.units_used, 100);
}

#[tokio::test]
async fn get_channels_batches_ids_by_fifty() {
    let server = MockServer::start().await;

    let ids: Vec<String> = (0..60).map(|i| format!("UC{i}")).collect();
    let first_batch = ids[..50].join(",");
    let second_batch = ids[50..].join(",");

    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("part", "snippet,statistics"))
        .and(query_param("id", first_batch.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [channel_json("UC0", "zero", "100")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("id", second_batch.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [channel_json("UC55", "fiftyfive", "200")]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), None);
    let channels = client.get_channels(&ids).await.expect("batches should succeed");

    assert_eq!(channels.len(), 2);
    assert_eq!(channels[0].id, "UC0");
    assert_eq!(channels[1].id, "UC55");

    let usage = client.usage();
    assert_eq!(usage.batch_calls, 2);
    assert_eq!(usage.units_used, 2);
}

#[tokio::test]
async fn get_channels_with_no_ids_makes_no_requests() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri(), None);
    let channels = client.get_channels(&[]).await.unwrap();
    assert!(channels.is_empty());
    assert_eq!(client.usage().total_calls(), 0);
}

#[tokio::test]
async fn quota_exceeded_body_maps_to_quota_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "The request cannot be completed because you have exceeded your quota.",
                "errors": [{"reason": "quotaExceeded", "domain": "youtube.quota"}]
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), None);
    let err = client.search_channels("chess", None).await.unwrap_err();
    assert!(matches!(err, YoutubeError::QuotaExceeded(_)), "got: {err:?}");
}

#[tokio::test]
async fn budget_refuses_search_before_sending_request() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), Some(150));
    client.search_channels("chess", None).await.unwrap();
    let err = client.search_channels("chess", None).await.unwrap_err();

    assert!(matches!(
        err,
        YoutubeError::BudgetExceeded {
            used: 100,
            limit: 150
        }
    ));
    assert_eq!(client.usage().search_calls, 1);
}

#[tokio::test]
async fn server_errors_are_retried() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(503).set_body_string("unavailable"))
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"items": []})))
        .mount(&server)
        .await;

    let client = YoutubeClient::with_base_url("test-key", 5, None, &server.uri())
        .unwrap()
        .with_retry_policy(2, 0);
    let page = client.search_channels("chess", None).await.unwrap();

    assert!(page.items.is_empty());
    // Both attempts were billed.
    assert_eq!(client.usage().search_calls, 2);
    assert_eq!(client.usage().units_used, 200);
}

#[tokio::test]
async fn malformed_body_is_a_deserialize_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(ResponseTemplate::new(200).set_body_string("{\"items\": 5}"))
        .mount(&server)
        .await;

    let client = test_client(&server.uri(), None);
    let err = client.get_channels(&["UC1".to_owned()]).await.unwrap_err();
    assert!(matches!(err, YoutubeError::Deserialize { .. }), "got: {err:?}");
}
