//! Resource-surface round trips against a mock server.

use serde_json::json;
use wiremock::matchers::{any, body_string_contains, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nylas_client::prelude::*;

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}

async fn client_for(server: &MockServer) -> NylasClient {
    NylasClient::builder("client-id", "client-secret")
        .with_access_token("token")
        .with_base_url(server.uri())
        .build()
        .unwrap()
}

#[tokio::test]
async fn list_sends_query_and_auth_header() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events"))
        .and(header("Authorization", "token"))
        .and(query_param("limit", "5"))
        .and(query_param("calendar_id", "cal_1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!([{"id": "evt_1", "title": "standup"}])),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let events = client
        .events()
        .list(&EventQuery {
            limit: Some(5),
            calendar_id: Some("cal_1".into()),
            ..Default::default()
        })
        .await
        .unwrap();

    assert_eq!(events.len(), 1);
    assert_eq!(events[0].title.as_deref(), Some("standup"));
}

#[tokio::test]
async fn list_rejects_invalid_query_before_any_request() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .events()
        .list(&EventQuery {
            limit: Some(0),
            ..Default::default()
        })
        .await
        .unwrap_err();

    assert!(err.is_validation());
}

#[tokio::test]
async fn create_posts_form_body_and_notify_query() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/events"))
        .and(query_param("notify_participants", "true"))
        .and(body_string_contains("calendar_id=cal_1"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "evt_new", "calendar_id": "cal_1"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let event = client
        .events()
        .create(&EventDraft {
            calendar_id: "cal_1".into(),
            when: When::Time {
                time: 1_700_000_000,
            },
            title: Some("standup".into()),
            description: None,
            location: None,
            busy: Some(true),
            recurrence: None,
            participants: None,
            notify_participants: Some(true),
        })
        .await
        .unwrap();

    assert_eq!(event.id, "evt_new");
}

#[tokio::test]
async fn create_rejects_blank_calendar_id_without_network() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client
        .events()
        .create(&EventDraft {
            calendar_id: String::new(),
            when: When::Time {
                time: 1_700_000_000,
            },
            title: None,
            description: None,
            location: None,
            busy: None,
            recurrence: None,
            participants: None,
            notify_participants: None,
        })
        .await
        .unwrap_err();

    assert!(err.is_validation());
}

#[tokio::test]
async fn update_puts_to_event_path_without_id_in_body() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("PUT"))
        .and(path("/events/evt_9"))
        .and(body_string_contains("title=revised"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "evt_9", "title": "revised"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let event = client
        .events()
        .update(&EventUpdate {
            id: "evt_9".into(),
            when: None,
            busy: None,
            title: Some("revised".into()),
            location: None,
            description: None,
            participants: None,
            notify_participants: None,
        })
        .await
        .unwrap();

    assert_eq!(event.title.as_deref(), Some("revised"));
}

#[tokio::test]
async fn get_single_event_runs_as_one_element_batch() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events/evt_1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "evt_1"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let event = client.events().get("evt_1").await.unwrap();
    assert_eq!(event.id, "evt_1");
}

#[tokio::test]
async fn get_single_event_surfaces_api_failure_as_error() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/events/evt_missing"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "not found"})))
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let err = client.events().get("evt_missing").await.unwrap_err();
    assert_eq!(err.status(), Some(404));
}

#[tokio::test]
async fn delete_by_id_delegates_to_batch_delete() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("DELETE"))
        .and(path("/events/evt_1"))
        .and(query_param("notify_participants", "true"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let payload = client.events().delete_by_id("evt_1", true).await.unwrap();
    assert!(payload.is_null());
}

#[tokio::test]
async fn rsvp_fills_account_id_from_cached_account() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/account"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"id": "acc_1", "account_id": "acc_1"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/send-rsvp"))
        .and(body_string_contains("account_id=acc_1"))
        .and(body_string_contains("status=yes"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({})))
        .expect(2)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let rsvp = Rsvp {
        event_id: "evt_1".into(),
        status: RsvpStatus::Yes,
        account_id: None,
        notify_participants: None,
    };

    // Two RSVPs, one account fetch: the second call hits the cache.
    client.events().rsvp(&rsvp).await.unwrap();
    client.events().rsvp(&rsvp).await.unwrap();
}

#[tokio::test]
async fn search_threads_sends_query_string() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/threads/search"))
        .and(query_param("q", "quarterly report"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "thr_1"}])))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let threads = client.search().threads("quarterly report").await.unwrap();
    assert_eq!(threads.len(), 1);

    let err = client.search().threads("  ").await.unwrap_err();
    assert!(err.is_validation());
}

#[tokio::test]
async fn delta_cursor_round_trip() {
    init_tracing();
    let server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/delta/latest_cursor"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"cursor": "cur_42"})))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/delta"))
        .and(query_param("cursor", "cur_42"))
        .and(query_param("include_types", "event,message"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "cursor_start": "cur_42",
            "cursor_end": "cur_43",
            "deltas": [{
                "cursor": "cur_43",
                "event": "create",
                "object": "event",
                "id": "evt_1",
            }],
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = client_for(&server).await;
    let cursor = client.deltas().latest_cursor().await.unwrap();
    assert_eq!(cursor, "cur_42");

    let mut query = DeltaQuery::new(cursor);
    query.include_types = Some(vec!["event".into(), "message".into()]);
    let set = client.deltas().since(&query).await.unwrap();

    assert_eq!(set.cursor_end.as_deref(), Some("cur_43"));
    assert_eq!(set.deltas.len(), 1);
    assert_eq!(set.deltas[0].event, "create");
}
