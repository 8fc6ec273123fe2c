//! Request engine behavior against a mock API server: authorization
//! headers, reauthentication, retry policies, pagination and task polling.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use serde_json::json;
use uuid::Uuid;
use wiremock::matchers::{body_json, header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

use nimbuscli::client::{Credentials, ProviderClient, ReauthHandler, RequestOpts};
use nimbuscli::error::ApiError;
use nimbuscli::resources::instances::{InstanceCreateOptions, InstanceListOptions, InstancesService};
use nimbuscli::resources::tasks::{TaskState, TasksService};
use nimbuscli::validation::Validator;

fn api_key_client(server: &MockServer) -> ProviderClient {
    ProviderClient::builder()
        .endpoint(format!("{}/", server.uri()))
        .project(1)
        .region(2)
        .credentials(Credentials::ApiKey {
            key: "permanent-key".to_string(),
        })
        .build()
        .unwrap()
}

fn token_client(server: &MockServer, handler: Option<ReauthHandler>) -> ProviderClient {
    let mut builder = ProviderClient::builder()
        .endpoint(format!("{}/", server.uri()))
        .project(1)
        .region(2)
        .credentials(Credentials::Token {
            access_token: "stale".to_string(),
            refresh_token: "refresh-1".to_string(),
        });
    if let Some(handler) = handler {
        builder = builder.reauth_handler(handler);
    }
    builder.build().unwrap()
}

/// Reauth handler returning a fixed fresh pair and counting invocations.
fn counting_handler(counter: Arc<AtomicUsize>) -> ReauthHandler {
    Arc::new(move |_credentials: Credentials| {
        let counter = Arc::clone(&counter);
        async move {
            // Widen the race window so concurrent 401s land while the
            // refresh is still in flight.
            tokio::time::sleep(Duration::from_millis(50)).await;
            counter.fetch_add(1, Ordering::SeqCst);
            Ok(Credentials::Token {
                access_token: "fresh".to_string(),
                refresh_token: "refresh-2".to_string(),
            })
        }
        .boxed()
    })
}

fn instance_body(id: Uuid, name: &str) -> serde_json::Value {
    json!({
        "id": id,
        "name": name,
        "status": "ACTIVE",
        "flavor": "g1-standard-2"
    })
}

#[tokio::test]
async fn test_api_key_authorization_header_and_scoped_path() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/v1/instances/1/2/{}", id)))
        .and(header("authorization", "APIKey permanent-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(instance_body(id, "web-1")))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_key_client(&server);
    let validator = Validator::new();
    let instance = InstancesService::new(&client, &validator)
        .get(&id)
        .await
        .unwrap();
    assert_eq!(instance.name, "web-1");
}

#[tokio::test]
async fn test_list_follows_next_links_across_pages() {
    let server = MockServer::start().await;
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();
    let third = Uuid::new_v4();

    // Mounted first so the offset query wins once the pager follows the
    // next link; the initial request carries no query at all.
    Mock::given(method("GET"))
        .and(path("/v1/instances/1/2"))
        .and(query_param("offset", "2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 3,
            "results": [instance_body(third, "web-3")]
        })))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/instances/1/2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "count": 3,
            "results": [instance_body(first, "web-1"), instance_body(second, "web-2")],
            "links": [
                {"rel": "next", "href": format!("{}/v1/instances/1/2?offset=2", server.uri())}
            ]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_key_client(&server);
    let validator = Validator::new();
    let instances = InstancesService::new(&client, &validator)
        .list(&InstanceListOptions::default())
        .await
        .unwrap();
    assert_eq!(instances.len(), 3);
    assert_eq!(instances[2].name, "web-3");
}

#[tokio::test]
async fn test_401_refreshes_once_across_concurrent_callers() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/v1/instances/1/2/{}", id)))
        .and(header("authorization", "Bearer stale"))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "expired"})))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(format!("/v1/instances/1/2/{}", id)))
        .and(header("authorization", "Bearer fresh"))
        .respond_with(ResponseTemplate::new(200).set_body_json(instance_body(id, "web-1")))
        .mount(&server)
        .await;

    let refreshes = Arc::new(AtomicUsize::new(0));
    let client = token_client(&server, Some(counting_handler(Arc::clone(&refreshes))));
    let validator = Validator::new();
    let service = InstancesService::new(&client, &validator);

    let (a, b) = tokio::join!(service.get(&id), service.get(&id));
    assert_eq!(a.unwrap().name, "web-1");
    assert_eq!(b.unwrap().name, "web-1");
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);

    // Refreshed credentials stay on the client for later persistence.
    match client.credentials().await {
        Credentials::Token { access_token, .. } => assert_eq!(access_token, "fresh"),
        other => panic!("unexpected credentials: {:?}", other),
    }
}

#[tokio::test]
async fn test_second_401_surfaces_as_after_reauth() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/v1/instances/1/2/{}", id)))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "still bad"})))
        .expect(2)
        .mount(&server)
        .await;

    let refreshes = Arc::new(AtomicUsize::new(0));
    let client = token_client(&server, Some(counting_handler(Arc::clone(&refreshes))));
    let validator = Validator::new();
    let err = InstancesService::new(&client, &validator)
        .get(&id)
        .await
        .unwrap_err();

    assert!(matches!(err, ApiError::AfterReauth { .. }));
    assert_eq!(err.status(), Some(401));
    assert_eq!(refreshes.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_401_without_handler_is_not_retried() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("GET"))
        .and(path(format!("/v1/instances/1/2/{}", id)))
        .respond_with(ResponseTemplate::new(401).set_body_json(json!({"message": "expired"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = token_client(&server, None);
    let validator = Validator::new();
    let err = InstancesService::new(&client, &validator)
        .get(&id)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Unauthorized { .. }));
}

#[tokio::test]
async fn test_409_retried_within_budget() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/things"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "busy"})))
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v1/things"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_key_client(&server);
    let url = client.resource_url("v1/things").unwrap();
    let response = client
        .post(url, RequestOpts::new().with_conflict_retries(3, 0))
        .await
        .unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_409_budget_exhaustion_surfaces_conflict() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/things"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"message": "busy"})))
        .expect(3)
        .mount(&server)
        .await;

    let client = api_key_client(&server);
    let url = client.resource_url("v1/things").unwrap();
    let err = client
        .post(url, RequestOpts::new().with_conflict_retries(2, 0))
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Conflict { .. }));
}

#[tokio::test]
async fn test_get_5xx_retried_when_policy_enabled() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/things"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "maintenance"})))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/things"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .expect(1)
        .mount(&server)
        .await;

    let mut client = api_key_client(&server);
    client.enable_get_retries_on_5xx(2, 0);
    let url = client.resource_url("v1/things").unwrap();
    let response = client.get(url, RequestOpts::default()).await.unwrap();
    assert_eq!(response.status().as_u16(), 200);
}

#[tokio::test]
async fn test_get_5xx_not_retried_without_policy() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/things"))
        .respond_with(ResponseTemplate::new(503).set_body_json(json!({"message": "maintenance"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_key_client(&server);
    let url = client.resource_url("v1/things").unwrap();
    let err = client.get(url, RequestOpts::default()).await.unwrap_err();
    assert!(matches!(err, ApiError::ServiceUnavailable { .. }));
}

#[tokio::test]
async fn test_validation_failure_sends_no_request() {
    let server = MockServer::start().await;

    let client = api_key_client(&server);
    let validator = Validator::new();
    let opts = InstanceCreateOptions {
        name: Some("web-1".to_string()),
        flavor: Some("g1-standard-2".to_string()),
        source: Some("image".to_string()),
        ..InstanceCreateOptions::default()
    };
    let err = InstancesService::new(&client, &validator)
        .create(&opts)
        .await
        .unwrap_err();
    assert!(matches!(err, ApiError::Validation(_)));
    assert!(server.received_requests().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_create_posts_body_and_returns_task_envelope() {
    let server = MockServer::start().await;
    let image_id = Uuid::new_v4();
    let expected_body = json!({
        "name": "web-1",
        "flavor": "g1-standard-2",
        "source": "image",
        "image_id": image_id,
        "interfaces": [{"type": "external"}]
    });
    Mock::given(method("POST"))
        .and(path("/v1/instances/1/2"))
        .and(body_json(&expected_body))
        .respond_with(ResponseTemplate::new(202).set_body_json(json!({"tasks": ["task-1"]})))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_key_client(&server);
    let validator = Validator::new();
    let opts = InstanceCreateOptions {
        name: Some("web-1".to_string()),
        flavor: Some("g1-standard-2".to_string()),
        source: Some("image".to_string()),
        image_id: Some(image_id),
        interfaces: vec![nimbuscli::resources::instances::InterfaceOptions {
            interface_type: "external".to_string(),
            subnet_id: None,
        }],
        ..InstanceCreateOptions::default()
    };
    let results = InstancesService::new(&client, &validator)
        .create(&opts)
        .await
        .unwrap();
    assert_eq!(results.first(), Some("task-1"));
}

#[tokio::test]
async fn test_wait_for_task_polls_to_completion() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tasks/task-1"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": "task-1", "state": "RUNNING"})),
        )
        .up_to_n_times(2)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/v1/tasks/task-1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "task-1",
            "state": "FINISHED",
            "created_resources": {"instances": ["a3c9e1d0-9a1f-4b6e-8f3d-2f1f6c7d8e9f"]}
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_key_client(&server);
    let task = TasksService::new(&client)
        .wait_for_task_with_interval("task-1", Duration::from_millis(1))
        .await
        .unwrap();
    assert_eq!(task.state, TaskState::Finished);
    let ids = task.created_resource_ids("instances").unwrap();
    assert_eq!(ids, vec!["a3c9e1d0-9a1f-4b6e-8f3d-2f1f6c7d8e9f"]);
}

#[tokio::test]
async fn test_wait_for_task_surfaces_task_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/tasks/task-9"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "id": "task-9",
            "state": "ERROR",
            "error": "quota exceeded"
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_key_client(&server);
    let err = TasksService::new(&client)
        .wait_for_task_with_interval("task-9", Duration::from_millis(1))
        .await
        .unwrap_err();
    match err {
        ApiError::TaskFailed { id, message } => {
            assert_eq!(id, "task-9");
            assert_eq!(message, "quota exceeded");
        }
        other => panic!("unexpected error: {:?}", other),
    }
}

#[tokio::test]
async fn test_confirm_deleted_treats_404_as_success() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    let resource_path = format!("/v1/instances/1/2/{}", id);
    Mock::given(method("GET"))
        .and(path(resource_path.as_str()))
        .respond_with(ResponseTemplate::new(200).set_body_json(instance_body(id, "web-1")))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path(resource_path.as_str()))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "gone"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_key_client(&server);
    let url = client
        .resource_url(&format!("v1/instances/1/2/{}", id))
        .unwrap();
    TasksService::new(&client)
        .confirm_deleted(url, Duration::from_millis(1))
        .await
        .unwrap();
}

#[tokio::test]
async fn test_delete_missing_resource_is_typed_not_found() {
    let server = MockServer::start().await;
    let id = Uuid::new_v4();
    Mock::given(method("DELETE"))
        .and(path(format!("/v1/instances/1/2/{}", id)))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({"message": "no such id"})))
        .expect(1)
        .mount(&server)
        .await;

    let client = api_key_client(&server);
    let validator = Validator::new();
    let err = InstancesService::new(&client, &validator)
        .delete(&id)
        .await
        .unwrap_err();
    assert!(err.is_not_found());
    // The per-call error context replaces the server's message.
    assert_eq!(
        err.to_string(),
        format!("resource not found: instance {} does not exist", id)
    );
}
