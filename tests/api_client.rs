//! HTTP-level tests for the API client against a mock server.

use taskui::api::{ApiClient, NewTask, TaskPatch};
use taskui::error::TaskuiError;
use taskui::task::model::TaskStatus;
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

async fn client() -> (MockServer, ApiClient) {
    let server = MockServer::start().await;
    let api = ApiClient::new(server.uri()).expect("client");
    (server, api)
}

#[tokio::test]
async fn login_unwraps_token_envelope() {
    let (server, api) = client().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .and(body_json(serde_json::json!({
            "email": "ada@example.com",
            "password": "Hunter2!x"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "token": { "access_token": "tok-123" },
            "name": "Ada"
        })))
        .mount(&server)
        .await;

    let creds = api.login("ada@example.com", "Hunter2!x").await.expect("login");
    assert_eq!(creds.token, "tok-123");
    assert_eq!(creds.name, "Ada");
}

#[tokio::test]
async fn login_failure_surfaces_server_message() {
    let (server, api) = client().await;

    Mock::given(method("POST"))
        .and(path("/auth/login"))
        .respond_with(ResponseTemplate::new(400).set_body_json(serde_json::json!({
            "message": "Invalid email or password"
        })))
        .mount(&server)
        .await;

    let err = api.login("ada@example.com", "wrong").await.unwrap_err();
    match err {
        TaskuiError::Server { status, message } => {
            assert_eq!(status, 400);
            assert_eq!(message, "Invalid email or password");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn register_posts_all_fields() {
    let (server, api) = client().await;

    Mock::given(method("POST"))
        .and(path("/auth/register"))
        .and(body_json(serde_json::json!({
            "name": "Ada",
            "email": "ada@example.com",
            "password": "Hunter2!x"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "message": "User created"
        })))
        .mount(&server)
        .await;

    api.register("Ada", "ada@example.com", "Hunter2!x")
        .await
        .expect("register");
}

#[tokio::test]
async fn list_tasks_sends_raw_token_and_unwraps_data() {
    let (server, api) = client().await;

    // The token goes in the Authorization header verbatim, no Bearer prefix.
    Mock::given(method("GET"))
        .and(path("/task/"))
        .and(header("Authorization", "tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": [
                {
                    "id": 1,
                    "title": "Write report",
                    "description": "Quarterly numbers",
                    "status": "PENDING",
                    "createdAt": "2024-03-05T09:30:00.000Z",
                    "updatedAt": "2024-03-05T09:30:00.000Z"
                },
                {
                    "id": 2,
                    "title": "Ship release",
                    "status": "COMPLETED"
                }
            ]
        })))
        .mount(&server)
        .await;

    let tasks = api.list_tasks("tok-123").await.expect("list");
    assert_eq!(tasks.len(), 2);
    assert_eq!(tasks[0].title, "Write report");
    assert_eq!(tasks[0].status, TaskStatus::Pending);
    // Optional fields the server may omit default to empty.
    assert_eq!(tasks[1].description, "");
    assert_eq!(tasks[1].created_at, "");
}

#[tokio::test]
async fn expired_token_maps_to_unauthorized() {
    let (server, api) = client().await;

    Mock::given(method("GET"))
        .and(path("/task/"))
        .respond_with(ResponseTemplate::new(401).set_body_json(serde_json::json!({
            "message": "jwt expired"
        })))
        .mount(&server)
        .await;

    let err = api.list_tasks("stale").await.unwrap_err();
    assert!(matches!(err, TaskuiError::Unauthorized(_)));
    assert!(err.is_auth());
}

#[tokio::test]
async fn create_task_returns_created_task() {
    let (server, api) = client().await;

    Mock::given(method("POST"))
        .and(path("/task"))
        .and(header("Authorization", "tok-123"))
        .and(body_json(serde_json::json!({
            "title": "Write report",
            "description": "",
            "status": "PENDING"
        })))
        .respond_with(ResponseTemplate::new(201).set_body_json(serde_json::json!({
            "data": {
                "id": 9,
                "title": "Write report",
                "description": "",
                "status": "PENDING",
                "createdAt": "2024-03-05T09:30:00.000Z",
                "updatedAt": "2024-03-05T09:30:00.000Z"
            }
        })))
        .mount(&server)
        .await;

    let task = api
        .create_task(
            "tok-123",
            &NewTask {
                title: "Write report",
                description: "",
                status: TaskStatus::Pending,
            },
        )
        .await
        .expect("create");
    assert_eq!(task.id, 9);
}

#[tokio::test]
async fn update_task_omits_absent_fields() {
    let (server, api) = client().await;

    // Only the title key may appear in the body.
    Mock::given(method("PATCH"))
        .and(path("/task/9"))
        .and(body_json(serde_json::json!({ "title": "Renamed" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Task updated"
        })))
        .mount(&server)
        .await;

    let patch = TaskPatch {
        title: Some("Renamed".to_owned()),
        ..TaskPatch::default()
    };
    api.update_task("tok-123", 9, &patch).await.expect("update");
}

#[tokio::test]
async fn status_update_hits_dedicated_route() {
    let (server, api) = client().await;

    Mock::given(method("PATCH"))
        .and(path("/task/status/9"))
        .and(body_json(serde_json::json!({ "status": "COMPLETED" })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Task updated"
        })))
        .mount(&server)
        .await;

    api.update_task_status("tok-123", 9, TaskStatus::Completed)
        .await
        .expect("status update");
}

#[tokio::test]
async fn delete_task_hits_id_route() {
    let (server, api) = client().await;

    Mock::given(method("DELETE"))
        .and(path("/task/9"))
        .and(header("Authorization", "tok-123"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "message": "Task deleted"
        })))
        .mount(&server)
        .await;

    api.delete_task("tok-123", 9).await.expect("delete");
}

#[tokio::test]
async fn bodyless_error_gets_fallback_message() {
    let (server, api) = client().await;

    Mock::given(method("GET"))
        .and(path("/task/"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let err = api.list_tasks("tok-123").await.unwrap_err();
    match err {
        TaskuiError::Server { status, message } => {
            assert_eq!(status, 500);
            assert!(message.contains("500"));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}
