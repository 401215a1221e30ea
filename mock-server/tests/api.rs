use axum::http::{self, Request, StatusCode};
use http_body_util::BodyExt;
use mock_server::{app, MockTask};
use tower::ServiceExt;

const KEY: &str = "test-token";

async fn body_json<T: serde::de::DeserializeOwned>(response: axum::response::Response) -> T {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

async fn body_bytes(response: axum::response::Response) -> bytes::Bytes {
    response.into_body().collect().await.unwrap().to_bytes()
}

fn authed(method: &str, uri: &str) -> http::request::Builder {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(http::header::AUTHORIZATION, format!("Bearer {KEY}"))
}

fn create_request(body: &str) -> Request<String> {
    authed("POST", "/tasks")
        .header(http::header::CONTENT_TYPE, "application/json")
        .body(body.to_string())
        .unwrap()
}

// --- auth ---

#[tokio::test]
async fn list_without_token_is_401() {
    let resp = app(KEY)
        .oneshot(Request::builder().uri("/tasks").body(String::new()).unwrap())
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn list_with_wrong_token_is_401() {
    let resp = app(KEY)
        .oneshot(
            Request::builder()
                .uri("/tasks")
                .header(http::header::AUTHORIZATION, "Bearer nope")
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

// --- list ---

#[tokio::test]
async fn list_tasks_empty() {
    let resp = app(KEY)
        .oneshot(authed("GET", "/tasks").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let tasks: Vec<MockTask> = body_json(resp).await;
    assert!(tasks.is_empty());
}

// --- create ---

#[tokio::test]
async fn create_task_with_due_datetime() {
    let resp = app(KEY)
        .oneshot(create_request(
            r#"{"content":"Call mom","priority":4,"due_datetime":"2024-01-01T18:30:00","due_string":"today 18:30"}"#,
        ))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::OK);
    let task: MockTask = body_json(resp).await;
    assert_eq!(task.content, "Call mom");
    assert_eq!(task.priority, 4);
    let due = task.due.unwrap();
    assert_eq!(due.date, "2024-01-01T18:30:00");
    assert_eq!(due.string, "today 18:30");
}

#[tokio::test]
async fn create_task_malformed_json_returns_422() {
    let resp = app(KEY)
        .oneshot(create_request(r#"{"not_content":1}"#))
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

// --- close ---

#[tokio::test]
async fn close_unknown_task_is_404() {
    let resp = app(KEY)
        .oneshot(authed("POST", "/tasks/nope/close").body(String::new()).unwrap())
        .await
        .unwrap();

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

// --- lifecycle ---

#[tokio::test]
async fn create_list_close_lifecycle() {
    use tower::Service;

    let mut app = app(KEY).into_service();

    let mut ids = Vec::new();
    for content in ["First", "Second"] {
        let resp = ServiceExt::ready(&mut app)
            .await
            .unwrap()
            .call(create_request(&format!(r#"{{"content":"{content}"}}"#)))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
        let task: MockTask = body_json(resp).await;
        ids.push(task.id);
    }

    // list keeps creation order
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("GET", "/tasks").body(String::new()).unwrap())
        .await
        .unwrap();
    let tasks: Vec<MockTask> = body_json(resp).await;
    let contents: Vec<_> = tasks.iter().map(|t| t.content.as_str()).collect();
    assert_eq!(contents, ["First", "Second"]);

    // close the first
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            authed("POST", &format!("/tasks/{}/close", ids[0]))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NO_CONTENT);
    assert!(body_bytes(resp).await.is_empty());

    // closing again is 404
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(
            authed("POST", &format!("/tasks/{}/close", ids[0]))
                .body(String::new())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // list now only has the second
    let resp = ServiceExt::ready(&mut app)
        .await
        .unwrap()
        .call(authed("GET", "/tasks").body(String::new()).unwrap())
        .await
        .unwrap();
    let tasks: Vec<MockTask> = body_json(resp).await;
    assert_eq!(tasks.len(), 1);
    assert_eq!(tasks[0].id, ids[1]);
}
