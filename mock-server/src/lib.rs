//! In-memory stand-in for the remote task API.
//!
//! Honors the contract the sync engine depends on: `GET /tasks` lists open
//! tasks in creation order, `POST /tasks/{id}/close` answers `204`, and every
//! route requires `Authorization: Bearer <key>`. `POST /tasks` exists only so
//! tests can seed data.

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Due {
    pub date: String,
    pub string: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MockTask {
    pub id: String,
    pub content: String,
    pub description: String,
    pub project_id: Option<String>,
    pub section_id: Option<String>,
    pub parent_id: Option<String>,
    /// Upstream scale: 1 is normal, 4 is most urgent.
    pub priority: i64,
    pub due: Option<Due>,
    pub is_completed: bool,
}

#[derive(Deserialize)]
pub struct CreateTask {
    pub content: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub project_id: Option<String>,
    #[serde(default = "default_priority")]
    pub priority: i64,
    /// `YYYY-MM-DD`.
    #[serde(default)]
    pub due_date: Option<String>,
    /// `YYYY-MM-DDThh:mm:ss`; wins over `due_date`.
    #[serde(default)]
    pub due_datetime: Option<String>,
    #[serde(default)]
    pub due_string: Option<String>,
}

fn default_priority() -> i64 {
    1
}

pub struct MockState {
    api_key: String,
    tasks: Vec<MockTask>,
}

pub type Db = Arc<RwLock<MockState>>;

pub fn app(api_key: &str) -> Router {
    let db: Db = Arc::new(RwLock::new(MockState {
        api_key: api_key.to_string(),
        tasks: Vec::new(),
    }));
    Router::new()
        .route("/tasks", get(list_tasks).post(create_task))
        .route("/tasks/{id}/close", post(close_task))
        .with_state(db)
}

pub async fn run(listener: TcpListener, api_key: &str) -> Result<(), std::io::Error> {
    axum::serve(listener, app(api_key)).await
}

fn authorize(state: &MockState, headers: &HeaderMap) -> Result<(), StatusCode> {
    let expected = format!("Bearer {}", state.api_key);
    match headers.get(header::AUTHORIZATION) {
        Some(value) if value.as_bytes() == expected.as_bytes() => Ok(()),
        _ => Err(StatusCode::UNAUTHORIZED),
    }
}

async fn list_tasks(
    State(db): State<Db>,
    headers: HeaderMap,
) -> Result<Json<Vec<MockTask>>, StatusCode> {
    let state = db.read().await;
    authorize(&state, &headers)?;
    let open = state.tasks.iter().filter(|t| !t.is_completed).cloned().collect();
    Ok(Json(open))
}

async fn create_task(
    State(db): State<Db>,
    headers: HeaderMap,
    Json(input): Json<CreateTask>,
) -> Result<Json<MockTask>, StatusCode> {
    let mut state = db.write().await;
    authorize(&state, &headers)?;
    let due = input.due_datetime.or(input.due_date).map(|date| Due {
        string: input.due_string.unwrap_or_else(|| date.clone()),
        date,
    });
    let task = MockTask {
        id: Uuid::new_v4().simple().to_string(),
        content: input.content,
        description: input.description,
        project_id: input.project_id,
        section_id: None,
        parent_id: None,
        priority: input.priority,
        due,
        is_completed: false,
    };
    state.tasks.push(task.clone());
    tracing::info!(id = %task.id, "task created");
    Ok(Json(task))
}

async fn close_task(
    State(db): State<Db>,
    headers: HeaderMap,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    let mut state = db.write().await;
    authorize(&state, &headers)?;
    let task = state
        .tasks
        .iter_mut()
        .find(|t| t.id == id && !t.is_completed)
        .ok_or(StatusCode::NOT_FOUND)?;
    task.is_completed = true;
    tracing::info!(%id, "task closed");
    Ok(StatusCode::NO_CONTENT)
}
