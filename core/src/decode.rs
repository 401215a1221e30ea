//! Defensive decoding of task-list bodies.
//!
//! # Design
//! The body is parsed into a `serde_json::Value` first and walked by hand
//! instead of deriving `Deserialize` on `Task`. A derived impl would reject
//! the whole list when one field has the wrong type; here every field is read
//! only if present with the expected JSON type and otherwise falls back to
//! the task default. Only structural problems (empty body, invalid JSON,
//! top-level value not an array) fail the decode.
//!
//! Memory is bounded by [`DecodeLimits`]: a cap on the number of tasks kept
//! and a cap on description length. Both are policy knobs; `None` disables
//! them.

use serde_json::{json, Map, Value};
use tracing::warn;

use crate::error::DecodeError;
use crate::task::{Priority, Task};

pub const DEFAULT_MAX_TASKS: usize = 10;
pub const DEFAULT_MAX_DESCRIPTION_LEN: usize = 100;

/// Size policy applied while decoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DecodeLimits {
    /// Stop after this many tasks. The rest of the array is ignored and the
    /// result is flagged as truncated.
    pub max_tasks: Option<usize>,
    /// Descriptions longer than this many characters are dropped, not cut.
    pub max_description_len: Option<usize>,
}

impl DecodeLimits {
    pub const UNLIMITED: DecodeLimits = DecodeLimits {
        max_tasks: None,
        max_description_len: None,
    };
}

impl Default for DecodeLimits {
    fn default() -> Self {
        Self {
            max_tasks: Some(DEFAULT_MAX_TASKS),
            max_description_len: Some(DEFAULT_MAX_DESCRIPTION_LEN),
        }
    }
}

/// Tasks in source order, plus whether the task cap cut the list short.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct DecodedTasks {
    pub tasks: Vec<Task>,
    pub truncated: bool,
}

/// Decode a `GET /tasks` body.
pub fn decode_tasks(body: &[u8], limits: DecodeLimits) -> Result<DecodedTasks, DecodeError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Err(DecodeError::EmptyResponse);
    }

    let doc: Value =
        serde_json::from_slice(body).map_err(|e| DecodeError::MalformedJson(e.to_string()))?;
    let Value::Array(items) = doc else {
        return Err(DecodeError::UnexpectedShape);
    };

    let mut decoded = DecodedTasks::default();
    for item in &items {
        let Value::Object(obj) = item else {
            continue;
        };
        if limits.max_tasks.is_some_and(|max| decoded.tasks.len() >= max) {
            decoded.truncated = true;
            break;
        }
        decoded.tasks.push(decode_task(obj, limits));
    }

    if decoded.truncated {
        warn!(
            kept = decoded.tasks.len(),
            received = items.len(),
            "task list truncated by max_tasks"
        );
    }
    Ok(decoded)
}

fn decode_task(obj: &Map<String, Value>, limits: DecodeLimits) -> Task {
    let description = string_field(obj, "description")
        .filter(|d| {
            limits
                .max_description_len
                .is_none_or(|max| d.chars().count() <= max)
        })
        .unwrap_or_default();

    let due = obj.get("due").and_then(Value::as_object);
    let due_date = due.and_then(|d| string_field(d, "date"));
    let due_string = due.and_then(|d| string_field(d, "string"));

    let priority = obj
        .get("priority")
        .and_then(Value::as_i64)
        .map(Priority::from_upstream)
        .unwrap_or_default();

    Task {
        id: string_field(obj, "id").unwrap_or_default(),
        content: string_field(obj, "content").unwrap_or_default(),
        description,
        project_id: string_field(obj, "project_id"),
        section_id: string_field(obj, "section_id"),
        parent_id: string_field(obj, "parent_id"),
        due_date,
        due_string,
        priority,
        is_completed: false,
        is_deleted: false,
    }
}

fn string_field(obj: &Map<String, Value>, key: &str) -> Option<String> {
    obj.get(key).and_then(Value::as_str).map(str::to_string)
}

/// Re-encode tasks in the upstream JSON shape.
pub fn encode_tasks(tasks: &[Task]) -> Value {
    Value::Array(tasks.iter().map(encode_task).collect())
}

fn encode_task(task: &Task) -> Value {
    let mut obj = json!({
        "id": task.id,
        "content": task.content,
        "description": task.description,
        "project_id": task.project_id,
        "section_id": task.section_id,
        "parent_id": task.parent_id,
        "priority": task.priority.upstream(),
        "is_completed": task.is_completed,
    });
    if task.due_date.is_some() || task.due_string.is_some() {
        obj["due"] = json!({
            "date": task.due_date,
            "string": task.due_string,
        });
    }
    obj
}
