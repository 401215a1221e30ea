//! Plain-text rendering of the categorized task list.

use std::fmt::Write;

use tasksync_core::{Buckets, Priority, Snapshot, SyncStatus, Task};

fn priority_label(p: Priority) -> &'static str {
    match p {
        Priority::P1 => "P1",
        Priority::P2 => "P2",
        Priority::P3 => "P3",
        Priority::P4 => "P4",
    }
}

fn task_line(out: &mut String, task: &Task) {
    let _ = write!(out, "  [{}] {}", priority_label(task.priority), task.content);
    let time = task.due_time();
    if !time.is_empty() {
        let _ = write!(out, " @ {time}");
    } else if let Some(label) = &task.due_string {
        let _ = write!(out, " ({label})");
    }
    let _ = writeln!(out, "  #{}", task.id);
}

fn section(out: &mut String, title: &str, tasks: &[&Task]) {
    if tasks.is_empty() {
        return;
    }
    let _ = writeln!(out, "{title} ({})", tasks.len());
    for task in tasks {
        task_line(out, task);
    }
}

pub fn status_line(snapshot: &Snapshot) -> String {
    match &snapshot.status {
        SyncStatus::Idle => "idle".to_string(),
        SyncStatus::Loading => "loading...".to_string(),
        SyncStatus::Ready if snapshot.truncated => {
            format!("{} tasks (list truncated)", snapshot.tasks.len())
        }
        SyncStatus::Ready => format!("{} tasks", snapshot.tasks.len()),
        SyncStatus::Error(msg) => format!("error: {msg}"),
    }
}

pub fn render(snapshot: &Snapshot, buckets: &Buckets<'_>) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", status_line(snapshot));
    section(&mut out, "Overdue", &buckets.overdue);
    section(&mut out, "Today", &buckets.due_today);
    section(&mut out, "Tomorrow", &buckets.due_tomorrow);
    if buckets.hidden > 0 {
        let _ = writeln!(out, "... and {} more", buckets.hidden);
    }
    if buckets.is_empty() {
        let _ = writeln!(out, "Nothing due.");
    }
    out
}
