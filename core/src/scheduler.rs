//! Periodic, single-flight synchronization of the task snapshot.
//!
//! # Design
//! `SyncScheduler` is a sans-IO state machine. `tick`, `trigger_refresh` and
//! `complete` never perform I/O; when a request has to go out they return an
//! [`Outbound`] tagged with a [`RequestId`]. The host executes it and reports
//! the outcome through `handle_response`, in whatever order exchanges finish.
//!
//! Only one task-list fetch is in flight at a time. A refresh requested while
//! `Loading` is dropped. A fetch completion is applied only if its id is the
//! one currently in flight; anything else (a duplicate, or a response that
//! arrives after the watchdog gave up) is discarded.
//!
//! The snapshot is replaced wholesale behind an `Arc` and published through
//! [`SnapshotReader`], so readers on other threads never observe a partially
//! updated list.

use std::collections::{BTreeMap, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use chrono::NaiveDateTime;
use parking_lot::RwLock;
use tracing::{debug, error, info, warn};

use crate::client::{TodoistClient, DEFAULT_TIMEOUT};
use crate::http::{HttpOutcome, HttpRequest};
use crate::task::Task;

pub const DEFAULT_UPDATE_INTERVAL: Duration = Duration::from_secs(300);
pub const DEFAULT_BUCKET_CAP: usize = 5;
/// Slack past the request timeout before the watchdog gives up on a fetch.
/// Uptime has whole-second resolution, so the transport must get to report
/// its own timeout first.
pub const WATCHDOG_GRACE: Duration = Duration::from_secs(2);
/// Close requests awaiting a response. The oldest is forgotten beyond this.
pub const MAX_PENDING_COMPLETIONS: usize = 16;

/// Seconds on the host's monotonic clock. Wraps around; all arithmetic on it
/// goes through [`Uptime::since`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Uptime(pub u32);

impl Uptime {
    /// Seconds elapsed from `earlier` to `self`, modulo 2^32.
    pub fn since(self, earlier: Uptime) -> u32 {
        self.0.wrapping_sub(earlier.0)
    }
}

/// Identifies one outbound request so its completion can be matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequestKind {
    ListTasks,
    CompleteTask { task_id: String },
}

/// A request the host must execute, then report back with the same `id`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbound {
    pub id: RequestId,
    pub kind: RequestKind,
    pub request: HttpRequest,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum SyncStatus {
    #[default]
    Idle,
    Loading,
    Ready,
    Error(String),
}

/// A transient failure report for the presentation layer. Not a state
/// transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub task_id: String,
    pub message: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    pub update_interval: Duration,
    /// How long a fetch may stay `Loading` before the scheduler gives up on it.
    pub request_timeout: Duration,
    /// Maximum tasks per due-date bucket.
    pub bucket_cap: usize,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            update_interval: DEFAULT_UPDATE_INTERVAL,
            request_timeout: DEFAULT_TIMEOUT,
            bucket_cap: DEFAULT_BUCKET_CAP,
        }
    }
}

/// The scheduler's authoritative view. Never mutated after publication.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub tasks: Vec<Task>,
    /// Uptime of the last successful fetch.
    pub fetched_at: Option<Uptime>,
    /// The last successful fetch hit the decoder's task cap.
    pub truncated: bool,
    pub status: SyncStatus,
}

/// Tasks grouped by due date relative to `now`.
#[derive(Debug, Default, PartialEq, Eq)]
pub struct Buckets<'a> {
    pub overdue: Vec<&'a Task>,
    pub due_today: Vec<&'a Task>,
    pub due_tomorrow: Vec<&'a Task>,
    /// Bucket-eligible tasks left out because their bucket was full.
    pub hidden: usize,
}

impl Buckets<'_> {
    pub fn is_empty(&self) -> bool {
        self.overdue.is_empty() && self.due_today.is_empty() && self.due_tomorrow.is_empty()
    }
}

impl Snapshot {
    /// Look a task up by its stable id.
    pub fn task(&self, id: &str) -> Option<&Task> {
        self.tasks.iter().find(|t| t.id == id)
    }

    /// Split tasks into overdue / today / tomorrow, each holding at most `cap`
    /// tasks in snapshot order. Tasks due later, or without a due date, are in
    /// none of them.
    pub fn buckets(&self, now: NaiveDateTime, cap: usize) -> Buckets<'_> {
        let mut buckets = Buckets::default();
        for task in &self.tasks {
            let bucket = if task.is_overdue(now) {
                &mut buckets.overdue
            } else if task.is_due_today(now) {
                &mut buckets.due_today
            } else if task.is_due_tomorrow(now) {
                &mut buckets.due_tomorrow
            } else {
                continue;
            };
            if bucket.len() < cap {
                bucket.push(task);
            } else {
                buckets.hidden += 1;
            }
        }
        if buckets.hidden > 0 {
            warn!(cap, hidden = buckets.hidden, "limiting displayed tasks per section");
        }
        buckets
    }
}

/// Cloneable read handle on the published snapshot.
#[derive(Debug, Clone, Default)]
pub struct SnapshotReader {
    inner: Arc<RwLock<Arc<Snapshot>>>,
}

impl SnapshotReader {
    pub fn load(&self) -> Arc<Snapshot> {
        Arc::clone(&self.inner.read())
    }

    fn store(&self, snapshot: Arc<Snapshot>) {
        *self.inner.write() = snapshot;
    }
}

#[derive(Debug, Clone, Copy)]
struct InFlight {
    id: RequestId,
    started: Uptime,
}

pub struct SyncScheduler {
    client: TodoistClient,
    config: SchedulerConfig,
    snapshot: Arc<Snapshot>,
    reader: SnapshotReader,
    fetch: Option<InFlight>,
    last_attempt: Option<Uptime>,
    completions: BTreeMap<RequestId, String>,
    notices: VecDeque<Notice>,
    next_id: u64,
}

impl SyncScheduler {
    pub fn new(client: TodoistClient, config: SchedulerConfig) -> Self {
        Self {
            client,
            config,
            snapshot: Arc::default(),
            reader: SnapshotReader::default(),
            fetch: None,
            last_attempt: None,
            completions: BTreeMap::new(),
            notices: VecDeque::new(),
            next_id: 1,
        }
    }

    /// Replace credentials and polling period. Applies from the next fetch;
    /// an in-flight request keeps the key it was built with.
    pub fn configure(&mut self, api_key: &str, update_interval: Duration) {
        self.client.set_api_key(api_key);
        self.config.update_interval = update_interval;
        let key = if api_key.is_empty() { "(empty)" } else { "(set)" };
        info!(key, interval_secs = update_interval.as_secs(), "sync configured");
    }

    pub fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    pub fn snapshot(&self) -> Arc<Snapshot> {
        Arc::clone(&self.snapshot)
    }

    pub fn status(&self) -> &SyncStatus {
        &self.snapshot.status
    }

    pub fn reader(&self) -> SnapshotReader {
        self.reader.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.fetch.is_some()
    }

    /// Close requests handed out but not yet answered.
    pub fn pending_completions(&self) -> usize {
        self.completions.len()
    }

    /// Drain pending completion-failure notices, oldest first.
    pub fn take_notices(&mut self) -> Vec<Notice> {
        self.notices.drain(..).collect()
    }

    /// Call on a regular cadence. Starts a fetch when the interval has elapsed
    /// since the last attempt (or none was ever made), and expires a fetch
    /// that has been loading longer than the request timeout plus
    /// [`WATCHDOG_GRACE`].
    pub fn tick(&mut self, now: Uptime) -> Option<Outbound> {
        if let Some(fetch) = self.fetch {
            let limit = self
                .config
                .request_timeout
                .as_secs()
                .saturating_add(WATCHDOG_GRACE.as_secs());
            if u64::from(now.since(fetch.started)) > limit {
                warn!(id = %fetch.id, "fetch timed out; late response will be ignored");
                self.fetch = None;
                self.fail("request timed out".to_string());
            }
            return None;
        }

        let due = match self.last_attempt {
            None => true,
            Some(last) => u64::from(now.since(last)) >= self.config.update_interval.as_secs(),
        };
        if due {
            self.start_fetch(now)
        } else {
            None
        }
    }

    /// Fetch now unless a fetch is already loading.
    pub fn trigger_refresh(&mut self, now: Uptime) -> Option<Outbound> {
        if self.fetch.is_some() {
            debug!("refresh requested while loading; ignored");
            return None;
        }
        self.start_fetch(now)
    }

    /// Ask the server to close `task_id`. The snapshot is not touched; a
    /// successful close triggers a refresh instead.
    pub fn complete(&mut self, task_id: &str) -> Option<Outbound> {
        info!(task_id, "marking task as completed");
        match self.client.build_complete_task(task_id) {
            Ok(request) => {
                let id = self.next_request_id();
                self.completions.insert(id, task_id.to_string());
                while self.completions.len() > MAX_PENDING_COMPLETIONS {
                    if let Some((old, dropped)) = self.completions.pop_first() {
                        warn!(id = %old, task_id = %dropped, "no response for close request; forgetting it");
                    }
                }
                Some(Outbound {
                    id,
                    kind: RequestKind::CompleteTask {
                        task_id: task_id.to_string(),
                    },
                    request,
                })
            }
            Err(e) => {
                self.notify(task_id, e.to_string());
                None
            }
        }
    }

    /// Apply the outcome of a request previously returned by this scheduler.
    /// May return a follow-up request (the refresh after a successful close).
    pub fn handle_response(
        &mut self,
        id: RequestId,
        outcome: HttpOutcome,
        now: Uptime,
    ) -> Option<Outbound> {
        if let Some(task_id) = self.completions.remove(&id) {
            return self.finish_completion(&task_id, outcome, now);
        }
        match self.fetch {
            Some(fetch) if fetch.id == id => {
                self.fetch = None;
                self.finish_fetch(outcome, now);
            }
            _ => debug!(%id, "discarding stale response"),
        }
        None
    }

    fn start_fetch(&mut self, now: Uptime) -> Option<Outbound> {
        self.last_attempt = Some(now);
        info!("fetching tasks");
        match self.client.build_list_tasks() {
            Ok(request) => {
                let id = self.next_request_id();
                self.fetch = Some(InFlight { id, started: now });
                self.publish(Snapshot {
                    status: SyncStatus::Loading,
                    ..(*self.snapshot).clone()
                });
                Some(Outbound {
                    id,
                    kind: RequestKind::ListTasks,
                    request,
                })
            }
            Err(e) => {
                self.fail(e.to_string());
                None
            }
        }
    }

    fn finish_fetch(&mut self, outcome: HttpOutcome, now: Uptime) {
        let result = outcome
            .map_err(Into::into)
            .and_then(|response| self.client.parse_list_tasks(response));
        match result {
            Ok(decoded) => self.publish(Snapshot {
                tasks: decoded.tasks,
                fetched_at: Some(now),
                truncated: decoded.truncated,
                status: SyncStatus::Ready,
            }),
            Err(e) => self.fail(e.to_string()),
        }
    }

    fn finish_completion(
        &mut self,
        task_id: &str,
        outcome: HttpOutcome,
        now: Uptime,
    ) -> Option<Outbound> {
        let result = outcome
            .map_err(Into::into)
            .and_then(|response| self.client.parse_complete_task(response));
        match result {
            Ok(()) => {
                info!(task_id, "task completed");
                self.trigger_refresh(now)
            }
            Err(e) => {
                self.notify(task_id, e.to_string());
                None
            }
        }
    }

    /// Enter `Error`, keeping the previous tasks visible.
    fn fail(&mut self, message: String) {
        error!(%message, "failed to fetch tasks");
        self.publish(Snapshot {
            status: SyncStatus::Error(message),
            ..(*self.snapshot).clone()
        });
    }

    fn notify(&mut self, task_id: &str, message: String) {
        error!(task_id, %message, "failed to complete task");
        self.notices.push_back(Notice {
            task_id: task_id.to_string(),
            message,
        });
    }

    fn publish(&mut self, snapshot: Snapshot) {
        self.snapshot = Arc::new(snapshot);
        self.reader.store(Arc::clone(&self.snapshot));
    }

    fn next_request_id(&mut self) -> RequestId {
        let id = RequestId(self.next_id);
        self.next_id += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http::{HttpResponse, TransportError};
    use crate::task::Priority;

    const TASKS: &str = r#"[
        {"id":"1","content":"A","priority":4,"due":{"date":"2024-01-01"}},
        {"id":"2","content":"B","due":{"date":"2024-01-02T08:00:00"}},
        {"id":"3","content":"C","due":{"date":"2024-01-03"}},
        {"id":"4","content":"D","due":{"date":"2024-02-01"}},
        {"id":"5","content":"E"}
    ]"#;

    fn scheduler() -> SyncScheduler {
        SyncScheduler::new(
            TodoistClient::new("http://localhost:3000").with_api_key("k"),
            SchedulerConfig::default(),
        )
    }

    fn ok(body: &str) -> HttpOutcome {
        Ok(HttpResponse::new(200, body))
    }

    fn now() -> NaiveDateTime {
        NaiveDateTime::parse_from_str("2024-01-02 12:00:00", "%Y-%m-%d %H:%M:%S").unwrap()
    }

    #[test]
    fn starts_idle_and_first_tick_fetches() {
        let mut s = scheduler();
        assert_eq!(s.status(), &SyncStatus::Idle);
        let out = s.tick(Uptime(0)).unwrap();
        assert_eq!(out.kind, RequestKind::ListTasks);
        assert_eq!(out.request.url, "http://localhost:3000/tasks");
        assert_eq!(s.status(), &SyncStatus::Loading);
    }

    #[test]
    fn success_replaces_snapshot() {
        let mut s = scheduler();
        let out = s.tick(Uptime(0)).unwrap();
        assert!(s.handle_response(out.id, ok(TASKS), Uptime(1)).is_none());
        let snap = s.snapshot();
        assert_eq!(snap.status, SyncStatus::Ready);
        assert_eq!(snap.tasks.len(), 5);
        assert_eq!(snap.fetched_at, Some(Uptime(1)));
        assert_eq!(snap.tasks[0].priority, Priority::P1);
    }

    #[test]
    fn success_can_shrink_the_list() {
        let mut s = scheduler();
        let out = s.trigger_refresh(Uptime(0)).unwrap();
        s.handle_response(out.id, ok(TASKS), Uptime(0));
        let out = s.trigger_refresh(Uptime(1)).unwrap();
        s.handle_response(out.id, ok(r#"[{"id":"9"}]"#), Uptime(2));
        let snap = s.snapshot();
        assert_eq!(snap.tasks.len(), 1);
        assert_eq!(snap.tasks[0].id, "9");
    }

    #[test]
    fn failure_keeps_previous_tasks() {
        let mut s = scheduler();
        let out = s.trigger_refresh(Uptime(0)).unwrap();
        s.handle_response(out.id, ok(TASKS), Uptime(0));
        let before = s.snapshot().tasks.clone();

        let out = s.trigger_refresh(Uptime(5)).unwrap();
        s.handle_response(out.id, Ok(HttpResponse::new(500, "boom")), Uptime(6));
        let snap = s.snapshot();
        assert_eq!(snap.tasks, before);
        assert_eq!(snap.fetched_at, Some(Uptime(0)));
        assert_eq!(snap.status, SyncStatus::Error("HTTP error 500: boom".to_string()));

        let out = s.trigger_refresh(Uptime(7)).unwrap();
        s.handle_response(out.id, Err(TransportError::Code(-1)), Uptime(8));
        assert_eq!(s.snapshot().tasks, before);
        assert!(matches!(s.status(), SyncStatus::Error(m) if m.starts_with("network error")));
    }

    #[test]
    fn double_trigger_sends_one_request() {
        let mut s = scheduler();
        assert!(s.trigger_refresh(Uptime(0)).is_some());
        assert!(s.trigger_refresh(Uptime(0)).is_none());
        assert!(s.tick(Uptime(1)).is_none());
        assert!(s.is_loading());
    }

    #[test]
    fn missing_key_is_an_error_state() {
        let mut s = SyncScheduler::new(TodoistClient::new("http://x"), SchedulerConfig::default());
        assert!(s.tick(Uptime(0)).is_none());
        assert_eq!(s.status(), &SyncStatus::Error("API key not set".to_string()));
        assert!(!s.is_loading());
    }

    #[test]
    fn cadence_follows_interval_even_in_error() {
        let mut s = scheduler();
        let out = s.tick(Uptime(0)).unwrap();
        s.handle_response(out.id, Err(TransportError::Timeout), Uptime(1));
        assert!(matches!(s.status(), SyncStatus::Error(_)));
        assert!(s.tick(Uptime(10)).is_none());
        assert!(s.tick(Uptime(299)).is_none());
        assert!(s.tick(Uptime(300)).is_some());
    }

    #[test]
    fn tick_survives_uptime_wraparound() {
        let mut s = scheduler();
        let start = Uptime(u32::MAX - 10);
        let out = s.tick(start).unwrap();
        s.handle_response(out.id, ok("[]"), start);
        assert!(s.tick(Uptime(100)).is_none());
        assert!(s.tick(Uptime(289)).is_some());
    }

    #[test]
    fn watchdog_expires_fetch_and_discards_late_response() {
        let mut s = scheduler();
        let out = s.tick(Uptime(0)).unwrap();
        assert!(s.tick(Uptime(12)).is_none());
        assert_eq!(s.status(), &SyncStatus::Loading);
        assert!(s.tick(Uptime(13)).is_none());
        assert_eq!(s.status(), &SyncStatus::Error("request timed out".to_string()));

        s.handle_response(out.id, ok(TASKS), Uptime(14));
        assert!(s.snapshot().tasks.is_empty());
        assert!(matches!(s.status(), SyncStatus::Error(_)));
    }

    #[test]
    fn response_at_the_request_timeout_is_applied() {
        let mut s = scheduler();
        let out = s.tick(Uptime(0)).unwrap();
        assert_eq!(out.request.timeout, Duration::from_secs(10));
        assert!(s.tick(Uptime(10)).is_none());
        assert_eq!(s.status(), &SyncStatus::Loading);

        s.handle_response(out.id, ok(r#"[{"id":"1"}]"#), Uptime(10));
        assert_eq!(s.status(), &SyncStatus::Ready);
        assert_eq!(s.snapshot().tasks.len(), 1);
    }

    #[test]
    fn transport_timeout_wins_over_watchdog() {
        let mut s = scheduler();
        let out = s.tick(Uptime(0)).unwrap();
        s.tick(Uptime(11));
        s.handle_response(out.id, Err(TransportError::Timeout), Uptime(11));
        assert_eq!(
            s.status(),
            &SyncStatus::Error("network error: request timed out".to_string())
        );
    }

    #[test]
    fn unanswered_completions_are_bounded() {
        let mut s = scheduler();
        let first = s.complete("first").unwrap();
        for i in 0..1000 {
            assert!(s.complete(&i.to_string()).is_some());
        }
        assert_eq!(s.pending_completions(), MAX_PENDING_COMPLETIONS);

        // The forgotten request no longer counts as a close.
        assert!(s
            .handle_response(first.id, Ok(HttpResponse::new(204, "")), Uptime(0))
            .is_none());
        assert!(!s.is_loading());

        let last = s.complete("last").unwrap();
        let refresh = s.handle_response(last.id, Ok(HttpResponse::new(204, "")), Uptime(1));
        assert_eq!(refresh.map(|o| o.kind), Some(RequestKind::ListTasks));
        assert_eq!(s.pending_completions(), MAX_PENDING_COMPLETIONS - 1);
    }

    #[test]
    fn duplicate_completion_is_discarded() {
        let mut s = scheduler();
        let out = s.tick(Uptime(0)).unwrap();
        s.handle_response(out.id, ok(TASKS), Uptime(1));
        s.handle_response(out.id, ok("[]"), Uptime(2));
        assert_eq!(s.snapshot().tasks.len(), 5);
    }

    #[test]
    fn complete_success_triggers_refresh() {
        let mut s = scheduler();
        let out = s.complete("7").unwrap();
        assert_eq!(out.request.url, "http://localhost:3000/tasks/7/close");
        assert_eq!(
            out.kind,
            RequestKind::CompleteTask {
                task_id: "7".to_string()
            }
        );
        let follow = s
            .handle_response(out.id, Ok(HttpResponse::new(204, "")), Uptime(3))
            .unwrap();
        assert_eq!(follow.kind, RequestKind::ListTasks);
        assert!(s.take_notices().is_empty());
    }

    #[test]
    fn complete_with_200_is_a_notice_not_a_state_change() {
        let mut s = scheduler();
        let out = s.trigger_refresh(Uptime(0)).unwrap();
        s.handle_response(out.id, ok(TASKS), Uptime(0));

        let out = s.complete("1").unwrap();
        assert!(s
            .handle_response(out.id, Ok(HttpResponse::new(200, "")), Uptime(1))
            .is_none());
        assert_eq!(s.status(), &SyncStatus::Ready);
        assert_eq!(s.snapshot().tasks.len(), 5);
        let notices = s.take_notices();
        assert_eq!(notices.len(), 1);
        assert_eq!(notices[0].task_id, "1");
        assert!(s.take_notices().is_empty());
    }

    #[test]
    fn complete_while_loading_does_not_start_second_fetch() {
        let mut s = scheduler();
        let fetch = s.tick(Uptime(0)).unwrap();
        let close = s.complete("1").unwrap();
        assert!(s
            .handle_response(close.id, Ok(HttpResponse::new(204, "")), Uptime(1))
            .is_none());
        assert!(s.is_loading());
        s.handle_response(fetch.id, ok("[]"), Uptime(2));
        assert_eq!(s.status(), &SyncStatus::Ready);
    }

    #[test]
    fn complete_without_key_is_a_notice() {
        let mut s = SyncScheduler::new(TodoistClient::new("http://x"), SchedulerConfig::default());
        assert!(s.complete("1").is_none());
        assert_eq!(s.take_notices()[0].message, "API key not set");
        assert_eq!(s.status(), &SyncStatus::Idle);
    }

    #[test]
    fn configure_applies_to_next_fetch() {
        let mut s = SyncScheduler::new(TodoistClient::new("http://x"), SchedulerConfig::default());
        s.configure("new-key", Duration::from_secs(60));
        let out = s.tick(Uptime(0)).unwrap();
        assert_eq!(out.request.header("Authorization"), Some("Bearer new-key"));
        s.handle_response(out.id, ok("[]"), Uptime(0));
        assert!(s.tick(Uptime(59)).is_none());
        assert!(s.tick(Uptime(60)).is_some());
    }

    #[test]
    fn reader_sees_whole_snapshots() {
        let mut s = scheduler();
        let reader = s.reader();
        assert_eq!(reader.load().status, SyncStatus::Idle);
        let out = s.tick(Uptime(0)).unwrap();
        assert_eq!(reader.load().status, SyncStatus::Loading);
        s.handle_response(out.id, ok(TASKS), Uptime(0));
        let snap = reader.load();
        assert_eq!(snap.status, SyncStatus::Ready);
        assert_eq!(snap.tasks.len(), 5);
    }

    #[test]
    fn buckets_split_by_due_date() {
        let mut s = scheduler();
        let out = s.tick(Uptime(0)).unwrap();
        s.handle_response(out.id, ok(TASKS), Uptime(0));
        let snap = s.snapshot();
        let b = snap.buckets(now(), 5);
        let ids = |v: &Vec<&Task>| v.iter().map(|t| t.id.clone()).collect::<Vec<_>>();
        assert_eq!(ids(&b.overdue), ["1"]);
        assert_eq!(ids(&b.due_today), ["2"]);
        assert_eq!(ids(&b.due_tomorrow), ["3"]);
        assert_eq!(b.hidden, 0);
    }

    #[test]
    fn buckets_are_capped() {
        let snap = Snapshot {
            tasks: (0..8)
                .map(|i| Task {
                    id: i.to_string(),
                    due_date: Some("2024-01-02".to_string()),
                    ..Task::default()
                })
                .collect(),
            ..Snapshot::default()
        };
        let b = snap.buckets(now(), 5);
        assert_eq!(b.due_today.len(), 5);
        assert_eq!(b.due_today[4].id, "4");
        assert_eq!(b.hidden, 3);
        assert!(snap.buckets(now(), 0).is_empty());
    }

    #[test]
    fn lookup_by_id() {
        let snap = Snapshot {
            tasks: vec![Task {
                id: "x".to_string(),
                content: "hello".to_string(),
                ..Task::default()
            }],
            ..Snapshot::default()
        };
        assert_eq!(snap.task("x").map(|t| t.content.as_str()), Some("hello"));
        assert!(snap.task("y").is_none());
    }
}
