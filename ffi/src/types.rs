//! `#[repr(C)]` types for the FFI boundary.
//!
//! # Design
//! Each type mirrors a core type but uses C-compatible representations:
//! `*mut c_char` instead of `String`, raw pointers plus lengths instead of
//! `Vec`, and enums with explicit discriminants. Optional strings become
//! empty strings rather than null so C renderers can print them blindly.
//! Conversion functions live here to keep `lib.rs` focused on the
//! `extern "C"` surface.

use std::collections::VecDeque;
use std::ffi::CString;
use std::os::raw::c_char;

use tasksync_core::{
    Buckets, HttpMethod, Notice, Outbound, Priority, RequestKind, SyncScheduler, SyncStatus, Task,
};

/// Opaque handle to a `SyncScheduler`. C callers receive a pointer to this
/// and pass it back into every FFI function.
pub struct FfiScheduler {
    pub(crate) inner: SyncScheduler,
    pub(crate) notices: VecDeque<Notice>,
}

/// Copy `s` into a heap C string. Interior NULs are dropped.
pub(crate) fn c_string(s: &str) -> *mut c_char {
    let cleaned: String = s.chars().filter(|&c| c != '\0').collect();
    CString::new(cleaned).unwrap_or_default().into_raw()
}

/// Release a string produced by `c_string`. Null is ignored.
pub(crate) unsafe fn free_c_string(s: *mut c_char) {
    if !s.is_null() {
        drop(CString::from_raw(s));
    }
}

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Scalar configuration passed to `tasksync_new`.
///
/// `api_key` and `base_url` may be null (no key / default URL). A zero
/// `max_tasks` or `max_description_len` disables that limit; a zero
/// `request_timeout_secs` uses the default.
#[repr(C)]
pub struct FfiConfig {
    pub api_key: *const c_char,
    pub base_url: *const c_char,
    pub update_interval_secs: u32,
    pub request_timeout_secs: u32,
    pub verify_tls: bool,
    pub max_tasks: u32,
    pub max_description_len: u32,
    pub bucket_cap: u32,
}

// ---------------------------------------------------------------------------
// Request types
// ---------------------------------------------------------------------------

#[repr(C)]
pub enum FfiHttpMethod {
    Get = 0,
    Post = 1,
}

impl From<HttpMethod> for FfiHttpMethod {
    fn from(m: HttpMethod) -> Self {
        match m {
            HttpMethod::Get => FfiHttpMethod::Get,
            HttpMethod::Post => FfiHttpMethod::Post,
        }
    }
}

#[repr(C)]
pub enum FfiRequestKind {
    ListTasks = 0,
    CompleteTask = 1,
}

/// A single HTTP header as a key-value pair of C strings.
#[repr(C)]
pub struct FfiHeader {
    pub key: *mut c_char,
    pub value: *mut c_char,
}

/// A request the C host must execute and then report back with
/// `tasksync_handle_response` or `tasksync_handle_transport_error`, passing
/// `request_id` unchanged.
///
/// `body` is null when the request has no body and an empty string for an
/// explicit empty body.
#[repr(C)]
pub struct FfiHttpRequest {
    pub request_id: u64,
    pub kind: FfiRequestKind,
    pub method: FfiHttpMethod,
    pub url: *mut c_char,
    pub headers: *mut FfiHeader,
    pub headers_len: u32,
    pub body: *mut c_char,
    pub timeout_ms: u32,
    pub verify_tls: bool,
}

impl FfiHttpRequest {
    /// Convert an `Outbound` into a heap-allocated `FfiHttpRequest`.
    pub(crate) fn from_outbound(out: Outbound) -> *mut Self {
        let req = out.request;
        let body = match req.body {
            Some(b) => c_string(&String::from_utf8_lossy(&b)),
            None => std::ptr::null_mut(),
        };

        let headers_len = req.headers.len() as u32;
        let headers = if req.headers.is_empty() {
            std::ptr::null_mut()
        } else {
            let ffi_headers: Box<[FfiHeader]> = req
                .headers
                .iter()
                .map(|(k, v)| FfiHeader {
                    key: c_string(k),
                    value: c_string(v),
                })
                .collect();
            Box::into_raw(ffi_headers) as *mut FfiHeader
        };

        let kind = match out.kind {
            RequestKind::ListTasks => FfiRequestKind::ListTasks,
            RequestKind::CompleteTask { .. } => FfiRequestKind::CompleteTask,
        };

        Box::into_raw(Box::new(FfiHttpRequest {
            request_id: out.id.0,
            kind,
            method: req.method.into(),
            url: c_string(&req.url),
            headers,
            headers_len,
            body,
            timeout_ms: u32::try_from(req.timeout.as_millis()).unwrap_or(u32::MAX),
            verify_tls: req.verify_tls,
        }))
    }

    pub(crate) unsafe fn free(ptr: *mut Self) {
        let req = Box::from_raw(ptr);
        free_c_string(req.url);
        free_c_string(req.body);
        if !req.headers.is_null() {
            let slice = std::ptr::slice_from_raw_parts_mut(req.headers, req.headers_len as usize);
            let headers = Box::from_raw(slice);
            for h in headers.iter() {
                free_c_string(h.key);
                free_c_string(h.value);
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Response input (caller-provided, not heap-allocated by us)
// ---------------------------------------------------------------------------

/// A completed HTTP exchange, built by the C caller on its own stack.
/// The FFI layer reads but does not free `body`.
#[repr(C)]
pub struct FfiHttpResponse {
    pub status: u16,
    pub body: *const u8,
    pub body_len: usize,
}

// ---------------------------------------------------------------------------
// State and task output
// ---------------------------------------------------------------------------

#[repr(C)]
#[derive(Debug, PartialEq, Eq)]
pub enum FfiSyncStatus {
    Idle = 0,
    Loading = 1,
    Ready = 2,
    Error = 3,
}

impl From<&SyncStatus> for FfiSyncStatus {
    fn from(s: &SyncStatus) -> Self {
        match s {
            SyncStatus::Idle => FfiSyncStatus::Idle,
            SyncStatus::Loading => FfiSyncStatus::Loading,
            SyncStatus::Ready => FfiSyncStatus::Ready,
            SyncStatus::Error(_) => FfiSyncStatus::Error,
        }
    }
}

/// One task prepared for display. `priority` is 1 (most urgent) to 4.
#[repr(C)]
pub struct FfiTask {
    pub id: *mut c_char,
    pub content: *mut c_char,
    pub description: *mut c_char,
    pub due_date: *mut c_char,
    pub due_string: *mut c_char,
    pub due_time: *mut c_char,
    pub priority: u8,
    pub color: u32,
}

impl FfiTask {
    fn from_task(task: &Task) -> Self {
        let priority = match task.priority {
            Priority::P1 => 1,
            Priority::P2 => 2,
            Priority::P3 => 3,
            Priority::P4 => 4,
        };
        FfiTask {
            id: c_string(&task.id),
            content: c_string(&task.content),
            description: c_string(&task.description),
            due_date: c_string(task.due_date.as_deref().unwrap_or("")),
            due_string: c_string(task.due_string.as_deref().unwrap_or("")),
            due_time: c_string(task.due_time()),
            priority,
            color: task.priority_color(),
        }
    }

    unsafe fn release(&self) {
        for s in [
            self.id,
            self.content,
            self.description,
            self.due_date,
            self.due_string,
            self.due_time,
        ] {
            free_c_string(s);
        }
    }
}

#[repr(C)]
pub struct FfiTaskList {
    pub items: *mut FfiTask,
    pub len: u32,
}

impl FfiTaskList {
    fn from_tasks(tasks: &[&Task]) -> Self {
        if tasks.is_empty() {
            return FfiTaskList {
                items: std::ptr::null_mut(),
                len: 0,
            };
        }
        let items: Box<[FfiTask]> = tasks.iter().map(|t| FfiTask::from_task(t)).collect();
        let len = items.len() as u32;
        FfiTaskList {
            items: Box::into_raw(items) as *mut FfiTask,
            len,
        }
    }

    unsafe fn release(&self) {
        if self.items.is_null() {
            return;
        }
        let slice = std::ptr::slice_from_raw_parts_mut(self.items, self.len as usize);
        let items = Box::from_raw(slice);
        for item in items.iter() {
            item.release();
        }
    }
}

/// Overdue / today / tomorrow sections, each already capped.
#[repr(C)]
pub struct FfiBuckets {
    pub overdue: FfiTaskList,
    pub due_today: FfiTaskList,
    pub due_tomorrow: FfiTaskList,
    pub hidden: u32,
}

impl FfiBuckets {
    pub(crate) fn from_buckets(b: &Buckets<'_>) -> *mut Self {
        Box::into_raw(Box::new(FfiBuckets {
            overdue: FfiTaskList::from_tasks(&b.overdue),
            due_today: FfiTaskList::from_tasks(&b.due_today),
            due_tomorrow: FfiTaskList::from_tasks(&b.due_tomorrow),
            hidden: u32::try_from(b.hidden).unwrap_or(u32::MAX),
        }))
    }

    pub(crate) unsafe fn free(ptr: *mut Self) {
        let buckets = Box::from_raw(ptr);
        buckets.overdue.release();
        buckets.due_today.release();
        buckets.due_tomorrow.release();
    }
}
