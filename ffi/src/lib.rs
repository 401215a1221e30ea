//! C-ABI wrapper around `tasksync-core`.
//!
//! # Overview
//! Lets a firmware host with its own HTTP stack drive the sync engine. The
//! host calls `tasksync_tick` from its main loop; whenever a function returns
//! a non-null `FfiHttpRequest`, the host executes it asynchronously and later
//! reports the result with `tasksync_handle_response` (or
//! `tasksync_handle_transport_error`), which may itself return a follow-up
//! request.
//!
//! # Design
//! - Every `extern "C"` function wraps its body in `catch_unwind` so panics
//!   never cross the FFI boundary.
//! - Null handles and null required arguments are rejected with a null / false
//!   / default return, never a crash.
//! - The C caller owns all returned pointers and must call the matching
//!   `tasksync_free_*` function to release them.

pub mod types;

use std::ffi::CStr;
use std::os::raw::c_char;
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::time::Duration;

use chrono::NaiveDate;
use tasksync_core::{
    HttpResponse, Outbound, RequestId, SyncConfig, SyncScheduler, TransportError, Uptime,
};

use types::*;

/// Borrow a C string as `&str`. Null or non-UTF-8 yields `None`.
fn str_arg<'a>(s: *const c_char) -> Option<&'a str> {
    if s.is_null() {
        return None;
    }
    unsafe { CStr::from_ptr(s) }.to_str().ok()
}

/// Run `f` on the scheduler behind `handle`, or return `fallback` if the
/// handle is null or `f` panics.
fn with_scheduler<R>(
    handle: *mut FfiScheduler,
    fallback: R,
    f: impl FnOnce(&mut FfiScheduler) -> R,
) -> R {
    if handle.is_null() {
        return fallback;
    }
    catch_unwind(AssertUnwindSafe(|| f(unsafe { &mut *handle }))).unwrap_or(fallback)
}

fn request_ptr(out: Option<Outbound>) -> *mut FfiHttpRequest {
    out.map_or(std::ptr::null_mut(), FfiHttpRequest::from_outbound)
}

/// Move freshly produced notices into the handle's queue.
fn collect_notices(s: &mut FfiScheduler) {
    let notices = s.inner.take_notices();
    s.notices.extend(notices);
}

// ---------------------------------------------------------------------------
// Lifecycle
// ---------------------------------------------------------------------------

/// Configuration with every knob at its default and no API key.
#[unsafe(no_mangle)]
pub extern "C" fn tasksync_config_default() -> FfiConfig {
    let d = SyncConfig::default();
    FfiConfig {
        api_key: std::ptr::null(),
        base_url: std::ptr::null(),
        update_interval_secs: d.update_interval_secs as u32,
        request_timeout_secs: d.request_timeout_secs as u32,
        verify_tls: d.verify_tls,
        max_tasks: d.max_tasks as u32,
        max_description_len: d.max_description_len as u32,
        bucket_cap: d.bucket_cap as u32,
    }
}

/// Create a scheduler. A null `config` means all defaults.
///
/// Returns null if an internal panic occurs. Free with `tasksync_free`.
#[unsafe(no_mangle)]
pub extern "C" fn tasksync_new(config: *const FfiConfig) -> *mut FfiScheduler {
    catch_unwind(|| {
        let mut cfg = SyncConfig::default();
        if !config.is_null() {
            let c = unsafe { &*config };
            cfg.api_key = str_arg(c.api_key).map(str::to_string);
            if let Some(url) = str_arg(c.base_url) {
                cfg.base_url = url.to_string();
            }
            cfg.update_interval_secs = u64::from(c.update_interval_secs);
            cfg.request_timeout_secs = u64::from(c.request_timeout_secs);
            cfg.verify_tls = c.verify_tls;
            cfg.max_tasks = c.max_tasks as usize;
            cfg.max_description_len = c.max_description_len as usize;
            cfg.bucket_cap = c.bucket_cap as usize;
        }
        let inner = SyncScheduler::new(cfg.client(), cfg.scheduler_config());
        Box::into_raw(Box::new(FfiScheduler {
            inner,
            notices: Default::default(),
        }))
    })
    .unwrap_or(std::ptr::null_mut())
}

/// Free a scheduler created by `tasksync_new`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn tasksync_free(handle: *mut FfiScheduler) {
    if !handle.is_null() {
        let _ = catch_unwind(AssertUnwindSafe(|| {
            drop(unsafe { Box::from_raw(handle) });
        }));
    }
}

/// Replace the API key and polling interval. A null key clears it.
///
/// Returns false if `handle` is null.
#[unsafe(no_mangle)]
pub extern "C" fn tasksync_configure(
    handle: *mut FfiScheduler,
    api_key: *const c_char,
    update_interval_secs: u32,
) -> bool {
    with_scheduler(handle, false, |s| {
        let key = str_arg(api_key).unwrap_or("");
        s.inner
            .configure(key, Duration::from_secs(u64::from(update_interval_secs)));
        true
    })
}

// ---------------------------------------------------------------------------
// Driving the scheduler
// ---------------------------------------------------------------------------

/// Call regularly with the host's monotonic clock in seconds (wrapping).
/// Returns a request to execute, or null.
#[unsafe(no_mangle)]
pub extern "C" fn tasksync_tick(handle: *mut FfiScheduler, uptime_secs: u32) -> *mut FfiHttpRequest {
    with_scheduler(handle, std::ptr::null_mut(), |s| {
        request_ptr(s.inner.tick(Uptime(uptime_secs)))
    })
}

/// Fetch now unless a fetch is already in flight (then returns null).
#[unsafe(no_mangle)]
pub extern "C" fn tasksync_trigger_refresh(
    handle: *mut FfiScheduler,
    uptime_secs: u32,
) -> *mut FfiHttpRequest {
    with_scheduler(handle, std::ptr::null_mut(), |s| {
        request_ptr(s.inner.trigger_refresh(Uptime(uptime_secs)))
    })
}

/// Build the request closing `task_id`. Returns null and queues a notice if
/// it cannot be built (no API key, empty or unsafe id); null without a notice if
/// `task_id` is null.
#[unsafe(no_mangle)]
pub extern "C" fn tasksync_complete(
    handle: *mut FfiScheduler,
    task_id: *const c_char,
) -> *mut FfiHttpRequest {
    with_scheduler(handle, std::ptr::null_mut(), |s| {
        let Some(id) = str_arg(task_id) else {
            return std::ptr::null_mut();
        };
        let out = s.inner.complete(id);
        collect_notices(s);
        request_ptr(out)
    })
}

/// Report a completed HTTP exchange for `request_id`. May return a follow-up
/// request (the refresh after a successful completion).
#[unsafe(no_mangle)]
pub extern "C" fn tasksync_handle_response(
    handle: *mut FfiScheduler,
    request_id: u64,
    response: *const FfiHttpResponse,
    uptime_secs: u32,
) -> *mut FfiHttpRequest {
    with_scheduler(handle, std::ptr::null_mut(), |s| {
        if response.is_null() {
            return std::ptr::null_mut();
        }
        let resp = unsafe { &*response };
        let body = if resp.body.is_null() || resp.body_len == 0 {
            Vec::new()
        } else {
            unsafe { std::slice::from_raw_parts(resp.body, resp.body_len) }.to_vec()
        };
        let out = s.inner.handle_response(
            RequestId(request_id),
            Ok(HttpResponse::new(resp.status, body)),
            Uptime(uptime_secs),
        );
        collect_notices(s);
        request_ptr(out)
    })
}

/// Report that `request_id` failed without an HTTP status (connection
/// refused, timeout, TLS). `code` is the platform's error code.
#[unsafe(no_mangle)]
pub extern "C" fn tasksync_handle_transport_error(
    handle: *mut FfiScheduler,
    request_id: u64,
    code: i32,
    uptime_secs: u32,
) -> *mut FfiHttpRequest {
    with_scheduler(handle, std::ptr::null_mut(), |s| {
        let out = s.inner.handle_response(
            RequestId(request_id),
            Err(TransportError::Code(code)),
            Uptime(uptime_secs),
        );
        collect_notices(s);
        request_ptr(out)
    })
}

// ---------------------------------------------------------------------------
// Reading state
// ---------------------------------------------------------------------------

#[unsafe(no_mangle)]
pub extern "C" fn tasksync_status(handle: *mut FfiScheduler) -> FfiSyncStatus {
    with_scheduler(handle, FfiSyncStatus::Idle, |s| s.inner.status().into())
}

/// The current error message, or null when not in the error state.
/// Free with `tasksync_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn tasksync_error_message(handle: *mut FfiScheduler) -> *mut c_char {
    with_scheduler(handle, std::ptr::null_mut(), |s| match s.inner.status() {
        tasksync_core::SyncStatus::Error(msg) => c_string(msg),
        _ => std::ptr::null_mut(),
    })
}

/// Pop the oldest completion-failure notice as `"<task id>: <message>"`, or
/// null if there is none. Free with `tasksync_free_string`.
#[unsafe(no_mangle)]
pub extern "C" fn tasksync_take_notice(handle: *mut FfiScheduler) -> *mut c_char {
    with_scheduler(handle, std::ptr::null_mut(), |s| {
        collect_notices(s);
        match s.notices.pop_front() {
            Some(n) => c_string(&format!("{}: {}", n.task_id, n.message)),
            None => std::ptr::null_mut(),
        }
    })
}

/// Number of tasks in the current snapshot.
#[unsafe(no_mangle)]
pub extern "C" fn tasksync_task_count(handle: *mut FfiScheduler) -> u32 {
    with_scheduler(handle, 0, |s| s.inner.snapshot().tasks.len() as u32)
}

/// Categorize the current snapshot against the given local date and time.
///
/// Returns null if the date or time is invalid. Free with
/// `tasksync_free_buckets`.
#[unsafe(no_mangle)]
pub extern "C" fn tasksync_buckets(
    handle: *mut FfiScheduler,
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> *mut FfiBuckets {
    with_scheduler(handle, std::ptr::null_mut(), |s| {
        let Some(now) =
            NaiveDate::from_ymd_opt(year, month, day).and_then(|d| d.and_hms_opt(hour, minute, 0))
        else {
            return std::ptr::null_mut();
        };
        let snapshot = s.inner.snapshot();
        let buckets = snapshot.buckets(now, s.inner.config().bucket_cap);
        FfiBuckets::from_buckets(&buckets)
    })
}

// ---------------------------------------------------------------------------
// Free functions
// ---------------------------------------------------------------------------

/// Free a request returned by any driving function. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn tasksync_free_request(req: *mut FfiHttpRequest) {
    if !req.is_null() {
        let _ = catch_unwind(|| unsafe { FfiHttpRequest::free(req) });
    }
}

/// Free buckets returned by `tasksync_buckets`. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn tasksync_free_buckets(buckets: *mut FfiBuckets) {
    if !buckets.is_null() {
        let _ = catch_unwind(|| unsafe { FfiBuckets::free(buckets) });
    }
}

/// Free a string returned by this library. Safe to call with null.
#[unsafe(no_mangle)]
pub extern "C" fn tasksync_free_string(s: *mut c_char) {
    let _ = catch_unwind(|| unsafe { free_c_string(s) });
}
