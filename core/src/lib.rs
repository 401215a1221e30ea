//! Task synchronization engine for a remote to-do service.
//!
//! # Overview
//! Keeps a memory-bounded, always-current snapshot of a remote task list.
//! The core never touches the network (host-does-IO pattern): it builds
//! `HttpRequest` values and consumes whatever the host reports back, which
//! keeps every state transition deterministic and testable.
//!
//! # Design
//! - `task`: the typed task model and its due-date derivations.
//! - `decode`: defensive, size-bounded decoding of untrusted JSON bodies.
//! - `client`: `build_*` / `parse_*` pairs for listing and closing tasks.
//! - `scheduler`: the single-flight sync state machine that owns the snapshot.
//! - `config`: scalar knobs, loadable from TOML.

pub mod client;
pub mod config;
pub mod decode;
pub mod error;
pub mod http;
pub mod scheduler;
pub mod task;

pub use client::TodoistClient;
pub use config::{ConfigError, SyncConfig};
pub use decode::{decode_tasks, encode_tasks, DecodeLimits, DecodedTasks};
pub use error::{ApiError, DecodeError};
pub use http::{HttpMethod, HttpOutcome, HttpRequest, HttpResponse, TransportError};
pub use scheduler::{
    Buckets, Notice, Outbound, RequestId, RequestKind, SchedulerConfig, Snapshot, SnapshotReader,
    SyncScheduler, SyncStatus, Uptime,
};
pub use task::{Priority, Task};
