//! sdoc-watch - client-side project synchronization
//!
//! Keeps a remote view of a project consistent with server-side state while
//! pipeline work is in flight: a typed API client plus a polling watcher
//! that re-fetches the project aggregate on a fixed interval until the
//! project reaches a terminal status.

pub mod client;
pub mod watcher;

pub use client::{ApiClient, WatchError};
pub use watcher::{ProjectUpdate, ProjectWatcher, DEFAULT_POLL_INTERVAL};
