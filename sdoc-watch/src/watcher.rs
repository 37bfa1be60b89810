//! Polling watcher for in-flight projects
//!
//! Two-state machine: **polling** (a repeating timer re-fetches the project
//! aggregate) and **idle-terminal** (no timer). The watcher fetches once on
//! start, then keeps a fixed-interval timer armed until a fetched status is
//! terminal or the watcher is stopped. Stopping only suppresses future
//! ticks; an already-in-flight fetch completes and reports once more.
//!
//! Overlapping fetches are tolerated by design: the aggregate read is
//! idempotent, so a slow response at worst delivers a slightly stale view
//! that the next tick replaces.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tokio::time::interval;
use tracing::{debug, warn};

use sdoc_common::db::models::ProjectDetail;
use sdoc_common::pipeline::{derive_stage_states, StageView};
use sdoc_common::types::ProjectStatus;

use crate::client::ApiClient;

/// Policy interval between re-fetches while a project is in flight.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// One observed snapshot: the fetched aggregate plus the derived per-stage
/// render states for the stepper.
#[derive(Debug, Clone)]
pub struct ProjectUpdate {
    pub detail: ProjectDetail,
    pub stages: Vec<StageView>,
}

/// Handle to a running watch task.
pub struct ProjectWatcher {
    running: Arc<AtomicBool>,
    handle: JoinHandle<()>,
}

impl ProjectWatcher {
    /// Start watching a project, invoking `on_update` for every fetched
    /// snapshot (including the initial one).
    pub fn spawn<F>(
        client: ApiClient,
        project_id: impl Into<String>,
        poll_interval: Duration,
        mut on_update: F,
    ) -> Self
    where
        F: FnMut(ProjectUpdate) + Send + 'static,
    {
        let project_id = project_id.into();
        let running = Arc::new(AtomicBool::new(true));
        let flag = Arc::clone(&running);

        let handle = tokio::spawn(async move {
            // Initial fetch on view load
            if let Some(status) = fetch_and_report(&client, &project_id, &mut on_update).await {
                if status.is_terminal() {
                    debug!("Project {} already terminal ({})", project_id, status);
                    return;
                }
            }

            let mut tick = interval(poll_interval);
            tick.tick().await; // first tick completes immediately

            loop {
                tick.tick().await;

                if !flag.load(Ordering::SeqCst) {
                    debug!("Watcher for {} stopped", project_id);
                    break;
                }

                if let Some(status) = fetch_and_report(&client, &project_id, &mut on_update).await {
                    if status.is_terminal() {
                        debug!("Project {} reached terminal status {}", project_id, status);
                        break;
                    }
                }
            }
        });

        Self { running, handle }
    }

    /// Disarm the timer: no further fetches are started. An in-flight fetch
    /// may still complete and report once.
    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    /// Whether the watch task has exited (terminal status or stop observed).
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    /// Wait for the watch task to exit.
    pub async fn join(mut self) {
        let _ = (&mut self.handle).await;
    }
}

impl Drop for ProjectWatcher {
    fn drop(&mut self) {
        // Tearing down the view disarms the timer; the detached task exits
        // on its next tick.
        self.running.store(false, Ordering::SeqCst);
    }
}

/// Fetch the aggregate, derive stage states, report to the observer.
///
/// A failed fetch is reported as `None` and polling continues: transient
/// server unavailability must not kill the view.
async fn fetch_and_report<F>(
    client: &ApiClient,
    project_id: &str,
    on_update: &mut F,
) -> Option<ProjectStatus>
where
    F: FnMut(ProjectUpdate) + Send,
{
    match client.get_project(project_id).await {
        Ok(detail) => {
            let status = detail.project.status;
            let stages = derive_stage_states(status, &detail.jobs);
            on_update(ProjectUpdate { detail, stages });
            Some(status)
        }
        Err(e) => {
            warn!("Failed to fetch project {}: {}", project_id, e);
            None
        }
    }
}
