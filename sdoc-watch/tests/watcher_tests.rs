//! Watcher integration tests against a scripted in-process server
//!
//! The test server pops one status per fetch from a script (the last status
//! repeats), so each test can assert exactly how many fetches the watcher
//! performed and when it stopped.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::extract::{Path, State};
use axum::routing::get;
use axum::{Json, Router};
use chrono::Utc;
use tokio::sync::mpsc;
use tokio::time::timeout;

use sdoc_common::db::models::{Project, ProjectDetail};
use sdoc_common::pipeline::StageState;
use sdoc_common::types::{ProjectStatus, SourceType};
use sdoc_watch::{ApiClient, ProjectWatcher};

const POLL: Duration = Duration::from_millis(40);

#[derive(Clone)]
struct ScriptState {
    statuses: Arc<Mutex<VecDeque<ProjectStatus>>>,
    fetches: Arc<AtomicUsize>,
}

fn detail(id: &str, status: ProjectStatus) -> ProjectDetail {
    let now = Utc::now();
    ProjectDetail {
        project: Project {
            id: id.to_string(),
            title: "scripted".to_string(),
            source_type: SourceType::Youtube,
            source_url: Some("https://youtube.com/watch?v=test".to_string()),
            video_path: None,
            audio_path: None,
            transcript_path: None,
            analysis_path: None,
            status,
            error_message: None,
            video_duration: None,
            created_at: now,
            updated_at: now,
        },
        lessons: Vec::new(),
        jobs: Vec::new(),
    }
}

async fn scripted_get_project(
    State(state): State<ScriptState>,
    Path(id): Path<String>,
) -> Json<ProjectDetail> {
    state.fetches.fetch_add(1, Ordering::SeqCst);
    let mut script = state.statuses.lock().unwrap();
    let status = if script.len() > 1 {
        script.pop_front().unwrap()
    } else {
        *script.front().expect("script must not be empty")
    };
    Json(detail(&id, status))
}

/// Spawn the scripted server on an ephemeral port; returns base url, fetch
/// counter and the shared script.
async fn spawn_server(script: Vec<ProjectStatus>) -> (String, Arc<AtomicUsize>, ScriptState) {
    let state = ScriptState {
        statuses: Arc::new(Mutex::new(script.into_iter().collect())),
        fetches: Arc::new(AtomicUsize::new(0)),
    };
    let fetches = Arc::clone(&state.fetches);

    let app = Router::new()
        .route("/projects/:id", get(scripted_get_project))
        .with_state(state.clone());

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    (format!("http://{addr}"), fetches, state)
}

#[tokio::test]
async fn polls_through_in_flight_statuses_and_stops_at_completed() {
    let (base, fetches, _state) = spawn_server(vec![
        ProjectStatus::Pending,
        ProjectStatus::Downloading,
        ProjectStatus::Downloading,
        ProjectStatus::Completed,
    ])
    .await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let watcher = ProjectWatcher::spawn(ApiClient::new(&base), "p1", POLL, move |update| {
        let _ = tx.send(update);
    });

    let mut observed = Vec::new();
    while let Ok(Some(update)) = timeout(Duration::from_secs(2), rx.recv()).await {
        let terminal = update.detail.project.status.is_terminal();
        observed.push(update);
        if terminal {
            break;
        }
    }

    let statuses: Vec<ProjectStatus> = observed.iter().map(|u| u.detail.project.status).collect();
    assert_eq!(
        statuses,
        vec![
            ProjectStatus::Pending,
            ProjectStatus::Downloading,
            ProjectStatus::Downloading,
            ProjectStatus::Completed,
        ]
    );

    // The final update derives every stage completed
    let last = observed.last().unwrap();
    assert!(last.stages.iter().all(|s| s.state == StageState::Completed));

    timeout(Duration::from_secs(2), watcher.join()).await.unwrap();

    // Terminal status disarmed the timer: no more fetches happen
    let settled = fetches.load(Ordering::SeqCst);
    assert_eq!(settled, 4);
    tokio::time::sleep(POLL * 4).await;
    assert_eq!(fetches.load(Ordering::SeqCst), settled);
}

#[tokio::test]
async fn already_terminal_project_is_fetched_exactly_once() {
    let (base, fetches, _state) = spawn_server(vec![ProjectStatus::Failed]).await;

    let (tx, mut rx) = mpsc::unbounded_channel();
    let watcher = ProjectWatcher::spawn(ApiClient::new(&base), "p1", POLL, move |update| {
        let _ = tx.send(update.detail.project.status);
    });

    let first = timeout(Duration::from_secs(2), rx.recv()).await.unwrap();
    assert_eq!(first, Some(ProjectStatus::Failed));

    timeout(Duration::from_secs(2), watcher.join()).await.unwrap();
    let settled = fetches.load(Ordering::SeqCst);
    assert_eq!(settled, 1);
    tokio::time::sleep(POLL * 4).await;
    assert_eq!(fetches.load(Ordering::SeqCst), settled);
}

#[tokio::test]
async fn stop_disarms_future_ticks() {
    // Never reaches a terminal status on its own
    let (base, fetches, _state) = spawn_server(vec![ProjectStatus::Transcribing]).await;

    let watcher = ProjectWatcher::spawn(ApiClient::new(&base), "p1", POLL, |_| {});

    // Let a few polls happen, then tear down
    tokio::time::sleep(POLL * 3).await;
    assert!(fetches.load(Ordering::SeqCst) >= 2);

    watcher.stop();
    // One in-flight fetch may still complete after stop
    tokio::time::sleep(POLL * 2).await;
    let after_stop = fetches.load(Ordering::SeqCst);

    tokio::time::sleep(POLL * 5).await;
    assert_eq!(fetches.load(Ordering::SeqCst), after_stop);
    assert!(watcher.is_finished());
}

#[tokio::test]
async fn fetch_errors_do_not_stop_polling() {
    // Server that fails every other request
    #[derive(Clone)]
    struct FlakyState {
        hits: Arc<AtomicUsize>,
    }

    async fn flaky_get_project(
        State(state): State<FlakyState>,
        Path(id): Path<String>,
    ) -> Result<Json<ProjectDetail>, axum::http::StatusCode> {
        let hit = state.hits.fetch_add(1, Ordering::SeqCst);
        if hit % 2 == 0 {
            Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR)
        } else if hit >= 3 {
            Ok(Json(detail(&id, ProjectStatus::Completed)))
        } else {
            Ok(Json(detail(&id, ProjectStatus::Analyzing)))
        }
    }

    let state = FlakyState {
        hits: Arc::new(AtomicUsize::new(0)),
    };
    let app = Router::new()
        .route("/projects/:id", get(flaky_get_project))
        .with_state(state);
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    let (tx, mut rx) = mpsc::unbounded_channel();
    let watcher = ProjectWatcher::spawn(
        ApiClient::new(format!("http://{addr}")),
        "p1",
        POLL,
        move |update| {
            let _ = tx.send(update.detail.project.status);
        },
    );

    let mut seen = Vec::new();
    while let Ok(Some(status)) = timeout(Duration::from_secs(2), rx.recv()).await {
        let terminal = status.is_terminal();
        seen.push(status);
        if terminal {
            break;
        }
    }

    assert_eq!(seen, vec![ProjectStatus::Analyzing, ProjectStatus::Completed]);
    timeout(Duration::from_secs(2), watcher.join()).await.unwrap();
}
