//! Project lifecycle endpoints
//!
//! Creation accepts either a JSON body (youtube sources) or a multipart form
//! carrying the video file (upload sources). One id is allocated up front
//! and passed explicitly to both the storage provisioning step and the row
//! insert, so the directory and the row can never disagree.

use axum::extract::{FromRequest, Multipart, Path, Request, State};
use axum::http::{header, StatusCode};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

use sdoc_common::db::models::{LessonDetail, Project, ProjectDetail};
use sdoc_common::paths::StorageLayout;
use sdoc_common::types::SourceType;

use crate::db;
use crate::error::{ApiError, ApiResult};
use crate::AppState;

/// JSON body for youtube-source creates.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct CreateProjectBody {
    title: Option<String>,
    source_type: Option<String>,
    source_url: Option<String>,
}

/// Accumulated create-request fields, from either body encoding.
///
/// `dir_provisioned` tracks whether the storage directory keyed by `id`
/// already exists, so a late validation failure can clean it up.
#[derive(Debug)]
struct CreateDraft {
    id: String,
    title: Option<String>,
    source_type: Option<String>,
    source_url: Option<String>,
    video_path: Option<String>,
    dir_provisioned: bool,
}

impl CreateDraft {
    fn new() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: None,
            source_type: None,
            source_url: None,
            video_path: None,
            dir_provisioned: false,
        }
    }
}

/// POST /projects
///
/// Returns 201 with the created project row (no nested lessons/jobs).
pub async fn create_project(
    State(state): State<AppState>,
    req: Request,
) -> ApiResult<(StatusCode, Json<Project>)> {
    let is_multipart = req
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|v| v.starts_with("multipart/form-data"));

    let mut draft = CreateDraft::new();

    if is_multipart {
        let multipart = Multipart::from_request(req, &state)
            .await
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        if let Err(e) = read_multipart_fields(multipart, &state.storage, &mut draft).await {
            discard_draft_storage(&state.storage, &draft);
            return Err(e);
        }
    } else {
        let Json(body) = Json::<CreateProjectBody>::from_request(req, &state)
            .await
            .map_err(|e| ApiError::Validation(e.to_string()))?;
        draft.title = body.title;
        draft.source_type = body.source_type;
        draft.source_url = body.source_url;
    }

    let (title, source_type, source_url) = match validate_draft(&draft) {
        Ok(valid) => valid,
        Err(e) => {
            discard_draft_storage(&state.storage, &draft);
            return Err(e);
        }
    };

    // Youtube projects have no file yet; the download worker still needs the
    // directory to exist before it writes video.mp4.
    if !draft.dir_provisioned {
        state.storage.provision_project_dir(&draft.id)?;
    }

    let project = db::projects::insert(
        &state.db,
        &db::projects::NewProject {
            id: &draft.id,
            title: &title,
            source_type,
            source_url: source_url.as_deref(),
            video_path: draft.video_path.as_deref(),
        },
    )
    .await?;

    info!(
        "Created project {} ({}, {})",
        project.id, project.title, project.source_type
    );

    Ok((StatusCode::CREATED, Json(project)))
}

/// Drain the multipart stream into the draft, streaming the video part to
/// its final storage path.
async fn read_multipart_fields(
    mut multipart: Multipart,
    storage: &StorageLayout,
    draft: &mut CreateDraft,
) -> ApiResult<()> {
    while let Some(mut field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "title" => draft.title = Some(read_text(field).await?),
            "sourceType" => draft.source_type = Some(read_text(field).await?),
            "sourceUrl" => draft.source_url = Some(read_text(field).await?),
            "video" => {
                // Reject non-video payloads before any directory is created.
                let content_type = field.content_type().unwrap_or_default().to_string();
                if !content_type.starts_with("video/") {
                    return Err(ApiError::Validation(
                        "Only video files are allowed".to_string(),
                    ));
                }

                let ext = video_extension(field.file_name());
                storage.provision_project_dir(&draft.id)?;
                draft.dir_provisioned = true;

                let dest = storage.video_path(&draft.id, &ext);
                let mut file = tokio::fs::File::create(&dest).await?;
                while let Some(chunk) = field
                    .chunk()
                    .await
                    .map_err(|e| ApiError::Validation(e.to_string()))?
                {
                    file.write_all(&chunk).await?;
                }
                file.flush().await?;

                draft.video_path = Some(dest.to_string_lossy().into_owned());
            }
            // Unknown parts are ignored, matching lenient form handling.
            _ => {}
        }
    }
    Ok(())
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> ApiResult<String> {
    field
        .text()
        .await
        .map_err(|e| ApiError::Validation(e.to_string()))
}

fn validate_draft(draft: &CreateDraft) -> ApiResult<(String, SourceType, Option<String>)> {
    let title = draft.title.as_deref().unwrap_or("").trim().to_string();
    let source_type_raw = draft.source_type.as_deref().unwrap_or("");

    if title.is_empty() || source_type_raw.is_empty() {
        return Err(ApiError::Validation(
            "title and sourceType are required".to_string(),
        ));
    }

    let source_type: SourceType = source_type_raw.parse()?;

    let source_url = draft
        .source_url
        .as_deref()
        .map(str::trim)
        .filter(|u| !u.is_empty())
        .map(str::to_string);

    match source_type {
        SourceType::Youtube if source_url.is_none() => Err(ApiError::Validation(
            "sourceUrl is required for youtube projects".to_string(),
        )),
        SourceType::Upload if draft.video_path.is_none() => Err(ApiError::Validation(
            "a video file is required for upload projects".to_string(),
        )),
        _ => Ok((title, source_type, source_url)),
    }
}

/// Best-effort removal of a provisioned directory after a rejected create.
/// Nothing was persisted to the database, so a leftover directory is the
/// only state to undo.
fn discard_draft_storage(storage: &StorageLayout, draft: &CreateDraft) {
    if !draft.dir_provisioned {
        return;
    }
    if let Err(e) = storage.remove_project_dir(&draft.id) {
        warn!(
            "Failed to clean up storage for rejected project {}: {}",
            draft.id, e
        );
    }
}

/// File extension for the stored video, taken from the client filename.
fn video_extension(file_name: Option<&str>) -> String {
    file_name
        .and_then(|n| n.rsplit_once('.'))
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .filter(|ext| {
            !ext.is_empty() && ext.len() <= 8 && ext.chars().all(|c| c.is_ascii_alphanumeric())
        })
        .unwrap_or_else(|| "mp4".to_string())
}

/// GET /projects
///
/// All projects, newest first.
pub async fn list_projects(State(state): State<AppState>) -> ApiResult<Json<Vec<Project>>> {
    let projects = db::projects::list(&state.db).await?;
    Ok(Json(projects))
}

/// GET /projects/:id
///
/// The full aggregate: project row, lessons (ordered) with nested frames
/// (ordered), and the complete job set for stage derivation. Read-only.
pub async fn get_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<ProjectDetail>> {
    let project = db::projects::get(&state.db, &id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Project not found".to_string()))?;

    let mut lessons = Vec::new();
    for lesson in db::lessons::list_for_project(&state.db, &project.id).await? {
        let frames = db::frames::list_for_lesson(&state.db, &lesson.id).await?;
        lessons.push(LessonDetail { lesson, frames });
    }

    let jobs = db::jobs::list_for_project(&state.db, &project.id).await?;

    Ok(Json(ProjectDetail {
        project,
        lessons,
        jobs,
    }))
}

/// DELETE /projects/:id
///
/// Database first (cascade removes all descendants atomically), storage
/// second. A filesystem failure after the row deletion is logged and
/// swallowed: the database is authoritative for existence, and a leaked
/// directory is recoverable garbage, not an inconsistency.
pub async fn delete_project(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let deleted = db::projects::delete(&state.db, &id).await?;
    if !deleted {
        return Err(ApiError::NotFound("Project not found".to_string()));
    }

    if let Err(e) = state.storage.remove_project_dir(&id) {
        warn!("Storage cleanup failed for deleted project {}: {}", id, e);
    }

    info!("Deleted project {}", id);
    Ok(Json(json!({ "success": true })))
}
