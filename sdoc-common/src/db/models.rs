//! Database models
//!
//! Wire names are camelCase (serde renames); database columns are snake_case
//! and map directly onto the struct fields for `sqlx::FromRow`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::types::{JobStatus, PipelineStage, ProjectStatus, SourceType};

/// One ingested video and its pipeline progress.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Project {
    pub id: String,
    pub title: String,
    pub source_type: SourceType,
    pub source_url: Option<String>,
    pub video_path: Option<String>,
    pub audio_path: Option<String>,
    pub transcript_path: Option<String>,
    pub analysis_path: Option<String>,
    pub status: ProjectStatus,
    pub error_message: Option<String>,
    pub video_duration: Option<f64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A detected sub-segment (time span) of a project's video.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: String,
    pub project_id: String,
    pub order_index: i64,
    pub title: String,
    pub summary: Option<String>,
    pub start_time: f64,
    pub end_time: f64,
    pub clip_path: Option<String>,
    pub sop_json_path: Option<String>,
    pub sop_html_path: Option<String>,
    pub thumbnail_path: Option<String>,
    pub status: JobStatus,
    pub error_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

/// A captured still image tied to a lesson, optionally captioned.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Frame {
    pub id: String,
    pub lesson_id: String,
    pub order_index: i64,
    pub timestamp: f64,
    pub file_path: String,
    pub caption: Option<String>,
}

/// One attempt at one pipeline stage for a project.
///
/// Uniqueness per (project, stage) is NOT enforced: retries may leave
/// multiple rows for the same stage and readers must tolerate that.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Job {
    pub id: String,
    pub project_id: String,
    pub stage: PipelineStage,
    pub status: JobStatus,
    pub progress: i64,
    pub error_message: Option<String>,
    pub started_at: Option<DateTime<Utc>>,
    pub completed_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

/// A lesson with its frames, ordered by `order_index`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LessonDetail {
    #[serde(flatten)]
    pub lesson: Lesson,
    pub frames: Vec<Frame>,
}

/// The full project aggregate returned by `GET /projects/{id}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectDetail {
    #[serde(flatten)]
    pub project: Project,
    pub lessons: Vec<LessonDetail>,
    pub jobs: Vec<Job>,
}
