//! Project row operations

use chrono::Utc;
use sqlx::SqlitePool;

use sdoc_common::db::models::Project;
use sdoc_common::types::{ProjectStatus, SourceType};
use sdoc_common::Result;

/// Fields supplied at project creation; everything else starts NULL/pending.
#[derive(Debug)]
pub struct NewProject<'a> {
    pub id: &'a str,
    pub title: &'a str,
    pub source_type: SourceType,
    pub source_url: Option<&'a str>,
    pub video_path: Option<&'a str>,
}

/// Insert a new project with status `pending` and return the persisted row.
///
/// The caller allocates the id (it also keys the storage directory, and the
/// two must agree).
pub async fn insert(pool: &SqlitePool, new: &NewProject<'_>) -> Result<Project> {
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO projects (id, title, source_type, source_url, video_path, status, created_at, updated_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(new.id)
    .bind(new.title)
    .bind(new.source_type)
    .bind(new.source_url)
    .bind(new.video_path)
    .bind(ProjectStatus::Pending)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?")
        .bind(new.id)
        .fetch_one(pool)
        .await?;

    Ok(project)
}

pub async fn get(pool: &SqlitePool, id: &str) -> Result<Option<Project>> {
    let project = sqlx::query_as::<_, Project>("SELECT * FROM projects WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(project)
}

/// All projects, newest first.
pub async fn list(pool: &SqlitePool) -> Result<Vec<Project>> {
    let projects =
        sqlx::query_as::<_, Project>("SELECT * FROM projects ORDER BY created_at DESC")
            .fetch_all(pool)
            .await?;
    Ok(projects)
}

/// Delete a project row; cascade removes all lessons, frames and jobs
/// atomically with it. Returns false when no such project existed.
pub async fn delete(pool: &SqlitePool, id: &str) -> Result<bool> {
    let result = sqlx::query("DELETE FROM projects WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

/// Advance the project's pipeline status (worker-facing).
pub async fn set_status(pool: &SqlitePool, id: &str, status: ProjectStatus) -> Result<()> {
    sqlx::query("UPDATE projects SET status = ?, updated_at = ? WHERE id = ?")
        .bind(status)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Mark the project failed with an operator-readable message (worker-facing).
pub async fn fail(pool: &SqlitePool, id: &str, message: &str) -> Result<()> {
    sqlx::query("UPDATE projects SET status = ?, error_message = ?, updated_at = ? WHERE id = ?")
        .bind(ProjectStatus::Failed)
        .bind(message)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn set_audio_path(pool: &SqlitePool, id: &str, path: &str) -> Result<()> {
    set_path_column(pool, id, "audio_path", path).await
}

pub async fn set_transcript_path(pool: &SqlitePool, id: &str, path: &str) -> Result<()> {
    set_path_column(pool, id, "transcript_path", path).await
}

pub async fn set_analysis_path(pool: &SqlitePool, id: &str, path: &str) -> Result<()> {
    set_path_column(pool, id, "analysis_path", path).await
}

pub async fn set_video_duration(pool: &SqlitePool, id: &str, seconds: f64) -> Result<()> {
    sqlx::query("UPDATE projects SET video_duration = ?, updated_at = ? WHERE id = ?")
        .bind(seconds)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

// Column name comes from the fixed set above, never from input.
async fn set_path_column(pool: &SqlitePool, id: &str, column: &str, path: &str) -> Result<()> {
    let sql = format!("UPDATE projects SET {column} = ?, updated_at = ? WHERE id = ?");
    sqlx::query(&sql)
        .bind(path)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
