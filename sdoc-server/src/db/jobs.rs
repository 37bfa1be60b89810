//! Job row operations
//!
//! One row per attempt at one pipeline stage. A retried stage gets a fresh
//! row rather than an update-in-place, so failures stay visible; readers
//! resolve duplicates by creation time (see stage derivation).

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use sdoc_common::db::models::Job;
use sdoc_common::types::{JobStatus, PipelineStage};
use sdoc_common::Result;

/// Record the start of a stage attempt: a new `processing` row at 0%.
pub async fn start_stage(pool: &SqlitePool, project_id: &str, stage: PipelineStage) -> Result<Job> {
    let id = Uuid::new_v4().to_string();
    let now = Utc::now();

    sqlx::query(
        r#"
        INSERT INTO jobs (id, project_id, stage, status, progress, started_at, created_at)
        VALUES (?, ?, ?, ?, 0, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(project_id)
    .bind(stage)
    .bind(JobStatus::Processing)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    get(pool, &id).await
}

pub async fn get(pool: &SqlitePool, id: &str) -> Result<Job> {
    let job = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    Ok(job)
}

/// Full job set for a project, no ordering guarantee.
pub async fn list_for_project(pool: &SqlitePool, project_id: &str) -> Result<Vec<Job>> {
    let jobs = sqlx::query_as::<_, Job>("SELECT * FROM jobs WHERE project_id = ?")
        .bind(project_id)
        .fetch_all(pool)
        .await?;
    Ok(jobs)
}

pub async fn set_progress(pool: &SqlitePool, id: &str, progress: i64) -> Result<()> {
    sqlx::query("UPDATE jobs SET progress = ? WHERE id = ?")
        .bind(progress.clamp(0, 100))
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn complete(pool: &SqlitePool, id: &str) -> Result<()> {
    sqlx::query("UPDATE jobs SET status = ?, progress = 100, completed_at = ? WHERE id = ?")
        .bind(JobStatus::Completed)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn fail(pool: &SqlitePool, id: &str, message: &str) -> Result<()> {
    sqlx::query("UPDATE jobs SET status = ?, error_message = ?, completed_at = ? WHERE id = ?")
        .bind(JobStatus::Failed)
        .bind(message)
        .bind(Utc::now())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
