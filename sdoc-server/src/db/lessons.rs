//! Lesson row operations
//!
//! Lessons are inserted by the analysis worker in orderIndex order and
//! enriched progressively by the clipping and SOP-generation workers.

use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;

use sdoc_common::db::models::Lesson;
use sdoc_common::types::JobStatus;
use sdoc_common::Result;

#[derive(Debug)]
pub struct NewLesson<'a> {
    pub project_id: &'a str,
    pub order_index: i64,
    pub title: &'a str,
    pub summary: Option<&'a str>,
    pub start_time: f64,
    pub end_time: f64,
}

pub async fn insert(pool: &SqlitePool, new: &NewLesson<'_>) -> Result<Lesson> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO lessons (id, project_id, order_index, title, summary, start_time, end_time, status, created_at)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(new.project_id)
    .bind(new.order_index)
    .bind(new.title)
    .bind(new.summary)
    .bind(new.start_time)
    .bind(new.end_time)
    .bind(JobStatus::Pending)
    .bind(Utc::now())
    .execute(pool)
    .await?;

    let lesson = sqlx::query_as::<_, Lesson>("SELECT * FROM lessons WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await?;

    Ok(lesson)
}

/// All lessons of a project, in pipeline-detected order.
pub async fn list_for_project(pool: &SqlitePool, project_id: &str) -> Result<Vec<Lesson>> {
    let lessons = sqlx::query_as::<_, Lesson>(
        "SELECT * FROM lessons WHERE project_id = ? ORDER BY order_index ASC",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;
    Ok(lessons)
}

pub async fn set_status(pool: &SqlitePool, id: &str, status: JobStatus) -> Result<()> {
    sqlx::query("UPDATE lessons SET status = ? WHERE id = ?")
        .bind(status)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Written by the clipping worker once the lesson clip and thumbnail exist.
pub async fn set_clip_paths(
    pool: &SqlitePool,
    id: &str,
    clip_path: &str,
    thumbnail_path: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE lessons SET clip_path = ?, thumbnail_path = ? WHERE id = ?")
        .bind(clip_path)
        .bind(thumbnail_path)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Written by the SOP-generation worker.
pub async fn set_sop_paths(
    pool: &SqlitePool,
    id: &str,
    sop_json_path: &str,
    sop_html_path: &str,
) -> Result<()> {
    sqlx::query("UPDATE lessons SET sop_json_path = ?, sop_html_path = ? WHERE id = ?")
        .bind(sop_json_path)
        .bind(sop_html_path)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
