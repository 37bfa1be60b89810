//! Frame row operations
//!
//! Frames are captured stills written by the frame-extraction worker, one
//! row per image under the lesson's `frames/` directory.

use sqlx::SqlitePool;
use uuid::Uuid;

use sdoc_common::db::models::Frame;
use sdoc_common::Result;

#[derive(Debug)]
pub struct NewFrame<'a> {
    pub lesson_id: &'a str,
    pub order_index: i64,
    pub timestamp: f64,
    pub file_path: &'a str,
    pub caption: Option<&'a str>,
}

pub async fn insert(pool: &SqlitePool, new: &NewFrame<'_>) -> Result<Frame> {
    let id = Uuid::new_v4().to_string();

    sqlx::query(
        r#"
        INSERT INTO frames (id, lesson_id, order_index, timestamp, file_path, caption)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(&id)
    .bind(new.lesson_id)
    .bind(new.order_index)
    .bind(new.timestamp)
    .bind(new.file_path)
    .bind(new.caption)
    .execute(pool)
    .await?;

    let frame = sqlx::query_as::<_, Frame>("SELECT * FROM frames WHERE id = ?")
        .bind(&id)
        .fetch_one(pool)
        .await?;

    Ok(frame)
}

/// Frames of a lesson in capture order.
pub async fn list_for_lesson(pool: &SqlitePool, lesson_id: &str) -> Result<Vec<Frame>> {
    let frames = sqlx::query_as::<_, Frame>(
        "SELECT * FROM frames WHERE lesson_id = ? ORDER BY order_index ASC",
    )
    .bind(lesson_id)
    .fetch_all(pool)
    .await?;
    Ok(frames)
}

/// Set or replace the vision-model caption for a frame.
pub async fn set_caption(pool: &SqlitePool, id: &str, caption: &str) -> Result<()> {
    sqlx::query("UPDATE frames SET caption = ? WHERE id = ?")
        .bind(caption)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}
