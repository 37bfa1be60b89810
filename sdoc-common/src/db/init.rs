//! Database initialization
//!
//! Opens (or creates) the SQLite database and applies the schema. Schema
//! creation is idempotent: every statement is `CREATE ... IF NOT EXISTS`,
//! safe to run on every startup.
//!
//! Ownership is strictly hierarchical (projects -> {lessons -> {frames},
//! jobs}) and enforced with `ON DELETE CASCADE` foreign keys, so deleting a
//! project row removes every descendant row in one atomic statement.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize database connection pool and create tables if needed.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    configure_connection(&pool).await?;
    create_schema(&pool).await?;

    Ok(pool)
}

/// Connection pragmas: cascade deletes require foreign_keys ON; WAL allows
/// concurrent readers while a pipeline worker writes.
async fn configure_connection(pool: &SqlitePool) -> Result<()> {
    sqlx::query("PRAGMA foreign_keys = ON").execute(pool).await?;
    sqlx::query("PRAGMA journal_mode = WAL").execute(pool).await?;
    sqlx::query("PRAGMA busy_timeout = 5000").execute(pool).await?;
    Ok(())
}

/// Create all tables (idempotent).
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_projects_table(pool).await?;
    create_lessons_table(pool).await?;
    create_frames_table(pool).await?;
    create_jobs_table(pool).await?;
    Ok(())
}

async fn create_projects_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS projects (
            id TEXT PRIMARY KEY,
            title TEXT NOT NULL,
            source_type TEXT NOT NULL,
            source_url TEXT,
            video_path TEXT,
            audio_path TEXT,
            transcript_path TEXT,
            analysis_path TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            error_message TEXT,
            video_duration REAL,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

async fn create_lessons_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS lessons (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            order_index INTEGER NOT NULL,
            title TEXT NOT NULL,
            summary TEXT,
            start_time REAL NOT NULL,
            end_time REAL NOT NULL,
            clip_path TEXT,
            sop_json_path TEXT,
            sop_html_path TEXT,
            thumbnail_path TEXT,
            status TEXT NOT NULL DEFAULT 'pending',
            error_message TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_lessons_project ON lessons(project_id)")
        .execute(pool)
        .await?;
    Ok(())
}

async fn create_frames_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS frames (
            id TEXT PRIMARY KEY,
            lesson_id TEXT NOT NULL REFERENCES lessons(id) ON DELETE CASCADE,
            order_index INTEGER NOT NULL,
            timestamp REAL NOT NULL,
            file_path TEXT NOT NULL,
            caption TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_frames_lesson ON frames(lesson_id)")
        .execute(pool)
        .await?;
    Ok(())
}

async fn create_jobs_table(pool: &SqlitePool) -> Result<()> {
    // No uniqueness on (project_id, stage): retries may insert additional
    // rows for a stage, and readers pick the most recent.
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS jobs (
            id TEXT PRIMARY KEY,
            project_id TEXT NOT NULL REFERENCES projects(id) ON DELETE CASCADE,
            stage TEXT NOT NULL,
            status TEXT NOT NULL DEFAULT 'pending',
            progress INTEGER NOT NULL DEFAULT 0,
            error_message TEXT,
            started_at TEXT,
            completed_at TEXT,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_jobs_project ON jobs(project_id)")
        .execute(pool)
        .await?;
    Ok(())
}
