//! Integration tests for database initialization and cascade semantics

use sdoc_common::db::init_database;
use sqlx::SqlitePool;

async fn setup() -> (tempfile::TempDir, SqlitePool) {
    let tmp = tempfile::tempdir().expect("tempdir");
    let pool = init_database(&tmp.path().join("sdoc.db"))
        .await
        .expect("init database");
    (tmp, pool)
}

async fn count(pool: &SqlitePool, table: &str) -> i64 {
    sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table}"))
        .fetch_one(pool)
        .await
        .unwrap()
}

#[tokio::test]
async fn init_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let db_path = tmp.path().join("sdoc.db");

    let pool = init_database(&db_path).await.unwrap();
    drop(pool);

    // Re-opening an existing database must not fail or clobber the schema
    let pool = init_database(&db_path).await.unwrap();
    assert_eq!(count(&pool, "projects").await, 0);
}

#[tokio::test]
async fn foreign_keys_are_enforced() {
    let (_tmp, pool) = setup().await;

    let orphan = sqlx::query(
        "INSERT INTO lessons (id, project_id, order_index, title, start_time, end_time, status, created_at)
         VALUES ('l1', 'no-such-project', 0, 'x', 0.0, 1.0, 'pending', '2026-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await;

    assert!(orphan.is_err(), "lesson insert without a parent project must fail");
}

#[tokio::test]
async fn deleting_a_project_cascades_through_all_descendants() {
    let (_tmp, pool) = setup().await;

    sqlx::query(
        "INSERT INTO projects (id, title, source_type, status, created_at, updated_at)
         VALUES ('p1', 't', 'youtube', 'pending', '2026-01-01T00:00:00Z', '2026-01-01T00:00:00Z')",
    )
    .execute(&pool)
    .await
    .unwrap();

    for lesson in ["l1", "l2"] {
        sqlx::query(
            "INSERT INTO lessons (id, project_id, order_index, title, start_time, end_time, status, created_at)
             VALUES (?, 'p1', 0, 'x', 0.0, 1.0, 'pending', '2026-01-01T00:00:00Z')",
        )
        .bind(lesson)
        .execute(&pool)
        .await
        .unwrap();

        for i in 0..3 {
            sqlx::query(
                "INSERT INTO frames (id, lesson_id, order_index, timestamp, file_path)
                 VALUES (?, ?, ?, 1.0, '/tmp/f.png')",
            )
            .bind(format!("{lesson}-f{i}"))
            .bind(lesson)
            .bind(i)
            .execute(&pool)
            .await
            .unwrap();
        }
    }

    for i in 0..4 {
        sqlx::query(
            "INSERT INTO jobs (id, project_id, stage, status, created_at)
             VALUES (?, 'p1', 'DOWNLOAD', 'pending', '2026-01-01T00:00:00Z')",
        )
        .bind(format!("j{i}"))
        .execute(&pool)
        .await
        .unwrap();
    }

    assert_eq!(count(&pool, "lessons").await, 2);
    assert_eq!(count(&pool, "frames").await, 6);
    assert_eq!(count(&pool, "jobs").await, 4);

    sqlx::query("DELETE FROM projects WHERE id = 'p1'")
        .execute(&pool)
        .await
        .unwrap();

    assert_eq!(count(&pool, "projects").await, 0);
    assert_eq!(count(&pool, "lessons").await, 0);
    assert_eq!(count(&pool, "frames").await, 0);
    assert_eq!(count(&pool, "jobs").await, 0);
}
