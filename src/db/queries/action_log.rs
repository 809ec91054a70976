use sqlx::PgPool;

use crate::db::models::{ActionKind, ActionLogEntry};

pub async fn create(
    pool: &PgPool,
    kind: ActionKind,
    chat_id: i64,
    user_id: i64,
    reason: &str,
) -> Result<ActionLogEntry, sqlx::Error> {
    let sql = format!(
        r#"
        INSERT INTO {} (chat_id, user_id, reason)
        VALUES ($1, $2, $3)
        RETURNING id, chat_id, user_id, reason, logged_at
        "#,
        kind.table()
    );

    sqlx::query_as::<_, ActionLogEntry>(&sql)
        .bind(chat_id)
        .bind(user_id)
        .bind(reason)
        .fetch_one(pool)
        .await
}

pub async fn list_all(pool: &PgPool, kind: ActionKind) -> Result<Vec<ActionLogEntry>, sqlx::Error> {
    let sql = format!(
        "SELECT id, chat_id, user_id, reason, logged_at FROM {} ORDER BY seq",
        kind.table()
    );

    sqlx::query_as::<_, ActionLogEntry>(&sql)
        .fetch_all(pool)
        .await
}
