use chrono::{DateTime, Utc};
use sqlx::PgPool;

use crate::db::models::{MuteKind, MuteRecord};

/// Insert or replace the mute for a (chat, user) pair.
/// A new mute always supersedes the previous one, whatever its kind.
pub async fn upsert(
    pool: &PgPool,
    chat_id: i64,
    user_id: i64,
    until: Option<DateTime<Utc>>,
    kind: MuteKind,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO mute_records (chat_id, user_id, until, kind)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (chat_id, user_id)
        DO UPDATE SET
            until = EXCLUDED.until,
            kind = EXCLUDED.kind,
            muted_at = NOW()
        "#
    )
    .bind(chat_id)
    .bind(user_id)
    .bind(until)
    .bind(kind)
    .execute(pool)
    .await?;

    Ok(())
}

pub async fn remove(pool: &PgPool, chat_id: i64, user_id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM mute_records WHERE chat_id = $1 AND user_id = $2")
        .bind(chat_id)
        .bind(user_id)
        .execute(pool)
        .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn get(
    pool: &PgPool,
    chat_id: i64,
    user_id: i64,
) -> Result<Option<MuteRecord>, sqlx::Error> {
    sqlx::query_as::<_, MuteRecord>(
        r#"
        SELECT chat_id, user_id, until, kind FROM mute_records
        WHERE chat_id = $1 AND user_id = $2
        "#
    )
    .bind(chat_id)
    .bind(user_id)
    .fetch_optional(pool)
    .await
}

/// Mutes of `kind` with a concrete expiry at or before `now`.
/// Indefinite mutes are never returned.
pub async fn find_expired(
    pool: &PgPool,
    now: DateTime<Utc>,
    kind: MuteKind,
) -> Result<Vec<MuteRecord>, sqlx::Error> {
    sqlx::query_as::<_, MuteRecord>(
        r#"
        SELECT chat_id, user_id, until, kind FROM mute_records
        WHERE kind = $1 AND until IS NOT NULL AND until <= $2
        ORDER BY id
        "#
    )
    .bind(kind)
    .bind(now)
    .fetch_all(pool)
    .await
}

pub async fn list_all(pool: &PgPool) -> Result<Vec<MuteRecord>, sqlx::Error> {
    sqlx::query_as::<_, MuteRecord>(
        "SELECT chat_id, user_id, until, kind FROM mute_records ORDER BY id"
    )
    .fetch_all(pool)
    .await
}
