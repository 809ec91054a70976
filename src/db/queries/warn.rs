use sqlx::PgPool;

use crate::db::models::WarnRecord;

/// Add one warning, creating the record at 1 if the user has none.
/// Returns the resulting count.
pub async fn increment(pool: &PgPool, user_id: i64) -> Result<i32, sqlx::Error> {
    let row: (i32,) = sqlx::query_as(
        r#"
        INSERT INTO warn_records (user_id, warn_count)
        VALUES ($1, 1)
        ON CONFLICT (user_id)
        DO UPDATE SET
            warn_count = warn_records.warn_count + 1,
            updated_at = NOW()
        RETURNING warn_count
        "#
    )
    .bind(user_id)
    .fetch_one(pool)
    .await?;

    Ok(row.0)
}

/// Remove one warning, never going below zero.
/// Returns the resulting count, or 0 when nothing was changed.
pub async fn decrement(pool: &PgPool, user_id: i64) -> Result<i32, sqlx::Error> {
    let row: Option<(i32,)> = sqlx::query_as(
        r#"
        UPDATE warn_records
        SET
            warn_count = warn_count - 1,
            updated_at = NOW()
        WHERE user_id = $1 AND warn_count > 0
        RETURNING warn_count
        "#
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|r| r.0).unwrap_or(0))
}

pub async fn get_count(pool: &PgPool, user_id: i64) -> Result<i32, sqlx::Error> {
    let row: Option<(i32,)> =
        sqlx::query_as("SELECT warn_count FROM warn_records WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|r| r.0).unwrap_or(0))
}

/// Storage order follows the serial column; timestamps can tie
const LIST_ALL: &str =
    "SELECT user_id, warn_count, created_at, updated_at FROM warn_records ORDER BY seq";

pub async fn list_all(pool: &PgPool) -> Result<Vec<WarnRecord>, sqlx::Error> {
    sqlx::query_as::<_, WarnRecord>(LIST_ALL)
        .fetch_all(pool)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_listing_follows_insertion_sequence() {
        assert!(LIST_ALL.ends_with("ORDER BY seq"));
        assert!(include_str!("../../../migrations/001_warn_records.sql").contains("seq BIGSERIAL"));
    }
}
