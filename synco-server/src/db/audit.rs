//! Best-effort activity log
//!
//! Callers invoke this with `let _ =` — a failed audit write never fails the
//! operation being audited.

use sqlx::PgPool;

pub async fn log(
    pool: &PgPool,
    account_id: Option<i64>,
    action: &str,
    detail: Option<&serde_json::Value>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO audit_log (account_id, action, detail, created_at)
         VALUES ($1, $2, $3, $4)",
    )
    .bind(account_id)
    .bind(action)
    .bind(detail)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(())
}
