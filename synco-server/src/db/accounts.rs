//! Login accounts: staff and auto-provisioned parent logins

use sqlx::PgConnection;

/// Role id assigned to auto-provisioned parent accounts
pub const PARENT_ROLE_ID: i32 = 9;

#[derive(Debug, sqlx::FromRow)]
pub struct Account {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub first_name: String,
    pub last_name: String,
    pub phone: Option<String>,
    pub role_id: i32,
}

pub async fn find_by_email(
    conn: &mut PgConnection,
    email: &str,
) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, email, password_hash, first_name, last_name, phone, role_id
         FROM accounts WHERE email = $1",
    )
    .bind(email)
    .fetch_optional(conn)
    .await
}

pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> Result<Option<Account>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, email, password_hash, first_name, last_name, phone, role_id
         FROM accounts WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

pub async fn email_exists(conn: &mut PgConnection, email: &str) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM accounts WHERE email = $1")
        .bind(email)
        .fetch_optional(conn)
        .await?;
    Ok(row.is_some())
}

pub struct NewAccount<'a> {
    pub email: &'a str,
    pub password_hash: &'a str,
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: Option<&'a str>,
    pub role_id: i32,
    pub now: i64,
}

pub async fn create(conn: &mut PgConnection, acc: &NewAccount<'_>) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO accounts (email, password_hash, first_name, last_name, phone, role_id, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $7)
         RETURNING id",
    )
    .bind(acc.email)
    .bind(acc.password_hash)
    .bind(acc.first_name)
    .bind(acc.last_name)
    .bind(acc.phone)
    .bind(acc.role_id)
    .bind(acc.now)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Idempotent find-or-create for a parent's login account.
///
/// An existing account under the same email is updated in place (name and
/// phone refreshed) rather than rejected; the returned id is used as the
/// booking's `booked_by` in the open/self-service flow.
pub async fn ensure_parent_account(
    conn: &mut PgConnection,
    acc: &NewAccount<'_>,
) -> Result<i64, sqlx::Error> {
    if let Some(existing) = find_by_email(conn, acc.email).await? {
        sqlx::query(
            "UPDATE accounts SET first_name = $1, last_name = $2, phone = COALESCE($3, phone), updated_at = $4
             WHERE id = $5",
        )
        .bind(acc.first_name)
        .bind(acc.last_name)
        .bind(acc.phone)
        .bind(acc.now)
        .bind(existing.id)
        .execute(conn)
        .await?;
        return Ok(existing.id);
    }
    create(conn, acc).await
}
