//! Venue reference data

use sqlx::{PgConnection, PgPool};

#[derive(Debug, serde::Serialize, sqlx::FromRow)]
pub struct Venue {
    pub id: i64,
    pub name: String,
    pub address: String,
    pub area: String,
    pub postcode: String,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
}

pub async fn find_by_id(conn: &mut PgConnection, id: i64) -> Result<Option<Venue>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, name, address, area, postcode, latitude, longitude
         FROM venues WHERE id = $1",
    )
    .bind(id)
    .fetch_optional(conn)
    .await
}

pub async fn list(pool: &PgPool) -> Result<Vec<Venue>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, name, address, area, postcode, latitude, longitude
         FROM venues ORDER BY name",
    )
    .fetch_all(pool)
    .await
}
