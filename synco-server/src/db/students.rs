//! Student, parent and emergency-contact rows owned by a booking

use chrono::NaiveDate;
use sqlx::PgConnection;

#[derive(Debug, serde::Serialize, sqlx::FromRow)]
pub struct Student {
    pub id: i64,
    pub booking_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub medical_info: String,
}

#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct Parent {
    pub id: i64,
    pub student_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub relation_to_child: Option<String>,
    pub referral_source: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize, sqlx::FromRow)]
pub struct EmergencyContact {
    pub id: i64,
    pub student_id: i64,
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub relation_to_child: Option<String>,
}

pub struct NewStudent<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub date_of_birth: NaiveDate,
    pub age: Option<i32>,
    pub gender: Option<&'a str>,
    pub medical_info: &'a str,
}

pub async fn insert_student(
    conn: &mut PgConnection,
    booking_id: i64,
    s: &NewStudent<'_>,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO booking_students (booking_id, first_name, last_name, date_of_birth, age, gender, medical_info, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
         RETURNING id",
    )
    .bind(booking_id)
    .bind(s.first_name)
    .bind(s.last_name)
    .bind(s.date_of_birth)
    .bind(s.age)
    .bind(s.gender)
    .bind(s.medical_info)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub struct NewParent<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub email: &'a str,
    pub phone: &'a str,
    pub relation_to_child: Option<&'a str>,
    pub referral_source: Option<&'a str>,
}

pub async fn insert_parent(
    conn: &mut PgConnection,
    student_id: i64,
    p: &NewParent<'_>,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO booking_parents (student_id, first_name, last_name, email, phone, relation_to_child, referral_source, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $8)
         RETURNING id",
    )
    .bind(student_id)
    .bind(p.first_name)
    .bind(p.last_name)
    .bind(p.email)
    .bind(p.phone)
    .bind(p.relation_to_child)
    .bind(p.referral_source)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

pub struct NewEmergencyContact<'a> {
    pub first_name: &'a str,
    pub last_name: &'a str,
    pub phone: &'a str,
    pub relation_to_child: Option<&'a str>,
}

pub async fn insert_emergency_contact(
    conn: &mut PgConnection,
    student_id: i64,
    e: &NewEmergencyContact<'_>,
    now: i64,
) -> Result<i64, sqlx::Error> {
    let (id,): (i64,) = sqlx::query_as(
        "INSERT INTO booking_emergency_contacts (student_id, first_name, last_name, phone, relation_to_child, created_at, updated_at)
         VALUES ($1, $2, $3, $4, $5, $6, $6)
         RETURNING id",
    )
    .bind(student_id)
    .bind(e.first_name)
    .bind(e.last_name)
    .bind(e.phone)
    .bind(e.relation_to_child)
    .bind(now)
    .fetch_one(conn)
    .await?;
    Ok(id)
}

/// Whether a parent email is already attached to any booking
pub async fn parent_email_exists(
    conn: &mut PgConnection,
    email: &str,
) -> Result<bool, sqlx::Error> {
    let row: Option<(i64,)> = sqlx::query_as(
        "SELECT id FROM booking_parents WHERE lower(email) = lower($1) LIMIT 1",
    )
    .bind(email)
    .fetch_optional(conn)
    .await?;
    Ok(row.is_some())
}

pub async fn list_for_booking(
    conn: &mut PgConnection,
    booking_id: i64,
) -> Result<Vec<Student>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, booking_id, first_name, last_name, date_of_birth, age, gender, medical_info
         FROM booking_students WHERE booking_id = $1 ORDER BY id",
    )
    .bind(booking_id)
    .fetch_all(conn)
    .await
}

pub async fn parents_for_student(
    conn: &mut PgConnection,
    student_id: i64,
) -> Result<Vec<Parent>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, student_id, first_name, last_name, email, phone, relation_to_child, referral_source
         FROM booking_parents WHERE student_id = $1 ORDER BY id",
    )
    .bind(student_id)
    .fetch_all(conn)
    .await
}

pub async fn emergency_contact_for_student(
    conn: &mut PgConnection,
    student_id: i64,
) -> Result<Option<EmergencyContact>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, student_id, first_name, last_name, phone, relation_to_child
         FROM booking_emergency_contacts WHERE student_id = $1 LIMIT 1",
    )
    .bind(student_id)
    .fetch_optional(conn)
    .await
}

/// Natural-key lookup used by waiting-list conversion: students are matched
/// by name within the booking, never created.
pub async fn find_student_by_name(
    conn: &mut PgConnection,
    booking_id: i64,
    first_name: &str,
    last_name: &str,
) -> Result<Option<Student>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, booking_id, first_name, last_name, date_of_birth, age, gender, medical_info
         FROM booking_students
         WHERE booking_id = $1 AND lower(first_name) = lower($2) AND lower(last_name) = lower($3)
         LIMIT 1",
    )
    .bind(booking_id)
    .bind(first_name)
    .bind(last_name)
    .fetch_optional(conn)
    .await
}

pub async fn find_parent_by_name(
    conn: &mut PgConnection,
    student_id: i64,
    first_name: &str,
    last_name: &str,
) -> Result<Option<Parent>, sqlx::Error> {
    sqlx::query_as(
        "SELECT id, student_id, first_name, last_name, email, phone, relation_to_child, referral_source
         FROM booking_parents
         WHERE student_id = $1 AND lower(first_name) = lower($2) AND lower(last_name) = lower($3)
         LIMIT 1",
    )
    .bind(student_id)
    .bind(first_name)
    .bind(last_name)
    .fetch_optional(conn)
    .await
}

pub async fn update_student(
    conn: &mut PgConnection,
    student_id: i64,
    s: &NewStudent<'_>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE booking_students
         SET first_name = $1, last_name = $2, date_of_birth = $3, age = $4, gender = $5,
             medical_info = $6, updated_at = $7
         WHERE id = $8",
    )
    .bind(s.first_name)
    .bind(s.last_name)
    .bind(s.date_of_birth)
    .bind(s.age)
    .bind(s.gender)
    .bind(s.medical_info)
    .bind(now)
    .bind(student_id)
    .execute(conn)
    .await?;
    Ok(())
}

pub async fn update_parent(
    conn: &mut PgConnection,
    parent_id: i64,
    p: &NewParent<'_>,
    now: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "UPDATE booking_parents
         SET first_name = $1, last_name = $2, email = $3, phone = $4,
             relation_to_child = $5, referral_source = $6, updated_at = $7
         WHERE id = $8",
    )
    .bind(p.first_name)
    .bind(p.last_name)
    .bind(p.email)
    .bind(p.phone)
    .bind(p.relation_to_child)
    .bind(p.referral_source)
    .bind(now)
    .bind(parent_id)
    .execute(conn)
    .await?;
    Ok(())
}
