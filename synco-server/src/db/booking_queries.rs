//! Booking list/detail assembly and summary statistics
//!
//! List endpoints load every matching row into memory and flatten the
//! booking, its schedule/venue/plan, the latest payment and the student tree
//! into one denormalized shape. No pagination.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use sqlx::{PgConnection, PgPool};

use super::students::{EmergencyContact, Parent};

/// Supported list filters; all optional, combined with AND
#[derive(Debug, Default, serde::Deserialize)]
pub struct BookingFilters {
    pub status: Option<String>,
    pub venue_id: Option<i64>,
    /// Substring match on venue name, case-insensitive
    pub venue_name: Option<String>,
    pub booked_by: Option<i64>,
    /// Substring match across student first/last name
    pub student_name: Option<String>,
    /// Exact calendar day the booking row was created
    pub date_booked: Option<NaiveDate>,
    /// Trial-date range
    pub from_date: Option<NaiveDate>,
    pub to_date: Option<NaiveDate>,
    /// Start-date range
    pub date_from: Option<NaiveDate>,
    pub date_to: Option<NaiveDate>,
}

#[derive(Debug, serde::Serialize, sqlx::FromRow)]
pub struct BookingRow {
    pub id: i64,
    pub booking_ref: String,
    pub booking_type: String,
    pub status: String,
    pub total_students: i32,
    pub trial_date: Option<NaiveDate>,
    pub start_date: Option<NaiveDate>,
    pub interest: Option<String>,
    pub additional_note: Option<String>,
    pub created_at: i64,
    pub venue_id: i64,
    pub venue_name: String,
    pub class_schedule_id: i64,
    pub class_name: String,
    pub day_of_week: String,
    pub start_time: String,
    pub end_time: String,
    pub payment_plan_id: Option<i64>,
    pub plan_name: Option<String>,
    pub plan_price: Option<Decimal>,
    pub plan_joining_fee: Option<Decimal>,
    pub plan_duration_months: Option<i32>,
    pub booked_by: i64,
    pub booked_by_name: String,
    pub payment_status: Option<String>,
}

#[derive(Debug, Clone, serde::Serialize)]
pub struct StudentDetail {
    pub id: i64,
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub medical_info: String,
    pub parents: Vec<Parent>,
    pub emergency_contact: Option<EmergencyContact>,
}

#[derive(Debug, serde::Serialize)]
pub struct BookingDetail {
    #[serde(flatten)]
    pub booking: BookingRow,
    pub students: Vec<StudentDetail>,
}

/// Aggregate figures over a filtered result set
#[derive(Debug, PartialEq, serde::Serialize)]
pub struct BookingStats {
    pub total_bookings: usize,
    pub total_students: i64,
    /// Σ (plan price + joining fee) × students, over plan-bearing bookings
    pub revenue: Decimal,
    /// Mean of per-booking revenue ÷ plan duration
    pub average_monthly_fee: Decimal,
    /// Mean plan duration in months
    pub average_duration_months: Decimal,
}

const LIST_SQL: &str = "\
SELECT b.id, b.booking_ref, b.booking_type, b.status, b.total_students, b.trial_date,
       b.start_date, b.interest, b.additional_note, b.created_at,
       b.venue_id, v.name AS venue_name,
       b.class_schedule_id, cs.class_name, cs.day_of_week, cs.start_time, cs.end_time,
       b.payment_plan_id, pp.name AS plan_name, pp.price AS plan_price,
       pp.joining_fee AS plan_joining_fee, pp.duration_months AS plan_duration_months,
       b.booked_by, trim(a.first_name || ' ' || a.last_name) AS booked_by_name,
       p.payment_status
FROM bookings b
JOIN venues v ON v.id = b.venue_id
JOIN class_schedules cs ON cs.id = b.class_schedule_id
LEFT JOIN payment_plans pp ON pp.id = b.payment_plan_id
JOIN accounts a ON a.id = b.booked_by
LEFT JOIN LATERAL (
    SELECT payment_status FROM booking_payments
    WHERE booking_id = b.id
    ORDER BY created_at DESC, id DESC
    LIMIT 1
) p ON TRUE
WHERE ($1::text IS NULL OR b.status = $1)
  AND ($2::bigint IS NULL OR b.venue_id = $2)
  AND ($3::text IS NULL OR v.name ILIKE '%' || $3 || '%')
  AND ($4::bigint IS NULL OR b.booked_by = $4)
  AND ($5::text IS NULL OR EXISTS (
        SELECT 1 FROM booking_students s
        WHERE s.booking_id = b.id
          AND (s.first_name ILIKE '%' || $5 || '%' OR s.last_name ILIKE '%' || $5 || '%')))
  AND ($6::date IS NULL OR to_timestamp(b.created_at / 1000.0)::date = $6)
  AND ($7::date IS NULL OR b.trial_date >= $7)
  AND ($8::date IS NULL OR b.trial_date <= $8)
  AND ($9::date IS NULL OR b.start_date >= $9)
  AND ($10::date IS NULL OR b.start_date <= $10)
ORDER BY b.created_at DESC";

pub async fn list(
    pool: &PgPool,
    filters: &BookingFilters,
) -> Result<Vec<BookingDetail>, sqlx::Error> {
    let rows: Vec<BookingRow> = sqlx::query_as(LIST_SQL)
        .bind(filters.status.as_deref())
        .bind(filters.venue_id)
        .bind(filters.venue_name.as_deref())
        .bind(filters.booked_by)
        .bind(filters.student_name.as_deref())
        .bind(filters.date_booked)
        .bind(filters.from_date)
        .bind(filters.to_date)
        .bind(filters.date_from)
        .bind(filters.date_to)
        .fetch_all(pool)
        .await?;

    let booking_ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let mut conn = pool.acquire().await?;
    let students = load_student_trees(&mut conn, &booking_ids).await?;

    let mut out = Vec::with_capacity(rows.len());
    for row in rows {
        let students = students
            .iter()
            .filter(|(bid, _)| *bid == row.id)
            .map(|(_, s)| s)
            .cloned()
            .collect();
        out.push(BookingDetail {
            booking: row,
            students,
        });
    }
    Ok(out)
}

pub async fn find_by_ref(
    pool: &PgPool,
    booking_ref: &str,
) -> Result<Option<BookingDetail>, sqlx::Error> {
    let mut conn = pool.acquire().await?;
    let row: Option<BookingRow> = sqlx::query_as(&format!(
        "{LIST_SQL_SINGLE} WHERE b.booking_ref = $1"
    ))
    .bind(booking_ref)
    .fetch_optional(&mut *conn)
    .await?;

    let Some(row) = row else { return Ok(None) };
    let students = load_student_trees(&mut conn, &[row.id]).await?;
    Ok(Some(BookingDetail {
        booking: row,
        students: students.into_iter().map(|(_, s)| s).collect(),
    }))
}

const LIST_SQL_SINGLE: &str = "\
SELECT b.id, b.booking_ref, b.booking_type, b.status, b.total_students, b.trial_date,
       b.start_date, b.interest, b.additional_note, b.created_at,
       b.venue_id, v.name AS venue_name,
       b.class_schedule_id, cs.class_name, cs.day_of_week, cs.start_time, cs.end_time,
       b.payment_plan_id, pp.name AS plan_name, pp.price AS plan_price,
       pp.joining_fee AS plan_joining_fee, pp.duration_months AS plan_duration_months,
       b.booked_by, trim(a.first_name || ' ' || a.last_name) AS booked_by_name,
       p.payment_status
FROM bookings b
JOIN venues v ON v.id = b.venue_id
JOIN class_schedules cs ON cs.id = b.class_schedule_id
LEFT JOIN payment_plans pp ON pp.id = b.payment_plan_id
JOIN accounts a ON a.id = b.booked_by
LEFT JOIN LATERAL (
    SELECT payment_status FROM booking_payments
    WHERE booking_id = b.id
    ORDER BY created_at DESC, id DESC
    LIMIT 1
) p ON TRUE";

#[derive(Clone, Debug, serde::Serialize, sqlx::FromRow)]
struct StudentRow {
    id: i64,
    booking_id: i64,
    first_name: String,
    last_name: String,
    date_of_birth: NaiveDate,
    age: Option<i32>,
    gender: Option<String>,
    medical_info: String,
}

async fn load_student_trees(
    conn: &mut PgConnection,
    booking_ids: &[i64],
) -> Result<Vec<(i64, StudentDetail)>, sqlx::Error> {
    if booking_ids.is_empty() {
        return Ok(Vec::new());
    }

    let students: Vec<StudentRow> = sqlx::query_as(
        "SELECT id, booking_id, first_name, last_name, date_of_birth, age, gender, medical_info
         FROM booking_students WHERE booking_id = ANY($1) ORDER BY id",
    )
    .bind(booking_ids)
    .fetch_all(&mut *conn)
    .await?;

    let student_ids: Vec<i64> = students.iter().map(|s| s.id).collect();

    let parents: Vec<Parent> = sqlx::query_as(
        "SELECT id, student_id, first_name, last_name, email, phone, relation_to_child, referral_source
         FROM booking_parents WHERE student_id = ANY($1) ORDER BY id",
    )
    .bind(&student_ids)
    .fetch_all(&mut *conn)
    .await?;

    let contacts: Vec<EmergencyContact> = sqlx::query_as(
        "SELECT id, student_id, first_name, last_name, phone, relation_to_child
         FROM booking_emergency_contacts WHERE student_id = ANY($1) ORDER BY id",
    )
    .bind(&student_ids)
    .fetch_all(&mut *conn)
    .await?;

    Ok(students
        .into_iter()
        .map(|s| {
            let detail = StudentDetail {
                id: s.id,
                first_name: s.first_name,
                last_name: s.last_name,
                date_of_birth: s.date_of_birth,
                age: s.age,
                gender: s.gender,
                medical_info: s.medical_info,
                parents: parents
                    .iter()
                    .filter(|p| p.student_id == s.id)
                    .cloned()
                    .collect(),
                emergency_contact: contacts
                    .iter()
                    .find(|c| c.student_id == s.id)
                    .cloned(),
            };
            (s.booking_id, detail)
        })
        .collect())
}

/// Summary figures over an already-loaded result set.
///
/// Revenue counts plan-bearing bookings only: (price + joining fee) per
/// enrolled student. Averages are over the same subset.
pub fn compute_stats(rows: &[BookingDetail]) -> BookingStats {
    let total_students: i64 = rows.iter().map(|r| r.booking.total_students as i64).sum();

    let mut revenue = Decimal::ZERO;
    let mut monthly_fees = Decimal::ZERO;
    let mut duration_total = Decimal::ZERO;
    let mut plan_count = 0u32;

    for row in rows {
        let b = &row.booking;
        let (Some(price), Some(joining_fee), Some(duration)) =
            (b.plan_price, b.plan_joining_fee, b.plan_duration_months)
        else {
            continue;
        };
        let booking_revenue = (price + joining_fee) * Decimal::from(b.total_students);
        revenue += booking_revenue;
        if duration > 0 {
            monthly_fees += booking_revenue / Decimal::from(duration);
        }
        duration_total += Decimal::from(duration);
        plan_count += 1;
    }

    let (average_monthly_fee, average_duration_months) = if plan_count > 0 {
        (
            (monthly_fees / Decimal::from(plan_count)).round_dp(2),
            (duration_total / Decimal::from(plan_count)).round_dp(1),
        )
    } else {
        (Decimal::ZERO, Decimal::ZERO)
    };

    BookingStats {
        total_bookings: rows.len(),
        total_students,
        revenue: revenue.round_dp(2),
        average_monthly_fee,
        average_duration_months,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::dec;

    fn booking_row(total_students: i32, plan: Option<(Decimal, Decimal, i32)>) -> BookingDetail {
        BookingDetail {
            booking: BookingRow {
                id: 1,
                booking_ref: "AAAABBBBCCCC".into(),
                booking_type: "paid".into(),
                status: "active".into(),
                total_students,
                trial_date: None,
                start_date: None,
                interest: None,
                additional_note: None,
                created_at: 0,
                venue_id: 1,
                venue_name: "Acton".into(),
                class_schedule_id: 1,
                class_name: "Saturday 4-5yrs".into(),
                day_of_week: "Saturday".into(),
                start_time: "09:00".into(),
                end_time: "10:00".into(),
                payment_plan_id: plan.map(|_| 1),
                plan_name: plan.map(|_| "Gold".to_string()),
                plan_price: plan.map(|p| p.0),
                plan_joining_fee: plan.map(|p| p.1),
                plan_duration_months: plan.map(|p| p.2),
                booked_by: 1,
                booked_by_name: "Sam Coach".into(),
                payment_status: None,
            },
            students: Vec::new(),
        }
    }

    #[test]
    fn test_stats_empty() {
        let stats = compute_stats(&[]);
        assert_eq!(stats.total_bookings, 0);
        assert_eq!(stats.total_students, 0);
        assert_eq!(stats.revenue, Decimal::ZERO);
        assert_eq!(stats.average_monthly_fee, Decimal::ZERO);
    }

    #[test]
    fn test_stats_single_plan_booking() {
        // (30 + 12) * 2 students = 84 revenue; 84 / 12 months = 7/month
        let rows = vec![booking_row(2, Some((dec!(30), dec!(12), 12)))];
        let stats = compute_stats(&rows);
        assert_eq!(stats.total_bookings, 1);
        assert_eq!(stats.total_students, 2);
        assert_eq!(stats.revenue, dec!(84.00));
        assert_eq!(stats.average_monthly_fee, dec!(7.00));
        assert_eq!(stats.average_duration_months, dec!(12.0));
    }

    #[test]
    fn test_stats_skips_planless_bookings() {
        let rows = vec![
            booking_row(1, Some((dec!(40), dec!(0), 10))),
            booking_row(3, None), // free trial, counts students but no revenue
        ];
        let stats = compute_stats(&rows);
        assert_eq!(stats.total_bookings, 2);
        assert_eq!(stats.total_students, 4);
        assert_eq!(stats.revenue, dec!(40.00));
        assert_eq!(stats.average_monthly_fee, dec!(4.00));
        assert_eq!(stats.average_duration_months, dec!(10.0));
    }

    #[test]
    fn test_stats_averages_across_plans() {
        let rows = vec![
            booking_row(1, Some((dec!(24), dec!(0), 12))), // 24 rev, 2/month
            booking_row(1, Some((dec!(36), dec!(0), 6))),  // 36 rev, 6/month
        ];
        let stats = compute_stats(&rows);
        assert_eq!(stats.revenue, dec!(60.00));
        assert_eq!(stats.average_monthly_fee, dec!(4.00));
        assert_eq!(stats.average_duration_months, dec!(9.0));
    }
}
