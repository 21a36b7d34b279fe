//! Booking creation flows: free trial, membership, waiting list
//!
//! One transaction per creation. Child rows, the payment attempt and the
//! capacity decrement commit together or not at all; a failed membership
//! payment aborts the whole creation and surfaces the gateway's message.

use chrono::NaiveDate;
use shared::error::{AppError, ErrorCode};
use shared::models::{BookingStatus, BookingType, InterestLevel, PaymentStatus};
use shared::util::now_millis;
use sqlx::PgConnection;

use crate::db;
use crate::db::accounts::PARENT_ROLE_ID;
use crate::error::{ServiceError, ServiceResult};
use crate::services::payment::{self, PaymentDetailsInput};
use crate::state::AppState;
use crate::util;

/// Which creation pipeline is running
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationFlow {
    FreeTrial,
    Membership,
    WaitingList,
}

impl CreationFlow {
    fn booking_type(&self) -> BookingType {
        match self {
            Self::FreeTrial => BookingType::Free,
            Self::Membership => BookingType::Paid,
            Self::WaitingList => BookingType::WaitingList,
        }
    }

    fn initial_status(&self) -> BookingStatus {
        match self {
            Self::FreeTrial => BookingStatus::Pending,
            Self::Membership => BookingStatus::Active,
            Self::WaitingList => BookingStatus::WaitingList,
        }
    }

    /// Confirmed flows consume class capacity; waiting-list entries do not
    fn consumes_capacity(&self) -> bool {
        !matches!(self, Self::WaitingList)
    }
}

/// Who is creating the booking
#[derive(Debug, Clone, Copy)]
pub enum Creator {
    /// Authenticated staff account
    Admin(i64),
    /// Open/self-service booking: a parent account is found-or-created from
    /// the first parent's email and used as the creator
    OpenSelfService,
}

#[derive(Debug, serde::Deserialize)]
pub struct StudentInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    pub date_of_birth: Option<NaiveDate>,
    pub age: Option<i32>,
    pub gender: Option<String>,
    pub medical_info: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct ParentInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
    pub relation_to_child: Option<String>,
    pub referral_source: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct EmergencyContactInput {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub phone: String,
    pub relation_to_child: Option<String>,
}

#[derive(Debug, serde::Deserialize)]
pub struct CreateBookingRequest {
    pub class_schedule_id: i64,
    pub students: Vec<StudentInput>,
    pub parents: Vec<ParentInput>,
    pub emergency_contact: EmergencyContactInput,
    pub interest: Option<InterestLevel>,
    pub additional_note: Option<String>,
    /// Free-trial flow
    pub trial_date: Option<NaiveDate>,
    /// Membership flow
    pub start_date: Option<NaiveDate>,
    pub payment_plan_id: Option<i64>,
    pub payment: Option<PaymentDetailsInput>,
}

/// Denormalized creation result, enough for the caller to compose emails
#[derive(Debug, serde::Serialize)]
pub struct CreatedBooking {
    pub booking_id: i64,
    pub booking_ref: String,
    pub booking_type: BookingType,
    pub status: BookingStatus,
    pub first_student_first_name: String,
    pub first_student_last_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payment_status: Option<PaymentStatus>,
}

// ──────────────────────────── validation ────────────────────────────

fn blank(s: &str) -> bool {
    s.trim().is_empty()
}

/// Field-presence validation; reports the first missing field by name.
pub fn validate_request(flow: CreationFlow, req: &CreateBookingRequest) -> Result<(), AppError> {
    if req.students.is_empty() {
        return Err(AppError::validation("At least one student is required."));
    }
    for (i, s) in req.students.iter().enumerate() {
        let n = i + 1;
        if blank(&s.first_name) {
            return Err(AppError::missing_field(format!("Student {n} first name")));
        }
        if blank(&s.last_name) {
            return Err(AppError::missing_field(format!("Student {n} last name")));
        }
        if s.date_of_birth.is_none() {
            return Err(AppError::missing_field(format!("Student {n} date of birth")));
        }
        if s.medical_info.as_deref().is_none_or(blank) {
            return Err(AppError::missing_field(format!(
                "Student {n} medical information"
            )));
        }
    }

    if req.parents.is_empty() {
        return Err(AppError::validation("At least one parent is required."));
    }
    for (i, p) in req.parents.iter().enumerate() {
        let n = i + 1;
        if blank(&p.first_name) {
            return Err(AppError::missing_field(format!("Parent {n} first name")));
        }
        if blank(&p.last_name) {
            return Err(AppError::missing_field(format!("Parent {n} last name")));
        }
        if blank(&p.email) {
            return Err(AppError::missing_field(format!("Parent {n} email")));
        }
        if blank(&p.phone) {
            return Err(AppError::missing_field(format!("Parent {n} phone")));
        }
    }

    let ec = &req.emergency_contact;
    if blank(&ec.first_name) {
        return Err(AppError::missing_field("Emergency contact first name"));
    }
    if blank(&ec.last_name) {
        return Err(AppError::missing_field("Emergency contact last name"));
    }
    if blank(&ec.phone) {
        return Err(AppError::missing_field("Emergency contact phone"));
    }

    match flow {
        CreationFlow::FreeTrial => {
            if req.trial_date.is_none() {
                return Err(AppError::missing_field("Trial date"));
            }
        }
        CreationFlow::Membership => {
            if req.start_date.is_none() {
                return Err(AppError::missing_field("Start date"));
            }
            if req.payment_plan_id.is_none() {
                return Err(AppError::new(ErrorCode::PaymentPlanRequired));
            }
            if req.payment.is_none() {
                return Err(AppError::missing_field("Payment details"));
            }
        }
        CreationFlow::WaitingList => {}
    }

    Ok(())
}

/// The capacity gate of step 2: confirmed flows need room for every student,
/// waiting-list entries are only allowed once the class is full.
pub fn check_capacity(
    flow: CreationFlow,
    capacity: i32,
    total_students: i32,
) -> Result<(), AppError> {
    match flow {
        CreationFlow::FreeTrial | CreationFlow::Membership => {
            if capacity < total_students {
                Err(AppError::capacity_exceeded(capacity))
            } else {
                Ok(())
            }
        }
        CreationFlow::WaitingList => {
            if capacity > 0 {
                Err(AppError::seats_available(capacity))
            } else {
                Ok(())
            }
        }
    }
}

// ──────────────────────────── creation ────────────────────────────

const BOOKING_REF_ATTEMPTS: u32 = 5;

pub async fn create_booking(
    state: &AppState,
    flow: CreationFlow,
    creator: Creator,
    req: CreateBookingRequest,
) -> ServiceResult<CreatedBooking> {
    validate_request(flow, &req).map_err(ServiceError::App)?;

    let now = now_millis();
    let mut tx = state.pool.begin().await?;

    // Step 1-2: schedule must exist and pass the capacity gate
    let schedule = db::class_schedules::find_by_id(&mut *tx, req.class_schedule_id)
        .await?
        .ok_or_else(|| AppError::new(ErrorCode::ClassNotFound))?;
    let total_students = req.students.len() as i32;
    check_capacity(flow, schedule.capacity, total_students).map_err(ServiceError::App)?;

    // Step 4: resolve the creating account
    let (booked_by, provisioned_email) = match creator {
        Creator::Admin(id) => (id, None),
        Creator::OpenSelfService => {
            let first_parent = &req.parents[0];
            let email = first_parent.email.trim().to_lowercase();
            let password_hash = util::hash_password(&state.parent_default_password)
                .map_err(|e| AppError::internal(format!("Password hash error: {e}")))?;
            let id = db::accounts::ensure_parent_account(
                &mut *tx,
                &db::accounts::NewAccount {
                    email: &email,
                    password_hash: &password_hash,
                    first_name: &first_parent.first_name,
                    last_name: &first_parent.last_name,
                    phone: Some(&first_parent.phone),
                    role_id: PARENT_ROLE_ID,
                    now,
                },
            )
            .await?;
            (id, Some(email))
        }
    };

    // Step 5: duplicate-email policy. The auto-provisioned parent email is
    // exempt; every other parent email must be new to both tables.
    for parent in &req.parents {
        let email = parent.email.trim().to_lowercase();
        if provisioned_email.as_deref() == Some(email.as_str()) {
            continue;
        }
        if db::students::parent_email_exists(&mut *tx, &email).await?
            || db::accounts::email_exists(&mut *tx, &email).await?
        {
            return Err(AppError::duplicate_email(email).into());
        }
    }

    // Step 6: booking row with a fresh reference, retried on collision
    let booking_type = flow.booking_type();
    let status = flow.initial_status();
    let (booking_id, booking_ref) = insert_with_ref(
        &mut *tx,
        &req,
        booking_type,
        status,
        total_students,
        schedule.venue_id,
        booked_by,
        now,
    )
    .await?;

    insert_children(&mut *tx, booking_id, &req, now).await?;

    // Step 7: membership flow pays inside the same transaction; a failed
    // outcome aborts everything and surfaces the gateway's message verbatim
    let mut payment_status = None;
    if flow == CreationFlow::Membership {
        let plan_id = req.payment_plan_id.unwrap_or_default();
        let plan = db::payment_plans::find_by_id(&mut *tx, plan_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::PaymentPlanNotFound))?;
        let details = req.payment.as_ref().ok_or_else(|| {
            AppError::missing_field("Payment details")
        })?;
        let outcome =
            payment::attempt_payment(state, &mut *tx, booking_id, &booking_ref, &plan, details)
                .await?;
        if outcome.status == PaymentStatus::Failed {
            let msg = outcome
                .message
                .unwrap_or_else(|| ErrorCode::PaymentFailed.message().to_string());
            return Err(AppError::payment_failed(msg).into());
        }
        payment_status = Some(outcome.status);
    }

    // Step 8: atomic capacity decrement, the authoritative guard against
    // concurrent over-booking
    if flow.consumes_capacity() {
        let decremented = db::class_schedules::try_decrement_capacity(
            &mut *tx,
            schedule.id,
            total_students,
            now,
        )
        .await?;
        if !decremented {
            let remaining = db::class_schedules::find_by_id(&mut *tx, schedule.id)
                .await?
                .map(|s| s.capacity)
                .unwrap_or(0);
            return Err(AppError::capacity_exceeded(remaining).into());
        }
    }

    tx.commit().await?;

    let first = &req.students[0];
    tracing::info!(
        %booking_ref,
        booking_type = booking_type.as_db(),
        total_students,
        "Booking created"
    );

    Ok(CreatedBooking {
        booking_id,
        booking_ref,
        booking_type,
        status,
        first_student_first_name: first.first_name.clone(),
        first_student_last_name: first.last_name.clone(),
        payment_status,
    })
}

#[allow(clippy::too_many_arguments)]
async fn insert_with_ref(
    conn: &mut PgConnection,
    req: &CreateBookingRequest,
    booking_type: BookingType,
    status: BookingStatus,
    total_students: i32,
    venue_id: i64,
    booked_by: i64,
    now: i64,
) -> ServiceResult<(i64, String)> {
    use sqlx::Acquire;

    for _ in 0..BOOKING_REF_ATTEMPTS {
        let booking_ref = util::generate_booking_ref();
        let new_booking = db::bookings::NewBooking {
            booking_ref: &booking_ref,
            booking_type: booking_type.as_db(),
            status: status.as_db(),
            total_students,
            trial_date: req.trial_date,
            start_date: req.start_date,
            interest: req.interest.map(|i| i.as_db()),
            additional_note: req.additional_note.as_deref(),
            venue_id,
            class_schedule_id: req.class_schedule_id,
            payment_plan_id: req.payment_plan_id,
            booked_by,
            now,
        };
        // Savepoint per attempt: a unique-violation would otherwise abort the
        // enclosing transaction and poison the retry
        let mut sp = conn.begin().await?;
        match db::bookings::insert(&mut *sp, &new_booking).await {
            Ok(id) => {
                sp.commit().await?;
                return Ok((id, booking_ref));
            }
            Err(e) if db::is_unique_violation(&e) => {
                sp.rollback().await?;
                tracing::warn!(%booking_ref, "Booking reference collision, retrying");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Err(ServiceError::Db(
        "booking reference generation exhausted after repeated collisions".into(),
    ))
}

/// Cascade the student tree: every student, parents on the first student,
/// the emergency contact on the first student.
async fn insert_children(
    conn: &mut PgConnection,
    booking_id: i64,
    req: &CreateBookingRequest,
    now: i64,
) -> ServiceResult<()> {
    let mut first_student_id = None;
    for s in &req.students {
        let date_of_birth = s
            .date_of_birth
            .ok_or_else(|| AppError::missing_field("Student date of birth"))?;
        let student_id = db::students::insert_student(
            conn,
            booking_id,
            &db::students::NewStudent {
                first_name: s.first_name.trim(),
                last_name: s.last_name.trim(),
                date_of_birth,
                age: s.age,
                gender: s.gender.as_deref(),
                medical_info: s.medical_info.as_deref().unwrap_or_default(),
            },
            now,
        )
        .await?;
        first_student_id.get_or_insert(student_id);
    }

    let first_student_id =
        first_student_id.ok_or_else(|| AppError::validation("At least one student is required."))?;

    for p in &req.parents {
        let email = p.email.trim().to_lowercase();
        db::students::insert_parent(
            conn,
            first_student_id,
            &db::students::NewParent {
                first_name: p.first_name.trim(),
                last_name: p.last_name.trim(),
                email: &email,
                phone: p.phone.trim(),
                relation_to_child: p.relation_to_child.as_deref(),
                referral_source: p.referral_source.as_deref(),
            },
            now,
        )
        .await?;
    }

    let ec = &req.emergency_contact;
    db::students::insert_emergency_contact(
        conn,
        first_student_id,
        &db::students::NewEmergencyContact {
            first_name: ec.first_name.trim(),
            last_name: ec.last_name.trim(),
            phone: ec.phone.trim(),
            relation_to_child: ec.relation_to_child.as_deref(),
        },
        now,
    )
    .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn student(first: &str) -> StudentInput {
        StudentInput {
            first_name: first.into(),
            last_name: "Lee".into(),
            date_of_birth: NaiveDate::from_ymd_opt(2020, 3, 14),
            age: Some(6),
            gender: None,
            medical_info: Some("None".into()),
        }
    }

    fn parent() -> ParentInput {
        ParentInput {
            first_name: "Jordan".into(),
            last_name: "Lee".into(),
            email: "jordan@example.com".into(),
            phone: "07700900000".into(),
            relation_to_child: Some("Mother".into()),
            referral_source: None,
        }
    }

    fn emergency() -> EmergencyContactInput {
        EmergencyContactInput {
            first_name: "Ash".into(),
            last_name: "Lee".into(),
            phone: "07700900001".into(),
            relation_to_child: None,
        }
    }

    fn trial_request() -> CreateBookingRequest {
        CreateBookingRequest {
            class_schedule_id: 1,
            students: vec![student("Sam")],
            parents: vec![parent()],
            emergency_contact: emergency(),
            interest: Some(InterestLevel::High),
            additional_note: None,
            trial_date: NaiveDate::from_ymd_opt(2026, 9, 5),
            start_date: None,
            payment_plan_id: None,
            payment: None,
        }
    }

    #[test]
    fn test_validate_trial_ok() {
        assert!(validate_request(CreationFlow::FreeTrial, &trial_request()).is_ok());
    }

    #[test]
    fn test_validate_names_first_missing_field() {
        let mut req = trial_request();
        req.students[0].first_name = " ".into();
        let err = validate_request(CreationFlow::FreeTrial, &req).unwrap_err();
        assert_eq!(err.message, "Student 1 first name is required.");
    }

    #[test]
    fn test_validate_missing_medical_info() {
        let mut req = trial_request();
        req.students[0].medical_info = None;
        let err = validate_request(CreationFlow::FreeTrial, &req).unwrap_err();
        assert_eq!(err.message, "Student 1 medical information is required.");
    }

    #[test]
    fn test_validate_missing_parent_email() {
        let mut req = trial_request();
        req.parents[0].email = String::new();
        let err = validate_request(CreationFlow::FreeTrial, &req).unwrap_err();
        assert_eq!(err.message, "Parent 1 email is required.");
    }

    #[test]
    fn test_validate_missing_emergency_phone() {
        let mut req = trial_request();
        req.emergency_contact.phone = String::new();
        let err = validate_request(CreationFlow::FreeTrial, &req).unwrap_err();
        assert_eq!(err.message, "Emergency contact phone is required.");
    }

    #[test]
    fn test_validate_trial_requires_trial_date() {
        let mut req = trial_request();
        req.trial_date = None;
        let err = validate_request(CreationFlow::FreeTrial, &req).unwrap_err();
        assert_eq!(err.message, "Trial date is required.");
    }

    #[test]
    fn test_validate_membership_requires_plan_and_payment() {
        let mut req = trial_request();
        req.trial_date = None;
        req.start_date = NaiveDate::from_ymd_opt(2026, 9, 12);
        let err = validate_request(CreationFlow::Membership, &req).unwrap_err();
        assert_eq!(err.code, ErrorCode::PaymentPlanRequired);
    }

    #[test]
    fn test_capacity_gate_confirmed_flows() {
        // capacity 2, 3 students: rejected with the slots-left message
        let err = check_capacity(CreationFlow::FreeTrial, 2, 3).unwrap_err();
        assert_eq!(err.message, "Only 2 slot(s) left for this class.");
        assert!(check_capacity(CreationFlow::FreeTrial, 3, 3).is_ok());
        assert!(check_capacity(CreationFlow::Membership, 5, 2).is_ok());
        assert!(check_capacity(CreationFlow::Membership, 0, 1).is_err());
    }

    #[test]
    fn test_capacity_gate_waiting_list_inverse() {
        let err = check_capacity(CreationFlow::WaitingList, 1, 1).unwrap_err();
        assert_eq!(err.code, ErrorCode::SeatsAvailable);
        assert!(check_capacity(CreationFlow::WaitingList, 0, 2).is_ok());
    }

    #[test]
    fn test_flow_pairs() {
        assert_eq!(CreationFlow::FreeTrial.booking_type(), BookingType::Free);
        assert_eq!(
            CreationFlow::FreeTrial.initial_status(),
            BookingStatus::Pending
        );
        assert_eq!(CreationFlow::Membership.booking_type(), BookingType::Paid);
        assert_eq!(
            CreationFlow::Membership.initial_status(),
            BookingStatus::Active
        );
        assert_eq!(
            CreationFlow::WaitingList.booking_type(),
            BookingType::WaitingList
        );
        assert_eq!(
            CreationFlow::WaitingList.initial_status(),
            BookingStatus::WaitingList
        );
        assert!(!CreationFlow::WaitingList.consumes_capacity());
        assert!(CreationFlow::FreeTrial.consumes_capacity());
        assert!(CreationFlow::Membership.consumes_capacity());
    }
}
