//! Booking creation endpoints
//!
//! POST /api/admin/bookings/free-trial   — staff-created trial
//! POST /api/bookings/free-trial         — open/self-service trial
//! POST /api/admin/bookings/membership   — paid membership (pays in-transaction)
//! POST /api/admin/bookings/waiting-list — waiting-list entry (full classes only)

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::{Extension, Json};
use serde_json::json;

use shared::error::ApiResponse;
use shared::util::now_millis;

use crate::auth::AdminIdentity;
use crate::db;
use crate::email::{Recipient, templates};
use crate::services::booking::{
    CreateBookingRequest, CreatedBooking, CreationFlow, Creator, create_booking,
};
use crate::state::AppState;

pub async fn free_trial(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Json(req): Json<CreateBookingRequest>,
) -> impl IntoResponse {
    create(state, CreationFlow::FreeTrial, Creator::Admin(identity.account_id), req).await
}

pub async fn free_trial_open(
    State(state): State<AppState>,
    Json(req): Json<CreateBookingRequest>,
) -> impl IntoResponse {
    create(state, CreationFlow::FreeTrial, Creator::OpenSelfService, req).await
}

pub async fn membership(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Json(req): Json<CreateBookingRequest>,
) -> impl IntoResponse {
    create(state, CreationFlow::Membership, Creator::Admin(identity.account_id), req).await
}

pub async fn waiting_list(
    State(state): State<AppState>,
    Extension(identity): Extension<AdminIdentity>,
    Json(req): Json<CreateBookingRequest>,
) -> impl IntoResponse {
    create(state, CreationFlow::WaitingList, Creator::Admin(identity.account_id), req).await
}

async fn create(
    state: AppState,
    flow: CreationFlow,
    creator: Creator,
    req: CreateBookingRequest,
) -> axum::response::Response {
    let recipients: Vec<Recipient> = req
        .parents
        .iter()
        .map(|p| Recipient {
            name: format!("{} {}", p.first_name.trim(), p.last_name.trim()),
            email: p.email.trim().to_lowercase(),
        })
        .collect();

    let created = match create_booking(&state, flow, creator, req).await {
        Ok(c) => c,
        Err(e) => return e.into_response(),
    };

    // Confirmation emails and the audit row are post-commit side effects;
    // neither can fail the booking response.
    send_confirmation_emails(&state, flow, &created, &recipients).await;

    let actor = match creator {
        Creator::Admin(id) => Some(id),
        Creator::OpenSelfService => None,
    };
    let detail = json!({
        "booking_ref": created.booking_ref,
        "flow": match flow {
            CreationFlow::FreeTrial => "free_trial",
            CreationFlow::Membership => "membership",
            CreationFlow::WaitingList => "waiting_list",
        },
    });
    let _ = db::audit::log(&state.pool, actor, "booking_created", Some(&detail), now_millis())
        .await;

    (
        StatusCode::CREATED,
        Json(ApiResponse::success_with_message(
            "Booking created successfully.",
            created,
        )),
    )
        .into_response()
}

async fn send_confirmation_emails(
    state: &AppState,
    flow: CreationFlow,
    created: &CreatedBooking,
    recipients: &[Recipient],
) {
    let detail = match db::booking_queries::find_by_ref(&state.pool, &created.booking_ref).await {
        Ok(Some(d)) => d,
        Ok(None) => return,
        Err(e) => {
            tracing::warn!(error = %e, "Skipping confirmation emails, booking reload failed");
            return;
        }
    };
    let b = &detail.booking;
    let student_name = format!(
        "{} {}",
        created.first_student_first_name, created.first_student_last_name
    );
    let trial_date = b.trial_date.map(|d| d.to_string()).unwrap_or_default();
    let start_date = b.start_date.map(|d| d.to_string()).unwrap_or_default();
    let plan_name = b.plan_name.clone().unwrap_or_default();
    let plan_price = b
        .plan_price
        .map(|p| p.to_string())
        .unwrap_or_default();

    for r in recipients {
        let values = [
            ("parentName", r.name.as_str()),
            ("studentName", student_name.as_str()),
            ("className", b.class_name.as_str()),
            ("venueName", b.venue_name.as_str()),
            ("trialDate", trial_date.as_str()),
            ("startDate", start_date.as_str()),
            ("planName", plan_name.as_str()),
            ("planPrice", plan_price.as_str()),
            ("bookingRef", b.booking_ref.as_str()),
        ];
        let (subject, template) = match flow {
            CreationFlow::FreeTrial => ("Your free trial is booked", templates::TRIAL_CONFIRMATION),
            CreationFlow::Membership => ("Welcome to Synco", templates::MEMBERSHIP_CONFIRMATION),
            CreationFlow::WaitingList => (
                "You're on the waiting list",
                templates::WAITING_LIST_CONFIRMATION,
            ),
        };
        let html = templates::render(template, &values);
        state
            .mailer
            .send_to_all(std::slice::from_ref(r), subject, &html)
            .await;
    }
}
