//! API routes for synco-server

pub mod bookings;
pub mod classes;
pub mod health;
pub mod login;

use axum::routing::{get, patch, post};
use axum::{Router, middleware};
use tower_http::trace::TraceLayer;

use shared::error::{ApiResponse, AppError};

use crate::auth::admin_auth_middleware;
use crate::state::AppState;

/// Handlers answer with the unified envelope or an [`AppError`]
pub type ApiResult<T> = Result<ApiResponse<T>, AppError>;

/// Create the combined router
pub fn create_router(state: AppState) -> Router {
    // Open/self-service booking (no auth): a parent account is provisioned
    // from the request itself
    let open = Router::new().route("/api/bookings/free-trial", post(bookings::free_trial_open));

    // Staff login (no auth)
    let auth = Router::new().route("/api/auth/login", post(login::login));

    // Admin API (JWT authenticated)
    let admin = Router::new()
        .route("/api/admin/bookings", get(bookings::list))
        .route("/api/admin/bookings/free-trial", post(bookings::free_trial))
        .route("/api/admin/bookings/membership", post(bookings::membership))
        .route(
            "/api/admin/bookings/waiting-list",
            post(bookings::waiting_list),
        )
        .route(
            "/api/admin/bookings/due-cancellations",
            get(bookings::due_cancellations),
        )
        .route("/api/admin/bookings/{ref}", get(bookings::get_booking))
        .route("/api/admin/bookings/{ref}/cancel", post(bookings::cancel))
        .route(
            "/api/admin/bookings/{ref}/apply-cancellation",
            post(bookings::apply_cancellation),
        )
        .route("/api/admin/bookings/{ref}/freeze", patch(bookings::freeze))
        .route(
            "/api/admin/bookings/{ref}/reactivate",
            patch(bookings::reactivate),
        )
        .route(
            "/api/admin/bookings/{ref}/transfer",
            patch(bookings::transfer),
        )
        .route("/api/admin/bookings/{ref}/remove", post(bookings::remove))
        .route(
            "/api/admin/bookings/{ref}/no-membership",
            post(bookings::no_membership),
        )
        .route(
            "/api/admin/bookings/{ref}/trial-outcome",
            patch(bookings::trial_outcome),
        )
        .route("/api/admin/bookings/{ref}/convert", post(bookings::convert))
        .route(
            "/api/admin/bookings/{ref}/retry-payment",
            post(bookings::retry_payment),
        )
        .route(
            "/api/admin/bookings/{ref}/students",
            patch(bookings::update_students),
        )
        .route("/api/admin/venues", get(classes::list_venues))
        .route(
            "/api/admin/class-schedules",
            get(classes::list_class_schedules),
        )
        .route(
            "/api/admin/class-schedules/{id}/capacity",
            patch(classes::set_capacity),
        )
        .route(
            "/api/admin/payment-plans",
            get(classes::list_payment_plans),
        )
        .layer(middleware::from_fn_with_state(
            state.clone(),
            admin_auth_middleware,
        ));

    Router::new()
        .route("/health", get(health::health_check))
        .merge(open)
        .merge(auth)
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
