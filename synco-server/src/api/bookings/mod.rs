//! Booking API endpoints — split into sub-modules by concern

mod create;
mod lifecycle;
mod payment;
mod queries;

// Re-export all handlers for route registration
pub use create::{free_trial, free_trial_open, membership, waiting_list};

pub use lifecycle::{
    apply_cancellation, cancel, convert, due_cancellations, freeze, no_membership, reactivate,
    remove, transfer, trial_outcome, update_students,
};

pub use payment::retry_payment;

pub use queries::{get_booking, list};
