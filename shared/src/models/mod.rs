//! Booking domain types shared across crates

pub mod booking;
pub mod lifecycle;
pub mod payment;

pub use booking::{BookingStatus, BookingType, InterestLevel};
pub use lifecycle::{CancellationType, LifecycleEventKind};
pub use payment::{PaymentMethod, PaymentStatus};
