//! Booking lifecycle services
//!
//! Each operation owns exactly one transaction: child-record writes, gateway
//! outcome recording and the capacity decrement all commit or roll back
//! together.

pub mod booking;
pub mod payment;
pub mod transitions;
