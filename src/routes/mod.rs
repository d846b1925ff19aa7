pub mod admin;
pub mod bookings;
pub mod health;
pub mod payment;
pub mod pricing;
pub mod quote;
