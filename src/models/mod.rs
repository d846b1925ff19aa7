pub mod booking;
pub mod fare;
pub mod pricing;
pub mod quote;
