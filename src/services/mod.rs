pub mod booking_service;
pub mod distance_service;
pub mod fare_service;
pub mod payment_service;
pub mod pricing_service;
