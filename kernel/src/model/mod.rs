pub mod availability;
pub mod booking_code;
pub mod id;
pub mod identity;
pub mod notification;
pub mod plan;
pub mod pricing;
pub mod reservation;
pub mod staff;
pub mod unit;
