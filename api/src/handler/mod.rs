pub mod health;
pub mod notification;
pub mod plan;
pub mod reservation;
pub mod unit;
