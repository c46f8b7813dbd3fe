use chrono::{DateTime, Utc};
use kernel::model::{
    booking_code::BookingCode,
    id::{PlanId, ReservationId, StaffId, UnitId},
    reservation::{Customer, Delivery, Reservation, TimeWindow},
};
use shared::error::AppError;

pub(crate) const RESERVATION_COLUMNS: &str = r#"
    reservation_id, unit_id, plan_id, booking_code,
    customer_name, customer_phone, customer_email, delivery_address,
    start_time, end_time, actual_end_time, status,
    total_amount, deposit_amount, payment_method, payment_status,
    payment_proof_url, staff_id, notes, created_at
"#;

#[derive(sqlx::FromRow)]
pub struct ReservationRow {
    pub reservation_id: ReservationId,
    pub unit_id: UnitId,
    pub plan_id: Option<PlanId>,
    pub booking_code: String,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub delivery_address: Option<String>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub status: String,
    pub total_amount: i64,
    pub deposit_amount: i64,
    pub payment_method: String,
    pub payment_status: String,
    pub payment_proof_url: Option<String>,
    pub staff_id: Option<StaffId>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

fn conversion_error(column: &str, value: &str) -> AppError {
    AppError::ConversionEntityError(format!("unknown {column}: {value}"))
}

impl TryFrom<ReservationRow> for Reservation {
    type Error = AppError;

    fn try_from(value: ReservationRow) -> Result<Self, Self::Error> {
        let ReservationRow {
            reservation_id,
            unit_id,
            plan_id,
            booking_code,
            customer_name,
            customer_phone,
            customer_email,
            delivery_address,
            start_time,
            end_time,
            actual_end_time,
            status,
            total_amount,
            deposit_amount,
            payment_method,
            payment_status,
            payment_proof_url,
            staff_id,
            notes,
            created_at,
        } = value;
        Ok(Reservation {
            id: reservation_id,
            unit_id,
            plan_id,
            booking_code: BookingCode::parse(&booking_code)
                .ok_or_else(|| conversion_error("booking code", &booking_code))?,
            customer: Customer {
                name: customer_name,
                phone: customer_phone,
                email: customer_email,
            },
            delivery: match delivery_address {
                Some(address) => Delivery::Address(address),
                None => Delivery::StudioPickup,
            },
            start_time,
            end_time,
            actual_end_time,
            status: status
                .parse()
                .map_err(|_| conversion_error("reservation status", &status))?,
            total_amount,
            deposit_amount,
            payment_method: payment_method
                .parse()
                .map_err(|_| conversion_error("payment method", &payment_method))?,
            payment_status: payment_status
                .parse()
                .map_err(|_| conversion_error("payment status", &payment_status))?,
            payment_proof_url,
            staff_id,
            notes,
            created_at,
        })
    }
}

// 空き状況と重複チェックで使う、時間枠だけの行
#[derive(sqlx::FromRow)]
pub struct ReservationWindowRow {
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
}

impl From<ReservationWindowRow> for TimeWindow {
    fn from(value: ReservationWindowRow) -> Self {
        TimeWindow {
            start: value.start_time,
            end: value.end_time,
        }
    }
}
