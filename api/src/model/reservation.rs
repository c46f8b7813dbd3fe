use chrono::{DateTime, Duration, NaiveDate, Utc};
use garde::Validate;
use kernel::model::{
    availability::TimeSlot,
    booking_code::BookingCode,
    id::{PlanId, ReservationId, StaffId, UnitId},
    identity::{event::AttachIdentity, IdentityRecord, IdentityType},
    reservation::{
        event::{CreateReservation, ReservationListOptions},
        Customer, Delivery, PaymentMethod, PaymentStatus, Reservation, ReservationStatus,
        MAX_DURATION_HOURS,
    },
};
use serde::{Deserialize, Serialize};
use shared::error::AppError;

#[derive(Debug, Deserialize)]
pub struct AvailabilityQuery {
    pub date: NaiveDate,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AvailabilityResponse {
    pub unit_id: UnitId,
    pub date: NaiveDate,
    pub slots: Vec<TimeSlot>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct CreateReservationRequest {
    #[garde(skip)]
    pub unit_id: UnitId,
    #[garde(length(min = 1))]
    pub customer_name: String,
    #[garde(length(min = 1))]
    pub customer_phone: String,
    #[garde(email)]
    pub customer_email: Option<String>,
    #[garde(skip)]
    pub delivery_address: Option<String>,
    #[garde(skip)]
    #[serde(default)]
    pub pickup_at_studio: bool,
    #[garde(skip)]
    pub start_time: DateTime<Utc>,
    #[garde(range(min = 1, max = MAX_DURATION_HOURS))]
    pub duration_hours: i64,
    #[garde(skip)]
    pub payment_method: PaymentMethod,
    #[garde(skip)]
    pub plan_id: Option<PlanId>,
    #[garde(skip)]
    pub notes: Option<String>,
    #[garde(dive)]
    pub identity: Option<IdentityRequest>,
}

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct IdentityRequest {
    #[garde(skip)]
    pub identity_type: IdentityType,
    #[garde(skip)]
    pub identity_number: Option<String>,
    #[garde(length(min = 1))]
    pub identity_file_url: String,
}

impl CreateReservationRequest {
    /// 身分証の保持日数を加えて予約作成の要求に変換する
    pub fn into_event(self, identity_retention_days: i64) -> Result<CreateReservation, AppError> {
        let CreateReservationRequest {
            unit_id,
            customer_name,
            customer_phone,
            customer_email,
            delivery_address,
            pickup_at_studio,
            start_time,
            duration_hours,
            payment_method,
            plan_id,
            notes,
            identity,
        } = self;

        let delivery = if pickup_at_studio {
            Delivery::StudioPickup
        } else {
            match delivery_address.map(|a| a.trim().to_string()) {
                Some(address) if !address.is_empty() => Delivery::Address(address),
                _ => {
                    return Err(AppError::InvalidRequest(
                        "deliveryAddress is required unless picking up at the studio".into(),
                    ))
                }
            }
        };
        let identity = identity.map(|i| AttachIdentity {
            identity_type: i.identity_type,
            identity_number: i.identity_number,
            identity_file_url: i.identity_file_url,
            retention: Duration::days(identity_retention_days),
        });

        Ok(CreateReservation::new(
            unit_id,
            Customer {
                name: customer_name,
                phone: customer_phone,
                email: customer_email,
            },
            delivery,
            start_time,
            duration_hours,
            payment_method,
            plan_id,
            notes,
            identity,
        ))
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationListQuery {
    pub status: Option<ReservationStatus>,
    pub unit_id: Option<UnitId>,
}

impl From<ReservationListQuery> for ReservationListOptions {
    fn from(value: ReservationListQuery) -> Self {
        let ReservationListQuery { status, unit_id } = value;
        ReservationListOptions { status, unit_id }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateReservationStatusRequest {
    pub status: ReservationStatus,
    pub note: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePaymentRequest {
    pub payment_status: PaymentStatus,
    pub payment_proof_url: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationResponse {
    pub id: ReservationId,
    pub unit_id: UnitId,
    pub plan_id: Option<PlanId>,
    pub booking_code: BookingCode,
    pub customer_name: String,
    pub customer_phone: String,
    pub customer_email: Option<String>,
    pub delivery_address: Option<String>,
    pub pickup_at_studio: bool,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub actual_end_time: Option<DateTime<Utc>>,
    pub status: ReservationStatus,
    pub total_amount: i64,
    pub deposit_amount: i64,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
    pub payment_proof_url: Option<String>,
    pub staff_id: Option<StaffId>,
    pub notes: String,
    pub created_at: DateTime<Utc>,
}

impl From<Reservation> for ReservationResponse {
    fn from(value: Reservation) -> Self {
        let Reservation {
            id,
            unit_id,
            plan_id,
            booking_code,
            customer,
            delivery,
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
        let pickup_at_studio = delivery.is_pickup();
        Self {
            id,
            unit_id,
            plan_id,
            booking_code,
            customer_name: customer.name,
            customer_phone: customer.phone,
            customer_email: customer.email,
            delivery_address: delivery.address().map(str::to_string),
            pickup_at_studio,
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
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationsResponse {
    pub items: Vec<ReservationResponse>,
}

impl From<Vec<Reservation>> for ReservationsResponse {
    fn from(value: Vec<Reservation>) -> Self {
        Self {
            items: value.into_iter().map(ReservationResponse::from).collect(),
        }
    }
}

/// 顧客向けの予約状況。連絡先などは含めない
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationTrackingResponse {
    pub booking_code: BookingCode,
    pub unit_id: UnitId,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub status: ReservationStatus,
    pub total_amount: i64,
    pub deposit_amount: i64,
    pub payment_status: PaymentStatus,
}

impl From<Reservation> for ReservationTrackingResponse {
    fn from(value: Reservation) -> Self {
        Self {
            booking_code: value.booking_code,
            unit_id: value.unit_id,
            start_time: value.start_time,
            end_time: value.end_time,
            status: value.status,
            total_amount: value.total_amount,
            deposit_amount: value.deposit_amount,
            payment_status: value.payment_status,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IdentityResponse {
    pub identity_type: IdentityType,
    pub identity_number: Option<String>,
    pub identity_file_url: String,
    pub expiry_date: DateTime<Utc>,
}

impl From<IdentityRecord> for IdentityResponse {
    fn from(value: IdentityRecord) -> Self {
        Self {
            identity_type: value.identity_type,
            identity_number: value.identity_number,
            identity_file_url: value.identity_file_url,
            expiry_date: value.expiry_date,
        }
    }
}

/// スタッフ向けの予約詳細
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ReservationDetailResponse {
    #[serde(flatten)]
    pub reservation: ReservationResponse,
    pub identity: Option<IdentityResponse>,
}
