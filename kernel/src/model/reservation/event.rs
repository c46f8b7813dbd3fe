use chrono::{DateTime, Utc};
use derive_new::new;

use super::{Customer, Delivery, PaymentMethod, PaymentStatus, ReservationStatus};
use crate::model::{
    id::{PlanId, ReservationId, UnitId},
    identity::event::AttachIdentity,
    staff::StaffIdentity,
};

/// 予約作成の要求。プランの確定と料金計算、予約コード発行は保存時にまとめて行う
#[derive(Debug, new)]
pub struct CreateReservation {
    pub unit_id: UnitId,
    pub customer: Customer,
    pub delivery: Delivery,
    pub start_time: DateTime<Utc>,
    pub duration_hours: i64,
    pub payment_method: PaymentMethod,
    pub plan_id: Option<PlanId>,
    pub notes: Option<String>,
    pub identity: Option<AttachIdentity>,
}

#[derive(Debug, new)]
pub struct TransitionReservation {
    pub reservation_id: ReservationId,
    pub status: ReservationStatus,
    pub note: Option<String>,
    pub requested_by: StaffIdentity,
}

#[derive(Debug, new)]
pub struct UpdatePayment {
    pub reservation_id: ReservationId,
    pub payment_status: PaymentStatus,
    pub payment_proof_url: Option<String>,
    pub requested_by: StaffIdentity,
}

#[derive(Debug, Default)]
pub struct ReservationListOptions {
    pub status: Option<ReservationStatus>,
    pub unit_id: Option<UnitId>,
}
