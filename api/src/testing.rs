//! ハンドラのテスト用に、DB の代わりにメモリ上で動くリポジトリを用意する。

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{Request, Response},
    Router,
};
use chrono::{DateTime, FixedOffset, Utc};
use kernel::{
    model::{
        booking_code::BookingCode,
        id::{IdentityRecordId, NotificationId, PlanId, ReservationId, UnitId},
        identity::IdentityRecord,
        notification::{Notification, NotificationKind},
        plan::{
            event::{CreatePricingPlan, DeletePricingPlan, UpdatePricingPlan},
            PricingPlan,
        },
        reservation::{
            append_note,
            event::{CreateReservation, ReservationListOptions, TransitionReservation, UpdatePayment},
            find_conflict, plan_booking, BookingPlan, PaymentStatus, PlanSelection, Reservation,
            ReservationStatus, TimeWindow,
        },
        unit::{
            event::{CreateRentalUnit, DeleteRentalUnit, UpdateRentalUnit, UpdateUnitStatus},
            Hardware, RentalUnit, UnitStatus,
        },
    },
    repository::{
        health::HealthCheckRepository, identity::IdentityRecordRepository,
        notification::NotificationRepository, plan::PricingPlanRepository,
        reservation::ReservationRepository, unit::RentalUnitRepository,
    },
};
use registry::AppRegistry;
use serde_json::Value;
use shared::error::{AppError, AppResult};

use crate::route::v1;

pub(crate) const RETENTION_DAYS: i64 = 7;

/// テストでの店舗タイムゾーン（UTC+7）
pub(crate) fn shop_timezone() -> FixedOffset {
    FixedOffset::east_opt(7 * 3600).unwrap()
}

#[derive(Default)]
pub(crate) struct FakeStore {
    pub units: Mutex<Vec<RentalUnit>>,
    pub plans: Mutex<Vec<PricingPlan>>,
    pub reservations: Mutex<Vec<Reservation>>,
    pub identities: Mutex<Vec<IdentityRecord>>,
    pub notifications: Mutex<Vec<Notification>>,
}

impl FakeStore {
    pub fn add_unit(&self, name: &str) -> UnitId {
        let id = UnitId::new();
        self.units.lock().unwrap().push(RentalUnit {
            id,
            name: name.into(),
            hardware: Hardware {
                screen_size: Some("32 inch".into()),
                console_model: "PS5".into(),
                controller_count: 2,
            },
            description: String::new(),
            image_url: None,
            status: UnitStatus::Available,
            location: None,
            featured: false,
        });
        id
    }

    pub fn add_plan(&self, event: CreatePricingPlan) -> PlanId {
        let id = PlanId::new();
        self.plans.lock().unwrap().push(plan_from(id, event));
        id
    }

    pub fn unit_status(&self, unit_id: UnitId) -> Option<UnitStatus> {
        let units = self.units.lock().unwrap();
        units.iter().find(|u| u.id == unit_id).map(|u| u.status)
    }
}

fn plan_from(id: PlanId, event: CreatePricingPlan) -> PricingPlan {
    let CreatePricingPlan {
        name,
        delivery_fee,
        weekend_surcharge,
        deposit_amount,
        is_active,
        kind,
    } = event;
    PricingPlan {
        id,
        name,
        delivery_fee,
        weekend_surcharge,
        deposit_amount,
        is_active,
        kind,
    }
}

fn reservation_not_found(id: ReservationId) -> AppError {
    AppError::EntityNotFound(format!("reservation ({id}) not found"))
}

#[async_trait]
impl HealthCheckRepository for FakeStore {
    async fn check_db(&self) -> bool {
        true
    }
}

#[async_trait]
impl RentalUnitRepository for FakeStore {
    async fn create(&self, event: CreateRentalUnit) -> AppResult<UnitId> {
        let id = UnitId::new();
        self.units.lock().unwrap().push(RentalUnit {
            id,
            name: event.name,
            hardware: event.hardware,
            description: event.description,
            image_url: event.image_url,
            status: UnitStatus::Available,
            location: event.location,
            featured: event.featured,
        });
        Ok(id)
    }

    async fn find_all(&self, featured: Option<bool>) -> AppResult<Vec<RentalUnit>> {
        let units = self.units.lock().unwrap();
        Ok(units
            .iter()
            .filter(|u| featured.map_or(true, |f| u.featured == f))
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, unit_id: UnitId) -> AppResult<Option<RentalUnit>> {
        let units = self.units.lock().unwrap();
        Ok(units.iter().find(|u| u.id == unit_id).cloned())
    }

    async fn update(&self, event: UpdateRentalUnit) -> AppResult<()> {
        let mut units = self.units.lock().unwrap();
        let unit = units
            .iter_mut()
            .find(|u| u.id == event.unit_id)
            .ok_or_else(|| AppError::EntityNotFound("rental unit not found".into()))?;
        if let Some(name) = event.name {
            unit.name = name;
        }
        if let Some(console_model) = event.console_model {
            unit.hardware.console_model = console_model;
        }
        if let Some(controller_count) = event.controller_count {
            unit.hardware.controller_count = controller_count;
        }
        if let Some(featured) = event.featured {
            unit.featured = featured;
        }
        Ok(())
    }

    async fn update_status(&self, event: UpdateUnitStatus) -> AppResult<()> {
        let mut units = self.units.lock().unwrap();
        let unit = units
            .iter_mut()
            .find(|u| u.id == event.unit_id)
            .ok_or_else(|| AppError::EntityNotFound("rental unit not found".into()))?;
        unit.status = event.status;
        Ok(())
    }

    async fn delete(&self, event: DeleteRentalUnit) -> AppResult<()> {
        let in_progress = self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.unit_id == event.unit_id && !r.status.is_terminal());
        if in_progress {
            return Err(AppError::InvalidRequest("reservations in progress".into()));
        }
        let mut units = self.units.lock().unwrap();
        let before = units.len();
        units.retain(|u| u.id != event.unit_id);
        if units.len() == before {
            return Err(AppError::EntityNotFound("rental unit not found".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl PricingPlanRepository for FakeStore {
    async fn create(&self, event: CreatePricingPlan) -> AppResult<PlanId> {
        Ok(self.add_plan(event))
    }

    async fn find_all(&self, active_only: bool) -> AppResult<Vec<PricingPlan>> {
        let plans = self.plans.lock().unwrap();
        Ok(plans
            .iter()
            .filter(|p| !active_only || p.is_active)
            .cloned()
            .collect())
    }

    async fn find_by_id(&self, plan_id: PlanId) -> AppResult<Option<PricingPlan>> {
        let plans = self.plans.lock().unwrap();
        Ok(plans.iter().find(|p| p.id == plan_id).cloned())
    }

    async fn update(&self, event: UpdatePricingPlan) -> AppResult<()> {
        let mut plans = self.plans.lock().unwrap();
        let plan = plans
            .iter_mut()
            .find(|p| p.id == event.plan_id)
            .ok_or_else(|| AppError::EntityNotFound("pricing plan not found".into()))?;
        *plan = PricingPlan {
            id: event.plan_id,
            name: event.name,
            delivery_fee: event.delivery_fee,
            weekend_surcharge: event.weekend_surcharge,
            deposit_amount: event.deposit_amount,
            is_active: event.is_active,
            kind: event.kind,
        };
        Ok(())
    }

    async fn delete(&self, event: DeletePricingPlan) -> AppResult<()> {
        let referenced = self
            .reservations
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.plan_id == Some(event.plan_id));
        let mut plans = self.plans.lock().unwrap();
        if referenced {
            if let Some(plan) = plans.iter_mut().find(|p| p.id == event.plan_id) {
                plan.is_active = false;
            }
        } else {
            plans.retain(|p| p.id != event.plan_id);
        }
        Ok(())
    }
}

#[async_trait]
impl ReservationRepository for FakeStore {
    async fn create(&self, event: CreateReservation) -> AppResult<Reservation> {
        let unit_name = self
            .units
            .lock()
            .unwrap()
            .iter()
            .find(|u| u.id == event.unit_id)
            .map(|u| u.name.clone())
            .ok_or_else(|| AppError::EntityNotFound("rental unit not found".into()))?;

        let selection = {
            let plans = self.plans.lock().unwrap();
            match event.plan_id {
                Some(plan_id) => PlanSelection::Requested(
                    plans
                        .iter()
                        .find(|p| p.id == plan_id)
                        .cloned()
                        .ok_or_else(|| AppError::EntityNotFound("pricing plan not found".into()))?,
                ),
                None => PlanSelection::Recommend(
                    plans.iter().filter(|p| p.is_active).cloned().collect(),
                ),
            }
        };
        let BookingPlan {
            plan,
            window,
            total_amount,
            ..
        } = plan_booking(selection, &event, &shop_timezone())?;

        let mut reservations = self.reservations.lock().unwrap();
        let busy: Vec<TimeWindow> = reservations
            .iter()
            .filter(|r| r.unit_id == event.unit_id && !r.status.is_terminal())
            .map(Reservation::window)
            .collect();
        if find_conflict(&busy, &window).is_some() {
            return Err(AppError::SlotConflict("already booked".into()));
        }

        let reservation = Reservation {
            id: ReservationId::new(),
            unit_id: event.unit_id,
            plan_id: Some(plan.id),
            booking_code: BookingCode::generate(&mut rand::thread_rng()),
            customer: event.customer,
            delivery: event.delivery.clone(),
            start_time: window.start,
            end_time: window.end,
            actual_end_time: None,
            status: ReservationStatus::Pending,
            total_amount,
            deposit_amount: plan.deposit_amount,
            payment_method: event.payment_method,
            payment_status: PaymentStatus::Pending,
            payment_proof_url: None,
            staff_id: None,
            notes: event.notes.unwrap_or_default(),
            created_at: Utc::now(),
        };
        reservations.push(reservation.clone());

        if let Some(identity) = event.identity {
            self.identities.lock().unwrap().push(IdentityRecord {
                id: IdentityRecordId::new(),
                reservation_id: reservation.id,
                identity_type: identity.identity_type,
                identity_number: identity.identity_number,
                identity_file_url: identity.identity_file_url,
                expiry_date: window.end + identity.retention,
            });
        }
        self.notifications.lock().unwrap().push(Notification {
            id: NotificationId::new(),
            target_id: reservation.id.raw(),
            kind: NotificationKind::NewReservation,
            message: format!("New reservation {} for {unit_name}", reservation.booking_code),
            is_read: false,
            created_at: Utc::now(),
        });

        Ok(reservation)
    }

    async fn transition(&self, event: TransitionReservation) -> AppResult<Reservation> {
        let updated = {
            let mut reservations = self.reservations.lock().unwrap();
            let reservation = reservations
                .iter_mut()
                .find(|r| r.id == event.reservation_id)
                .ok_or_else(|| reservation_not_found(event.reservation_id))?;
            reservation.status.ensure_transition_to(event.status)?;

            reservation.status = event.status;
            if let Some(note) = &event.note {
                reservation.notes = append_note(&reservation.notes, note);
            }
            if event.status == ReservationStatus::Completed {
                reservation.actual_end_time = Some(Utc::now());
            }
            if event.status == ReservationStatus::Cancelled
                && reservation.payment_status != PaymentStatus::Paid
            {
                reservation.payment_status = PaymentStatus::Cancelled;
            }
            reservation.staff_id = Some(event.requested_by.staff_id);
            reservation.clone()
        };

        if let Some(status) = event.status.unit_status_effect() {
            let mut units = self.units.lock().unwrap();
            if let Some(unit) = units.iter_mut().find(|u| u.id == updated.unit_id) {
                unit.status = status;
            }
        }
        Ok(updated)
    }

    async fn update_payment(&self, event: UpdatePayment) -> AppResult<Reservation> {
        let mut reservations = self.reservations.lock().unwrap();
        let reservation = reservations
            .iter_mut()
            .find(|r| r.id == event.reservation_id)
            .ok_or_else(|| reservation_not_found(event.reservation_id))?;
        reservation.payment_status = event.payment_status;
        if event.payment_proof_url.is_some() {
            reservation.payment_proof_url = event.payment_proof_url;
        }
        reservation.staff_id = Some(event.requested_by.staff_id);
        Ok(reservation.clone())
    }

    async fn find_by_id(&self, reservation_id: ReservationId) -> AppResult<Option<Reservation>> {
        let reservations = self.reservations.lock().unwrap();
        Ok(reservations.iter().find(|r| r.id == reservation_id).cloned())
    }

    async fn find_by_booking_code(&self, code: &BookingCode) -> AppResult<Option<Reservation>> {
        let reservations = self.reservations.lock().unwrap();
        Ok(reservations
            .iter()
            .find(|r| &r.booking_code == code)
            .cloned())
    }

    async fn find_all(&self, options: ReservationListOptions) -> AppResult<Vec<Reservation>> {
        let reservations = self.reservations.lock().unwrap();
        Ok(reservations
            .iter()
            .rev()
            .filter(|r| options.status.map_or(true, |s| r.status == s))
            .filter(|r| options.unit_id.map_or(true, |u| r.unit_id == u))
            .cloned()
            .collect())
    }

    async fn find_active_windows(
        &self,
        unit_id: UnitId,
        window: TimeWindow,
    ) -> AppResult<Vec<TimeWindow>> {
        let reservations = self.reservations.lock().unwrap();
        Ok(reservations
            .iter()
            .filter(|r| r.unit_id == unit_id && !r.status.is_terminal())
            .map(Reservation::window)
            .filter(|w| w.overlaps(&window))
            .collect())
    }
}

#[async_trait]
impl IdentityRecordRepository for FakeStore {
    async fn find_by_reservation_id(
        &self,
        reservation_id: ReservationId,
    ) -> AppResult<Option<IdentityRecord>> {
        let identities = self.identities.lock().unwrap();
        Ok(identities
            .iter()
            .find(|i| i.reservation_id == reservation_id)
            .cloned())
    }

    async fn find_expired(&self, now: DateTime<Utc>) -> AppResult<Vec<IdentityRecord>> {
        let identities = self.identities.lock().unwrap();
        Ok(identities.iter().filter(|i| i.is_expired(now)).cloned().collect())
    }

    async fn delete(&self, id: IdentityRecordId) -> AppResult<()> {
        self.identities.lock().unwrap().retain(|i| i.id != id);
        Ok(())
    }
}

#[async_trait]
impl NotificationRepository for FakeStore {
    async fn find_recent(&self, limit: i64) -> AppResult<Vec<Notification>> {
        let mut notifications = self.notifications.lock().unwrap().clone();
        notifications.sort_by(|a, b| {
            a.is_read
                .cmp(&b.is_read)
                .then(b.created_at.cmp(&a.created_at))
        });
        notifications.truncate(usize::try_from(limit).unwrap_or(0));
        Ok(notifications)
    }

    async fn mark_read(&self, notification_id: NotificationId) -> AppResult<()> {
        let mut notifications = self.notifications.lock().unwrap();
        let notification = notifications
            .iter_mut()
            .find(|n| n.id == notification_id)
            .ok_or_else(|| AppError::EntityNotFound("notification not found".into()))?;
        notification.is_read = true;
        Ok(())
    }
}

pub(crate) fn app(store: Arc<FakeStore>) -> Router {
    let registry = AppRegistry::from_repositories(
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store.clone(),
        store,
        RETENTION_DAYS,
        shop_timezone(),
    );
    v1::routes().with_state(registry)
}

pub(crate) fn staff_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    with_staff(Request::builder(), "staff")
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap()
}

pub(crate) fn admin_request(method: &str, uri: &str) -> Request<Body> {
    with_staff(Request::builder(), "admin")
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

fn with_staff(builder: axum::http::request::Builder, role: &str) -> axum::http::request::Builder {
    builder
        .header("X-Staff-Id", uuid::Uuid::new_v4().to_string())
        .header("X-Staff-Role", role)
}

pub(crate) fn public_request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.map_or_else(Body::empty, |b| Body::from(b.to_string())))
        .unwrap()
}

pub(crate) async fn body_json(response: Response<Body>) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    if bytes.is_empty() {
        return Value::Null;
    }
    serde_json::from_slice(&bytes).unwrap()
}
