use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    availability::{operating_window, slots_for},
    booking_code::BookingCode,
    id::{ReservationId, UnitId},
    reservation::{
        event::{TransitionReservation, UpdatePayment},
        ReservationStatus,
    },
};
use registry::AppRegistry;
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedStaff,
    model::reservation::{
        AvailabilityQuery, AvailabilityResponse, CreateReservationRequest, IdentityResponse,
        ReservationDetailResponse, ReservationListQuery, ReservationResponse,
        ReservationTrackingResponse, ReservationsResponse, UpdatePaymentRequest,
        UpdateReservationStatusRequest,
    },
};

/// 指定日の 1 時間枠ごとの空き状況。表示用の目安で、予約の確定は作成時の判定による
pub async fn show_availability(
    Path(unit_id): Path<UnitId>,
    Query(query): Query<AvailabilityQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<AvailabilityResponse>> {
    if registry.unit_repository().find_by_id(unit_id).await?.is_none() {
        return Err(AppError::EntityNotFound(format!(
            "rental unit ({unit_id}) not found"
        )));
    }
    let shop_timezone = registry.shop_timezone();
    let window = operating_window(query.date, &shop_timezone).ok_or_else(|| {
        AppError::InvalidRequest(format!("{} has no operating hours", query.date))
    })?;

    let busy = registry
        .reservation_repository()
        .find_active_windows(unit_id, window)
        .await?;

    Ok(Json(AvailabilityResponse {
        unit_id,
        date: query.date,
        slots: slots_for(query.date, &shop_timezone, &busy),
    }))
}

pub async fn create_reservation(
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateReservationRequest>,
) -> AppResult<(StatusCode, Json<ReservationResponse>)> {
    req.validate()?;

    let event = req.into_event(registry.identity_retention_days())?;
    registry
        .reservation_repository()
        .create(event)
        .await
        .map(|reservation| (StatusCode::CREATED, Json(reservation.into())))
}

pub async fn show_reservation_by_code(
    Path(booking_code): Path<String>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationTrackingResponse>> {
    let not_found = || AppError::EntityNotFound(format!("booking code {booking_code} not found"));

    let code = BookingCode::parse(&booking_code).ok_or_else(not_found)?;
    registry
        .reservation_repository()
        .find_by_booking_code(&code)
        .await?
        .map(|reservation| Json(reservation.into()))
        .ok_or_else(not_found)
}

pub async fn show_reservation_list(
    _staff: AuthorizedStaff,
    Query(query): Query<ReservationListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationsResponse>> {
    registry
        .reservation_repository()
        .find_all(query.into())
        .await
        .map(ReservationsResponse::from)
        .map(Json)
}

pub async fn show_reservation(
    _staff: AuthorizedStaff,
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationDetailResponse>> {
    let reservation = registry
        .reservation_repository()
        .find_by_id(reservation_id)
        .await?
        .ok_or_else(|| {
            AppError::EntityNotFound(format!("reservation ({reservation_id}) not found"))
        })?;
    let identity = registry
        .identity_repository()
        .find_by_reservation_id(reservation_id)
        .await?;

    Ok(Json(ReservationDetailResponse {
        reservation: reservation.into(),
        identity: identity.map(IdentityResponse::from),
    }))
}

pub async fn update_reservation_status(
    staff: AuthorizedStaff,
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateReservationStatusRequest>,
) -> AppResult<Json<ReservationResponse>> {
    registry
        .reservation_repository()
        .transition(TransitionReservation::new(
            reservation_id,
            req.status,
            req.note,
            staff.identity,
        ))
        .await
        .map(|reservation| Json(reservation.into()))
}

/// Pending から Confirmed への遷移だけを行う
pub async fn confirm_reservation(
    staff: AuthorizedStaff,
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<ReservationResponse>> {
    registry
        .reservation_repository()
        .transition(TransitionReservation::new(
            reservation_id,
            ReservationStatus::Confirmed,
            None,
            staff.identity,
        ))
        .await
        .map(|reservation| Json(reservation.into()))
}

pub async fn update_payment(
    staff: AuthorizedStaff,
    Path(reservation_id): Path<ReservationId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdatePaymentRequest>,
) -> AppResult<Json<ReservationResponse>> {
    registry
        .reservation_repository()
        .update_payment(UpdatePayment::new(
            reservation_id,
            req.payment_status,
            req.payment_proof_url,
            staff.identity,
        ))
        .await
        .map(|reservation| Json(reservation.into()))
}
