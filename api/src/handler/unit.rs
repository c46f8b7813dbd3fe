use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    id::UnitId,
    unit::event::{DeleteRentalUnit, UpdateUnitStatus},
};
use registry::AppRegistry;
use serde_json::{json, Value};
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedStaff,
    model::unit::{
        CreateUnitRequest, UnitListQuery, UnitResponse, UnitsResponse, UpdateUnitRequest,
        UpdateUnitRequestWithIds, UpdateUnitStatusRequest,
    },
};

pub async fn register_unit(
    staff: AuthorizedStaff,
    State(registry): State<AppRegistry>,
    Json(req): Json<CreateUnitRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    req.validate()?;

    let unit_id = registry.unit_repository().create(req.into()).await?;
    tracing::info!(%unit_id, staff_id = %staff.id(), "rental unit registered");
    Ok((StatusCode::CREATED, Json(json!({ "id": unit_id }))))
}

pub async fn show_unit_list(
    Query(query): Query<UnitListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UnitsResponse>> {
    registry
        .unit_repository()
        .find_all(query.featured)
        .await
        .map(UnitsResponse::from)
        .map(Json)
}

pub async fn show_unit(
    Path(unit_id): Path<UnitId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<UnitResponse>> {
    registry
        .unit_repository()
        .find_by_id(unit_id)
        .await
        .and_then(|unit| match unit {
            Some(unit) => Ok(Json(unit.into())),
            None => Err(AppError::EntityNotFound(format!(
                "rental unit ({unit_id}) not found"
            ))),
        })
}

pub async fn update_unit(
    _staff: AuthorizedStaff,
    Path(unit_id): Path<UnitId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateUnitRequest>,
) -> AppResult<StatusCode> {
    req.validate()?;

    let update_unit = UpdateUnitRequestWithIds::new(unit_id, req);
    registry
        .unit_repository()
        .update(update_unit.into())
        .await
        .map(|_| StatusCode::OK)
}

pub async fn update_unit_status(
    staff: AuthorizedStaff,
    Path(unit_id): Path<UnitId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<UpdateUnitStatusRequest>,
) -> AppResult<StatusCode> {
    registry
        .unit_repository()
        .update_status(UpdateUnitStatus::new(unit_id, req.status))
        .await?;
    tracing::info!(
        %unit_id,
        status = req.status.as_ref(),
        staff_id = %staff.id(),
        "rental unit status changed by staff"
    );
    Ok(StatusCode::OK)
}

pub async fn delete_unit(
    staff: AuthorizedStaff,
    Path(unit_id): Path<UnitId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    staff.ensure_admin()?;

    registry
        .unit_repository()
        .delete(DeleteRentalUnit { unit_id })
        .await
        .map(|_| StatusCode::OK)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use axum::http::StatusCode;
    use kernel::model::unit::UnitStatus;
    use serde_json::json;
    use tower::ServiceExt;

    use crate::testing::{app, body_json, public_request, staff_request, FakeStore};

    #[tokio::test]
    async fn staff_register_units_and_anyone_can_list_them() {
        let store = Arc::new(FakeStore::default());

        let res = app(store.clone())
            .oneshot(staff_request(
                "POST",
                "/api/v1/units",
                Some(json!({
                    "name": "Playbox 07",
                    "screenSize": "32 inch",
                    "consoleModel": "PS5",
                    "controllerCount": 2,
                    "featured": true,
                })),
            ))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::CREATED);

        let res = app(store)
            .oneshot(public_request("GET", "/api/v1/units?featured=true", None))
            .await
            .unwrap();
        assert_eq!(res.status(), StatusCode::OK);
        let body = body_json(res).await;
        assert_eq!(body["items"][0]["name"], "Playbox 07");
        assert_eq!(body["items"][0]["status"], "available");
    }

    #[tokio::test]
    async fn unit_without_name_is_rejected() {
        let store = Arc::new(FakeStore::default());

        let res = app(store.clone())
            .oneshot(staff_request(
                "POST",
                "/api/v1/units",
                Some(json!({ "name": "", "consoleModel": "PS5", "controllerCount": 2 })),
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::BAD_REQUEST);
        assert!(store.units.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_without_staff_headers_are_unauthorized() {
        let store = Arc::new(FakeStore::default());

        let res = app(store)
            .oneshot(public_request(
                "POST",
                "/api/v1/units",
                Some(json!({ "name": "Playbox 07", "consoleModel": "PS5", "controllerCount": 2 })),
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn staff_can_set_unit_status_directly() {
        let store = Arc::new(FakeStore::default());
        let unit_id = store.add_unit("Playbox 01");

        let res = app(store.clone())
            .oneshot(staff_request(
                "PUT",
                &format!("/api/v1/units/{unit_id}/status"),
                Some(json!({ "status": "maintenance" })),
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(store.unit_status(unit_id), Some(UnitStatus::Maintenance));
    }

    #[tokio::test]
    async fn unknown_unit_is_not_found() {
        let store = Arc::new(FakeStore::default());

        let res = app(store)
            .oneshot(public_request(
                "GET",
                "/api/v1/units/8f14e45f-ceea-467f-a8f4-6f0b7a2c4f6e",
                None,
            ))
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
    }
}
