use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use garde::Validate;
use kernel::model::{
    id::PlanId,
    plan::event::{CreatePricingPlan, DeletePricingPlan, UpdatePricingPlan},
    pricing,
    reservation::is_weekend,
};
use registry::AppRegistry;
use serde_json::{json, Value};
use shared::error::{AppError, AppResult};

use crate::{
    extractor::AuthorizedStaff,
    model::plan::{
        PlanListQuery, PlanRequest, PlanRequestWithIds, PlanResponse, PlansResponse, QuoteQuery,
        QuoteResponse,
    },
};

pub async fn register_plan(
    staff: AuthorizedStaff,
    State(registry): State<AppRegistry>,
    Json(req): Json<PlanRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    req.validate()?;

    let plan_id = registry
        .plan_repository()
        .create(CreatePricingPlan::try_from(req)?)
        .await?;
    tracing::info!(%plan_id, staff_id = %staff.id(), "pricing plan registered");
    Ok((StatusCode::CREATED, Json(json!({ "id": plan_id }))))
}

pub async fn show_plan_list(
    Query(query): Query<PlanListQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PlansResponse>> {
    registry
        .plan_repository()
        .find_all(query.active_only)
        .await
        .map(PlansResponse::from)
        .map(Json)
}

pub async fn show_plan(
    Path(plan_id): Path<PlanId>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<PlanResponse>> {
    registry
        .plan_repository()
        .find_by_id(plan_id)
        .await
        .and_then(|plan| match plan {
            Some(plan) => Ok(Json(plan.into())),
            None => Err(AppError::EntityNotFound(format!(
                "pricing plan ({plan_id}) not found"
            ))),
        })
}

pub async fn update_plan(
    _staff: AuthorizedStaff,
    Path(plan_id): Path<PlanId>,
    State(registry): State<AppRegistry>,
    Json(req): Json<PlanRequest>,
) -> AppResult<StatusCode> {
    req.validate()?;

    let update_plan = UpdatePricingPlan::try_from(PlanRequestWithIds::new(plan_id, req))?;
    registry
        .plan_repository()
        .update(update_plan)
        .await
        .map(|_| StatusCode::OK)
}

pub async fn delete_plan(
    staff: AuthorizedStaff,
    Path(plan_id): Path<PlanId>,
    State(registry): State<AppRegistry>,
) -> AppResult<StatusCode> {
    staff.ensure_admin()?;

    registry
        .plan_repository()
        .delete(DeletePricingPlan { plan_id })
        .await
        .map(|_| StatusCode::OK)
}

/// 料金の見積もり。プラン指定が無ければ有効なプランからおすすめを選ぶ
pub async fn show_quote(
    Query(query): Query<QuoteQuery>,
    State(registry): State<AppRegistry>,
) -> AppResult<Json<QuoteResponse>> {
    query.validate()?;

    // 週末判定は店舗の現地時刻で行う
    let shop_timezone = registry.shop_timezone();
    let weekend = query
        .start
        .is_some_and(|start| is_weekend(&start.with_timezone(&shop_timezone)));
    let plan = match query.plan_id {
        Some(plan_id) => registry
            .plan_repository()
            .find_by_id(plan_id)
            .await?
            .ok_or_else(|| AppError::EntityNotFound(format!("pricing plan ({plan_id}) not found")))?,
        None => {
            let plans = registry.plan_repository().find_all(true).await?;
            pricing::recommend(&plans, query.duration_hours, weekend, query.pickup)
                .cloned()
                .ok_or_else(|| AppError::InvalidRequest("no active pricing plan".into()))?
        }
    };

    let total_amount =
        pricing::compute_total(&plan, query.duration_hours, weekend, query.pickup)?;
    let duration_hours = plan
        .fixed_duration()
        .map(|d| d.num_hours())
        .unwrap_or(query.duration_hours);

    Ok(Json(QuoteResponse {
        plan_id: plan.id,
        plan_name: plan.name,
        duration_hours,
        is_weekend: weekend,
        total_amount,
        deposit_amount: plan.deposit_amount,
    }))
}
