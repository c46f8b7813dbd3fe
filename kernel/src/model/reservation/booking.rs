use chrono::TimeZone;
use shared::error::{AppError, AppResult};

use super::{ensure_duration_hours, event::CreateReservation, is_weekend, TimeWindow};
use crate::model::{
    plan::{PlanKind, PricingPlan},
    pricing,
};

/// 予約に使う料金プランの決め方
#[derive(Debug)]
pub enum PlanSelection {
    /// 顧客が指定したプラン
    Requested(PricingPlan),
    /// 登録順に並んだプラン一覧。この中からおすすめを選ぶ
    Recommend(Vec<PricingPlan>),
}

/// 保存前に確定させる予約の中身
#[derive(Debug, Clone)]
pub struct BookingPlan {
    pub plan: PricingPlan,
    pub window: TimeWindow,
    pub is_weekend: bool,
    pub total_amount: i64,
}

/// プランの確定、時間枠の算出、料金計算をまとめて行う。
///
/// 週末の判定と固定パッケージの開始時刻の照合は、店舗のタイムゾーン `tz` の
/// 暦と時刻で行う。固定パッケージは決められた時刻にしか始められず、
/// 長さもプランの時間帯で決まる。
pub fn plan_booking<Tz: TimeZone>(
    selection: PlanSelection,
    request: &CreateReservation,
    tz: &Tz,
) -> AppResult<BookingPlan> {
    ensure_duration_hours(request.duration_hours)?;

    let local_start = request.start_time.with_timezone(tz);
    let weekend = is_weekend(&local_start);
    let pickup = request.delivery.is_pickup();

    let plan = match selection {
        PlanSelection::Requested(plan) if !plan.is_active => {
            return Err(AppError::InvalidRequest(format!(
                "pricing plan ({}) is no longer offered",
                plan.id
            )));
        }
        PlanSelection::Requested(plan) => plan,
        PlanSelection::Recommend(plans) => {
            let candidates: Vec<PricingPlan> = plans
                .into_iter()
                .filter(|plan| plan.is_active && plan.accepts_start(local_start.time()))
                .collect();
            pricing::recommend(&candidates, request.duration_hours, weekend, pickup)
                .cloned()
                .ok_or_else(|| AppError::InvalidRequest("no active pricing plan".into()))?
        }
    };

    let window = match &plan.kind {
        PlanKind::FixedSchedule(fixed) => {
            if !plan.accepts_start(local_start.time()) {
                return Err(AppError::InvalidRequest(format!(
                    "pricing plan ({}) only starts at {}",
                    plan.id,
                    fixed.start_time.format("%H:%M")
                )));
            }
            TimeWindow::from_duration(request.start_time, fixed.duration())?
        }
        PlanKind::Standard(_) => TimeWindow::from_hours(request.start_time, request.duration_hours)?,
    };
    let total_amount = pricing::compute_total(&plan, request.duration_hours, weekend, pickup)?;

    Ok(BookingPlan {
        plan,
        window,
        is_weekend: weekend,
        total_amount,
    })
}
