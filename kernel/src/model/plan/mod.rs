use chrono::{Duration, NaiveTime};

use super::id::PlanId;

pub mod event;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PricingPlan {
    pub id: PlanId,
    pub name: String,
    pub delivery_fee: i64,
    /// 週末料金の割増率（%）
    pub weekend_surcharge: i64,
    pub deposit_amount: i64,
    pub is_active: bool,
    pub kind: PlanKind,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlanKind {
    Standard(StandardRate),
    FixedSchedule(FixedSchedule),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardRate {
    pub base_price: i64,
    pub hourly_rate: i64,
    pub min_hours: i64,
    pub package_12h_price: Option<i64>,
    pub package_24h_price: Option<i64>,
}

impl StandardRate {
    pub fn package_price(&self, duration_hours: i64) -> Option<i64> {
        match duration_hours {
            12 => self.package_12h_price,
            24 => self.package_24h_price,
            _ => None,
        }
    }
}

/// 開始・終了時刻があらかじめ決まっているパッケージ
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FixedSchedule {
    pub base_price: i64,
    pub start_time: NaiveTime,
    pub end_time: NaiveTime,
}

impl FixedSchedule {
    /// 終了時刻が開始時刻以前なら日付をまたぐものとして扱う
    pub fn duration(&self) -> Duration {
        let diff = self.end_time - self.start_time;
        if diff <= Duration::zero() {
            diff + Duration::days(1)
        } else {
            diff
        }
    }
}

impl PricingPlan {
    pub fn is_fixed_package(&self) -> bool {
        matches!(self.kind, PlanKind::FixedSchedule(_))
    }

    pub fn fixed_duration(&self) -> Option<Duration> {
        match &self.kind {
            PlanKind::FixedSchedule(fixed) => Some(fixed.duration()),
            PlanKind::Standard(_) => None,
        }
    }

    /// 店舗の現地時刻 `local_start` に始まる予約をこのプランで受けられるか
    pub fn accepts_start(&self, local_start: NaiveTime) -> bool {
        match &self.kind {
            PlanKind::FixedSchedule(fixed) => fixed.start_time == local_start,
            PlanKind::Standard(_) => true,
        }
    }
}
