//! 料金計算。いずれも副作用のない関数で、同じ入力には必ず同じ金額を返す。

use shared::error::{AppError, AppResult};

use super::plan::{PlanKind, PricingPlan};

/// 予約 1 件分の合計金額を計算する。
///
/// 週末割増は `weekend_surcharge` を百分率として扱い、1 円未満は四捨五入する。
/// 固定パッケージの場合 `duration_hours` は使わない。
/// 金額が `i64` に収まらない場合は `InvalidRequest` を返す。
pub fn compute_total(
    plan: &PricingPlan,
    duration_hours: i64,
    is_weekend: bool,
    pickup_at_studio: bool,
) -> AppResult<i64> {
    let delivery_fee = if pickup_at_studio { 0 } else { plan.delivery_fee };
    let subtotal = match &plan.kind {
        PlanKind::FixedSchedule(fixed) => fixed.base_price.checked_add(delivery_fee),
        PlanKind::Standard(rate) => match rate.package_price(duration_hours) {
            // 12h/24h パッケージ料金には配送料を含めない
            Some(package_price) => Some(package_price),
            None => {
                let effective_hours = duration_hours.max(rate.min_hours);
                effective_hours
                    .checked_sub(rate.min_hours)
                    .and_then(|additional_hours| additional_hours.checked_mul(rate.hourly_rate))
                    .and_then(|amount| amount.checked_add(rate.base_price))
                    .and_then(|amount| amount.checked_add(delivery_fee))
            }
        },
    };
    subtotal
        .and_then(|amount| apply_weekend_surcharge(amount, plan.weekend_surcharge, is_weekend))
        .ok_or_else(|| {
            AppError::InvalidRequest(format!(
                "total amount for pricing plan ({}) is out of range",
                plan.id
            ))
        })
}

fn apply_weekend_surcharge(amount: i64, surcharge_percent: i64, is_weekend: bool) -> Option<i64> {
    if !is_weekend {
        return Some(amount);
    }
    amount
        .checked_mul(surcharge_percent.checked_add(100)?)?
        .checked_add(50)
        .map(|scaled| scaled.div_euclid(100))
}

/// 12h/24h パッケージ料金を時間料金に対する割引率で比較したときの値
fn package_savings(plan: &PricingPlan, duration_hours: i64) -> Option<f64> {
    let PlanKind::Standard(rate) = &plan.kind else {
        return None;
    };
    let package_price = rate.package_price(duration_hours)?;
    if rate.hourly_rate <= 0 {
        return None;
    }
    let hourly_total = (rate.hourly_rate * duration_hours) as f64;
    Some(1.0 - package_price as f64 / hourly_total)
}

/// 指定時間に最も得なプランを選ぶ。
///
/// 12h/24h でパッケージ料金を持つプランがあれば割引率が最大のものを、
/// そうでなければ合計金額が最小のものを返す。同率なら先に現れたものを優先する。
pub fn recommend(
    plans: &[PricingPlan],
    duration_hours: i64,
    is_weekend: bool,
    pickup_at_studio: bool,
) -> Option<&PricingPlan> {
    if matches!(duration_hours, 12 | 24) {
        let mut best: Option<(&PricingPlan, f64)> = None;
        for plan in plans {
            let Some(savings) = package_savings(plan, duration_hours) else {
                continue;
            };
            if best.map_or(true, |(_, best_savings)| savings > best_savings) {
                best = Some((plan, savings));
            }
        }
        if let Some((plan, _)) = best {
            return Some(plan);
        }
    }

    let mut best: Option<(&PricingPlan, i64)> = None;
    for plan in plans {
        // 金額が範囲外になるプランは候補から外す
        let Ok(total) = compute_total(plan, duration_hours, is_weekend, pickup_at_studio) else {
            continue;
        };
        if best.map_or(true, |(_, best_total)| total < best_total) {
            best = Some((plan, total));
        }
    }
    best.map(|(plan, _)| plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{
        id::PlanId,
        plan::{FixedSchedule, StandardRate},
    };
    use chrono::NaiveTime;
    use proptest::prelude::*;

    fn standard_plan(name: &str, rate: StandardRate) -> PricingPlan {
        PricingPlan {
            id: PlanId::new(),
            name: name.into(),
            delivery_fee: 20_000,
            weekend_surcharge: 10,
            deposit_amount: 100_000,
            is_active: true,
            kind: PlanKind::Standard(rate),
        }
    }

    fn basic_rate() -> StandardRate {
        StandardRate {
            base_price: 50_000,
            hourly_rate: 10_000,
            min_hours: 3,
            package_12h_price: None,
            package_24h_price: None,
        }
    }

    #[test]
    fn weekday_pickup_charges_extra_hours_only() {
        let plan = standard_plan("regular", basic_rate());
        assert_eq!(compute_total(&plan, 5, false, true).unwrap(), 70_000);
    }

    #[test]
    fn weekend_delivery_applies_surcharge_to_delivery_fee_too() {
        let plan = standard_plan("regular", basic_rate());
        assert_eq!(compute_total(&plan, 3, true, false).unwrap(), 77_000);
    }

    #[test]
    fn short_bookings_are_billed_at_minimum_hours() {
        let plan = standard_plan("regular", basic_rate());
        assert_eq!(compute_total(&plan, 1, false, true).unwrap(), 50_000);
    }

    #[test]
    fn package_price_replaces_hourly_billing_and_delivery() {
        let plan = standard_plan(
            "bundle",
            StandardRate {
                package_12h_price: Some(120_000),
                package_24h_price: Some(200_000),
                ..basic_rate()
            },
        );
        assert_eq!(compute_total(&plan, 12, false, false).unwrap(), 120_000);
        assert_eq!(compute_total(&plan, 24, true, false).unwrap(), 220_000);
        // 13 時間はパッケージ対象外
        assert_eq!(compute_total(&plan, 13, false, true).unwrap(), 150_000);
    }

    #[test]
    fn fixed_package_ignores_duration() {
        let plan = PricingPlan {
            kind: PlanKind::FixedSchedule(FixedSchedule {
                base_price: 150_000,
                start_time: NaiveTime::from_hms_opt(17, 0, 0).unwrap(),
                end_time: NaiveTime::from_hms_opt(23, 0, 0).unwrap(),
            }),
            ..standard_plan("night", basic_rate())
        };
        assert_eq!(compute_total(&plan, 1, false, true).unwrap(), 150_000);
        assert_eq!(compute_total(&plan, 99, false, false).unwrap(), 170_000);
        assert_eq!(compute_total(&plan, 6, true, false).unwrap(), 187_000);
    }

    #[test]
    fn recommend_prefers_largest_package_discount() {
        let plans = vec![
            standard_plan(
                "small discount",
                StandardRate {
                    package_12h_price: Some(110_000),
                    ..basic_rate()
                },
            ),
            standard_plan(
                "big discount",
                StandardRate {
                    hourly_rate: 20_000,
                    package_12h_price: Some(120_000),
                    ..basic_rate()
                },
            ),
        ];
        let chosen = recommend(&plans, 12, false, false).unwrap();
        assert_eq!(chosen.name, "big discount");
    }

    #[test]
    fn recommend_falls_back_to_cheapest_total() {
        let plans = vec![
            standard_plan("pricey", StandardRate {
                base_price: 80_000,
                ..basic_rate()
            }),
            standard_plan("cheap", basic_rate()),
            standard_plan("cheap twin", basic_rate()),
        ];
        let chosen = recommend(&plans, 5, false, true).unwrap();
        assert_eq!(chosen.name, "cheap");
    }

    #[test]
    fn overflowing_total_is_an_error() {
        let plan = standard_plan("regular", basic_rate());
        assert!(matches!(
            compute_total(&plan, 1_000_000_000_000_000, false, true),
            Err(AppError::InvalidRequest(_))
        ));

        let mut pricey = standard_plan("pricey", basic_rate());
        pricey.delivery_fee = i64::MAX;
        assert!(compute_total(&pricey, 3, false, false).is_err());
        assert!(compute_total(&pricey, 3, false, true).is_ok());

        let weekend_only = standard_plan(
            "weekend only",
            StandardRate {
                base_price: i64::MAX / 2,
                ..basic_rate()
            },
        );
        assert!(compute_total(&weekend_only, 3, false, true).is_ok());
        assert!(compute_total(&weekend_only, 3, true, true).is_err());
    }

    #[test]
    fn recommend_skips_plans_whose_total_overflows() {
        let mut broken = standard_plan("broken", basic_rate());
        broken.delivery_fee = i64::MAX;
        let plans = vec![broken, standard_plan("regular", basic_rate())];
        let chosen = recommend(&plans, 3, false, false).unwrap();
        assert_eq!(chosen.name, "regular");
    }

    #[test]
    fn recommend_on_empty_catalog_is_none() {
        assert!(recommend(&[], 3, false, false).is_none());
    }

    proptest! {
        #[test]
        fn compute_total_is_deterministic(
            base in 0i64..1_000_000,
            hourly in 0i64..100_000,
            min_hours in 0i64..12,
            duration in 1i64..48,
            surcharge in 0i64..=100,
            is_weekend: bool,
            pickup: bool,
        ) {
            let mut plan = standard_plan("p", StandardRate {
                base_price: base,
                hourly_rate: hourly,
                min_hours,
                package_12h_price: None,
                package_24h_price: None,
            });
            plan.weekend_surcharge = surcharge;
            let first = compute_total(&plan, duration, is_weekend, pickup).unwrap();
            let second = compute_total(&plan.clone(), duration, is_weekend, pickup).unwrap();
            prop_assert_eq!(first, second);
            prop_assert!(first >= base);
        }
    }
}
