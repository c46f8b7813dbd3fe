use chrono::{DateTime, Datelike, Duration, TimeZone, Utc, Weekday};
use serde::{Deserialize, Serialize};
use shared::error::{AppError, AppResult};
use strum::{AsRefStr, EnumString};

use super::{
    booking_code::BookingCode,
    id::{PlanId, ReservationId, StaffId, UnitId},
    unit::UnitStatus,
};

mod booking;
pub mod event;

pub use booking::{plan_booking, BookingPlan, PlanSelection};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "camelCase")]
pub enum ReservationStatus {
    Pending,
    Confirmed,
    InPreparation,
    InTransit,
    InUse,
    Returning,
    Completed,
    Cancelled,
}

impl ReservationStatus {
    /// 機材の時間枠を占有しなくなった状態か
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Completed | Self::Cancelled)
    }

    pub fn allowed_next(self) -> &'static [ReservationStatus] {
        use ReservationStatus::*;
        match self {
            Pending => &[Confirmed, Cancelled],
            Confirmed => &[InPreparation, Cancelled],
            InPreparation => &[InTransit, Cancelled],
            InTransit => &[InUse],
            InUse => &[Returning],
            Returning => &[Completed],
            Completed | Cancelled => &[],
        }
    }

    pub fn can_transition_to(self, next: ReservationStatus) -> bool {
        self.allowed_next().contains(&next)
    }

    pub fn ensure_transition_to(self, next: ReservationStatus) -> AppResult<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(AppError::InvalidTransition {
                from: self.as_ref().to_string(),
                to: next.as_ref().to_string(),
            })
        }
    }

    /// このステータスに変わったときの機材の物理状態
    pub fn unit_status_effect(self) -> Option<UnitStatus> {
        use ReservationStatus::*;
        match self {
            InPreparation => Some(UnitStatus::Maintenance),
            InTransit | Returning => Some(UnitStatus::InTransit),
            InUse => Some(UnitStatus::InUse),
            Completed | Cancelled => Some(UnitStatus::Available),
            Pending | Confirmed => None,
        }
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "camelCase")]
pub enum PaymentStatus {
    Pending,
    DownPayment,
    Paid,
    Cancelled,
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, EnumString, AsRefStr,
)]
#[strum(serialize_all = "snake_case")]
#[serde(rename_all = "camelCase")]
pub enum PaymentMethod {
    Cash,
    BankTransfer,
    Qris,
}

/// 配送先。スタジオ受け取りの場合は住所を持たない
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Delivery {
    Address(String),
    StudioPickup,
}

impl Delivery {
    pub fn is_pickup(&self) -> bool {
        matches!(self, Delivery::StudioPickup)
    }

    pub fn address(&self) -> Option<&str> {
        match self {
            Delivery::Address(address) => Some(address),
            Delivery::StudioPickup => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    pub name: String,
    pub phone: String,
    pub email: Option<String>,
}

/// 1 件の予約で借りられる最長の時間
pub const MAX_DURATION_HOURS: i64 = 24 * 7;

pub fn ensure_duration_hours(duration_hours: i64) -> AppResult<()> {
    if !(1..=MAX_DURATION_HOURS).contains(&duration_hours) {
        return Err(AppError::InvalidRequest(format!(
            "duration must be between 1 and {MAX_DURATION_HOURS} hours"
        )));
    }
    Ok(())
}

/// 半開区間 `[start, end)` の予約時間枠
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    pub fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> AppResult<Self> {
        if end <= start {
            return Err(AppError::InvalidRequest(
                "reservation must end after it starts".into(),
            ));
        }
        Ok(Self { start, end })
    }

    pub fn from_hours(start: DateTime<Utc>, duration_hours: i64) -> AppResult<Self> {
        ensure_duration_hours(duration_hours)?;
        let duration = Duration::try_hours(duration_hours)
            .ok_or_else(|| AppError::InvalidRequest("duration is out of range".into()))?;
        Self::from_duration(start, duration)
    }

    pub fn from_duration(start: DateTime<Utc>, duration: Duration) -> AppResult<Self> {
        let end = start
            .checked_add_signed(duration)
            .ok_or_else(|| AppError::InvalidRequest("reservation ends out of range".into()))?;
        Self::new(start, end)
    }

    /// 境界が接しているだけの枠同士は重ならない
    pub fn overlaps(&self, other: &TimeWindow) -> bool {
        self.start < other.end && self.end > other.start
    }
}

/// 既存の枠の中から `candidate` と重なる最初のものを返す
pub fn find_conflict<'a, I>(existing: I, candidate: &TimeWindow) -> Option<&'a TimeWindow>
where
    I: IntoIterator<Item = &'a TimeWindow>,
{
    existing.into_iter().find(|window| window.overlaps(candidate))
}

/// 予約開始日が土日かどうか。日付の判定は `tz` の暦で行う
pub fn is_weekend<Tz: TimeZone>(start: &DateTime<Tz>) -> bool {
    matches!(start.weekday(), Weekday::Sat | Weekday::Sun)
}

#[derive(Debug, Clone)]
pub struct Reservation {
    pub id: ReservationId,
    pub unit_id: UnitId,
    pub plan_id: Option<PlanId>,
    pub booking_code: BookingCode,
    pub customer: Customer,
    pub delivery: Delivery,
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

impl Reservation {
    pub fn window(&self) -> TimeWindow {
        TimeWindow {
            start: self.start_time,
            end: self.end_time,
        }
    }
}

/// 備考欄は追記のみ。既存の内容があれば改行で区切る
pub fn append_note(notes: &str, note: &str) -> String {
    let note = note.trim();
    if note.is_empty() {
        notes.to_string()
    } else if notes.is_empty() {
        note.to_string()
    } else {
        format!("{notes}\n{note}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use proptest::prelude::*;
    use ReservationStatus::*;

    const ALL: [ReservationStatus; 8] = [
        Pending,
        Confirmed,
        InPreparation,
        InTransit,
        InUse,
        Returning,
        Completed,
        Cancelled,
    ];

    fn at(s: &str) -> DateTime<Utc> {
        s.parse().unwrap()
    }

    #[test]
    fn happy_path_walks_the_whole_lifecycle() {
        let path = [
            Pending,
            Confirmed,
            InPreparation,
            InTransit,
            InUse,
            Returning,
            Completed,
        ];
        for pair in path.windows(2) {
            assert!(pair[0].ensure_transition_to(pair[1]).is_ok());
        }
    }

    #[test]
    fn cancellation_only_before_dispatch() {
        let cancellable: Vec<_> = ALL
            .into_iter()
            .filter(|s| s.can_transition_to(Cancelled))
            .collect();
        assert_eq!(cancellable, vec![Pending, Confirmed, InPreparation]);
    }

    #[test]
    fn completed_cannot_go_back_into_use() {
        let err = Completed.ensure_transition_to(InUse).unwrap_err();
        assert!(matches!(
            err,
            AppError::InvalidTransition { ref from, ref to } if from == "completed" && to == "in_use"
        ));
    }

    #[test]
    fn terminal_states_have_no_successor() {
        for from in [Completed, Cancelled] {
            assert!(ALL.into_iter().all(|to| !from.can_transition_to(to)));
        }
    }

    #[test]
    fn unit_side_effects_follow_the_table() {
        assert_eq!(InPreparation.unit_status_effect(), Some(UnitStatus::Maintenance));
        assert_eq!(InTransit.unit_status_effect(), Some(UnitStatus::InTransit));
        assert_eq!(InUse.unit_status_effect(), Some(UnitStatus::InUse));
        assert_eq!(Returning.unit_status_effect(), Some(UnitStatus::InTransit));
        assert_eq!(Completed.unit_status_effect(), Some(UnitStatus::Available));
        assert_eq!(Cancelled.unit_status_effect(), Some(UnitStatus::Available));
        assert_eq!(Confirmed.unit_status_effect(), None);
    }

    #[test]
    fn status_strings_round_trip() {
        for status in ALL {
            assert_eq!(status.as_ref().parse::<ReservationStatus>().ok(), Some(status));
        }
    }

    #[test]
    fn back_to_back_windows_do_not_overlap() {
        // 10:00 から 3 時間の予約に対して 12:00 開始は重なり、13:00 開始は重ならない
        let booked = TimeWindow::from_hours(at("2024-06-01T10:00:00Z"), 3).unwrap();
        let overlapping = TimeWindow::from_hours(at("2024-06-01T12:00:00Z"), 2).unwrap();
        let adjacent = TimeWindow::from_hours(at("2024-06-01T13:00:00Z"), 1).unwrap();
        assert!(find_conflict([&booked], &overlapping).is_some());
        assert!(find_conflict([&booked], &adjacent).is_none());
    }

    #[test]
    fn non_positive_duration_is_rejected() {
        assert!(TimeWindow::from_hours(at("2024-06-01T10:00:00Z"), 0).is_err());
        assert!(TimeWindow::from_hours(at("2024-06-01T10:00:00Z"), -2).is_err());
    }

    #[test]
    fn oversized_duration_is_rejected_instead_of_overflowing() {
        let start = at("2024-06-01T10:00:00Z");
        assert!(TimeWindow::from_hours(start, MAX_DURATION_HOURS).is_ok());
        assert!(matches!(
            TimeWindow::from_hours(start, MAX_DURATION_HOURS + 1),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            TimeWindow::from_hours(start, 10_000_000_000),
            Err(AppError::InvalidRequest(_))
        ));
        assert!(matches!(
            TimeWindow::from_duration(DateTime::<Utc>::MAX_UTC, Duration::hours(1)),
            Err(AppError::InvalidRequest(_))
        ));
    }

    #[test]
    fn weekend_is_judged_in_the_local_calendar() {
        // UTC では金曜 20:00 だが UTC+7 では土曜 03:00
        let start = at("2024-05-31T20:00:00Z");
        assert!(!is_weekend(&start));
        let jakarta = FixedOffset::east_opt(7 * 3600).unwrap();
        assert!(is_weekend(&start.with_timezone(&jakarta)));
    }

    #[test]
    fn notes_are_appended_line_by_line() {
        let notes = append_note("", "confirmed by phone");
        let notes = append_note(&notes, "  ");
        let notes = append_note(&notes, "courier left 14:05");
        assert_eq!(notes, "confirmed by phone\ncourier left 14:05");
    }

    proptest! {
        #[test]
        fn accepted_bookings_never_overlap(
            requests in proptest::collection::vec((0i64..24 * 14, 1i64..30), 1..60)
        ) {
            let origin = at("2024-06-01T00:00:00Z");
            let mut accepted: Vec<TimeWindow> = Vec::new();
            for (offset, hours) in requests {
                let candidate =
                    TimeWindow::from_hours(origin + Duration::hours(offset), hours).unwrap();
                if find_conflict(&accepted, &candidate).is_none() {
                    accepted.push(candidate);
                }
            }
            for (i, a) in accepted.iter().enumerate() {
                for b in &accepted[i + 1..] {
                    prop_assert!(!a.overlaps(b));
                }
            }
        }

        #[test]
        fn overlap_is_symmetric(
            a_start in 0i64..500, a_len in 1i64..48,
            b_start in 0i64..500, b_len in 1i64..48,
        ) {
            let origin = at("2024-06-01T00:00:00Z");
            let a = TimeWindow::from_hours(origin + Duration::hours(a_start), a_len).unwrap();
            let b = TimeWindow::from_hours(origin + Duration::hours(b_start), b_len).unwrap();
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }
    }
}
