use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use serde::Serialize;

use super::reservation::{find_conflict, TimeWindow};

/// 予約を受け付ける時間帯。8 時台から 21 時台までの 1 時間枠（08:00–22:00）
pub const OPENING_HOUR: u32 = 8;
pub const LAST_SLOT_HOUR: u32 = 21;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlot {
    pub hour: u32,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub available: bool,
}

/// 指定日の 1 時間枠の一覧を作り、`busy` と重なる枠を埋まりとして返す。
///
/// `busy` には終了・キャンセル済みでない予約の枠だけを渡すこと。
/// 表示用の目安であり、予約作成時の重複チェックの代わりにはならない。
/// 夏時間の切り替えなどで存在しない時刻の枠は返さない。
pub fn slots_for<Tz: TimeZone>(date: NaiveDate, tz: &Tz, busy: &[TimeWindow]) -> Vec<TimeSlot> {
    (OPENING_HOUR..=LAST_SLOT_HOUR)
        .filter_map(|hour| {
            let local = date.and_hms_opt(hour, 0, 0)?;
            let start = tz.from_local_datetime(&local).earliest()?.with_timezone(&Utc);
            let window = TimeWindow {
                start,
                end: start + Duration::hours(1),
            };
            Some(TimeSlot {
                hour,
                start_time: window.start,
                end_time: window.end,
                available: find_conflict(busy, &window).is_none(),
            })
        })
        .collect()
}

/// `slots_for` が扱う一日分の範囲。該当日の予約を絞り込むのに使う
pub fn operating_window<Tz: TimeZone>(date: NaiveDate, tz: &Tz) -> Option<TimeWindow> {
    let open = tz
        .from_local_datetime(&date.and_hms_opt(OPENING_HOUR, 0, 0)?)
        .earliest()?
        .with_timezone(&Utc);
    let close = tz
        .from_local_datetime(&date.and_hms_opt(LAST_SLOT_HOUR, 0, 0)?)
        .earliest()?
        .with_timezone(&Utc)
        + Duration::hours(1);
    Some(TimeWindow {
        start: open,
        end: close,
    })
}
