//! Event-log replay

use chrono::{DateTime, Days, Duration, NaiveDate, NaiveTime, TimeZone, Utc};
use crm_core::traits::Id;
use crm_models::work_time::{WorkTimeEvent, WorkTimeEventType};
use std::collections::BTreeMap;

use crate::summary::{DayBucket, WorkTimeSummary};

/// Reconstruct `user_id`'s worked time, bucketing days in UTC
///
/// `as_of` defaults to now. See [`compute_member_work_seconds_in`].
pub fn compute_member_work_seconds(
    user_id: Id,
    events: &[WorkTimeEvent],
    as_of: Option<DateTime<Utc>>,
) -> WorkTimeSummary {
    compute_member_work_seconds_in(user_id, events, as_of, &Utc)
}

/// Reconstruct `user_id`'s worked time, bucketing days in `tz`
///
/// `events` may hold several members' events in any order. Every closed
/// segment counts towards the total whatever `as_of` is; `as_of` (default
/// now) only bounds a segment still open at the end of the replay, whose
/// length is reported as `open_seconds` and never added to the total.
/// Instants are counted in whole seconds.
pub fn compute_member_work_seconds_in<Tz: TimeZone>(
    user_id: Id,
    events: &[WorkTimeEvent],
    as_of: Option<DateTime<Utc>>,
    tz: &Tz,
) -> WorkTimeSummary {
    let mut member_events: Vec<&WorkTimeEvent> = events
        .iter()
        .filter(|e| e.user_id == user_id)
        .collect();
    // Stable: same-instant events keep their log order
    member_events.sort_by_key(|e| e.occurred_at);

    let mut total_seconds = 0;
    let mut days: BTreeMap<NaiveDate, i64> = BTreeMap::new();
    let mut open: Option<DateTime<Utc>> = None;

    for event in member_events {
        match &event.event_type {
            WorkTimeEventType::Start | WorkTimeEventType::Resume => {
                open = Some(event.occurred_at);
            }
            WorkTimeEventType::Hold | WorkTimeEventType::End => {
                let Some(start) = open.take() else {
                    continue;
                };
                total_seconds += (event.occurred_at.timestamp() - start.timestamp()).max(0);
                attribute_to_days(start, event.occurred_at, tz, &mut days);

                if event.event_type == WorkTimeEventType::End {
                    break;
                }
            }
            WorkTimeEventType::Unknown(_) => {}
        }
    }

    let as_of = as_of.unwrap_or_else(Utc::now);
    WorkTimeSummary {
        total_seconds,
        running_since: open,
        open_seconds: open.map(|since| (as_of.timestamp() - since.timestamp()).max(0)),
        day_breakdown: days
            .into_iter()
            .map(|(date, seconds)| DayBucket { date, seconds })
            .collect(),
    }
}

/// Split `[start, end)` across the calendar days of `tz`
///
/// The start day is always visited, so an empty segment still leaves a
/// zero bucket. Later days are visited only if they begin before `end`.
fn attribute_to_days<Tz: TimeZone>(
    start: DateTime<Utc>,
    end: DateTime<Utc>,
    tz: &Tz,
    days: &mut BTreeMap<NaiveDate, i64>,
) {
    let start_s = start.timestamp();
    let end_s = end.timestamp().max(start_s);

    let mut date = start.with_timezone(tz).date_naive();
    let mut day_start = local_midnight(tz, date);
    let mut first = true;

    loop {
        if !first && day_start >= end_s {
            break;
        }
        let Some(next) = date.checked_add_days(Days::new(1)) else {
            break;
        };
        let day_end = local_midnight(tz, next);

        let overlap = (end_s.min(day_end) - start_s.max(day_start)).max(0);
        *days.entry(date).or_insert(0) += overlap;

        first = false;
        date = next;
        day_start = day_end;
    }
}

/// Epoch seconds of the first instant of `date` in `tz`
fn local_midnight<Tz: TimeZone>(tz: &Tz, date: NaiveDate) -> i64 {
    let midnight = date.and_time(NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        // Midnight skipped by a DST jump: the day starts an hour later
        .or_else(|| tz.from_local_datetime(&(midnight + Duration::hours(1))).earliest())
        .map(|dt| dt.timestamp())
        .unwrap_or_else(|| midnight.and_utc().timestamp())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::FixedOffset;
    use uuid::Uuid;

    fn at(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    fn ev(user: Id, kind: &str, when: DateTime<Utc>) -> WorkTimeEvent {
        WorkTimeEvent::new(user, WorkTimeEventType::from(kind), when)
    }

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_no_events() {
        let summary = compute_member_work_seconds(Uuid::new_v4(), &[], None);
        assert_eq!(summary, WorkTimeSummary::default());
        assert!(!summary.is_running());
    }

    #[test]
    fn test_single_day_segment() {
        let u = Uuid::new_v4();
        let events = vec![
            ev(u, "start", at(2024, 3, 4, 9, 0)),
            ev(u, "end", at(2024, 3, 4, 17, 0)),
        ];
        let summary = compute_member_work_seconds(u, &events, None);
        assert_eq!(summary.total_seconds, 28800);
        assert_eq!(
            summary.day_breakdown,
            vec![DayBucket { date: date(2024, 3, 4), seconds: 28800 }]
        );
        assert_eq!(summary.running_since, None);
    }

    #[test]
    fn test_segment_across_midnight() {
        let u = Uuid::new_v4();
        let events = vec![
            ev(u, "start", at(2024, 3, 4, 22, 0)),
            ev(u, "end", at(2024, 3, 5, 2, 0)),
        ];
        let summary = compute_member_work_seconds(u, &events, None);
        assert_eq!(summary.total_seconds, 14400);
        assert_eq!(summary.seconds_on(date(2024, 3, 4)), 7200);
        assert_eq!(summary.seconds_on(date(2024, 3, 5)), 7200);
        assert_eq!(summary.day_breakdown.len(), 2);
    }

    #[test]
    fn test_segment_spanning_three_days() {
        let u = Uuid::new_v4();
        let events = vec![
            ev(u, "start", at(2024, 3, 4, 12, 0)),
            ev(u, "hold", at(2024, 3, 6, 12, 0)),
        ];
        let summary = compute_member_work_seconds(u, &events, None);
        assert_eq!(summary.total_seconds, 2 * 86400);
        let seconds: Vec<i64> = summary.day_breakdown.iter().map(|b| b.seconds).collect();
        assert_eq!(seconds, vec![43200, 86400, 43200]);
    }

    #[test]
    fn test_segment_ending_at_midnight_stays_on_one_day() {
        let u = Uuid::new_v4();
        let events = vec![
            ev(u, "start", at(2024, 3, 4, 22, 0)),
            ev(u, "end", at(2024, 3, 5, 0, 0)),
        ];
        let summary = compute_member_work_seconds(u, &events, None);
        assert_eq!(
            summary.day_breakdown,
            vec![DayBucket { date: date(2024, 3, 4), seconds: 7200 }]
        );
    }

    #[test]
    fn test_open_segment_not_counted() {
        let u = Uuid::new_v4();
        let start = at(2024, 3, 4, 9, 0);
        let summary = compute_member_work_seconds(u, &[ev(u, "start", start)], None);
        assert_eq!(summary.total_seconds, 0);
        assert!(summary.day_breakdown.is_empty());
        assert_eq!(summary.running_since, Some(start));
        assert_eq!(summary.running_seconds(at(2024, 3, 4, 10, 0)), Some(3600));
        assert!(summary.open_seconds.is_some());
    }

    #[test]
    fn test_hold_resume_cycle() {
        let u = Uuid::new_v4();
        let events = vec![
            ev(u, "start", at(2024, 3, 4, 9, 0)),
            ev(u, "hold", at(2024, 3, 4, 12, 0)),
            ev(u, "resume", at(2024, 3, 4, 13, 0)),
            ev(u, "end", at(2024, 3, 4, 18, 0)),
        ];
        let summary = compute_member_work_seconds(u, &events, None);
        assert_eq!(summary.total_seconds, 8 * 3600);
        assert_eq!(summary.day_breakdown.len(), 1);
    }

    #[test]
    fn test_end_stops_replay() {
        let u = Uuid::new_v4();
        let events = vec![
            ev(u, "start", at(2024, 3, 4, 9, 0)),
            ev(u, "end", at(2024, 3, 4, 10, 0)),
            ev(u, "start", at(2024, 3, 4, 11, 0)),
            ev(u, "end", at(2024, 3, 4, 12, 0)),
        ];
        let summary = compute_member_work_seconds(u, &events, None);
        assert_eq!(summary.total_seconds, 3600);
        assert_eq!(summary.running_since, None);
    }

    #[test]
    fn test_end_without_open_segment_is_skipped() {
        let u = Uuid::new_v4();
        let events = vec![
            ev(u, "end", at(2024, 3, 4, 8, 0)),
            ev(u, "hold", at(2024, 3, 4, 8, 30)),
            ev(u, "start", at(2024, 3, 4, 9, 0)),
            ev(u, "hold", at(2024, 3, 4, 10, 0)),
        ];
        let summary = compute_member_work_seconds(u, &events, None);
        assert_eq!(summary.total_seconds, 3600);
    }

    #[test]
    fn test_restart_moves_marker() {
        let u = Uuid::new_v4();
        let events = vec![
            ev(u, "start", at(2024, 3, 4, 9, 0)),
            ev(u, "start", at(2024, 3, 4, 11, 0)),
            ev(u, "hold", at(2024, 3, 4, 12, 0)),
        ];
        let summary = compute_member_work_seconds(u, &events, None);
        assert_eq!(summary.total_seconds, 3600);
    }

    #[test]
    fn test_other_users_and_unknown_events_ignored() {
        let u = Uuid::new_v4();
        let other = Uuid::new_v4();
        let events = vec![
            ev(other, "start", at(2024, 3, 4, 6, 0)),
            ev(u, "start", at(2024, 3, 4, 9, 0)),
            ev(u, "break", at(2024, 3, 4, 9, 30)),
            ev(other, "end", at(2024, 3, 4, 23, 0)),
            ev(u, "hold", at(2024, 3, 4, 10, 0)),
        ];
        let summary = compute_member_work_seconds(u, &events, None);
        assert_eq!(summary.total_seconds, 3600);
    }

    #[test]
    fn test_unsorted_input_matches_sorted() {
        let u = Uuid::new_v4();
        let sorted = vec![
            ev(u, "start", at(2024, 3, 4, 9, 0)),
            ev(u, "hold", at(2024, 3, 4, 12, 0)),
            ev(u, "resume", at(2024, 3, 4, 13, 0)),
            ev(u, "end", at(2024, 3, 5, 1, 0)),
        ];
        let mut shuffled = sorted.clone();
        shuffled.reverse();
        shuffled.swap(0, 2);

        let a = compute_member_work_seconds(u, &sorted, None);
        let b = compute_member_work_seconds(u, &shuffled, None);
        assert_eq!(a, b);
        // No hidden state between runs
        assert_eq!(a, compute_member_work_seconds(u, &sorted, None));
    }

    #[test]
    fn test_closed_segments_count_regardless_of_as_of() {
        let u = Uuid::new_v4();
        let events = vec![
            ev(u, "start", at(2024, 3, 4, 9, 0)),
            ev(u, "end", at(2024, 3, 4, 17, 0)),
        ];
        let summary = compute_member_work_seconds(u, &events, Some(at(2024, 3, 4, 12, 0)));
        assert_eq!(summary.total_seconds, 28800);
        assert_eq!(summary.running_since, None);
        assert_eq!(summary.open_seconds, None);
        assert_eq!(
            summary.day_breakdown,
            vec![DayBucket { date: date(2024, 3, 4), seconds: 28800 }]
        );
        assert_eq!(summary, compute_member_work_seconds(u, &events, None));
    }

    #[test]
    fn test_as_of_bounds_open_segment() {
        let u = Uuid::new_v4();
        let events = vec![
            ev(u, "start", at(2024, 3, 4, 9, 0)),
            ev(u, "hold", at(2024, 3, 4, 12, 0)),
            ev(u, "resume", at(2024, 3, 4, 13, 0)),
        ];
        let summary = compute_member_work_seconds(u, &events, Some(at(2024, 3, 4, 14, 30)));
        assert_eq!(summary.total_seconds, 3 * 3600);
        assert_eq!(summary.running_since, Some(at(2024, 3, 4, 13, 0)));
        assert_eq!(summary.open_seconds, Some(5400));

        // An as_of before the open segment began clamps to zero
        let early = compute_member_work_seconds(u, &events, Some(at(2024, 3, 4, 8, 0)));
        assert_eq!(early.total_seconds, 3 * 3600);
        assert_eq!(early.open_seconds, Some(0));
    }

    #[test]
    fn test_zero_length_segment_leaves_zero_bucket() {
        let u = Uuid::new_v4();
        let t = at(2024, 3, 4, 9, 0);
        let events = vec![ev(u, "start", t), ev(u, "hold", t)];
        let summary = compute_member_work_seconds(u, &events, None);
        assert_eq!(summary.total_seconds, 0);
        assert_eq!(
            summary.day_breakdown,
            vec![DayBucket { date: date(2024, 3, 4), seconds: 0 }]
        );
    }

    #[test]
    fn test_fixed_offset_day_boundaries() {
        let u = Uuid::new_v4();
        let ist = FixedOffset::east_opt(5 * 3600 + 1800).unwrap();
        // 20:00Z to 23:00Z is 01:30 to 04:30 local on the next day
        let events = vec![
            ev(u, "start", at(2024, 3, 1, 20, 0)),
            ev(u, "end", at(2024, 3, 1, 23, 0)),
        ];

        let local = compute_member_work_seconds_in(u, &events, None, &ist);
        assert_eq!(
            local.day_breakdown,
            vec![DayBucket { date: date(2024, 3, 2), seconds: 10800 }]
        );

        let utc = compute_member_work_seconds(u, &events, None);
        assert_eq!(utc.seconds_on(date(2024, 3, 1)), 10800);
    }

    #[test]
    fn test_fixed_offset_split() {
        let u = Uuid::new_v4();
        let minus_five = FixedOffset::west_opt(5 * 3600).unwrap();
        // 03:00Z to 07:00Z is 22:00 to 02:00 local
        let events = vec![
            ev(u, "start", at(2024, 3, 5, 3, 0)),
            ev(u, "hold", at(2024, 3, 5, 7, 0)),
        ];
        let summary = compute_member_work_seconds_in(u, &events, None, &minus_five);
        assert_eq!(summary.seconds_on(date(2024, 3, 4)), 7200);
        assert_eq!(summary.seconds_on(date(2024, 3, 5)), 7200);
    }
}
