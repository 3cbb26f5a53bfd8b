use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use regex::Regex;
use std::sync::OnceLock;

use crate::records::TransactionRecord;

fn time_of_day_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d{1,2}):(\d{2})(?::(\d{2}))?").expect("time of day regex"))
}

/// The sole authority for when a transaction occurred: `ngay` at midnight,
/// with `gio` overlaid when it parses as a time of day. Filtering and
/// statistics must go through this rather than comparing `ngay` directly,
/// since `ngay` alone discards the time of day.
pub fn compose_date_time(record: &TransactionRecord) -> Option<NaiveDateTime> {
    let date = record.ngay?;
    if let Some(gio) = record.gio.as_deref() {
        if let Some(caps) = time_of_day_re().captures(gio.trim()) {
            let hour = caps[1].parse::<u32>().ok();
            let minute = caps[2].parse::<u32>().ok();
            let second = caps
                .get(3)
                .and_then(|m| m.as_str().parse::<u32>().ok())
                .unwrap_or(0);
            if let (Some(hour), Some(minute)) = (hour, minute) {
                if let Some(time) = NaiveTime::from_hms_opt(hour, minute, second) {
                    return Some(date.and_time(time));
                }
            }
        }
    }
    Some(date.and_time(NaiveTime::MIN))
}

/// Inclusive on both bounds over composed timestamps. Missing bounds make
/// this a no-op; records without a composed timestamp can never be confirmed
/// in range and are excluded once a real range is active.
pub fn filter_by_date_time_range(
    records: &[TransactionRecord],
    start: Option<NaiveDateTime>,
    end: Option<NaiveDateTime>,
) -> Vec<TransactionRecord> {
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        _ => return records.to_vec(),
    };
    records
        .iter()
        .filter(|record| {
            compose_date_time(record)
                .map(|dt| dt >= start && dt <= end)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

/// Date-only variant comparing `ngay`; the datetime filter above remains the
/// canonical one.
pub fn filter_by_date_range(
    records: &[TransactionRecord],
    start: Option<NaiveDate>,
    end: Option<NaiveDate>,
) -> Vec<TransactionRecord> {
    let (start, end) = match (start, end) {
        (Some(start), Some(end)) => (start, end),
        _ => return records.to_vec(),
    };
    records
        .iter()
        .filter(|record| {
            record
                .ngay
                .map(|ngay| ngay >= start && ngay <= end)
                .unwrap_or(false)
        })
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_at(id: i64, ngay: Option<NaiveDate>, gio: Option<&str>) -> TransactionRecord {
        TransactionRecord {
            id,
            ngay,
            gio: gio.map(str::to_string),
            ..TransactionRecord::default()
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn gio_overlays_hours_and_minutes() {
        let record = record_at(1, Some(ymd(2024, 5, 1)), Some("14:05"));
        assert_eq!(
            compose_date_time(&record),
            Some(ymd(2024, 5, 1).and_hms_opt(14, 5, 0).unwrap())
        );
    }

    #[test]
    fn gio_seconds_are_honored_when_present() {
        let record = record_at(1, Some(ymd(2024, 5, 1)), Some("14:05:30"));
        assert_eq!(
            compose_date_time(&record),
            Some(ymd(2024, 5, 1).and_hms_opt(14, 5, 30).unwrap())
        );
    }

    #[test]
    fn missing_or_unparseable_gio_falls_back_to_midnight() {
        let record = record_at(1, Some(ymd(2024, 5, 1)), None);
        assert_eq!(
            compose_date_time(&record),
            Some(ymd(2024, 5, 1).and_hms_opt(0, 0, 0).unwrap())
        );
        let record = record_at(1, Some(ymd(2024, 5, 1)), Some("chiều"));
        assert_eq!(
            compose_date_time(&record),
            Some(ymd(2024, 5, 1).and_hms_opt(0, 0, 0).unwrap())
        );
    }

    #[test]
    fn missing_ngay_composes_to_nothing() {
        assert_eq!(compose_date_time(&record_at(1, None, Some("14:05"))), None);
    }

    #[test]
    fn absent_bounds_return_input_unchanged() {
        let records = vec![record_at(1, Some(ymd(2024, 5, 1)), None)];
        let out = filter_by_date_time_range(&records, None, None);
        assert_eq!(out, records);
        let out = filter_by_date_time_range(
            &records,
            Some(ymd(2024, 5, 1).and_hms_opt(0, 0, 0).unwrap()),
            None,
        );
        assert_eq!(out, records);
    }

    #[test]
    fn bounds_are_inclusive_and_unknown_times_are_excluded() {
        let records = vec![
            record_at(1, Some(ymd(2024, 5, 1)), Some("08:00")),
            record_at(2, Some(ymd(2024, 5, 1)), Some("12:00")),
            record_at(3, None, Some("09:00")),
        ];
        let start = ymd(2024, 5, 1).and_hms_opt(8, 0, 0).unwrap();
        let end = ymd(2024, 5, 1).and_hms_opt(12, 0, 0).unwrap();
        let out = filter_by_date_time_range(&records, Some(start), Some(end));
        assert_eq!(out.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1, 2]);
    }

    #[test]
    fn filtering_twice_with_same_bounds_is_idempotent() {
        let records = vec![
            record_at(1, Some(ymd(2024, 5, 1)), Some("08:00")),
            record_at(2, Some(ymd(2024, 5, 2)), Some("08:00")),
        ];
        let start = ymd(2024, 5, 1).and_hms_opt(0, 0, 0).unwrap();
        let end = ymd(2024, 5, 1).and_hms_opt(23, 59, 59).unwrap();
        let once = filter_by_date_time_range(&records, Some(start), Some(end));
        let twice = filter_by_date_time_range(&once, Some(start), Some(end));
        assert_eq!(once, twice);
    }

    #[test]
    fn equal_bounds_match_only_that_instant() {
        let records = vec![
            record_at(1, Some(ymd(2024, 5, 1)), Some("14:05")),
            record_at(2, Some(ymd(2024, 5, 1)), Some("14:05:01")),
        ];
        let instant = ymd(2024, 5, 1).and_hms_opt(14, 5, 0).unwrap();
        let out = filter_by_date_time_range(&records, Some(instant), Some(instant));
        assert_eq!(out.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
    }

    #[test]
    fn date_only_filter_compares_ngay() {
        let records = vec![
            record_at(1, Some(ymd(2024, 5, 1)), None),
            record_at(2, Some(ymd(2024, 5, 3)), None),
            record_at(3, None, None),
        ];
        let out = filter_by_date_range(&records, Some(ymd(2024, 5, 1)), Some(ymd(2024, 5, 2)));
        assert_eq!(out.iter().map(|r| r.id).collect::<Vec<_>>(), vec![1]);
    }
}
