use std::collections::{BTreeMap, HashSet};

use chrono::{Datelike, Duration, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::records::TransactionRecord;
use crate::timeline::compose_date_time;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TimeRange {
    pub earliest: NaiveDateTime,
    pub latest: NaiveDateTime,
}

/// Derived summary over a record set. Recomputed on demand, never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionStatistics {
    pub total_transactions: usize,
    pub total_amount: f64,
    pub total_quantity: f64,
    pub average_amount: f64,
    pub average_quantity: f64,
    pub unique_stations: usize,
    pub unique_products: usize,
    pub time_range: Option<TimeRange>,
}

pub fn calculate_total_amount(records: &[TransactionRecord]) -> f64 {
    records.iter().map(|record| record.thanh_tien).sum()
}

fn distinct_non_empty<'a, I>(values: I) -> usize
where
    I: Iterator<Item = Option<&'a str>>,
{
    values
        .flatten()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .collect::<HashSet<_>>()
        .len()
}

pub fn calculate_statistics(records: &[TransactionRecord]) -> TransactionStatistics {
    if records.is_empty() {
        return TransactionStatistics::default();
    }

    let total_amount = calculate_total_amount(records);
    let total_quantity: f64 = records.iter().map(|record| record.so_luong).sum();
    let count = records.len();

    let unique_stations = distinct_non_empty(records.iter().map(|r| r.tram.as_deref()));
    let unique_products = distinct_non_empty(records.iter().map(|r| r.mat_hang.as_deref()));

    let mut date_times: Vec<NaiveDateTime> =
        records.iter().filter_map(compose_date_time).collect();
    date_times.sort();
    let time_range = match (date_times.first(), date_times.last()) {
        (Some(earliest), Some(latest)) => Some(TimeRange {
            earliest: *earliest,
            latest: *latest,
        }),
        _ => None,
    };

    TransactionStatistics {
        total_transactions: count,
        total_amount,
        total_quantity,
        average_amount: total_amount / count as f64,
        average_quantity: total_quantity / count as f64,
        unique_stations,
        unique_products,
        time_range,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Period {
    Hour,
    Day,
    Week,
    Month,
}

impl Period {
    fn bucket_key(self, dt: NaiveDateTime) -> String {
        match self {
            Period::Hour => dt.format("%Y-%m-%d %H:00").to_string(),
            Period::Day => dt.format("%Y-%m-%d").to_string(),
            Period::Week => {
                // Buckets start on Monday.
                let monday =
                    dt.date() - Duration::days(dt.date().weekday().num_days_from_monday() as i64);
                monday.format("%Y-%m-%d").to_string()
            }
            Period::Month => dt.format("%Y-%m").to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PeriodGroup {
    pub records: Vec<TransactionRecord>,
    pub statistics: TransactionStatistics,
}

/// Bucket records by composed timestamp truncated to the period, each bucket
/// carrying its own summary. Records with no composed timestamp fall in no
/// bucket.
pub fn group_by_period(
    records: &[TransactionRecord],
    period: Period,
) -> BTreeMap<String, PeriodGroup> {
    let mut buckets: BTreeMap<String, Vec<TransactionRecord>> = BTreeMap::new();
    for record in records {
        if let Some(dt) = compose_date_time(record) {
            buckets
                .entry(period.bucket_key(dt))
                .or_default()
                .push(record.clone());
        }
    }
    buckets
        .into_iter()
        .map(|(key, records)| {
            let statistics = calculate_statistics(&records);
            (key, PeriodGroup { records, statistics })
        })
        .collect()
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HourlyBucket {
    pub hour: u32,
    pub count: usize,
    pub total_amount: f64,
    pub records: Vec<TransactionRecord>,
}

/// Fixed 24-slot distribution of records over the hours of the day.
pub fn hourly_distribution(records: &[TransactionRecord]) -> Vec<HourlyBucket> {
    let mut buckets: Vec<HourlyBucket> = (0..24)
        .map(|hour| HourlyBucket {
            hour,
            count: 0,
            total_amount: 0.0,
            records: Vec::new(),
        })
        .collect();
    for record in records {
        if let Some(dt) = compose_date_time(record) {
            let bucket = &mut buckets[dt.hour() as usize];
            bucket.count += 1;
            bucket.total_amount += record.thanh_tien;
            bucket.records.push(record.clone());
        }
    }
    buckets
}
