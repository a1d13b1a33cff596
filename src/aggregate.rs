//! Time-bucketed aggregation over dashboard records
//!
//! Everything here is a pure function of (records, granularity, reference
//! instant). Callers pass `Local::now().naive_local()` as the reference
//! instant; tests pass a fixed one. Records with a missing or unparseable
//! timestamp are skipped and reported in the excluded counts, never as an
//! error.

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Timelike};
use serde::Serialize;

use crate::models::{ClientRecord, ConversionRecord, InteractionRecord, TimeFilter, Timestamped};

/// Label axis for the year view, as rendered by the dashboard.
const MONTH_LABELS: [&str; 12] = [
    "Jan", "Fev", "Mar", "Abr", "Mai", "Jun", "Jul", "Ago", "Set", "Out", "Nov", "Dez",
];

/// Parallel bucketed count series sharing one label axis.
#[derive(Debug, Clone, Serialize)]
pub struct BucketedSeries {
    pub granularity: TimeFilter,
    pub labels: Vec<String>,
    pub clients: Vec<u32>,
    pub interactions: Vec<u32>,
    pub conversions: Vec<u32>,
    pub excluded: ExcludedCounts,
}

/// Records dropped from time-based views because their timestamp was
/// missing or unparseable.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExcludedCounts {
    pub clients: usize,
    pub interactions: usize,
    pub conversions: usize,
}

impl ExcludedCounts {
    pub fn total(&self) -> usize {
        self.clients + self.interactions + self.conversions
    }
}

/// Per-type counts for one period.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PeriodCounts {
    pub clients: u32,
    pub interactions: u32,
    pub conversions: u32,
}

fn days_in_month(year: i32, month: u32) -> u32 {
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    next_month
        .and_then(|d| d.pred_opt())
        .map(|d| d.day())
        .unwrap_or(30)
}

/// Number of buckets for a granularity at the reference instant.
pub fn bucket_count(filter: TimeFilter, now: NaiveDateTime) -> usize {
    match filter {
        TimeFilter::Day => 24,
        TimeFilter::Month => days_in_month(now.year(), now.month()) as usize,
        TimeFilter::Year => 12,
    }
}

/// Labels for the bucket axis at the reference instant.
pub fn bucket_labels(filter: TimeFilter, now: NaiveDateTime) -> Vec<String> {
    match filter {
        TimeFilter::Year => MONTH_LABELS.iter().map(|m| m.to_string()).collect(),
        TimeFilter::Month => (1..=days_in_month(now.year(), now.month()))
            .map(|day| day.to_string())
            .collect(),
        TimeFilter::Day => (0..24).map(|hour| format!("{}h", hour)).collect(),
    }
}

/// Zero-based bucket index for a timestamp, or `None` when the timestamp
/// falls outside the current period.
pub fn bucket_index(filter: TimeFilter, ts: NaiveDateTime, now: NaiveDateTime) -> Option<usize> {
    match filter {
        TimeFilter::Year => (ts.year() == now.year()).then(|| ts.month0() as usize),
        TimeFilter::Month => (ts.year() == now.year() && ts.month() == now.month())
            .then(|| (ts.day() - 1) as usize),
        TimeFilter::Day => (ts.date() == now.date()).then(|| ts.hour() as usize),
    }
}

/// Whether a timestamp falls in the current year/month/day.
pub fn in_current_period(filter: TimeFilter, ts: NaiveDateTime, now: NaiveDateTime) -> bool {
    bucket_index(filter, ts, now).is_some()
}

fn bucket_records<'a, T, I>(records: I, filter: TimeFilter, now: NaiveDateTime) -> (Vec<u32>, usize)
where
    T: Timestamped + 'a,
    I: IntoIterator<Item = &'a T>,
{
    let mut buckets = vec![0u32; bucket_count(filter, now)];
    let mut excluded = 0usize;

    for record in records {
        match record.created_at() {
            Some(ts) => {
                if let Some(index) = bucket_index(filter, ts, now) {
                    buckets[index] += 1;
                }
            }
            None => excluded += 1,
        }
    }

    (buckets, excluded)
}

/// Bucket the three record types independently on a shared label axis.
/// With `completed_only`, clients are pre-filtered to completed
/// registrations; interactions and conversions never are.
pub fn compute_series(
    clients: &[ClientRecord],
    interactions: &[InteractionRecord],
    conversions: &[ConversionRecord],
    filter: TimeFilter,
    completed_only: bool,
    now: NaiveDateTime,
) -> BucketedSeries {
    let (client_buckets, excluded_clients) = if completed_only {
        bucket_records(clients.iter().filter(|c| c.completed()), filter, now)
    } else {
        bucket_records(clients.iter(), filter, now)
    };
    let (interaction_buckets, excluded_interactions) =
        bucket_records(interactions.iter(), filter, now);
    let (conversion_buckets, excluded_conversions) =
        bucket_records(conversions.iter(), filter, now);

    BucketedSeries {
        granularity: filter,
        labels: bucket_labels(filter, now),
        clients: client_buckets,
        interactions: interaction_buckets,
        conversions: conversion_buckets,
        excluded: ExcludedCounts {
            clients: excluded_clients,
            interactions: excluded_interactions,
            conversions: excluded_conversions,
        },
    }
}

fn count_in_current_period<'a, T, I>(records: I, filter: TimeFilter, now: NaiveDateTime) -> u32
where
    T: Timestamped + 'a,
    I: IntoIterator<Item = &'a T>,
{
    records
        .into_iter()
        .filter(|r| {
            r.created_at()
                .map_or(false, |ts| in_current_period(filter, ts, now))
        })
        .count() as u32
}

/// Counts of records falling in the current year/month/day.
pub fn current_period_counts(
    clients: &[ClientRecord],
    interactions: &[InteractionRecord],
    conversions: &[ConversionRecord],
    filter: TimeFilter,
    completed_only: bool,
    now: NaiveDateTime,
) -> PeriodCounts {
    let client_count = if completed_only {
        count_in_current_period(clients.iter().filter(|c| c.completed()), filter, now)
    } else {
        count_in_current_period(clients.iter(), filter, now)
    };

    PeriodCounts {
        clients: client_count,
        interactions: count_in_current_period(interactions.iter(), filter, now),
        conversions: count_in_current_period(conversions.iter(), filter, now),
    }
}

/// Inclusive boundaries of the period immediately preceding the current
/// one: previous calendar year, previous calendar month (rolling into the
/// previous year in January), or yesterday.
pub fn previous_period_bounds(
    filter: TimeFilter,
    now: NaiveDateTime,
) -> (NaiveDateTime, NaiveDateTime) {
    match filter {
        TimeFilter::Year => {
            let year = now.year() - 1;
            (ymd_hms(year, 1, 1, 0, 0, 0), ymd_hms(year, 12, 31, 23, 59, 59))
        }
        TimeFilter::Month => {
            let (year, month) = if now.month() == 1 {
                (now.year() - 1, 12)
            } else {
                (now.year(), now.month() - 1)
            };
            (
                ymd_hms(year, month, 1, 0, 0, 0),
                ymd_hms(year, month, days_in_month(year, month), 23, 59, 59),
            )
        }
        TimeFilter::Day => {
            let yesterday = now.date() - Duration::days(1);
            (
                yesterday.and_hms_opt(0, 0, 0).unwrap_or(NaiveDateTime::MIN),
                yesterday.and_hms_opt(23, 59, 59).unwrap_or(NaiveDateTime::MIN),
            )
        }
    }
}

fn ymd_hms(year: i32, month: u32, day: u32, hour: u32, min: u32, sec: u32) -> NaiveDateTime {
    NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|d| d.and_hms_opt(hour, min, sec))
        .unwrap_or(NaiveDateTime::MIN)
}

fn count_in_range<'a, T, I>(records: I, start: NaiveDateTime, end: NaiveDateTime) -> u32
where
    T: Timestamped + 'a,
    I: IntoIterator<Item = &'a T>,
{
    records
        .into_iter()
        .filter(|r| r.created_at().map_or(false, |ts| ts >= start && ts <= end))
        .count() as u32
}

/// Counts of records falling in the previous period, with the same
/// completion filter applied to clients as the current-period counts.
pub fn previous_period_counts(
    clients: &[ClientRecord],
    interactions: &[InteractionRecord],
    conversions: &[ConversionRecord],
    filter: TimeFilter,
    completed_only: bool,
    now: NaiveDateTime,
) -> PeriodCounts {
    let (start, end) = previous_period_bounds(filter, now);

    let client_count = if completed_only {
        count_in_range(clients.iter().filter(|c| c.completed()), start, end)
    } else {
        count_in_range(clients.iter(), start, end)
    };

    PeriodCounts {
        clients: client_count,
        interactions: count_in_range(interactions.iter(), start, end),
        conversions: count_in_range(conversions.iter(), start, end),
    }
}

/// Percentage change between periods. Zero when the previous count is
/// zero; "previous had zero, now has some" reports as no-change.
pub fn percent_change(current: u32, previous: u32) -> f64 {
    if previous == 0 {
        return 0.0;
    }
    (current as f64 - previous as f64) / previous as f64 * 100.0
}
