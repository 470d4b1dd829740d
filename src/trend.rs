//! Least-squares trend, median and mode over a stat's entries.
//!
//! The time axis is measured in fractional days from the first entry in
//! input order, so callers are expected to hand entries over sorted by date.
//! Nothing here fails: empty input yields the all-zero [`TrendResult`].

use crate::models::StatItem;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MILLIS_PER_DAY: f64 = 86_400_000.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrendPoint {
    #[serde(flatten)]
    pub item: StatItem,
    /// Days elapsed since the first entry.
    pub x: f64,
    pub y: f64,
    pub trend: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendResult {
    pub slope: f64,
    pub intercept: f64,
    pub median: f64,
    pub avg_mode: f64,
    pub modes: Vec<f64>,
    pub data: Vec<TrendPoint>,
}

pub fn compute_trend(entries: &[StatItem]) -> TrendResult {
    let Some(first) = entries.first() else {
        return TrendResult::default();
    };

    let origin = first.date_of_entry;
    let xs: Vec<f64> = entries
        .iter()
        .map(|entry| elapsed_days(origin, entry.date_of_entry))
        .collect();
    let ys: Vec<f64> = entries.iter().map(|entry| entry.numeric_value).collect();

    let (slope, intercept) = least_squares(&xs, &ys);

    let data = entries
        .iter()
        .zip(xs.iter().zip(ys.iter()))
        .map(|(entry, (&x, &y))| TrendPoint {
            item: entry.clone(),
            x,
            y,
            trend: round2(slope * x + intercept),
        })
        .collect();

    let mut sorted = ys;
    sorted.sort_by(f64::total_cmp);
    let modes = most_frequent(&sorted);

    TrendResult {
        slope: round2(slope),
        intercept: round2(intercept),
        median: round2(median(&sorted)),
        avg_mode: round2(positive_mean(&modes)),
        modes,
        data,
    }
}

fn elapsed_days(origin: DateTime<Utc>, at: DateTime<Utc>) -> f64 {
    (at - origin).num_milliseconds() as f64 / MILLIS_PER_DAY
}

/// Returns `(slope, intercept)`; a flat line through the mean when every
/// x is the same.
fn least_squares(xs: &[f64], ys: &[f64]) -> (f64, f64) {
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;

    let mut num = 0.0;
    let mut den = 0.0;
    for (&x, &y) in xs.iter().zip(ys) {
        num += (x - mean_x) * (y - mean_y);
        den += (x - mean_x) * (x - mean_x);
    }

    let slope = if den == 0.0 { 0.0 } else { num / den };
    (slope, mean_y - slope * mean_x)
}

/// `sorted` must be ascending and non-empty.
fn median(sorted: &[f64]) -> f64 {
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

fn most_frequent(sorted: &[f64]) -> Vec<f64> {
    let mut runs: Vec<(f64, usize)> = Vec::new();
    for &value in sorted {
        match runs.last_mut() {
            Some((last, count)) if *last == value => *count += 1,
            _ => runs.push((if value == 0.0 { 0.0 } else { value }, 1)),
        }
    }

    let max = runs.iter().map(|(_, count)| *count).max().unwrap_or(0);
    runs.into_iter()
        .filter(|(_, count)| *count == max)
        .map(|(value, _)| value)
        .collect()
}

fn positive_mean(values: &[f64]) -> f64 {
    let (sum, count) = values
        .iter()
        .filter(|value| **value > 0.0)
        .fold((0.0, 0usize), |(sum, count), value| (sum + value, count + 1));
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Rounds half away from zero to two decimals; never returns `-0.0`.
/// Magnitudes too large to scale are already whole and come back as-is.
pub fn round2(value: f64) -> f64 {
    let scaled = value * 100.0;
    if !scaled.is_finite() {
        return value;
    }
    let rounded = scaled.round() / 100.0;
    if rounded == 0.0 { 0.0 } else { rounded }
}
