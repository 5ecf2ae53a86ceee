//! Derived views over attempt history.
//!
//! Everything here is a pure function of the attempts passed in. Nothing is
//! cached and nothing is stored.

use crate::problem::PracticeAttempt;
use chrono::{DateTime, Days, Local, NaiveDate, TimeZone, Utc};
use std::collections::BTreeMap;

/// Ceiling used to normalise speeds for colouring.
pub const SPEED_CEILING_MS: f64 = 5000.0;

/// Percentage of correct attempts, 0 when there are none.
pub fn calculate_accuracy<'a, I>(attempts: I) -> f64
where
    I: IntoIterator<Item = &'a PracticeAttempt>,
{
    let (total, correct) = attempts
        .into_iter()
        .fold((0usize, 0usize), |(total, correct), a| {
            (total + 1, correct + usize::from(a.is_correct))
        });
    if total == 0 {
        return 0.0;
    }
    correct as f64 / total as f64 * 100.0
}

/// Mean answer time in milliseconds, 0 when there are none.
pub fn calculate_average_speed<'a, I>(attempts: I) -> f64
where
    I: IntoIterator<Item = &'a PracticeAttempt>,
{
    let (total, sum) = attempts
        .into_iter()
        .fold((0usize, 0u128), |(total, sum), a| {
            (total + 1, sum + u128::from(a.time_ms))
        });
    if total == 0 {
        return 0.0;
    }
    sum as f64 / total as f64
}

fn local_day<Tz: TimeZone>(attempt: &PracticeAttempt, tz: &Tz) -> Option<NaiveDate> {
    attempt
        .answered_at()
        .map(|utc| utc.with_timezone(tz).date_naive())
}

/// Groups attempts by the local calendar day they were answered on.
pub fn group_by_date(attempts: &[PracticeAttempt]) -> BTreeMap<NaiveDate, Vec<&PracticeAttempt>> {
    group_by_date_in(attempts, &Local)
}

pub fn group_by_date_in<'a, Tz: TimeZone>(
    attempts: &'a [PracticeAttempt],
    tz: &Tz,
) -> BTreeMap<NaiveDate, Vec<&'a PracticeAttempt>> {
    let mut grouped: BTreeMap<NaiveDate, Vec<&PracticeAttempt>> = BTreeMap::new();
    for attempt in attempts {
        if let Some(day) = local_day(attempt, tz) {
            grouped.entry(day).or_default().push(attempt);
        }
    }
    grouped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeatMapMetric {
    Accuracy,
    Speed,
}

impl HeatMapMetric {
    pub fn aggregate(self, attempts: &[&PracticeAttempt]) -> f64 {
        match self {
            HeatMapMetric::Accuracy => calculate_accuracy(attempts.iter().copied()),
            HeatMapMetric::Speed => calculate_average_speed(attempts.iter().copied()),
        }
    }

    pub fn tier(self, value: f64) -> ColorTier {
        match self {
            HeatMapMetric::Accuracy => ColorTier::for_accuracy(value),
            HeatMapMetric::Speed => ColorTier::for_speed(value),
        }
    }

    pub fn format(self, value: f64) -> String {
        match self {
            HeatMapMetric::Accuracy => format_accuracy(value),
            HeatMapMetric::Speed => format_speed(value),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeatMapCell {
    pub x: u32,
    pub y: u32,
    pub value: f64,
}

/// One cell per ordered factor pair seen, sorted by `(x, y)`. 3×7 and 7×3 are
/// separate cells.
pub fn generate_heat_map(attempts: &[PracticeAttempt], metric: HeatMapMetric) -> Vec<HeatMapCell> {
    let mut pairs: BTreeMap<(u32, u32), Vec<&PracticeAttempt>> = BTreeMap::new();
    for attempt in attempts {
        pairs
            .entry((attempt.first_number, attempt.second_number))
            .or_default()
            .push(attempt);
    }

    pairs
        .into_iter()
        .map(|((x, y), group)| HeatMapCell {
            x,
            y,
            value: metric.aggregate(&group),
        })
        .collect()
}

/// Dense square layout of heat map cells over `lo..=hi` on both axes.
/// Row is the first factor, column the second.
#[derive(Debug, Clone, PartialEq)]
pub struct HeatMapGrid {
    pub lo: u32,
    pub hi: u32,
    rows: Vec<Vec<Option<f64>>>,
}

impl HeatMapGrid {
    pub fn build(cells: &[HeatMapCell], lo: u32, hi: u32) -> Self {
        let size = if hi >= lo { (hi - lo + 1) as usize } else { 0 };
        let mut rows = vec![vec![None; size]; size];
        for cell in cells {
            if (lo..=hi).contains(&cell.x) && (lo..=hi).contains(&cell.y) {
                rows[(cell.x - lo) as usize][(cell.y - lo) as usize] = Some(cell.value);
            }
        }
        Self { lo, hi, rows }
    }

    pub fn factors(&self) -> impl Iterator<Item = u32> {
        self.lo..=self.hi
    }

    pub fn get(&self, x: u32, y: u32) -> Option<f64> {
        let row = x.checked_sub(self.lo)? as usize;
        let col = y.checked_sub(self.lo)? as usize;
        self.rows.get(row)?.get(col).copied().flatten()
    }

}

#[derive(Debug, Clone, PartialEq)]
pub struct ProgressPoint {
    pub day: NaiveDate,
    pub label: String,
    pub attempts: usize,
    pub accuracy: f64,
    pub speed: f64,
}

/// `day_count` points ending today, oldest first.
pub fn generate_progress_series(attempts: &[PracticeAttempt], day_count: usize) -> Vec<ProgressPoint> {
    progress_series_in(attempts, day_count, Local::now().date_naive(), &Local)
}

pub fn progress_series_in<Tz: TimeZone>(
    attempts: &[PracticeAttempt],
    day_count: usize,
    today: NaiveDate,
    tz: &Tz,
) -> Vec<ProgressPoint> {
    let grouped = group_by_date_in(attempts, tz);

    (0..day_count)
        .rev()
        .filter_map(|back| {
            let day = today.checked_sub_days(Days::new(back as u64))?;
            let label = match back {
                0 => "Today".to_string(),
                1 => "Yesterday".to_string(),
                _ => day.format("%-m/%-d/%Y").to_string(),
            };
            let day_attempts = grouped.get(&day).map(Vec::as_slice).unwrap_or_default();

            Some(ProgressPoint {
                day,
                label,
                attempts: day_attempts.len(),
                accuracy: calculate_accuracy(day_attempts.iter().copied()),
                speed: calculate_average_speed(day_attempts.iter().copied()),
            })
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProgressMetric {
    Accuracy,
    Speed,
    Attempts,
}

impl ProgressMetric {
    pub fn value(self, point: &ProgressPoint) -> f64 {
        match self {
            ProgressMetric::Accuracy => point.accuracy,
            ProgressMetric::Speed => point.speed,
            ProgressMetric::Attempts => point.attempts as f64,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            ProgressMetric::Accuracy => "Accuracy (%)",
            ProgressMetric::Speed => "Avg. Speed (ms)",
            ProgressMetric::Attempts => "Number of Attempts",
        }
    }

    pub fn max_over(self, points: &[ProgressPoint]) -> f64 {
        points
            .iter()
            .map(|p| self.value(p))
            .fold(0.0, f64::max)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorTier {
    High,
    Mid,
    Low,
}

impl ColorTier {
    pub fn for_accuracy(value: f64) -> Self {
        if value >= 90.0 {
            ColorTier::High
        } else if value >= 70.0 {
            ColorTier::Mid
        } else {
            ColorTier::Low
        }
    }

    /// Faster is better, so the normalised time is inverted before tiering.
    pub fn for_speed(ms: f64) -> Self {
        let normalized = (ms / SPEED_CEILING_MS).clamp(0.0, 1.0);
        let inverted = 1.0 - normalized;
        if inverted >= 0.7 {
            ColorTier::High
        } else if inverted >= 0.4 {
            ColorTier::Mid
        } else {
            ColorTier::Low
        }
    }

    pub fn rgb(self) -> [u8; 3] {
        match self {
            ColorTier::High => [0x10, 0xB9, 0x81],
            ColorTier::Mid => [0xFB, 0xBF, 0x24],
            ColorTier::Low => [0xEF, 0x44, 0x44],
        }
    }
}

pub fn accuracy_color(value: f64) -> ColorTier {
    ColorTier::for_accuracy(value)
}

pub fn speed_color(ms: f64) -> ColorTier {
    ColorTier::for_speed(ms)
}

pub fn format_accuracy(value: f64) -> String {
    format!("{}%", value.round())
}

pub fn format_speed(value: f64) -> String {
    format!("{}ms", value.round())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatsRange {
    Week,
    Month,
    AllTime,
}

impl StatsRange {
    pub const ALL: [StatsRange; 3] = [StatsRange::Week, StatsRange::Month, StatsRange::AllTime];

    pub fn days(self) -> i64 {
        match self {
            StatsRange::Week => 7,
            StatsRange::Month => 30,
            StatsRange::AllTime => 365,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            StatsRange::Week => "Last 7 days",
            StatsRange::Month => "Last 30 days",
            StatsRange::AllTime => "All time",
        }
    }
}

/// Attempts answered within `range` of `now`, order preserved.
pub fn filter_range(
    attempts: &[PracticeAttempt],
    range: StatsRange,
    now: DateTime<Utc>,
) -> Vec<PracticeAttempt> {
    let cutoff = (now - chrono::Duration::days(range.days())).timestamp_millis();
    attempts
        .iter()
        .filter(|a| a.timestamp >= cutoff)
        .cloned()
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatsSummary {
    pub total: usize,
    pub correct: usize,
    pub accuracy: f64,
    pub average_ms: f64,
}

impl StatsSummary {
    pub fn from_attempts(attempts: &[PracticeAttempt]) -> Self {
        Self {
            total: attempts.len(),
            correct: attempts.iter().filter(|a| a.is_correct).count(),
            accuracy: calculate_accuracy(attempts),
            average_ms: calculate_average_speed(attempts),
        }
    }
}
