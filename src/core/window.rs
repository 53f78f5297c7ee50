// src/core/window.rs

use chrono::{Duration, NaiveDate};
use log::warn;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Lookback period of a time series. Only three ranges are offered by the
/// time-range selector; anything else falls back to the widest one.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u32", from = "u32")]
pub enum TimeWindow {
    FourDays,
    Week,
    Quarter,
}

impl TimeWindow {
    pub const SUPPORTED: [TimeWindow; 3] = [TimeWindow::FourDays, TimeWindow::Week, TimeWindow::Quarter];

    pub fn days(&self) -> u32 {
        match self {
            TimeWindow::FourDays => 4,
            TimeWindow::Week => 7,
            TimeWindow::Quarter => 90,
        }
    }

    /// Map a day count to a window. Unsupported counts fall back to
    /// [`TimeWindow::Quarter`].
    pub fn from_days(days: u32) -> Self {
        match days {
            4 => TimeWindow::FourDays,
            7 => TimeWindow::Week,
            90 => TimeWindow::Quarter,
            other => {
                warn!("Unsupported window of {} days, falling back to 90 days", other);
                TimeWindow::Quarter
            }
        }
    }

    /// Parse a selector value such as `"7"`, `"7d"` or `"week"`.
    pub fn parse(selector: &str) -> Self {
        let selector = selector.trim().to_lowercase();
        match selector.as_str() {
            "4" | "4d" => TimeWindow::FourDays,
            "7" | "7d" | "week" => TimeWindow::Week,
            "90" | "90d" | "quarter" => TimeWindow::Quarter,
            other => {
                let days = other.trim_end_matches('d').parse::<u32>().unwrap_or(0);
                if days == 0 {
                    warn!("Unrecognized window selector '{}', falling back to 90 days", other);
                    TimeWindow::Quarter
                } else {
                    Self::from_days(days)
                }
            }
        }
    }

    /// First day covered by the window ending on `end`.
    pub fn start(&self, end: NaiveDate) -> NaiveDate {
        end - Duration::days(self.days() as i64)
    }

    pub fn contains(&self, end: NaiveDate, day: NaiveDate) -> bool {
        day >= self.start(end) && day <= end
    }
}

impl Default for TimeWindow {
    fn default() -> Self {
        TimeWindow::Quarter
    }
}

impl From<TimeWindow> for u32 {
    fn from(window: TimeWindow) -> Self {
        window.days()
    }
}

impl From<u32> for TimeWindow {
    fn from(days: u32) -> Self {
        TimeWindow::from_days(days)
    }
}

impl fmt::Display for TimeWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}d", self.days())
    }
}

/// Ascending day keys from `end - window` to `end`, inclusive.
pub fn day_keys(window: TimeWindow, end: NaiveDate) -> Vec<NaiveDate> {
    let start = window.start(end);
    start.iter_days().take(window.days() as usize + 1).collect()
}

/// Zero-filled skeleton with one accumulator per day of the window.
pub fn empty_buckets<A: Default>(window: TimeWindow, end: NaiveDate) -> BTreeMap<NaiveDate, A> {
    day_keys(window, end)
        .into_iter()
        .map(|day| (day, A::default()))
        .collect()
}

/// Fold `records` into per-day accumulators.
///
/// `classify` maps a record to its day key; records without a key, or whose
/// key falls outside the window, are skipped. `fold` adds one record to the
/// accumulator of its day.
pub fn bucket_by_day<'a, R, A, C, F>(
    records: &'a [R],
    window: TimeWindow,
    end: NaiveDate,
    classify: C,
    mut fold: F,
) -> BTreeMap<NaiveDate, A>
where
    A: Default,
    C: Fn(&R) -> Option<NaiveDate>,
    F: FnMut(&mut A, &'a R),
{
    let mut buckets = empty_buckets(window, end);
    for record in records {
        if let Some(bucket) = classify(record).and_then(|day| buckets.get_mut(&day)) {
            fold(bucket, record);
        }
    }
    buckets
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_day_keys_are_contiguous_for_every_window() {
        let end = date(2024, 3, 2);
        for window in TimeWindow::SUPPORTED {
            let keys = day_keys(window, end);
            assert_eq!(keys.len(), window.days() as usize + 1);
            assert_eq!(keys.first(), Some(&window.start(end)));
            assert_eq!(keys.last(), Some(&end));
            for pair in keys.windows(2) {
                assert_eq!(pair[1] - pair[0], Duration::days(1));
            }
        }
    }

    #[test]
    fn test_day_keys_cross_month_and_leap_day() {
        let keys = day_keys(TimeWindow::FourDays, date(2024, 3, 2));
        let rendered: Vec<String> = keys.iter().map(|d| d.format("%Y-%m-%d").to_string()).collect();
        assert_eq!(rendered, vec!["2024-02-27", "2024-02-28", "2024-02-29", "2024-03-01", "2024-03-02"]);
        let mut sorted = rendered.clone();
        sorted.sort();
        assert_eq!(sorted, rendered);
    }

    #[test]
    fn test_unsupported_window_falls_back_to_quarter() {
        assert_eq!(TimeWindow::from_days(30), TimeWindow::Quarter);
        assert_eq!(TimeWindow::from_days(0), TimeWindow::Quarter);
        assert_eq!(TimeWindow::parse("month"), TimeWindow::Quarter);
        assert_eq!(TimeWindow::parse("14d"), TimeWindow::Quarter);
    }

    #[test]
    fn test_parse_selectors() {
        assert_eq!(TimeWindow::parse("4d"), TimeWindow::FourDays);
        assert_eq!(TimeWindow::parse(" 7 "), TimeWindow::Week);
        assert_eq!(TimeWindow::parse("Week"), TimeWindow::Week);
        assert_eq!(TimeWindow::parse("90"), TimeWindow::Quarter);
    }

    #[test]
    fn test_bucket_by_day_drops_out_of_window_records() {
        let end = date(2024, 3, 10);
        let records = vec![date(2024, 3, 10), date(2024, 3, 3), date(2024, 3, 2), date(2024, 4, 1)];
        let buckets: BTreeMap<NaiveDate, u32> =
            bucket_by_day(&records, TimeWindow::Week, end, |d| Some(*d), |count, _| *count += 1);

        assert_eq!(buckets.len(), 8);
        assert_eq!(buckets[&date(2024, 3, 10)], 1);
        assert_eq!(buckets[&date(2024, 3, 3)], 1);
        assert!(!buckets.contains_key(&date(2024, 3, 2)));
        assert_eq!(buckets.values().sum::<u32>(), 2);
    }

    #[test]
    fn test_bucket_by_day_skips_unclassified_records() {
        let end = date(2024, 3, 10);
        let records: Vec<Option<NaiveDate>> = vec![None, Some(end)];
        let buckets: BTreeMap<NaiveDate, u32> =
            bucket_by_day(&records, TimeWindow::FourDays, end, |d| *d, |count, _| *count += 1);
        assert_eq!(buckets.values().sum::<u32>(), 1);
    }
}
