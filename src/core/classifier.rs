// src/core/classifier.rs

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::core::models::{Bid, BidStatus, Timestamped};

const WEEKDAY_LABELS: [&str; 7] = ["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"];

/// Calendar day of a timestamp. Day boundaries are taken in UTC so the same
/// record lands in the same bucket regardless of the viewer's timezone.
pub fn day_key(timestamp: DateTime<Utc>) -> NaiveDate {
    timestamp.date_naive()
}

/// Day key of a record, `None` if it carries no creation timestamp.
pub fn record_day<R: Timestamped>(record: &R) -> Option<NaiveDate> {
    record.created_at().map(day_key)
}

/// Weekday of a record as 0=Sunday..6=Saturday.
pub fn weekday_index<R: Timestamped>(record: &R) -> Option<usize> {
    record
        .created_at()
        .map(|ts| ts.weekday().num_days_from_sunday() as usize)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BidOutcome {
    Won,
    NotWon,
    Rejected,
}

pub fn classify_bid(bid: &Bid) -> BidOutcome {
    match bid.status() {
        status if status.is_won() => BidOutcome::Won,
        BidStatus::Rejected => BidOutcome::Rejected,
        _ => BidOutcome::NotWon,
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WeekdayCount {
    pub index: usize,
    pub day: String,
    pub count: u64,
}

/// Count records per day of week, across the whole collection.
pub fn weekday_distribution<R: Timestamped>(records: &[R]) -> Vec<WeekdayCount> {
    let mut counts = [0u64; 7];
    for index in records.iter().filter_map(weekday_index) {
        counts[index] += 1;
    }
    WEEKDAY_LABELS
        .iter()
        .zip(counts)
        .enumerate()
        .map(|(index, (day, count))| WeekdayCount {
            index,
            day: day.to_string(),
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_day_key_uses_utc_boundaries() {
        let late = Utc.with_ymd_and_hms(2024, 3, 1, 23, 59, 59).unwrap();
        let early = Utc.with_ymd_and_hms(2024, 3, 2, 0, 0, 0).unwrap();
        assert_eq!(day_key(late), NaiveDate::from_ymd_opt(2024, 3, 1).unwrap());
        assert_eq!(day_key(early), NaiveDate::from_ymd_opt(2024, 3, 2).unwrap());
    }

    #[test]
    fn test_classify_bid_partitions() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let bid = |status| Bid::new("b", "t", Some(1.0), status, at);
        assert_eq!(classify_bid(&bid(BidStatus::Accepted)), BidOutcome::Won);
        assert_eq!(classify_bid(&bid(BidStatus::Completed)), BidOutcome::Won);
        assert_eq!(classify_bid(&bid(BidStatus::Rejected)), BidOutcome::Rejected);
        assert_eq!(classify_bid(&bid(BidStatus::Submitted)), BidOutcome::NotWon);
        assert_eq!(classify_bid(&bid(BidStatus::Other("withdrawn".into()))), BidOutcome::NotWon);
    }

    #[test]
    fn test_weekday_distribution_starts_on_sunday() {
        // 2024-03-03 was a Sunday, 2024-03-09 a Saturday.
        let sunday = Utc.with_ymd_and_hms(2024, 3, 3, 8, 0, 0).unwrap();
        let saturday = Utc.with_ymd_and_hms(2024, 3, 9, 8, 0, 0).unwrap();
        let bids = vec![
            Bid::new("b1", "t", None, BidStatus::Submitted, sunday),
            Bid::new("b2", "t", None, BidStatus::Submitted, sunday),
            Bid::new("b3", "t", None, BidStatus::Submitted, saturday),
        ];
        let dist = weekday_distribution(&bids);
        assert_eq!(dist.len(), 7);
        assert_eq!(dist[0].day, "Sun");
        assert_eq!(dist[0].count, 2);
        assert_eq!(dist[6].day, "Sat");
        assert_eq!(dist[6].count, 1);
        assert_eq!(dist.iter().map(|d| d.count).sum::<u64>(), 3);
    }
}
