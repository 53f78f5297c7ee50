// src/core/aggregator.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::core::classifier::{classify_bid, record_day, BidOutcome};
use crate::core::models::{Bid, BidStatus, Tender};
use crate::core::window::{bucket_by_day, TimeWindow};

/// Activity recorded on a single calendar day.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyActivity {
    pub date: NaiveDate,
    pub tenders_posted: u64,
    pub bids_received: u64,
    pub my_bids: u64,
    pub total_bid_value: f64,
    pub bid_count: u64,
    // Timeline by status
    pub submitted: u64,
    pub accepted: u64,
    pub rejected: u64,
}

impl DailyActivity {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            ..Default::default()
        }
    }

    pub fn add_tender(&mut self, tender: &Tender) {
        self.tenders_posted += 1;
        self.bids_received += tender.bid_count();
    }

    pub fn add_bid(&mut self, bid: &Bid) {
        self.my_bids += 1;
        self.bid_count += 1;
        self.total_bid_value += bid.amount();
        match classify_bid(bid) {
            BidOutcome::Won => self.accepted += 1,
            BidOutcome::Rejected => self.rejected += 1,
            BidOutcome::NotWon if *bid.status() == BidStatus::Submitted => self.submitted += 1,
            BidOutcome::NotWon => {}
        }
    }

    /// Bids placed on this day; same counter as `my_bids`.
    pub fn bids_placed(&self) -> u64 {
        self.my_bids
    }

    pub fn avg_bid_value(&self) -> f64 {
        if self.bid_count > 0 {
            self.total_bid_value / self.bid_count as f64
        } else {
            0.0
        }
    }

    pub fn total_activity(&self) -> u64 {
        self.tenders_posted + self.my_bids
    }
}

/// A tender or bid, viewed as one event on the activity timeline.
#[derive(Clone, Copy, Debug)]
pub enum ActivityEvent<'a> {
    Tender(&'a Tender),
    Bid(&'a Bid),
}

impl ActivityEvent<'_> {
    pub fn day(&self) -> Option<NaiveDate> {
        match self {
            ActivityEvent::Tender(tender) => record_day(*tender),
            ActivityEvent::Bid(bid) => record_day(*bid),
        }
    }
}

/// Per-day buckets for the window ending on `end`, keyed by date.
pub fn bucket_activity(
    tenders: &[Tender],
    bids: &[Bid],
    window: TimeWindow,
    end: NaiveDate,
) -> BTreeMap<NaiveDate, DailyActivity> {
    let events: Vec<ActivityEvent<'_>> = tenders
        .iter()
        .map(ActivityEvent::Tender)
        .chain(bids.iter().map(ActivityEvent::Bid))
        .collect();

    let mut buckets = bucket_by_day(&events, window, end, ActivityEvent::day, |activity: &mut DailyActivity, event| {
        match event {
            ActivityEvent::Tender(tender) => activity.add_tender(tender),
            ActivityEvent::Bid(bid) => activity.add_bid(bid),
        }
    });
    for (date, activity) in buckets.iter_mut() {
        activity.date = *date;
    }
    buckets
}

/// Ordered, zero-filled daily series for the window ending on `end`.
pub fn compute_time_series(
    tenders: &[Tender],
    bids: &[Bid],
    window: TimeWindow,
    end: NaiveDate,
) -> Vec<DailyActivity> {
    bucket_activity(tenders, bids, window, end)
        .into_values()
        .collect()
}

/// Trailing mean of the daily average bid value over the last `span` days.
/// The first entries average over however many days are available.
pub fn rolling_average(series: &[DailyActivity], span: usize) -> Vec<f64> {
    let span = span.max(1);
    let daily: Vec<f64> = series.iter().map(DailyActivity::avg_bid_value).collect();
    (0..daily.len())
        .map(|i| {
            let from = (i + 1).saturating_sub(span);
            let slice = &daily[from..=i];
            slice.iter().sum::<f64>() / slice.len() as f64
        })
        .collect()
}
