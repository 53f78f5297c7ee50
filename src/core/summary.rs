// src/core/summary.rs

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::classifier::record_day;
use crate::core::models::{Bid, BidStatus, HasStatus, PaymentStatus, Tender, Timestamped};
use crate::core::window::TimeWindow;

pub const DEFAULT_TOP_N: usize = 5;
const TITLE_DISPLAY_LIMIT: usize = 20;

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryStats {
    pub total_tenders: u64,
    pub total_bids: u64,
    pub active_tenders: u64,
    pub completed_tenders: u64,
    pub pending_bids: u64,
    pub accepted_bids: u64,
    pub completed_bids: u64,
    pub won_bids: u64,
    pub avg_bids_per_project: f64,
    pub projects_with_no_bids: u64,
    pub total_bids_received: u64,
    pub win_rate: u32,
    pub total_bid_value: f64,
    pub avg_bid_value: f64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TenderRanking {
    pub name: String,
    pub bids: u64,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub name: String,
    pub value: u64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSummary {
    pub pending: u64,
    pub completed: u64,
    pub failed: u64,
    pub other: u64,
    pub paid_value: f64,
    pub outstanding_value: f64,
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

/// Average bids per tender, rounded to one decimal place. Zero without tenders.
pub fn avg_bids_per_project(total_bids_received: u64, tender_count: u64) -> f64 {
    if tender_count == 0 {
        return 0.0;
    }
    round_to(total_bids_received as f64 / tender_count as f64, 1)
}

/// Share of won bids as a whole percentage. Zero without bids.
pub fn win_rate(won_bids: u64, total_bids: u64) -> u32 {
    if total_bids == 0 {
        return 0;
    }
    (won_bids as f64 / total_bids as f64 * 100.0).round() as u32
}

pub fn compute_summary_stats(tenders: &[Tender], bids: &[Bid]) -> SummaryStats {
    let mut stats = SummaryStats {
        total_tenders: tenders.len() as u64,
        total_bids: bids.len() as u64,
        ..Default::default()
    };

    for tender in tenders {
        if tender.is_active() {
            stats.active_tenders += 1;
        }
        if tender.is_completed() {
            stats.completed_tenders += 1;
        }
        if tender.bid_count() == 0 {
            stats.projects_with_no_bids += 1;
        }
        stats.total_bids_received += tender.bid_count();
    }

    for bid in bids {
        match bid.status() {
            BidStatus::Submitted => stats.pending_bids += 1,
            BidStatus::Accepted => stats.accepted_bids += 1,
            BidStatus::Completed => stats.completed_bids += 1,
            _ => {}
        }
        if bid.is_won() {
            stats.won_bids += 1;
        }
        stats.total_bid_value += bid.amount();
    }

    stats.avg_bids_per_project = avg_bids_per_project(stats.total_bids_received, stats.total_tenders);
    stats.win_rate = win_rate(stats.won_bids, stats.total_bids);
    stats.avg_bid_value = if stats.total_bids > 0 {
        stats.total_bid_value / stats.total_bids as f64
    } else {
        0.0
    };
    stats
}

/// Shorten a title for chart labels.
pub fn display_title(title: &str) -> String {
    if title.chars().count() > TITLE_DISPLAY_LIMIT {
        let head: String = title.chars().take(TITLE_DISPLAY_LIMIT).collect();
        format!("{}...", head)
    } else {
        title.to_string()
    }
}

/// The `n` tenders with the most bids, highest first. Tenders without bids
/// are left out; ties keep their original order.
pub fn top_tenders_by_bid_count(tenders: &[Tender], n: usize) -> Vec<TenderRanking> {
    let mut ranked: Vec<&Tender> = tenders.iter().filter(|t| t.bid_count() > 0).collect();
    ranked.sort_by(|a, b| b.bid_count().cmp(&a.bid_count()));
    ranked
        .into_iter()
        .take(n)
        .map(|tender| TenderRanking {
            name: display_title(tender.title()),
            bids: tender.bid_count(),
        })
        .collect()
}

/// Occurrences of every status label present, in order of first appearance.
pub fn status_distribution<R: HasStatus>(records: &[R]) -> Vec<StatusCount> {
    let mut positions: HashMap<&str, usize> = HashMap::new();
    let mut distribution: Vec<StatusCount> = Vec::new();
    for record in records {
        let label = record.status_label();
        match positions.get(label) {
            Some(&idx) => distribution[idx].value += 1,
            None => {
                positions.insert(label, distribution.len());
                distribution.push(StatusCount {
                    name: label.to_string(),
                    value: 1,
                });
            }
        }
    }
    distribution
}

/// Payment progress of the bids. Paid and outstanding values only consider
/// won bids, since nothing is owed on the others.
pub fn payment_summary(bids: &[Bid]) -> PaymentSummary {
    let mut summary = PaymentSummary::default();
    for bid in bids {
        match bid.payment_status() {
            Some(PaymentStatus::Completed) => summary.completed += 1,
            Some(PaymentStatus::Failed) => summary.failed += 1,
            Some(PaymentStatus::Other(_)) => summary.other += 1,
            Some(PaymentStatus::Pending) | None => summary.pending += 1,
        }
        if bid.is_won() {
            match bid.payment_status() {
                Some(PaymentStatus::Completed) => summary.paid_value += bid.amount(),
                Some(PaymentStatus::Failed) | Some(PaymentStatus::Other(_)) => {}
                Some(PaymentStatus::Pending) | None => summary.outstanding_value += bid.amount(),
            }
        }
    }
    summary
}

/// Records created within the window ending on `end`. Records without a
/// creation timestamp are left out.
pub fn filter_within_window<R: Timestamped + Clone>(records: &[R], window: TimeWindow, end: NaiveDate) -> Vec<R> {
    records
        .iter()
        .filter(|r| record_day(*r).map_or(false, |day| window.contains(end, day)))
        .cloned()
        .collect()
}
