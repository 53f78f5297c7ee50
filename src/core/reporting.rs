// src/core/reporting.rs

use chrono::{DateTime, NaiveDate, Utc};
use itertools::Itertools;
use serde::{Deserialize, Serialize};

use crate::core::aggregator::{compute_time_series, rolling_average, DailyActivity};
use crate::core::classifier::{weekday_distribution, WeekdayCount};
use crate::core::models::{Bid, Tender};
use crate::core::summary::{
    compute_summary_stats, payment_summary, status_distribution, top_tenders_by_bid_count,
    PaymentSummary, StatusCount, SummaryStats, TenderRanking,
};
use crate::core::window::TimeWindow;

const ROLLING_SPAN_DAYS: usize = 7;

/// Everything the dashboard shows for one window.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Report {
    pub generated_at: DateTime<Utc>,
    pub window: TimeWindow,
    pub end_date: NaiveDate,
    pub time_series: Vec<DailyActivity>,
    pub rolling_avg_bid_value: Vec<f64>,
    pub summary: SummaryStats,
    pub top_tenders: Vec<TenderRanking>,
    pub tender_status: Vec<StatusCount>,
    pub bid_status: Vec<StatusCount>,
    pub bid_weekdays: Vec<WeekdayCount>,
    pub payments: PaymentSummary,
}

impl Report {
    /// Zero-valued report: every day of the window present with no activity.
    pub fn empty(window: TimeWindow, end_date: NaiveDate, generated_at: DateTime<Utc>) -> Self {
        build_report(&[], &[], window, end_date, 0, generated_at)
    }

    pub fn is_empty(&self) -> bool {
        self.summary.total_tenders == 0 && self.summary.total_bids == 0
    }
}

/// Aggregate both collections into a report. The result depends only on the
/// arguments, `generated_at` included.
pub fn build_report(
    tenders: &[Tender],
    bids: &[Bid],
    window: TimeWindow,
    end_date: NaiveDate,
    top_n: usize,
    generated_at: DateTime<Utc>,
) -> Report {
    let time_series = compute_time_series(tenders, bids, window, end_date);
    let rolling_avg_bid_value = rolling_average(&time_series, ROLLING_SPAN_DAYS);
    Report {
        generated_at,
        window,
        end_date,
        rolling_avg_bid_value,
        time_series,
        summary: compute_summary_stats(tenders, bids),
        top_tenders: top_tenders_by_bid_count(tenders, top_n),
        tender_status: status_distribution(tenders),
        bid_status: status_distribution(bids),
        bid_weekdays: weekday_distribution(bids),
        payments: payment_summary(bids),
    }
}

fn format_currency(amount: f64) -> String {
    let rounded = format!("{:.2}", amount.abs());
    let (int_part, frac_part) = rounded.split_once('.').unwrap_or((rounded.as_str(), "00"));
    let grouped = int_part
        .as_bytes()
        .rchunks(3)
        .rev()
        .map(|chunk| String::from_utf8_lossy(chunk).into_owned())
        .join(",");
    let sign = if amount < 0.0 { "-" } else { "" };
    format!("{}{}.{}", sign, grouped, frac_part)
}

fn format_distribution(counts: &[StatusCount]) -> String {
    if counts.is_empty() {
        return "N/A".to_string();
    }
    counts.iter().map(|c| format!("{}: {}", c.name, c.value)).join(", ")
}

fn format_section_summary(report: &Report) -> String {
    let s = &report.summary;
    let mut section = String::from("## Summary\n\n");
    section.push_str("| Metric | Value |\n");
    section.push_str("| :----- | ----: |\n");
    section.push_str(&format!("| Total Tenders | {} |\n", s.total_tenders));
    section.push_str(&format!("| Active Tenders | {} |\n", s.active_tenders));
    section.push_str(&format!("| Completed Tenders | {} |\n", s.completed_tenders));
    section.push_str(&format!("| Projects With No Bids | {} |\n", s.projects_with_no_bids));
    section.push_str(&format!("| Bids Received | {} |\n", s.total_bids_received));
    section.push_str(&format!("| Avg. Bids per Project | {:.1} |\n", s.avg_bids_per_project));
    section.push_str(&format!("| Total Bids | {} |\n", s.total_bids));
    section.push_str(&format!("| Pending Bids | {} |\n", s.pending_bids));
    section.push_str(&format!("| Won Bids | {} |\n", s.won_bids));
    section.push_str(&format!("| Win Rate | {}% |\n", s.win_rate));
    section.push_str(&format!("| Total Bid Value | {} |\n", format_currency(s.total_bid_value)));
    section.push_str(&format!("| Paid | {} |\n", format_currency(report.payments.paid_value)));
    section.push_str(&format!("| Awaiting Payment | {} |\n", format_currency(report.payments.outstanding_value)));
    section.push_str("\n");
    section
}

fn format_section_daily(report: &Report) -> String {
    let mut section = format!("## Daily Activity (last {} days)\n\n", report.window.days());
    section.push_str("| Date | Tenders | Bids Received | My Bids | Bid Value | Avg. Bid | 7d Avg. |\n");
    section.push_str("| :--- | ------: | ------------: | ------: | --------: | -------: | ------: |\n");
    for (day, rolling) in report.time_series.iter().zip(&report.rolling_avg_bid_value) {
        section.push_str(&format!(
            "| {} | {} | {} | {} | {} | {} | {} |\n",
            day.date.format("%Y-%m-%d"),
            day.tenders_posted,
            day.bids_received,
            day.my_bids,
            format_currency(day.total_bid_value),
            format_currency(day.avg_bid_value()),
            format_currency(*rolling),
        ));
    }
    section.push_str("\n");
    section
}

fn format_section_rankings(report: &Report) -> String {
    let mut section = String::from("## Top Tenders by Bids\n\n");
    if report.top_tenders.is_empty() {
        section.push_str("No tenders have received bids yet.\n\n");
    } else {
        for (rank, tender) in report.top_tenders.iter().enumerate() {
            section.push_str(&format!("{}. {} ({} bids)\n", rank + 1, tender.name, tender.bids));
        }
        section.push_str("\n");
    }

    section.push_str("## Distributions\n\n");
    section.push_str(&format!("*   Tender status: {}\n", format_distribution(&report.tender_status)));
    section.push_str(&format!("*   Bid status: {}\n", format_distribution(&report.bid_status)));
    section.push_str(&format!(
        "*   Bids by weekday: {}\n",
        report.bid_weekdays.iter().map(|d| format!("{} {}", d.day, d.count)).join(", ")
    ));
    section
}

/// Render a finished report as Markdown.
pub fn format_report(report: &Report) -> String {
    let mut out = String::from("# Tender & Bid Activity Report\n\n");
    out.push_str(&format!(
        "**Generated:** {}  \n**Window:** {} to {}\n\n",
        report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
        report.window.start(report.end_date).format("%Y-%m-%d"),
        report.end_date.format("%Y-%m-%d"),
    ));
    out.push_str(&format_section_summary(report));
    out.push_str(&format_section_daily(report));
    out.push_str(&format_section_rankings(report));
    out
}
