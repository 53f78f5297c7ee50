use chrono::{DateTime, Utc};
use futures::future::try_join;
use log::{debug, error, info};
use std::future::Future;
use std::sync::{Arc, Mutex};

use crate::core::reporting::{build_report, Report};
use crate::core::summary::DEFAULT_TOP_N;
use crate::core::window::TimeWindow;
use crate::error::ReportError;
use crate::services::tender_api::TenderApi;

/// State of the report shown for the currently selected window.
#[derive(Clone, Debug, PartialEq)]
pub enum ReportOutcome {
    Loading,
    Ready(Report),
    /// Fetching failed; `fallback` is the zero-valued report shown instead.
    Failed { message: String, fallback: Report },
}

impl ReportOutcome {
    pub fn report(&self) -> Option<&Report> {
        match self {
            ReportOutcome::Loading => None,
            ReportOutcome::Ready(report) => Some(report),
            ReportOutcome::Failed { fallback, .. } => Some(fallback),
        }
    }
}

/// Result of one refresh once it finished.
#[derive(Clone, Debug, PartialEq)]
pub enum RefreshResult {
    Applied(ReportOutcome),
    /// A newer refresh was requested while this one was in flight.
    Superseded,
}

pub struct ReportService {
    api: Arc<dyn TenderApi>,
    user_id: String,
    top_n: usize,
}

impl ReportService {
    pub fn new(api: Arc<dyn TenderApi>, user_id: impl Into<String>) -> Self {
        Self {
            api,
            user_id: user_id.into(),
            top_n: DEFAULT_TOP_N,
        }
    }

    pub fn with_top_n(mut self, top_n: usize) -> Self {
        self.top_n = top_n;
        self
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    /// Fetch both collections concurrently and build the report stamped
    /// `now`, for the window ending on `now`'s UTC day. Either fetch failing
    /// fails the whole report.
    pub async fn fetch_report(&self, window: TimeWindow, now: DateTime<Utc>) -> Result<Report, ReportError> {
        let tenders = async {
            self.api
                .fetch_tenders_for_user(&self.user_id)
                .await
                .map_err(|e| ReportError::fetch("tenders", e))
        };
        let bids = async {
            self.api
                .fetch_bids_for_user()
                .await
                .map_err(|e| ReportError::fetch("bids", e))
        };
        let (tenders, bids) = try_join(tenders, bids).await?;
        debug!("Fetched {} tenders and {} bids for user {}", tenders.len(), bids.len(), self.user_id);

        Ok(build_report(&tenders, &bids, window, now.date_naive(), self.top_n, now))
    }

    /// Like [`fetch_report`](Self::fetch_report), but never fails: a fetch
    /// error yields the zero-valued report and a single message.
    pub async fn report_or_fallback(&self, window: TimeWindow, now: DateTime<Utc>) -> ReportOutcome {
        match self.fetch_report(window, now).await {
            Ok(report) => ReportOutcome::Ready(report),
            Err(e) => {
                error!("Report for {} window unavailable: {}", window, e);
                ReportOutcome::Failed {
                    message: e.to_string(),
                    fallback: Report::empty(window, now.date_naive(), now),
                }
            }
        }
    }
}

/// Identity of one refresh request.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ticket {
    generation: u64,
    window: TimeWindow,
}

struct ControllerState {
    generation: u64,
    window: TimeWindow,
    outcome: ReportOutcome,
}

/// Keeps the report for the currently selected window. Every refresh is
/// keyed by a ticket; a result whose ticket is no longer the latest is
/// dropped so a slow response never overwrites a newer one.
pub struct ReportController {
    service: ReportService,
    state: Mutex<ControllerState>,
}

impl ReportController {
    pub fn new(service: ReportService, window: TimeWindow) -> Self {
        Self {
            service,
            state: Mutex::new(ControllerState {
                generation: 0,
                window,
                outcome: ReportOutcome::Loading,
            }),
        }
    }

    pub fn window(&self) -> TimeWindow {
        self.lock_state().window
    }

    pub fn outcome(&self) -> ReportOutcome {
        self.lock_state().outcome.clone()
    }

    /// Select `window` and refresh the report for it.
    ///
    /// The ticket is issued before the returned future is first polled, so
    /// the order of `refresh` calls decides which result wins.
    pub fn refresh(self: &Arc<Self>, window: TimeWindow) -> impl Future<Output = RefreshResult> + Send + 'static {
        let ticket = self.begin(window);
        let controller = Arc::clone(self);
        async move { controller.finish(ticket, Utc::now()).await }
    }

    fn lock_state(&self) -> std::sync::MutexGuard<'_, ControllerState> {
        // A poisoned lock only means a panic elsewhere; the state itself is
        // always replaced wholesale.
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn begin(&self, window: TimeWindow) -> Ticket {
        let mut state = self.lock_state();
        state.generation += 1;
        state.window = window;
        state.outcome = ReportOutcome::Loading;
        debug!("Refresh #{} requested for {} window", state.generation, window);
        Ticket {
            generation: state.generation,
            window,
        }
    }

    async fn finish(&self, ticket: Ticket, now: DateTime<Utc>) -> RefreshResult {
        let outcome = self.service.report_or_fallback(ticket.window, now).await;

        let mut state = self.lock_state();
        if state.generation != ticket.generation {
            info!(
                "Discarding stale {} report (#{}), #{} is current",
                ticket.window, ticket.generation, state.generation
            );
            return RefreshResult::Superseded;
        }
        state.outcome = outcome.clone();
        RefreshResult::Applied(outcome)
    }
}
