//! Administrative report over the visit log.

use anyhow::{bail, Result};
use chrono::NaiveDate;
use serde::Serialize;

use crate::db::VisitEvent;

use super::aggregate::{daily_unique_visitors, page_view_counts, DailyVisitors, PageViews};

/// Password check in front of the admin report.
pub struct AdminGate {
    password: String,
}

impl AdminGate {
    pub fn new(password: impl Into<String>) -> Self {
        Self {
            password: password.into(),
        }
    }

    pub fn verify(&self, attempt: &str) -> Result<()> {
        if self.password.is_empty() || attempt != self.password {
            bail!("admin password rejected");
        }
        Ok(())
    }
}

/// Inclusive calendar-date window.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// From the earliest to the latest visit date; `None` for an empty log.
    pub fn default_for(events: &[VisitEvent]) -> Option<Self> {
        let start = events.iter().map(|e| e.date).min()?;
        let end = events.iter().map(|e| e.date).max()?;
        Some(Self { start, end })
    }

    /// Fills whichever bound is missing from `span`, the log's own extent.
    pub fn resolve(
        span: Option<DateRange>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Option<Self> {
        let span = span?;
        Some(Self {
            start: start.unwrap_or(span.start),
            end: end.unwrap_or(span.end),
        })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date >= self.start && date <= self.end
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardReport {
    pub range: Option<DateRange>,
    pub total_visits: usize,
    pub daily_visitors: Vec<DailyVisitors>,
    pub page_views: Vec<PageViews>,
    /// Filtered log, newest first.
    pub recent: Vec<VisitEvent>,
}

impl DashboardReport {
    pub fn empty() -> Self {
        Self {
            range: None,
            total_visits: 0,
            daily_visitors: Vec::new(),
            page_views: Vec::new(),
            recent: Vec::new(),
        }
    }

    pub fn build(events: &[VisitEvent], range: DateRange) -> Self {
        let mut filtered: Vec<VisitEvent> = events
            .iter()
            .filter(|e| range.contains(e.date))
            .cloned()
            .collect();
        filtered.sort_by(|a, b| b.timestamp.cmp(&a.timestamp).then(b.id.cmp(&a.id)));

        Self {
            range: Some(range),
            total_visits: filtered.len(),
            daily_visitors: daily_unique_visitors(&filtered, range.start, range.end),
            page_views: page_view_counts(&filtered),
            recent: filtered,
        }
    }

    /// Report for the requested window. Open bounds come from `span`; no
    /// span means the log is empty.
    pub fn for_window(
        events: &[VisitEvent],
        span: Option<DateRange>,
        start: Option<NaiveDate>,
        end: Option<NaiveDate>,
    ) -> Self {
        match DateRange::resolve(span, start, end) {
            Some(range) => Self::build(events, range),
            None => Self::empty(),
        }
    }

    /// True when the log had nothing to report on at all.
    pub fn is_empty(&self) -> bool {
        self.range.is_none()
    }
}
