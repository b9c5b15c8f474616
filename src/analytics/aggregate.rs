//! Time-windowed aggregation over a loaded visit log.

use std::collections::{BTreeMap, HashMap, HashSet};

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::db::VisitEvent;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DailyVisitors {
    pub date: NaiveDate,
    pub visitors: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageViews {
    pub page: String,
    pub views: u64,
}

/// Distinct sessions per day between `start` and `end`, both inclusive.
///
/// Days without events are left out rather than reported as zero. Events
/// with no session id still place their day in the output but add no
/// visitor to it.
pub fn daily_unique_visitors(
    events: &[VisitEvent],
    start: NaiveDate,
    end: NaiveDate,
) -> Vec<DailyVisitors> {
    let mut sessions_by_day: BTreeMap<NaiveDate, HashSet<&str>> = BTreeMap::new();

    for event in events.iter().filter(|e| e.date >= start && e.date <= end) {
        let sessions = sessions_by_day.entry(event.date).or_default();
        if let Some(session_id) = event.session_id.as_deref() {
            sessions.insert(session_id);
        }
    }

    sessions_by_day
        .into_iter()
        .map(|(date, sessions)| DailyVisitors {
            date,
            visitors: sessions.len() as u64,
        })
        .collect()
}

/// Raw views per page, busiest first. Ties keep the order in which the pages
/// first appear in `events`.
pub fn page_view_counts(events: &[VisitEvent]) -> Vec<PageViews> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<PageViews> = Vec::new();

    for event in events {
        match index.get(event.page.as_str()) {
            Some(&slot) => counts[slot].views += 1,
            None => {
                index.insert(event.page.as_str(), counts.len());
                counts.push(PageViews {
                    page: event.page.clone(),
                    views: 1,
                });
            }
        }
    }

    // stable
    counts.sort_by(|a, b| b.views.cmp(&a.views));
    counts
}
