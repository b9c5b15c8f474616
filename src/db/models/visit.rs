//! Visit log data models.
//!
//! A `VisitEvent` is an immutable fact once written: the store assigns its
//! `id`, and `date` is always the calendar date of `timestamp`.

use chrono::{Local, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

/// One recorded page load, as read back from the log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct VisitEvent {
    pub id: i64,
    pub timestamp: NaiveDateTime,
    pub date: NaiveDate,
    pub page: String,
    pub session_id: Option<String>,
}

/// A visit that has not been written yet.
///
/// There is no way to set the date separately; it is derived from
/// `timestamp` when the row is written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewVisit {
    pub timestamp: NaiveDateTime,
    pub page: String,
    pub session_id: Option<String>,
}

impl NewVisit {
    pub fn new(timestamp: NaiveDateTime, page: impl Into<String>, session_id: Option<String>) -> Self {
        Self {
            timestamp,
            page: page.into(),
            session_id,
        }
    }

    /// Visit stamped with the local wall clock.
    pub fn now(page: impl Into<String>, session_id: Option<String>) -> Self {
        Self::new(Local::now().naive_local(), page, session_id)
    }

    pub fn date(&self) -> NaiveDate {
        self.timestamp.date()
    }
}
