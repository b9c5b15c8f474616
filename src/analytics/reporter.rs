use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime};

use crate::db::{Database, NewVisit, VisitEvent};

use super::SessionContext;

const ENABLE_LOGS: bool = true;

use crate::{log_info, log_warn};

/// Write path for page visits and read path for the admin view.
#[derive(Clone)]
pub struct AnalyticsReporter {
    db: Database,
}

impl AnalyticsReporter {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    /// Records one page load for `session`, creating its token if needed.
    pub async fn record_visit(&self, session: &mut SessionContext, page: &str) -> Result<()> {
        self.record_visit_at(session, page, Local::now().naive_local())
            .await
            .map(|_| ())
    }

    pub async fn record_visit_at(
        &self,
        session: &mut SessionContext,
        page: &str,
        now: NaiveDateTime,
    ) -> Result<i64> {
        let session_id = session.ensure_session_at(now).to_string();
        let visit = NewVisit::new(now, page, Some(session_id));
        self.db
            .append_visit(&visit)
            .await
            .with_context(|| format!("failed to record visit to '{page}'"))
    }

    /// Like `record_visit`, but a storage failure is logged and reported as
    /// `false` so the page can render regardless.
    pub async fn record_visit_or_warn(&self, session: &mut SessionContext, page: &str) -> bool {
        match self.record_visit(session, page).await {
            Ok(()) => true,
            Err(err) => {
                log_warn!("Visit not recorded: {err:#}");
                false
            }
        }
    }

    pub async fn load_all(&self) -> Result<Vec<VisitEvent>> {
        let visits = self
            .db
            .load_all_visits()
            .await
            .context("failed to load visit log")?;
        log_info!("Loaded {} visits from {}", visits.len(), self.db.path().display());
        Ok(visits)
    }
}
