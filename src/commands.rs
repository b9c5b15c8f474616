use std::{
    fmt::{self, Display},
    path::PathBuf,
};

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};

use crate::{
    analytics::{AdminGate, AnalyticsReporter, DashboardReport, DateRange, SessionContext},
    db::{Database, TIMESTAMP_FORMAT},
    settings::AppConfig,
};

#[derive(Parser, Debug)]
#[command(name = "visitlog", version, about = "Record page visits and report on them")]
pub struct Cli {
    /// JSON config file (falls back to $VISITLOG_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Visit log path, overriding the config
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Create the visit log if needed and print where it lives
    Init,
    /// Write the effective configuration as JSON
    SaveConfig {
        path: PathBuf,
    },
    /// Record one visit
    Record {
        /// Page label, free text
        page: String,
        /// Existing session token; a new one is issued when omitted
        #[arg(long)]
        session: Option<String>,
    },
    /// Print the admin dashboard
    Report {
        /// First day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        from: Option<NaiveDate>,
        /// Last day, inclusive (YYYY-MM-DD)
        #[arg(long)]
        to: Option<NaiveDate>,
        #[arg(long)]
        json: bool,
        #[arg(long, env = "VISITLOG_REPORT_PASSWORD")]
        password: String,
    },
}

pub fn open_database(config: &AppConfig) -> Result<Database> {
    Database::new(config.db_path.clone())
        .with_context(|| format!("failed to open visit log {}", config.db_path.display()))
}

pub async fn init(db: &Database) -> Result<String> {
    db.ensure_initialized().await?;
    let visits = db.count_visits().await?;
    Ok(format!(
        "Visit log ready at {} ({visits} visits)",
        db.path().display()
    ))
}

pub fn save_config(config: &AppConfig, path: &std::path::Path) -> Result<String> {
    config.save(path)?;
    Ok(format!("Configuration written to {}", path.display()))
}

/// Returns the session token the visit was recorded under.
pub async fn record(
    reporter: &AnalyticsReporter,
    page: &str,
    session: Option<String>,
) -> Result<String> {
    let mut session = match session {
        Some(token) => SessionContext::with_token(token),
        None => SessionContext::new(),
    };
    reporter.record_visit(&mut session, page).await?;
    Ok(session.token().unwrap_or_default().to_string())
}

pub async fn report(
    reporter: &AnalyticsReporter,
    gate: &AdminGate,
    password: &str,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
) -> Result<DashboardReport> {
    gate.verify(password)?;
    let span = reporter
        .database()
        .visit_date_bounds()
        .await
        .context("failed to read visit log date span")?
        .map(|(start, end)| DateRange::new(start, end));
    let events = reporter.load_all().await?;
    Ok(DashboardReport::for_window(&events, span, from, to))
}

/// Plain-text rendering of a dashboard report.
pub struct TextReport<'a>(pub &'a DashboardReport);

impl Display for TextReport<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let report = self.0;
        let Some(range) = report.range else {
            return writeln!(f, "No visit logs yet.");
        };

        writeln!(f, "Period: {} .. {}", range.start, range.end)?;
        writeln!(f, "Visits in period: {}", report.total_visits)?;

        writeln!(f, "\nDaily visitors (by session)")?;
        for day in &report.daily_visitors {
            writeln!(f, "  {}  {:>6}", day.date, day.visitors)?;
        }

        writeln!(f, "\nPage views")?;
        let width = report
            .page_views
            .iter()
            .map(|p| p.page.chars().count())
            .max()
            .unwrap_or(0);
        for page in &report.page_views {
            let pad = width - page.page.chars().count();
            writeln!(f, "  {}{}  {:>6}", page.page, " ".repeat(pad), page.views)?;
        }

        writeln!(f, "\nRaw log (newest first)")?;
        for visit in &report.recent {
            writeln!(
                f,
                "  {:>6}  {}  {}  {}",
                visit.id,
                visit.timestamp.format(TIMESTAMP_FORMAT),
                visit.session_id.as_deref().unwrap_or("-"),
                visit.page
            )?;
        }

        Ok(())
    }
}
