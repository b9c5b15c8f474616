pub mod aggregate;
pub mod dashboard;
mod reporter;
mod session;

pub use aggregate::{daily_unique_visitors, page_view_counts, DailyVisitors, PageViews};
pub use dashboard::{AdminGate, DashboardReport, DateRange};
pub use reporter::AnalyticsReporter;
pub use session::{SessionContext, SESSION_TOKEN_FORMAT};
