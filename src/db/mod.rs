mod connection;
mod helpers;
mod migrations;
pub mod models;
mod repositories;

pub use connection::Database;
pub use helpers::{format_date, format_timestamp, DATE_FORMAT, TIMESTAMP_FORMAT};
pub use models::{NewVisit, VisitEvent};
