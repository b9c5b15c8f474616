use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use rusqlite::{params, Row};

use crate::db::{
    connection::Database,
    helpers::{format_date, format_timestamp, parse_date, parse_timestamp},
    models::{NewVisit, VisitEvent},
};

fn row_to_visit(row: &Row) -> Result<VisitEvent> {
    let id: i64 = row.get("id")?;
    let timestamp: String = row.get("timestamp")?;
    let date: String = row.get("date")?;

    let timestamp = parse_timestamp(&timestamp, "timestamp")
        .with_context(|| format!("visit {id} has a malformed timestamp"))?;
    let date = parse_date(&date, "date")
        .with_context(|| format!("visit {id} has a malformed date"))?;
    if date != timestamp.date() {
        bail!("visit {id} is dated {date} but was recorded at {timestamp}");
    }

    Ok(VisitEvent {
        id,
        timestamp,
        date,
        page: row.get("page")?,
        session_id: row.get("session_id")?,
    })
}

impl Database {
    /// Appends one visit and returns the id the store assigned to it.
    pub async fn append_visit(&self, visit: &NewVisit) -> Result<i64> {
        let record = visit.clone();
        self.execute(move |conn| {
            conn.execute(
                "INSERT INTO visit_logs (timestamp, date, page, session_id)
                 VALUES (?1, ?2, ?3, ?4)",
                params![
                    format_timestamp(&record.timestamp),
                    format_date(&record.date()),
                    record.page,
                    record.session_id,
                ],
            )
            .with_context(|| "failed to insert visit")?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    /// Every visit in the log. No ordering is promised.
    pub async fn load_all_visits(&self) -> Result<Vec<VisitEvent>> {
        self.execute(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, timestamp, date, page, session_id
                 FROM visit_logs",
            )?;

            let mut rows = stmt.query([])?;
            let mut visits = Vec::new();
            while let Some(row) = rows.next()? {
                visits.push(row_to_visit(row)?);
            }

            Ok(visits)
        })
        .await
    }

    pub async fn count_visits(&self) -> Result<u64> {
        self.execute(|conn| {
            let count: i64 =
                conn.query_row("SELECT COUNT(*) FROM visit_logs", [], |row| row.get(0))?;
            Ok(count.max(0) as u64)
        })
        .await
    }

    /// Earliest and latest `date` in the log, or `None` when it is empty.
    pub async fn visit_date_bounds(&self) -> Result<Option<(NaiveDate, NaiveDate)>> {
        self.execute(|conn| {
            let (min, max): (Option<String>, Option<String>) = conn.query_row(
                "SELECT MIN(date), MAX(date) FROM visit_logs",
                [],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )?;

            match (min, max) {
                (Some(min), Some(max)) => Ok(Some((
                    parse_date(&min, "min date")?,
                    parse_date(&max, "max date")?,
                ))),
                _ => Ok(None),
            }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;
    use std::collections::HashSet;
    use tempfile::TempDir;

    fn create_test_db() -> (Database, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let db = Database::new(temp_dir.path().join("visits.sqlite3")).unwrap();
        (db, temp_dir)
    }

    fn at(raw: &str) -> NaiveDateTime {
        raw.parse().unwrap()
    }

    #[tokio::test]
    async fn append_then_load_keeps_every_field() {
        let (db, _dir) = create_test_db();
        let visit = NewVisit::new(
            at("2024-01-01T23:59:59.999999"),
            "배양체 균류 소재 확보 현황",
            Some("20240101235959999999".into()),
        );

        let id = db.append_visit(&visit).await.unwrap();
        let visits = db.load_all_visits().await.unwrap();

        assert_eq!(visits.len(), 1);
        let loaded = &visits[0];
        assert_eq!(loaded.id, id);
        assert_eq!(loaded.timestamp, visit.timestamp);
        assert_eq!(loaded.date, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(loaded.date, loaded.timestamp.date());
        assert_eq!(loaded.page, "배양체 균류 소재 확보 현황");
        assert_eq!(loaded.session_id.as_deref(), Some("20240101235959999999"));
    }

    #[tokio::test]
    async fn ids_strictly_increase() {
        let (db, _dir) = create_test_db();
        let mut last = 0;
        for page in ["a", "b", "c", "a"] {
            let id = db
                .append_visit(&NewVisit::now(page, Some("s".into())))
                .await
                .unwrap();
            assert!(id > last, "id {id} did not increase past {last}");
            last = id;
        }
    }

    #[tokio::test]
    async fn empty_log_loads_as_empty() {
        let (db, _dir) = create_test_db();
        assert!(db.load_all_visits().await.unwrap().is_empty());
        assert_eq!(db.count_visits().await.unwrap(), 0);
        assert_eq!(db.visit_date_bounds().await.unwrap(), None);
    }

    #[tokio::test]
    async fn null_session_round_trips() {
        let (db, _dir) = create_test_db();
        db.append_visit(&NewVisit::new(at("2024-02-01T10:00:00.000000"), "home", None))
            .await
            .unwrap();

        let visits = db.load_all_visits().await.unwrap();
        assert_eq!(visits[0].session_id, None);
    }

    #[tokio::test]
    async fn date_bounds_span_the_log() {
        let (db, _dir) = create_test_db();
        for raw in [
            "2024-01-03T08:00:00.000000",
            "2024-01-01T08:00:00.000000",
            "2024-01-02T08:00:00.000000",
        ] {
            db.append_visit(&NewVisit::new(at(raw), "home", Some("s".into())))
                .await
                .unwrap();
        }

        let (min, max) = db.visit_date_bounds().await.unwrap().unwrap();
        assert_eq!(min, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
        assert_eq!(max, NaiveDate::from_ymd_opt(2024, 1, 3).unwrap());
        assert_eq!(db.count_visits().await.unwrap(), 3);
    }

    #[tokio::test]
    async fn malformed_timestamp_fails_the_load() {
        let (db, _dir) = create_test_db();
        db.execute(|conn| {
            conn.execute(
                "INSERT INTO visit_logs (timestamp, date, page, session_id)
                 VALUES ('not a time', '2024-01-01', 'home', 's')",
                [],
            )?;
            Ok(())
        })
        .await
        .unwrap();

        let err = db.load_all_visits().await.unwrap_err();
        assert!(format!("{err:#}").contains("malformed timestamp"));
    }

    #[tokio::test]
    async fn mismatched_date_column_is_rejected() {
        let (db, _dir) = create_test_db();
        db.execute(|conn| {
            conn.execute(
                "INSERT INTO visit_logs (timestamp, date, page, session_id)
                 VALUES ('2024-01-01T12:00:00.000000', '2024-01-02', 'home', 's')",
                [],
            )?;
            Ok(())
        })
        .await
        .unwrap();

        assert!(db.load_all_visits().await.is_err());
    }

    #[tokio::test]
    async fn ensure_initialized_twice_is_harmless() {
        let (db, _dir) = create_test_db();
        db.append_visit(&NewVisit::now("home", Some("s".into())))
            .await
            .unwrap();

        db.ensure_initialized().await.unwrap();
        db.ensure_initialized().await.unwrap();

        assert_eq!(db.count_visits().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn ensure_initialized_recreates_missing_table() {
        let (db, _dir) = create_test_db();
        db.execute(|conn| {
            conn.execute_batch("DROP TABLE visit_logs;")?;
            Ok(())
        })
        .await
        .unwrap();

        db.ensure_initialized().await.unwrap();

        let id = db
            .append_visit(&NewVisit::now("home", Some("s".into())))
            .await
            .unwrap();
        assert!(id > 0);
        assert_eq!(db.count_visits().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_appends_across_handles_all_land() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("visits.sqlite3");
        let first = Database::new(path.clone()).unwrap();
        let second = Database::new(path).unwrap();
        let handles = [first.clone(), first.clone(), second.clone(), second.clone()];

        let mut tasks = Vec::new();
        for i in 0..200 {
            let db = handles[i % handles.len()].clone();
            tasks.push(tokio::spawn(async move {
                let visit = NewVisit::now(format!("page-{}", i % 7), Some(format!("s{}", i % 13)));
                db.append_visit(&visit).await
            }));
        }

        let mut ids = HashSet::new();
        for task in tasks {
            let id = task.await.unwrap().unwrap();
            assert!(ids.insert(id), "id {id} assigned twice");
        }

        assert_eq!(ids.len(), 200);
        assert_eq!(first.count_visits().await.unwrap(), 200);
        assert_eq!(second.load_all_visits().await.unwrap().len(), 200);
    }

    #[tokio::test]
    async fn reopening_keeps_rows_and_continues_ids() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("nested").join("visits.sqlite3");

        let first_id = {
            let db = Database::new(path.clone()).unwrap();
            db.append_visit(&NewVisit::now("home", Some("s".into())))
                .await
                .unwrap()
        };

        let db = Database::new(path).unwrap();
        let second_id = db
            .append_visit(&NewVisit::now("home", Some("s".into())))
            .await
            .unwrap();

        assert!(second_id > first_id);
        assert_eq!(db.load_all_visits().await.unwrap().len(), 2);
    }
}
