use anyhow::{bail, Context, Result};
use rusqlite::Connection;

/// Schema scripts in version order. Each one is re-runnable (`IF NOT EXISTS`),
/// so replaying the applied ones restores anything that went missing.
const MIGRATIONS: &[(&str, &str)] = &[
    ("schema_v1.sql", include_str!("schemas/schema_v1.sql")),
    ("schema_v2.sql", include_str!("schemas/schema_v2.sql")),
];

pub(crate) const CURRENT_SCHEMA_VERSION: i32 = MIGRATIONS.len() as i32;

pub fn run_migrations(conn: &mut Connection) -> Result<()> {
    let version: i32 = conn
        .pragma_query_value(None, "user_version", |row| row.get(0))
        .context("failed to read user_version pragma")?;

    if version > CURRENT_SCHEMA_VERSION {
        bail!(
            "database version ({}) is newer than supported schema ({})",
            version,
            CURRENT_SCHEMA_VERSION
        );
    }

    let tx = conn
        .transaction()
        .context("failed to open migration transaction")?;

    for (name, script) in MIGRATIONS {
        tx.execute_batch(script)
            .with_context(|| format!("failed to execute {name}"))?;
    }

    if version < CURRENT_SCHEMA_VERSION {
        tx.pragma_update(None, "user_version", CURRENT_SCHEMA_VERSION)
            .context("failed to update user_version pragma")?;
    }
    tx.commit().context("failed to commit migrations")?;

    Ok(())
}
