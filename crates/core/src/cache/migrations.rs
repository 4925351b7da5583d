//! Store schema migrations.
//!
//! Applied versions are recorded in `_migrations`; each pending migration
//! runs in its own transaction together with its version row.

use super::Error;
use tokio_rusqlite::{Connection, params};

struct Migration {
    version: i64,
    name: &'static str,
    sql: &'static str,
}

/// Ordered by version. Every script must tolerate re-running.
const MIGRATIONS: &[Migration] =
    &[Migration { version: 1, name: "kv_store", sql: include_str!("../../migrations/001_kv_store.sql") }];

/// Apply pending migrations and return how many ran.
///
/// # Errors
///
/// Returns [`Error::MigrationFailed`] naming the migration whose SQL failed.
pub async fn run(conn: &Connection) -> Result<usize, Error> {
    conn.call(|conn| -> Result<usize, Error> {
        conn.execute(
            "CREATE TABLE IF NOT EXISTS _migrations (
                version INTEGER PRIMARY KEY,
                applied_at TEXT NOT NULL
            )",
            [],
        )?;

        let current: i64 =
            conn.query_row("SELECT COALESCE(MAX(version), 0) FROM _migrations", [], |row| row.get(0))?;

        let mut applied = 0;
        for migration in MIGRATIONS.iter().filter(|m| m.version > current) {
            tracing::debug!(version = migration.version, name = migration.name, "applying store migration");

            let tx = conn.transaction()?;
            tx.execute_batch(migration.sql)
                .map_err(|e| Error::MigrationFailed(format!("{} (v{}): {e}", migration.name, migration.version)))?;
            tx.execute(
                "INSERT INTO _migrations (version, applied_at) VALUES (?1, ?2)",
                params![migration.version, chrono::Utc::now().to_rfc3339()],
            )?;
            tx.commit()?;
            applied += 1;
        }

        Ok(applied)
    })
    .await
    .map_err(Error::from)
}
