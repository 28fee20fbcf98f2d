//! Periodic maintenance, grounded on `DvbDb::purgeAudit` / `vacuumAudit` / `staleAudit` /
//! `staleCheck` in `original_source/sistorage/src/dvbdb.cpp`.

use rusqlite::Connection;

use crate::error::Error;

/// Deletes expired events and their now-orphaned children. Mirrors the original's four
/// statements verbatim, including its cascade-by-select clean-up for rows with no surviving
/// parent (SQLite's `FOREIGN KEY` declarations here are advisory, not enforced, matching the
/// original schema which never turns on `PRAGMA foreign_keys`).
pub fn purge_stale_events(conn: &Connection) -> anyhow::Result<()> {
    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "DELETE FROM Eit WHERE start_time + duration < strftime('%s', 'now', '-1 hour')",
        [],
    )?;
    tx.execute(
        "DELETE FROM EitDescriptor WHERE fkey NOT IN (SELECT DISTINCT eit_pk FROM Eit)",
        [],
    )?;
    tx.execute(
        "DELETE FROM Event WHERE start_time + duration < strftime('%s', 'now', '-1 hour')",
        [],
    )?;
    tx.execute(
        "DELETE FROM EventItem WHERE event_fk NOT IN (SELECT DISTINCT event_pk FROM Event)",
        [],
    )?;
    tx.execute(
        "DELETE FROM EventComponent WHERE fkey NOT IN (SELECT DISTINCT event_pk FROM Event)",
        [],
    )?;
    tx.commit()?;
    Ok(())
}

pub fn vacuum(conn: &Connection) -> anyhow::Result<()> {
    conn.execute_batch("VACUUM;")?;
    Ok(())
}

/// Latest known `Eit.start_time`, or `None` if the store has no events yet.
fn latest_event_start(conn: &Connection) -> anyhow::Result<Option<i64>> {
    let value: Option<i64> = conn.query_row(
        "SELECT MAX(start_time) FROM Eit",
        [],
        |row| row.get(0),
    )?;
    Ok(value)
}

/// True if the store's newest known event already started before `now` *and* a TDT/TOT has
/// been observed on-air since (`tot_received`). A fresh store with no events, or one that
/// simply hasn't received a clock reference yet, is never considered stale.
pub fn is_stale(conn: &Connection, now: i64, tot_received: bool) -> anyhow::Result<bool> {
    if !tot_received {
        return Ok(false);
    }
    Ok(matches!(latest_event_start(conn)?, Some(start) if start < now))
}

/// Drops and recreates every table. Called when `is_stale` returns true, or directly by the
/// NIT version-change upsert path.
pub fn drop_and_recreate_schema(conn: &Connection) -> anyhow::Result<()> {
    super::schema_drop(conn)?;
    super::schema_create(conn)?;
    Ok(())
}

/// Maps a SQLite error code observed after a `VACUUM` sanity check into the taxonomy's
/// storage-health variants. Anything else is treated as benign (`Ok(())`).
pub fn classify_sqlite_error(err: &rusqlite::Error) -> Option<Error> {
    use rusqlite::ErrorCode;
    match err {
        rusqlite::Error::SqliteFailure(e, _) => match e.code {
            ErrorCode::NotADatabase
            | ErrorCode::DatabaseCorrupt
            | ErrorCode::SystemIoFailure
            | ErrorCode::ApiMisuse => Some(Error::StorageCorrupt(err.to_string())),
            ErrorCode::DiskFull => Some(Error::StorageFull(err.to_string())),
            _ => None,
        },
        _ => None,
    }
}
