//! Deferred repair queue, grounded on `DvbDb::m_updateList` / `addUpdate` / `performUpdate` in
//! `original_source/sistorage/src/dvbdb.cpp`. Absorbs the order dependency between a `Bat`
//! arriving before the `Transport` row its `bouquet_fk` patch targets.

use rusqlite::Connection;

const MAX_TRIES: u32 = 3;

#[derive(Debug, Clone)]
struct Repair {
    statement: String,
    tries: u32,
    fixed: bool,
}

/// A list of pending SQL statements, each retried on every audit tick until it reports a
/// changed row (`fixed`) or has been tried `MAX_TRIES` times (dropped as unfixable).
#[derive(Debug, Clone, Default)]
pub struct RepairQueue {
    entries: Vec<Repair>,
}

impl RepairQueue {
    pub fn new() -> RepairQueue {
        RepairQueue::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Enqueues `statement`, unless an identical one is already pending.
    pub fn push(&mut self, statement: String) {
        if statement.is_empty() || self.entries.iter().any(|r| r.statement == statement) {
            return;
        }
        self.entries.push(Repair {
            statement,
            tries: 0,
            fixed: false,
        });
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// Runs every not-yet-fixed entry once against `conn`, then drops entries that are fixed
    /// or have exhausted their tries.
    pub fn retry(&mut self, conn: &Connection) -> anyhow::Result<()> {
        for repair in self.entries.iter_mut().filter(|r| !r.fixed) {
            let changed = conn.execute(&repair.statement, [])?;
            repair.tries += 1;
            if changed > 0 {
                repair.fixed = true;
            }
        }
        self.entries
            .retain(|r| !r.fixed && r.tries < MAX_TRIES);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deduplicates_identical_statements() {
        let mut q = RepairQueue::new();
        q.push("UPDATE Transport SET bouquet_fk = 1 WHERE transport_pk = 1;".into());
        q.push("UPDATE Transport SET bouquet_fk = 1 WHERE transport_pk = 1;".into());
        assert_eq!(q.len(), 1);
    }

    #[test]
    fn ignores_empty_statement() {
        let mut q = RepairQueue::new();
        q.push(String::new());
        assert!(q.is_empty());
    }

    #[test]
    fn retry_drops_entry_once_fixed() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER);INSERT INTO t VALUES (1);")
            .unwrap();
        let mut q = RepairQueue::new();
        q.push("UPDATE t SET id = 2 WHERE id = 1;".into());
        q.retry(&conn).unwrap();
        assert!(q.is_empty());
    }

    #[test]
    fn retry_drops_entry_after_max_tries() {
        let conn = Connection::open_in_memory().unwrap();
        conn.execute_batch("CREATE TABLE t (id INTEGER);").unwrap();
        let mut q = RepairQueue::new();
        q.push("UPDATE t SET id = 2 WHERE id = 1;".into());
        for _ in 0..MAX_TRIES {
            q.retry(&conn).unwrap();
        }
        assert!(q.is_empty());
    }
}
