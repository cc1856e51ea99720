//! SQLite implementation of [`SessionCache`].

use super::{CacheResult, SessionCache};
use rusqlite::{params, Connection, OptionalExtension};

/// Session cache stored in the `session_kv` table.
pub struct SqliteSessionCache<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteSessionCache<'conn> {
    pub fn new(conn: &'conn Connection) -> Self {
        Self { conn }
    }
}

impl SessionCache for SqliteSessionCache<'_> {
    fn get(&self, key: &str) -> CacheResult<Option<String>> {
        let value = self
            .conn
            .query_row(
                "SELECT value FROM session_kv WHERE key = ?1;",
                params![key],
                |row| row.get::<_, String>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn set(&self, key: &str, value: &str) -> CacheResult<()> {
        self.conn.execute(
            "INSERT INTO session_kv (key, value)
             VALUES (?1, ?2)
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![key, value],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> CacheResult<()> {
        self.conn
            .execute("DELETE FROM session_kv WHERE key = ?1;", params![key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteSessionCache;
    use crate::cache::{open_cache_in_memory, SessionCache};

    #[test]
    fn set_overwrites_and_remove_is_idempotent() {
        let conn = open_cache_in_memory().unwrap();
        let cache = SqliteSessionCache::new(&conn);

        assert_eq!(cache.get("currentUserId").unwrap(), None);
        cache.set("currentUserId", "u1").unwrap();
        cache.set("currentUserId", "u2").unwrap();
        assert_eq!(cache.get("currentUserId").unwrap().as_deref(), Some("u2"));

        cache.remove("currentUserId").unwrap();
        cache.remove("currentUserId").unwrap();
        assert_eq!(cache.get("currentUserId").unwrap(), None);
    }
}
