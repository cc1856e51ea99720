//! Connection bootstrap for the session cache.
//!
//! # Invariants
//! - Returned connections have migrations fully applied.
//! - The parent directory of a file cache is created on demand.

use super::migrations::apply_migrations;
use super::{CacheError, CacheResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::{Duration, Instant};

/// Opens (or creates) the cache database file and applies pending migrations.
///
/// # Side effects
/// - Emits `cache_open` logging events with duration and status.
pub fn open_cache(path: impl AsRef<Path>) -> CacheResult<Connection> {
    let path = path.as_ref();
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| {
            error!(
                "event=cache_open module=cache status=error mode=file error_code=cache_dir_failed"
            );
            CacheError::Io {
                path: parent.to_path_buf(),
                source,
            }
        })?;
    }
    open_with("file", || Connection::open(path))
}

/// Opens a throwaway in-memory cache with migrations applied.
pub fn open_cache_in_memory() -> CacheResult<Connection> {
    open_with("memory", Connection::open_in_memory)
}

fn open_with<F>(mode: &'static str, open: F) -> CacheResult<Connection>
where
    F: FnOnce() -> rusqlite::Result<Connection>,
{
    let started_at = Instant::now();
    info!("event=cache_open module=cache status=start mode={mode}");

    let mut conn = match open() {
        Ok(conn) => conn,
        Err(err) => {
            error!(
                "event=cache_open module=cache status=error mode={} duration_ms={} error_code=cache_open_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            return Err(err.into());
        }
    };

    match bootstrap_connection(&mut conn) {
        Ok(()) => {
            info!(
                "event=cache_open module=cache status=ok mode={} duration_ms={}",
                mode,
                started_at.elapsed().as_millis()
            );
            Ok(conn)
        }
        Err(err) => {
            error!(
                "event=cache_open module=cache status=error mode={} duration_ms={} error_code=cache_bootstrap_failed error={}",
                mode,
                started_at.elapsed().as_millis(),
                err
            );
            Err(err)
        }
    }
}

fn bootstrap_connection(conn: &mut Connection) -> CacheResult<()> {
    conn.busy_timeout(Duration::from_secs(5))?;
    apply_migrations(conn)?;
    Ok(())
}
