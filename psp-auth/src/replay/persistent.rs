//! The durable replay store: a SQLite table of used codes with a
//! background task that sweeps out expired rows.

use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use rusqlite::{params, Connection, TransactionBehavior};
use tokio::sync::{Mutex, Notify};
use tokio::task::JoinHandle;

use super::MarkOutcome;
use crate::error::ReplayError;

const SCHEMA: &str = "
CREATE TABLE IF NOT EXISTS httppubsub_hmacs (
    code BLOB PRIMARY KEY,
    expires_at INTEGER NOT NULL
) WITHOUT ROWID;
CREATE INDEX IF NOT EXISTS idx_httppubsub_hmacs_expires_at
    ON httppubsub_hmacs (expires_at);
";

fn now_secs() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as i64)
        .unwrap_or(0)
}

fn sqlite_err(err: rusqlite::Error) -> ReplayError {
    ReplayError::Unavailable(err.to_string())
}

/// A SQLite-backed store of HMAC digests seen within the current
/// token lifetime, reaped by a background task once they expire.
pub struct PersistentReplayStore {
    connection: Mutex<Option<Connection>>,
    reaper: Mutex<Option<JoinHandle<()>>>,
    wake: Arc<Notify>,
    token_lifetime_secs: i64,
    cleanup_batch_delay_secs: i64,
}

impl PersistentReplayStore {
    /// Opens (and migrates) the store at `path`. Use `":memory:"` for an
    /// ephemeral, process-local store.
    pub fn open(
        path: &str,
        token_lifetime_secs: i64,
        cleanup_batch_delay_secs: i64,
    ) -> Result<Self, ReplayError> {
        let connection = Connection::open(path).map_err(sqlite_err)?;
        connection.execute_batch(SCHEMA).map_err(sqlite_err)?;
        Ok(Self {
            connection: Mutex::new(Some(connection)),
            reaper: Mutex::new(None),
            wake: Arc::new(Notify::new()),
            token_lifetime_secs,
            cleanup_batch_delay_secs,
        })
    }

    /// Starts the background reaper, if it is not already running.
    pub async fn setup(self: &Arc<Self>) -> Result<(), ReplayError> {
        let mut reaper = self.reaper.lock().await;
        if reaper.is_none() {
            let store = Arc::clone(self);
            *reaper = Some(tokio::spawn(Self::reap_loop(store)));
        }
        Ok(())
    }

    /// Cancels the reaper and closes the connection. Each step is best
    /// effort and independent of the others: a failure closing the
    /// connection does not leave the reaper running, nor vice versa.
    pub async fn teardown(&self) -> Result<(), ReplayError> {
        if let Some(handle) = self.reaper.lock().await.take() {
            handle.abort();
        }
        let mut guard = self.connection.lock().await;
        if let Some(connection) = guard.take() {
            connection.flush_prepared_statement_cache();
            if let Err((_, err)) = connection.close() {
                return Err(sqlite_err(err));
            }
        }
        Ok(())
    }

    /// Inserts `code` if absent, expiring it `token_lifetime_secs` from
    /// now. The insert-then-check-rowcount dance runs inside an
    /// immediate transaction so two concurrent callers can never both
    /// observe `Ok` for the same code.
    pub async fn mark_code_used(&self, code: &[u8; 64]) -> Result<MarkOutcome, ReplayError> {
        let expires_at = now_secs() + self.token_lifetime_secs;
        let mut guard = self.connection.lock().await;
        let connection = guard
            .as_mut()
            .ok_or_else(|| ReplayError::Unavailable("replay store is closed".to_string()))?;

        let tx = connection
            .transaction_with_behavior(TransactionBehavior::Immediate)
            .map_err(sqlite_err)?;
        let inserted = tx
            .execute(
                "INSERT INTO httppubsub_hmacs (code, expires_at)
                 SELECT ?1, ?2 WHERE NOT EXISTS (
                     SELECT 1 FROM httppubsub_hmacs WHERE code = ?1
                 )",
                params![code.as_slice(), expires_at],
            )
            .map_err(sqlite_err)?;
        if inserted == 0 {
            tx.rollback().map_err(sqlite_err)?;
            return Ok(MarkOutcome::Conflict);
        }
        tx.commit().map_err(sqlite_err)?;
        drop(guard);
        self.wake.notify_one();
        Ok(MarkOutcome::Ok)
    }

    async fn reap_loop(store: Arc<Self>) {
        loop {
            let earliest = {
                let mut guard = store.connection.lock().await;
                let Some(connection) = guard.as_mut() else {
                    return;
                };
                let now = now_secs();
                if let Err(err) =
                    connection.execute("DELETE FROM httppubsub_hmacs WHERE expires_at < ?1", params![now])
                {
                    log::warn!("replay store expiry sweep failed: {err}");
                }
                connection
                    .query_row("SELECT MIN(expires_at) FROM httppubsub_hmacs", [], |row| {
                        row.get::<_, Option<i64>>(0)
                    })
                    .ok()
                    .flatten()
            };

            let now = now_secs();
            match earliest {
                None => {
                    let fallback = Duration::from_secs(
                        (store.token_lifetime_secs + store.cleanup_batch_delay_secs).max(1) as u64,
                    );
                    let _ = tokio::time::timeout(fallback, store.wake.notified()).await;
                    tokio::time::sleep(fallback).await;
                }
                Some(earliest) => {
                    let delay = (earliest - now).max(store.cleanup_batch_delay_secs).max(0);
                    tokio::time::sleep(Duration::from_secs(delay as u64)).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn first_mark_ok_second_is_conflict() {
        let store = PersistentReplayStore::open(":memory:", 60, 5).unwrap();
        let code = [7u8; 64];
        assert_eq!(store.mark_code_used(&code).await.unwrap(), MarkOutcome::Ok);
        assert_eq!(store.mark_code_used(&code).await.unwrap(), MarkOutcome::Conflict);
    }

    #[tokio::test]
    async fn distinct_codes_do_not_conflict() {
        let store = PersistentReplayStore::open(":memory:", 60, 5).unwrap();
        assert_eq!(store.mark_code_used(&[1u8; 64]).await.unwrap(), MarkOutcome::Ok);
        assert_eq!(store.mark_code_used(&[2u8; 64]).await.unwrap(), MarkOutcome::Ok);
    }

    #[tokio::test]
    async fn setup_and_teardown_cycle_reaper() {
        let store = Arc::new(PersistentReplayStore::open(":memory:", 60, 5).unwrap());
        store.setup().await.unwrap();
        assert!(store.reaper.lock().await.is_some());
        store.teardown().await.unwrap();
        assert!(store.reaper.lock().await.is_none());
        assert!(store.connection.lock().await.is_none());
    }

    #[tokio::test]
    async fn mark_code_used_after_teardown_is_unavailable() {
        let store = Arc::new(PersistentReplayStore::open(":memory:", 60, 5).unwrap());
        store.teardown().await.unwrap();
        assert!(store.mark_code_used(&[3u8; 64]).await.is_err());
    }
}
