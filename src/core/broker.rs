use crate::core::db;
use crate::core::error;
use crate::core::store::Store;
use crate::core::time;
use rusqlite::Connection;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

pub const AUDIT_LOG_NAME: &str = "catalog.events.jsonl";

/// The DB Broker is the single path to the catalog database.
/// It serializes access in-process and records one audit event per operation.
pub struct DbBroker {
    audit_log_path: PathBuf,
    audit: bool,
    busy_timeout: Duration,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct BrokerEvent {
    pub ts: String,
    pub event_id: String,
    pub actor: String,
    pub op: String,
    pub db_id: String,
    pub status: String,
}

impl DbBroker {
    pub fn new(store: &Store) -> Self {
        Self {
            audit_log_path: store.root.join(AUDIT_LOG_NAME),
            audit: store.config.audit,
            busy_timeout: store.config.busy_timeout(),
        }
    }

    /// Execute a closure with a serialized connection to the specified DB.
    pub fn with_conn<F, R>(
        &self,
        db_path: &Path,
        actor: &str,
        op_name: &str,
        f: F,
    ) -> Result<R, error::CatalogError>
    where
        F: FnOnce(&Connection) -> Result<R, error::CatalogError>,
    {
        static DB_LOCK: Mutex<()> = Mutex::new(());
        let _lock = DB_LOCK
            .lock()
            .map_err(|_| error::CatalogError::BrokerError("database lock poisoned".into()))?;

        let db_id = db_path
            .file_name()
            .unwrap_or_default()
            .to_string_lossy()
            .to_string();
        let conn = db::db_connect(&db_path.to_string_lossy(), self.busy_timeout)?;

        let _span = tracing::debug_span!("broker", op = op_name, db = %db_id).entered();
        let result = f(&conn);

        let status = if result.is_ok() { "success" } else { "error" };
        tracing::debug!(status, "broker operation finished");
        // The audit line never replaces the operation's own outcome.
        if self.audit
            && let Err(e) = self.log_event(actor, op_name, &db_id, status)
        {
            tracing::warn!(error = %e, op = op_name, "failed to append audit event");
        }

        result
    }

    fn log_event(
        &self,
        actor: &str,
        op: &str,
        db_id: &str,
        status: &str,
    ) -> Result<(), error::CatalogError> {
        use std::fs::OpenOptions;
        use std::io::Write;

        let ev = BrokerEvent {
            ts: time::now_epoch_z(),
            event_id: time::new_event_id(),
            actor: actor.to_string(),
            op: op.to_string(),
            db_id: db_id.to_string(),
            status: status.to_string(),
        };

        let mut f = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.audit_log_path)
            .map_err(error::CatalogError::IoError)?;

        writeln!(f, "{}", serde_json::to_string(&ev)?).map_err(error::CatalogError::IoError)?;
        Ok(())
    }
}

/// Read back the audit log, oldest first. A missing log reads as empty.
pub fn read_audit_log(store: &Store) -> Result<Vec<BrokerEvent>, error::CatalogError> {
    let path = store.root.join(AUDIT_LOG_NAME);
    if !path.exists() {
        return Ok(Vec::new());
    }
    let content = std::fs::read_to_string(&path)?;
    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| serde_json::from_str(line).map_err(error::CatalogError::JsonError))
        .collect()
}
