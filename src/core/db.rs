use crate::core::broker::DbBroker;
use crate::core::error;
use crate::core::schemas;
use crate::core::store::Store;
use regex::RegexBuilder;
use rusqlite::Connection;
use rusqlite::functions::FunctionFlags;
use rusqlite::types::ValueRef;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Name of the SQL function `regexp_like(pattern, text)` registered on every connection.
pub const REGEXP_LIKE_FN: &str = "regexp_like";

pub fn db_connect(db_path: &str, busy_timeout: Duration) -> Result<Connection, error::CatalogError> {
    let conn = Connection::open(db_path)?;
    conn.busy_timeout(busy_timeout)
        .map_err(error::CatalogError::RusqliteError)?;
    conn.query_row("PRAGMA journal_mode=WAL;", [], |_| Ok(()))
        .map_err(error::CatalogError::RusqliteError)?;
    register_regexp_like(&conn)?;
    Ok(conn)
}

/// Case-insensitive, unanchored regular-expression match.
///
/// The compiled pattern is cached as auxiliary data for the lifetime of the
/// prepared statement, so a scan compiles the pattern once. A NULL subject never
/// matches. A pattern that fails to compile is reported as a user-function error.
pub fn register_regexp_like(conn: &Connection) -> Result<(), error::CatalogError> {
    conn.create_scalar_function(
        REGEXP_LIKE_FN,
        2,
        FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
        |ctx| {
            let re: Arc<regex::Regex> = ctx.get_or_create_aux(0, |vr| -> Result<_, BoxError> {
                Ok(RegexBuilder::new(vr.as_str()?)
                    .case_insensitive(true)
                    .build()?)
            })?;
            let text = match ctx.get_raw(1) {
                ValueRef::Null => return Ok(false),
                value => value
                    .as_str()
                    .map_err(|e| rusqlite::Error::UserFunctionError(e.into()))?,
            };
            Ok(re.is_match(text))
        },
    )?;
    Ok(())
}

pub fn catalog_db_path(store: &Store) -> PathBuf {
    store.root.join(&store.config.db_name)
}

pub fn initialize_catalog_db(store: &Store) -> Result<(), error::CatalogError> {
    fs::create_dir_all(&store.root).map_err(error::CatalogError::IoError)?;

    let broker = DbBroker::new(store);
    broker.with_conn(&catalog_db_path(store), "catalog", "catalog.init", |conn| {
        for stmt in schemas::CATALOG_DB_SCHEMA {
            conn.execute(stmt, [])?;
        }
        Ok(())
    })
}
