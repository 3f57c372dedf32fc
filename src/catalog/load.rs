//! Bulk import of source rows from a JSON document.

use crate::core::broker::DbBroker;
use crate::core::db;
use crate::core::error::CatalogError;
use crate::core::store::Store;
use rusqlite::{Connection, params};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogRows {
    pub embankments: Vec<EmbankmentRow>,
    pub locks: Vec<LockRow>,
    pub outlets: Vec<OutletRow>,
    pub turbines: Vec<TurbineRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbankmentRow {
    pub office_id: String,
    pub embankment_location_id: String,
    pub project_id: String,
    pub unit_system: String,
    #[serde(default)]
    pub structure_type: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockRow {
    pub db_office_id: String,
    pub lock_id: String,
    pub project_id: String,
    #[serde(default)]
    pub lock_width: Option<f64>,
    #[serde(default)]
    pub lock_length: Option<f64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutletRow {
    pub office_id: String,
    pub outlet_id: String,
    pub project_id: String,
    #[serde(default)]
    pub rating_group_id: Option<String>,
    #[serde(default)]
    pub opening_unit_en: Option<String>,
    #[serde(default)]
    pub opening_unit_si: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TurbineRow {
    pub office_id: String,
    pub turbine_id: String,
    pub project_id: String,
    #[serde(default)]
    pub turbine_capacity: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct LoadSummary {
    pub embankments: usize,
    pub locks: usize,
    pub outlets: usize,
    pub turbines: usize,
}

pub fn read_rows_file(path: &Path) -> Result<CatalogRows, CatalogError> {
    let content = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&content)?)
}

/// Insert every row in one transaction; nothing is written if any insert fails.
pub fn load_rows(store: &Store, rows: &CatalogRows) -> Result<LoadSummary, CatalogError> {
    let broker = DbBroker::new(store);
    broker.with_conn(&db::catalog_db_path(store), "catalog", "catalog.load", |conn| {
        let tx = conn.unchecked_transaction()?;
        let summary = insert_rows(&tx, rows)?;
        tx.commit()?;
        tracing::info!(
            embankments = summary.embankments,
            locks = summary.locks,
            outlets = summary.outlets,
            turbines = summary.turbines,
            "loaded catalog rows"
        );
        Ok(summary)
    })
}

fn insert_rows(conn: &Connection, rows: &CatalogRows) -> Result<LoadSummary, CatalogError> {
    let mut summary = LoadSummary::default();

    let mut stmt = conn.prepare(
        "INSERT INTO av_embankment(office_id, embankment_location_id, project_id, unit_system, structure_type) VALUES(?1, ?2, ?3, ?4, ?5)",
    )?;
    for row in &rows.embankments {
        summary.embankments += stmt.execute(params![
            row.office_id,
            row.embankment_location_id,
            row.project_id,
            row.unit_system,
            row.structure_type
        ])?;
    }

    let mut stmt = conn.prepare(
        "INSERT INTO av_lock(db_office_id, lock_id, project_id, lock_width, lock_length) VALUES(?1, ?2, ?3, ?4, ?5)",
    )?;
    for row in &rows.locks {
        summary.locks += stmt.execute(params![
            row.db_office_id,
            row.lock_id,
            row.project_id,
            row.lock_width,
            row.lock_length
        ])?;
    }

    let mut stmt = conn.prepare(
        "INSERT INTO av_outlet(office_id, outlet_id, project_id, rating_group_id, opening_unit_en, opening_unit_si) VALUES(?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for row in &rows.outlets {
        summary.outlets += stmt.execute(params![
            row.office_id,
            row.outlet_id,
            row.project_id,
            row.rating_group_id,
            row.opening_unit_en,
            row.opening_unit_si
        ])?;
    }

    let mut stmt = conn.prepare(
        "INSERT INTO av_turbine(office_id, turbine_id, project_id, turbine_capacity) VALUES(?1, ?2, ?3, ?4)",
    )?;
    for row in &rows.turbines {
        summary.turbines += stmt.execute(params![
            row.office_id,
            row.turbine_id,
            row.project_id,
            row.turbine_capacity
        ])?;
    }

    Ok(summary)
}
