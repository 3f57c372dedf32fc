//! Kind Fetchers: one read per kind against its source relation.
//!
//! Every fetcher selects distinct (office, child, project) tuples for one office,
//! optionally narrowed by a case-insensitive project pattern, ordered by
//! (office, project, child). Rows are grouped by project in scan order.

use crate::catalog::kind::Kind;
use crate::catalog::model::{CwmsId, ProjectChildrenBuilder};
use crate::core::db::REGEXP_LIKE_FN;
use crate::core::error::CatalogError;
use indexmap::IndexMap;
use rusqlite::{Connection, Row, params};

/// Project id to that project's children of one kind, in retrieval order.
pub type ChildSet = IndexMap<String, Vec<CwmsId>>;

/// Anything that can answer "children of this kind, per project".
pub trait ChildSource {
    fn children_of_kind(
        &self,
        kind: Kind,
        office: &str,
        project_like: Option<&str>,
    ) -> Result<ChildSet, CatalogError>;
}

type FetchFn = fn(&Connection, &str, Option<&str>) -> Result<ChildSet, CatalogError>;
type AttachFn = fn(&mut ProjectChildrenBuilder, Vec<CwmsId>);

/// Dispatch entry for one kind: how to read it and where its list goes.
pub struct KindHandler {
    pub kind: Kind,
    pub fetch: FetchFn,
    pub attach: AttachFn,
}

pub static HANDLERS: [KindHandler; 5] = [
    KindHandler {
        kind: Kind::Embankment,
        fetch: fetch_embankments,
        attach: attach_embankments,
    },
    KindHandler {
        kind: Kind::Lock,
        fetch: fetch_locks,
        attach: attach_locks,
    },
    KindHandler {
        kind: Kind::Outlet,
        fetch: fetch_outlets,
        attach: attach_outlets,
    },
    KindHandler {
        kind: Kind::Turbine,
        fetch: fetch_turbines,
        attach: attach_turbines,
    },
    KindHandler {
        kind: Kind::Gate,
        fetch: fetch_gates,
        attach: attach_gates,
    },
];

pub fn handler(kind: Kind) -> Option<&'static KindHandler> {
    HANDLERS.iter().find(|h| h.kind == kind)
}

impl ChildSource for Connection {
    fn children_of_kind(
        &self,
        kind: Kind,
        office: &str,
        project_like: Option<&str>,
    ) -> Result<ChildSet, CatalogError> {
        match handler(kind) {
            Some(h) => (h.fetch)(self, office, project_like),
            None => Ok(ChildSet::new()),
        }
    }
}

// Embankment rows repeat once per unit system.
const REFERENCE_UNIT_PREDICATE: &str = "unit_system = 'SI'";

/// Column layout of one source relation.
struct SourceQuery {
    relation: &'static str,
    office_col: &'static str,
    child_col: &'static str,
    project_col: &'static str,
    /// Existence predicate for rows that really are this kind.
    predicate: Option<&'static str>,
}

impl SourceQuery {
    fn sql(&self, with_project_filter: bool) -> String {
        let mut sql = format!(
            "SELECT DISTINCT {office}, {child}, {project} FROM {relation} WHERE {office} = ?1",
            office = self.office_col,
            child = self.child_col,
            project = self.project_col,
            relation = self.relation,
        );
        if let Some(predicate) = self.predicate {
            sql.push_str(" AND (");
            sql.push_str(predicate);
            sql.push(')');
        }
        if with_project_filter {
            sql.push_str(&format!(" AND {}(?2, {})", REGEXP_LIKE_FN, self.project_col));
        }
        sql.push_str(&format!(
            " ORDER BY {}, {}, {}",
            self.office_col, self.project_col, self.child_col
        ));
        sql
    }

    fn scan(
        &self,
        conn: &Connection,
        office: &str,
        project_like: Option<&str>,
    ) -> Result<ChildSet, CatalogError> {
        fn read_row(row: &Row<'_>) -> rusqlite::Result<(String, String, String)> {
            Ok((row.get(0)?, row.get(1)?, row.get(2)?))
        }

        let mut stmt = conn.prepare(&self.sql(project_like.is_some()))?;
        let rows = match project_like {
            Some(pattern) => stmt
                .query_map(params![office, pattern], read_row)?
                .collect::<Result<Vec<_>, _>>()?,
            None => stmt
                .query_map(params![office], read_row)?
                .collect::<Result<Vec<_>, _>>()?,
        };

        let mut retval = ChildSet::new();
        for (row_office, child, project) in rows {
            retval
                .entry(project)
                .or_default()
                .push(CwmsId::new(row_office, child));
        }

        tracing::debug!(
            relation = self.relation,
            office,
            projects = retval.len(),
            children = retval.values().map(Vec::len).sum::<usize>(),
            "scanned child relation"
        );
        Ok(retval)
    }
}

pub fn fetch_embankments(
    conn: &Connection,
    office: &str,
    project_like: Option<&str>,
) -> Result<ChildSet, CatalogError> {
    SourceQuery {
        relation: "av_embankment",
        office_col: "office_id",
        child_col: "embankment_location_id",
        project_col: "project_id",
        predicate: Some(REFERENCE_UNIT_PREDICATE),
    }
    .scan(conn, office, project_like)
}

pub fn fetch_locks(
    conn: &Connection,
    office: &str,
    project_like: Option<&str>,
) -> Result<ChildSet, CatalogError> {
    SourceQuery {
        relation: "av_lock",
        office_col: "db_office_id",
        child_col: "lock_id",
        project_col: "project_id",
        predicate: None,
    }
    .scan(conn, office, project_like)
}

pub fn fetch_outlets(
    conn: &Connection,
    office: &str,
    project_like: Option<&str>,
) -> Result<ChildSet, CatalogError> {
    SourceQuery {
        relation: "av_outlet",
        office_col: "office_id",
        child_col: "outlet_id",
        project_col: "project_id",
        predicate: None,
    }
    .scan(conn, office, project_like)
}

pub fn fetch_turbines(
    conn: &Connection,
    office: &str,
    project_like: Option<&str>,
) -> Result<ChildSet, CatalogError> {
    SourceQuery {
        relation: "av_turbine",
        office_col: "office_id",
        child_col: "turbine_id",
        project_col: "project_id",
        predicate: None,
    }
    .scan(conn, office, project_like)
}

/// Gates have no relation of their own: an outlet row with a gate-opening unit
/// in either unit system is a gate.
pub fn fetch_gates(
    conn: &Connection,
    office: &str,
    project_like: Option<&str>,
) -> Result<ChildSet, CatalogError> {
    SourceQuery {
        relation: "av_outlet",
        office_col: "office_id",
        child_col: "outlet_id",
        project_col: "project_id",
        predicate: Some("opening_unit_en IS NOT NULL OR opening_unit_si IS NOT NULL"),
    }
    .scan(conn, office, project_like)
}

fn attach_embankments(builder: &mut ProjectChildrenBuilder, ids: Vec<CwmsId>) {
    builder.with_embankments(ids);
}

fn attach_locks(builder: &mut ProjectChildrenBuilder, ids: Vec<CwmsId>) {
    builder.with_locks(ids);
}

fn attach_outlets(builder: &mut ProjectChildrenBuilder, ids: Vec<CwmsId>) {
    builder.with_outlets(ids);
}

fn attach_turbines(builder: &mut ProjectChildrenBuilder, ids: Vec<CwmsId>) {
    builder.with_turbines(ids);
}

fn attach_gates(builder: &mut ProjectChildrenBuilder, ids: Vec<CwmsId>) {
    builder.with_gates(ids);
}
