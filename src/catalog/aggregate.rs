//! Aggregator: folds per-kind child sets into one summary per project.

use crate::catalog::fetch::{self, ChildSource};
use crate::catalog::kind::{self, KindSet};
use crate::catalog::model::{CwmsId, ProjectChildren, ProjectChildrenBuilder};
use crate::core::broker::DbBroker;
use crate::core::db;
use crate::core::error::CatalogError;
use crate::core::store::Store;
use indexmap::IndexMap;

/// Children for every project of `office`, restricted to kinds matching `kind_pattern`.
///
/// `None` for either pattern means "match everything".
pub fn children<S>(
    source: &S,
    office: &str,
    project_like: Option<&str>,
    kind_pattern: Option<&str>,
) -> Result<Vec<ProjectChildren>, CatalogError>
where
    S: ChildSource + ?Sized,
{
    children_of_kinds(source, office, project_like, &kind::matching_kinds(kind_pattern))
}

/// Kinds are read in [`Kind::ALL`](crate::catalog::kind::Kind::ALL) order regardless
/// of set iteration order. A project takes its position from the first kind that
/// reports it. The first fetch error aborts the whole call.
pub fn children_of_kinds<S>(
    source: &S,
    office: &str,
    project_like: Option<&str>,
    kinds: &KindSet,
) -> Result<Vec<ProjectChildren>, CatalogError>
where
    S: ChildSource + ?Sized,
{
    let mut builders: IndexMap<String, ProjectChildrenBuilder> = IndexMap::new();

    for kind in kind::ordered(kinds) {
        let Some(handler) = fetch::handler(kind) else {
            continue;
        };
        let child_set = source.children_of_kind(kind, office, project_like)?;
        if child_set.is_empty() {
            continue;
        }

        for (project_id, ids) in child_set {
            let builder = builders
                .entry(project_id.clone())
                .or_insert_with(|| ProjectChildrenBuilder::new(CwmsId::new(office, project_id)));
            (handler.attach)(builder, ids);
        }
    }

    tracing::debug!(office, projects = builders.len(), "aggregated project children");
    Ok(builders
        .into_values()
        .map(ProjectChildrenBuilder::build)
        .collect())
}

/// A catalog query as issued by a caller.
#[derive(Debug, Clone, Default)]
pub struct ChildrenRequest {
    pub office: String,
    pub project_like: Option<String>,
    pub kinds: KindSelection,
}

#[derive(Debug, Clone, Default)]
pub enum KindSelection {
    /// Every kind.
    #[default]
    All,
    /// Kinds whose name matches a case-insensitive pattern.
    Pattern(String),
    /// An explicit selection.
    Kinds(KindSet),
}

impl KindSelection {
    pub fn resolve(&self) -> KindSet {
        match self {
            KindSelection::All => kind::matching_kinds(None),
            KindSelection::Pattern(pattern) => kind::matching_kinds(Some(pattern)),
            KindSelection::Kinds(kinds) => kinds.clone(),
        }
    }
}

/// Run a request against the store's catalog database.
///
/// All kind reads share one read transaction, so they see a single snapshot.
pub fn catalog_children(
    store: &Store,
    request: &ChildrenRequest,
) -> Result<Vec<ProjectChildren>, CatalogError> {
    if request.office.trim().is_empty() {
        return Err(CatalogError::ValidationError("office is required".into()));
    }

    let kinds = request.kinds.resolve();
    let broker = DbBroker::new(store);
    broker.with_conn(&db::catalog_db_path(store), "catalog", "catalog.children", |conn| {
        let tx = conn.unchecked_transaction()?;
        let result = children_of_kinds(
            &*tx,
            &request.office,
            request.project_like.as_deref(),
            &kinds,
        )?;
        tx.commit()?;
        Ok(result)
    })
}
