//! Value types produced by the catalog: identifiers and per-project summaries.

use crate::catalog::kind::Kind;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An (office, name) pair naming a project or a child structure.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct CwmsId {
    pub office_id: String,
    pub name: String,
}

impl CwmsId {
    pub fn new(office_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            office_id: office_id.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for CwmsId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.office_id, self.name)
    }
}

/// Summary of the child structures of one project.
///
/// A kind's list is `Some` only when that kind was queried and returned at least
/// one structure for the project; it is never `Some(vec![])`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectChildren {
    pub project: CwmsId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub embankments: Option<Vec<CwmsId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub locks: Option<Vec<CwmsId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outlets: Option<Vec<CwmsId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub turbines: Option<Vec<CwmsId>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gates: Option<Vec<CwmsId>>,
}

impl ProjectChildren {
    pub fn children(&self, kind: Kind) -> Option<&[CwmsId]> {
        let list = match kind {
            Kind::Embankment => &self.embankments,
            Kind::Lock => &self.locks,
            Kind::Outlet => &self.outlets,
            Kind::Turbine => &self.turbines,
            Kind::Gate => &self.gates,
        };
        list.as_deref()
    }

    /// Kinds with data for this project, in processing order.
    pub fn present_kinds(&self) -> Vec<Kind> {
        Kind::ALL
            .into_iter()
            .filter(|kind| self.children(*kind).is_some())
            .collect()
    }
}

/// Mutable accumulator for one project while kinds are merged in.
#[derive(Debug, Clone)]
pub struct ProjectChildrenBuilder {
    project: CwmsId,
    embankments: Vec<CwmsId>,
    locks: Vec<CwmsId>,
    outlets: Vec<CwmsId>,
    turbines: Vec<CwmsId>,
    gates: Vec<CwmsId>,
}

impl ProjectChildrenBuilder {
    pub fn new(project: CwmsId) -> Self {
        Self {
            project,
            embankments: Vec::new(),
            locks: Vec::new(),
            outlets: Vec::new(),
            turbines: Vec::new(),
            gates: Vec::new(),
        }
    }

    // Setters replace rather than append.
    pub fn with_embankments(&mut self, ids: Vec<CwmsId>) -> &mut Self {
        self.embankments = ids;
        self
    }

    pub fn with_locks(&mut self, ids: Vec<CwmsId>) -> &mut Self {
        self.locks = ids;
        self
    }

    pub fn with_outlets(&mut self, ids: Vec<CwmsId>) -> &mut Self {
        self.outlets = ids;
        self
    }

    pub fn with_turbines(&mut self, ids: Vec<CwmsId>) -> &mut Self {
        self.turbines = ids;
        self
    }

    pub fn with_gates(&mut self, ids: Vec<CwmsId>) -> &mut Self {
        self.gates = ids;
        self
    }

    pub fn build(self) -> ProjectChildren {
        fn present(ids: Vec<CwmsId>) -> Option<Vec<CwmsId>> {
            (!ids.is_empty()).then_some(ids)
        }

        ProjectChildren {
            project: self.project,
            embankments: present(self.embankments),
            locks: present(self.locks),
            outlets: present(self.outlets),
            turbines: present(self.turbines),
            gates: present(self.gates),
        }
    }
}
