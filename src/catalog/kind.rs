//! Kind Registry: the fixed set of child-structure kinds and pattern-based selection.

use regex::RegexBuilder;
use rustc_hash::FxHashSet;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Kind {
    Embankment,
    Lock,
    Outlet,
    Turbine,
    Gate,
}

/// Unordered selection of kinds. Aggregation order comes from [`Kind::ALL`].
pub type KindSet = FxHashSet<Kind>;

impl Kind {
    /// Processing order for aggregation.
    pub const ALL: [Kind; 5] = [
        Kind::Embankment,
        Kind::Lock,
        Kind::Outlet,
        Kind::Turbine,
        Kind::Gate,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Kind::Embankment => "EMBANKMENT",
            Kind::Lock => "LOCK",
            Kind::Outlet => "OUTLET",
            Kind::Turbine => "TURBINE",
            Kind::Gate => "GATE",
        }
    }

    /// Field name used for this kind's list in a project summary.
    pub fn field_name(self) -> &'static str {
        match self {
            Kind::Embankment => "embankments",
            Kind::Lock => "locks",
            Kind::Outlet => "outlets",
            Kind::Turbine => "turbines",
            Kind::Gate => "gates",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown structure kind: {0}")]
pub struct ParseKindError(pub String);

impl FromStr for Kind {
    type Err = ParseKindError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let token = s.trim();
        Kind::ALL
            .into_iter()
            .find(|kind| {
                token.eq_ignore_ascii_case(kind.name()) || token.eq_ignore_ascii_case(kind.field_name())
            })
            .ok_or_else(|| ParseKindError(s.to_string()))
    }
}

/// Kinds whose canonical name matches `pattern` case-insensitively.
///
/// `None` selects every kind. The match is a search, so an empty pattern also
/// selects every kind. A pattern that does not compile selects nothing.
pub fn matching_kinds(pattern: Option<&str>) -> KindSet {
    let Some(pattern) = pattern else {
        return Kind::ALL.into_iter().collect();
    };

    match RegexBuilder::new(pattern).case_insensitive(true).build() {
        Ok(re) => Kind::ALL
            .into_iter()
            .filter(|kind| re.is_match(kind.name()))
            .collect(),
        Err(e) => {
            tracing::debug!(pattern, error = %e, "kind pattern does not compile; selecting no kinds");
            KindSet::default()
        }
    }
}

/// Build a selection from explicit tokens. Unknown tokens are skipped.
pub fn kinds_from_tokens<I, S>(tokens: I) -> KindSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    tokens
        .into_iter()
        .filter_map(|token| match token.as_ref().parse::<Kind>() {
            Ok(kind) => Some(kind),
            Err(e) => {
                tracing::debug!(error = %e, "ignoring kind token");
                None
            }
        })
        .collect()
}

/// The selected kinds in processing order.
pub fn ordered(kinds: &KindSet) -> Vec<Kind> {
    Kind::ALL
        .into_iter()
        .filter(|kind| kinds.contains(kind))
        .collect()
}
