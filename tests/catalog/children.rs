use project_catalog::catalog::aggregate::{
    ChildrenRequest, KindSelection, catalog_children, children, children_of_kinds,
};
use project_catalog::catalog::fetch::{self, ChildSource};
use project_catalog::catalog::kind::{Kind, KindSet, kinds_from_tokens, matching_kinds};
use project_catalog::catalog::load::{
    CatalogRows, EmbankmentRow, LockRow, OutletRow, TurbineRow, load_rows,
};
use project_catalog::catalog::model::{CwmsId, ProjectChildren};
use project_catalog::core::broker::read_audit_log;
use project_catalog::core::config::CatalogConfig;
use project_catalog::core::db;
use project_catalog::core::error::CatalogError;
use project_catalog::core::store::Store;
use rusqlite::Connection;
use std::collections::HashSet;
use tempfile::{TempDir, tempdir};

fn embankment(office: &str, id: &str, project: &str, unit_system: &str) -> EmbankmentRow {
    EmbankmentRow {
        office_id: office.to_string(),
        embankment_location_id: id.to_string(),
        project_id: project.to_string(),
        unit_system: unit_system.to_string(),
        structure_type: Some("Earthfill".to_string()),
    }
}

fn lock(office: &str, id: &str, project: &str) -> LockRow {
    LockRow {
        db_office_id: office.to_string(),
        lock_id: id.to_string(),
        project_id: project.to_string(),
        lock_width: Some(26.0),
        lock_length: Some(183.0),
    }
}

fn outlet(office: &str, id: &str, project: &str, en: Option<&str>, si: Option<&str>) -> OutletRow {
    OutletRow {
        office_id: office.to_string(),
        outlet_id: id.to_string(),
        project_id: project.to_string(),
        rating_group_id: None,
        opening_unit_en: en.map(str::to_string),
        opening_unit_si: si.map(str::to_string),
    }
}

fn turbine(office: &str, id: &str, project: &str) -> TurbineRow {
    TurbineRow {
        office_id: office.to_string(),
        turbine_id: id.to_string(),
        project_id: project.to_string(),
        turbine_capacity: Some(40.0),
    }
}

fn seeded_store(rows: &CatalogRows) -> (TempDir, Store) {
    let tmp = tempdir().expect("tempdir");
    let store = Store::new(tmp.path().join(".catalog"), CatalogConfig::default());
    db::initialize_catalog_db(&store).expect("init catalog db");
    load_rows(&store, rows).expect("load rows");
    (tmp, store)
}

fn connect(store: &Store) -> Connection {
    db::db_connect(
        &db::catalog_db_path(store).to_string_lossy(),
        store.config.busy_timeout(),
    )
    .expect("connect")
}

fn ids(office: &str, names: &[&str]) -> Option<Vec<CwmsId>> {
    Some(names.iter().map(|n| CwmsId::new(office, *n)).collect())
}

fn project_names(result: &[ProjectChildren]) -> Vec<&str> {
    result.iter().map(|p| p.project.name.as_str()).collect()
}

/// A mixed dataset over two offices with duplicates and non-gate outlets.
fn mixed_rows() -> CatalogRows {
    CatalogRows {
        embankments: vec![
            embankment("SPK", "E1", "DAM2", "SI"),
            embankment("SPK", "E1", "DAM2", "EN"),
            embankment("SPK", "E2", "DAM3", "SI"),
            embankment("SWT", "E9", "KEYSTONE", "SI"),
        ],
        locks: vec![
            lock("SPK", "L1", "DAM1"),
            lock("SPK", "L1", "DAM1"),
            lock("SPK", "L2", "DAM3"),
        ],
        outlets: vec![
            outlet("SPK", "O2", "DAM1", None, None),
            outlet("SPK", "O1", "DAM1", Some("ft"), None),
            outlet("SPK", "O3", "DAM3", None, Some("m")),
            outlet("SPK", "O4", "ZETA", Some("ft"), Some("m")),
        ],
        turbines: vec![turbine("SPK", "T1", "DAM3"), turbine("SWT", "T9", "KEYSTONE")],
    }
}

#[test]
fn scenario_locks_outlets_and_embankments() {
    let rows = CatalogRows {
        embankments: vec![embankment("SPK", "E1", "DAM2", "SI")],
        locks: vec![lock("SPK", "L1", "DAM1")],
        outlets: vec![outlet("SPK", "O1", "DAM1", None, None)],
        ..CatalogRows::default()
    };
    let (_tmp, store) = seeded_store(&rows);
    let conn = connect(&store);

    let kinds = kinds_from_tokens(["LOCK", "OUTLET", "EMBANKMENT"]);
    let result = children_of_kinds(&conn, "SPK", None, &kinds).unwrap();

    // EMBANKMENT is read first, so DAM2 takes the first slot.
    assert_eq!(
        result,
        vec![
            ProjectChildren {
                project: CwmsId::new("SPK", "DAM2"),
                embankments: ids("SPK", &["E1"]),
                locks: None,
                outlets: None,
                turbines: None,
                gates: None,
            },
            ProjectChildren {
                project: CwmsId::new("SPK", "DAM1"),
                embankments: None,
                locks: ids("SPK", &["L1"]),
                outlets: ids("SPK", &["O1"]),
                turbines: None,
                gates: None,
            },
        ]
    );
}

#[test]
fn project_first_seen_in_later_kind_sorts_after_earlier_kinds() {
    let rows = CatalogRows {
        locks: vec![lock("SPK", "L1", "ZULU")],
        outlets: vec![outlet("SPK", "O1", "ALPHA", Some("ft"), None)],
        ..CatalogRows::default()
    };
    let (_tmp, store) = seeded_store(&rows);
    let conn = connect(&store);

    let result = children(&conn, "SPK", None, None).unwrap();
    assert_eq!(project_names(&result), vec!["ZULU", "ALPHA"]);
    assert_eq!(result[1].outlets, ids("SPK", &["O1"]));
    assert_eq!(result[1].gates, ids("SPK", &["O1"]));
}

#[test]
fn gate_detected_from_either_opening_unit() {
    let (_tmp, store) = seeded_store(&mixed_rows());
    let conn = connect(&store);

    let gates = fetch::fetch_gates(&conn, "SPK", None).unwrap();
    assert_eq!(gates.get("DAM1"), Some(&vec![CwmsId::new("SPK", "O1")]));
    assert_eq!(gates.get("DAM3"), Some(&vec![CwmsId::new("SPK", "O3")]));
    assert_eq!(gates.get("ZETA"), Some(&vec![CwmsId::new("SPK", "O4")]));

    // O2 has no opening unit: an outlet, not a gate.
    let outlets = fetch::fetch_outlets(&conn, "SPK", None).unwrap();
    assert_eq!(outlets.get("DAM1"), ids("SPK", &["O1", "O2"]).as_ref());
}

#[test]
fn embankment_reads_reference_unit_system_only() {
    let (_tmp, store) = seeded_store(&mixed_rows());
    let conn = connect(&store);

    let embankments = fetch::fetch_embankments(&conn, "SPK", None).unwrap();
    assert_eq!(embankments.get("DAM2"), Some(&vec![CwmsId::new("SPK", "E1")]));

    let rows = CatalogRows {
        embankments: vec![embankment("SPK", "E5", "DAM5", "EN")],
        ..CatalogRows::default()
    };
    let (_tmp2, en_only) = seeded_store(&rows);
    let en_conn = connect(&en_only);
    assert!(fetch::fetch_embankments(&en_conn, "SPK", None).unwrap().is_empty());
}

#[test]
fn duplicate_source_rows_yield_one_identifier() {
    let (_tmp, store) = seeded_store(&mixed_rows());
    let conn = connect(&store);

    let locks = fetch::fetch_locks(&conn, "SPK", None).unwrap();
    assert_eq!(locks.get("DAM1"), Some(&vec![CwmsId::new("SPK", "L1")]));
}

#[test]
fn fetcher_orders_by_project_then_child() {
    let (_tmp, store) = seeded_store(&mixed_rows());
    let conn = connect(&store);

    let outlets = fetch::fetch_outlets(&conn, "SPK", None).unwrap();
    let projects: Vec<&str> = outlets.keys().map(String::as_str).collect();
    assert_eq!(projects, vec!["DAM1", "DAM3", "ZETA"]);
    assert_eq!(outlets["DAM1"], vec![CwmsId::new("SPK", "O1"), CwmsId::new("SPK", "O2")]);
}

#[test]
fn fetcher_with_no_rows_returns_empty_map() {
    let (_tmp, store) = seeded_store(&mixed_rows());
    let conn = connect(&store);

    for kind in Kind::ALL {
        let set = conn.children_of_kind(kind, "NWK", None).unwrap();
        assert!(set.is_empty(), "{} should be empty for NWK", kind);
    }
}

#[test]
fn office_is_an_exact_match() {
    let (_tmp, store) = seeded_store(&mixed_rows());
    let conn = connect(&store);

    let swt = children(&conn, "SWT", None, None).unwrap();
    assert_eq!(project_names(&swt), vec!["KEYSTONE"]);
    assert_eq!(swt[0].project.office_id, "SWT");
    assert_eq!(swt[0].turbines, ids("SWT", &["T9"]));

    assert!(children(&conn, "S.T", None, None).unwrap().is_empty());
    assert!(children(&conn, "swt", None, None).unwrap().is_empty());
}

#[test]
fn project_pattern_is_case_insensitive_search() {
    let (_tmp, store) = seeded_store(&mixed_rows());
    let conn = connect(&store);

    let result = children(&conn, "SPK", Some("dam"), None).unwrap();
    assert!(project_names(&result).iter().all(|n| n.starts_with("DAM")));
    assert!(!project_names(&result).contains(&"ZETA"));

    let anchored = children(&conn, "SPK", Some("^dam3$"), None).unwrap();
    assert_eq!(project_names(&anchored), vec!["DAM3"]);
}

#[test]
fn absent_project_pattern_equals_match_all() {
    let (_tmp, store) = seeded_store(&mixed_rows());
    let conn = connect(&store);

    let unfiltered = children(&conn, "SPK", None, None).unwrap();
    let match_all = children(&conn, "SPK", Some(".*"), None).unwrap();
    assert_eq!(unfiltered, match_all);
    assert!(!unfiltered.is_empty());
}

#[test]
fn empty_kind_set_yields_empty_result() {
    let (_tmp, store) = seeded_store(&mixed_rows());
    let conn = connect(&store);

    assert!(children_of_kinds(&conn, "SPK", None, &KindSet::default()).unwrap().is_empty());
    assert!(children(&conn, "SPK", None, Some("^spillway$")).unwrap().is_empty());
    assert!(children(&conn, "SPK", None, Some("[bad")).unwrap().is_empty());
}

#[test]
fn no_duplicate_projects_and_no_empty_lists() {
    let (_tmp, store) = seeded_store(&mixed_rows());
    let conn = connect(&store);

    let result = children(&conn, "SPK", None, None).unwrap();
    let mut seen = HashSet::new();
    for project in &result {
        assert!(seen.insert(project.project.clone()), "duplicate {}", project.project);
        for kind in Kind::ALL {
            if let Some(list) = project.children(kind) {
                assert!(!list.is_empty());
            }
        }
    }

    let dam3 = result.iter().find(|p| p.project.name == "DAM3").unwrap();
    assert_eq!(
        dam3.present_kinds(),
        vec![Kind::Embankment, Kind::Lock, Kind::Outlet, Kind::Turbine, Kind::Gate]
    );
}

#[test]
fn aggregation_is_idempotent() {
    let (_tmp, store) = seeded_store(&mixed_rows());
    let conn = connect(&store);

    let first = children(&conn, "SPK", Some("a"), Some("lock|outlet|gate")).unwrap();
    let second = children(&conn, "SPK", Some("a"), Some("lock|outlet|gate")).unwrap();
    assert_eq!(first, second);
}

#[test]
fn kind_pattern_restricts_fields() {
    let (_tmp, store) = seeded_store(&mixed_rows());
    let conn = connect(&store);

    let result = children(&conn, "SPK", None, Some("^turbine$")).unwrap();
    assert_eq!(project_names(&result), vec!["DAM3"]);
    assert_eq!(result[0].present_kinds(), vec![Kind::Turbine]);
    assert_eq!(matching_kinds(Some("^turbine$")).len(), 1);
}

#[test]
fn malformed_project_pattern_fails_whole_call() {
    let (_tmp, store) = seeded_store(&mixed_rows());
    let conn = connect(&store);

    let err = children(&conn, "SPK", Some("(unclosed"), None).unwrap_err();
    assert!(matches!(err, CatalogError::RusqliteError(_)));
}

#[test]
fn catalog_children_runs_through_broker() {
    let (_tmp, store) = seeded_store(&mixed_rows());

    let request = ChildrenRequest {
        office: "SPK".to_string(),
        project_like: Some("dam1".to_string()),
        kinds: KindSelection::Pattern("lock|gate".to_string()),
    };
    let result = catalog_children(&store, &request).unwrap();
    assert_eq!(project_names(&result), vec!["DAM1"]);
    assert_eq!(result[0].locks, ids("SPK", &["L1"]));
    assert_eq!(result[0].gates, ids("SPK", &["O1"]));
    assert_eq!(result[0].outlets, None);

    let events = read_audit_log(&store).unwrap();
    let last = events.last().expect("audit event");
    assert_eq!(last.op, "catalog.children");
    assert_eq!(last.status, "success");
}

#[test]
fn catalog_children_requires_office() {
    let (_tmp, store) = seeded_store(&CatalogRows::default());
    let request = ChildrenRequest {
        office: "  ".to_string(),
        ..ChildrenRequest::default()
    };
    let err = catalog_children(&store, &request).unwrap_err();
    assert!(matches!(err, CatalogError::ValidationError(_)));
}

#[test]
fn json_output_uses_catalog_field_names() {
    let (_tmp, store) = seeded_store(&mixed_rows());
    let conn = connect(&store);

    let result = children(&conn, "SPK", Some("^dam2$"), None).unwrap();
    let json = serde_json::to_value(&result).unwrap();
    assert_eq!(
        json,
        serde_json::json!([{
            "project": {"office-id": "SPK", "name": "DAM2"},
            "embankments": [{"office-id": "SPK", "name": "E1"}]
        }])
    );
}
