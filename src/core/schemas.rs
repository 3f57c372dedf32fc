//! Schema definitions for the catalog database.
//!
//! The catalog reads four source relations, named after the upstream views they
//! mirror. OUTLET and GATE share `av_outlet`. None of the relations constrain
//! (office, child, project) to be unique, so readers must select distinct tuples.

pub const CATALOG_DB_NAME: &str = "catalog.db";

pub const AV_EMBANKMENT_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS av_embankment (
        office_id TEXT NOT NULL,
        embankment_location_id TEXT NOT NULL,
        project_id TEXT NOT NULL,
        unit_system TEXT NOT NULL,
        structure_type TEXT
    )
";
pub const AV_EMBANKMENT_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_embankment_office_project ON av_embankment(office_id, project_id)";

pub const AV_LOCK_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS av_lock (
        db_office_id TEXT NOT NULL,
        lock_id TEXT NOT NULL,
        project_id TEXT NOT NULL,
        lock_width REAL,
        lock_length REAL
    )
";
pub const AV_LOCK_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_lock_office_project ON av_lock(db_office_id, project_id)";

pub const AV_OUTLET_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS av_outlet (
        office_id TEXT NOT NULL,
        outlet_id TEXT NOT NULL,
        project_id TEXT NOT NULL,
        rating_group_id TEXT,
        opening_unit_en TEXT, -- gate opening unit, English system
        opening_unit_si TEXT  -- gate opening unit, metric system
    )
";
pub const AV_OUTLET_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_outlet_office_project ON av_outlet(office_id, project_id)";

pub const AV_TURBINE_SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS av_turbine (
        office_id TEXT NOT NULL,
        turbine_id TEXT NOT NULL,
        project_id TEXT NOT NULL,
        turbine_capacity REAL
    )
";
pub const AV_TURBINE_INDEX: &str =
    "CREATE INDEX IF NOT EXISTS idx_turbine_office_project ON av_turbine(office_id, project_id)";

/// Every statement needed to bring an empty database to the current schema.
pub const CATALOG_DB_SCHEMA: &[&str] = &[
    AV_EMBANKMENT_SCHEMA,
    AV_EMBANKMENT_INDEX,
    AV_LOCK_SCHEMA,
    AV_LOCK_INDEX,
    AV_OUTLET_SCHEMA,
    AV_OUTLET_INDEX,
    AV_TURBINE_SCHEMA,
    AV_TURBINE_INDEX,
];

/// Embankment rows are repeated once per unit system; only this one is read.
pub const REFERENCE_UNIT_SYSTEM: &str = "SI";
