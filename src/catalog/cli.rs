use crate::catalog::aggregate::{self, ChildrenRequest, KindSelection};
use crate::catalog::kind;
use crate::catalog::load;
use crate::catalog::model::ProjectChildren;
use crate::core::error::CatalogError;
use crate::core::store::Store;
use clap::{Args, ValueEnum};
use colored::Colorize;
use std::path::PathBuf;

#[derive(Args, Debug)]
pub struct ChildrenCli {
    /// Office to list projects for. Falls back to `default_office` from config.
    #[clap(long)]
    pub office: Option<String>,
    /// Case-insensitive regex on project names. Omit to list every project.
    #[clap(long)]
    pub project_like: Option<String>,
    /// Case-insensitive regex selecting kinds by name (e.g. "lock|gate").
    #[clap(long, conflicts_with = "kind")]
    pub kinds: Option<String>,
    /// Explicit kind, repeatable. Unknown kinds are ignored.
    #[clap(long)]
    pub kind: Vec<String>,
    /// Output format.
    #[clap(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Args, Debug)]
pub struct KindsCli {
    /// Case-insensitive regex; omit to list every kind.
    #[clap(long)]
    pub pattern: Option<String>,
}

#[derive(Args, Debug)]
pub struct LoadCli {
    /// JSON file with `embankments`, `locks`, `outlets` and `turbines` row arrays.
    #[clap(long)]
    pub file: PathBuf,
}

impl ChildrenCli {
    pub fn to_request(&self, store: &Store) -> Result<ChildrenRequest, CatalogError> {
        let office = self
            .office
            .clone()
            .or_else(|| store.config.default_office.clone())
            .ok_or_else(|| {
                CatalogError::ValidationError(
                    "--office is required (or set default_office in catalog.toml)".into(),
                )
            })?;

        let kinds = if let Some(pattern) = &self.kinds {
            KindSelection::Pattern(pattern.clone())
        } else if !self.kind.is_empty() {
            KindSelection::Kinds(kind::kinds_from_tokens(&self.kind))
        } else {
            KindSelection::All
        };

        Ok(ChildrenRequest {
            office,
            project_like: self.project_like.clone(),
            kinds,
        })
    }
}

pub fn run_children_cli(store: &Store, cli: ChildrenCli) -> Result<(), CatalogError> {
    let request = cli.to_request(store)?;
    let result = aggregate::catalog_children(store, &request)?;
    match cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&result)?),
        OutputFormat::Text => print!("{}", render_text(&result)),
    }
    Ok(())
}

pub fn run_kinds_cli(cli: KindsCli) -> Result<(), CatalogError> {
    for kind in kind::ordered(&kind::matching_kinds(cli.pattern.as_deref())) {
        println!("{}", kind);
    }
    Ok(())
}

pub fn run_load_cli(store: &Store, cli: LoadCli) -> Result<(), CatalogError> {
    let rows = load::read_rows_file(&cli.file)?;
    let summary = load::load_rows(store, &rows)?;
    println!(
        "Loaded {} embankment, {} lock, {} outlet, {} turbine rows",
        summary.embankments, summary.locks, summary.outlets, summary.turbines
    );
    Ok(())
}

/// One block per project, one indented line per present kind.
pub fn render_text(projects: &[ProjectChildren]) -> String {
    if projects.is_empty() {
        return format!("{}\n", "No projects matched".dimmed());
    }

    let mut out = String::new();
    for project in projects {
        out.push_str(&format!(
            "{} {}\n",
            project.project.name.bold(),
            format!("({})", project.project.office_id).dimmed()
        ));
        for kind in project.present_kinds() {
            let names = project
                .children(kind)
                .unwrap_or_default()
                .iter()
                .map(|id| id.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            out.push_str(&format!("  {}: {}\n", kind.field_name().cyan(), names));
        }
    }
    out
}
