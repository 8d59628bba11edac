use std::fs;
use std::path::Path;

use crate::error::{Error, Result};
use crate::quota::PlanTable;

/// Parses a plan table from TOML:
///
/// ```toml
/// [default]
/// max_projects = 1
/// max_files_per_project = 1
///
/// [plans.tier-a]
/// max_projects = 1
/// max_files_per_project = 3
/// ```
pub fn parse_plan_table(source: &str) -> Result<PlanTable> {
    toml::from_str(source).map_err(|e| Error::Config(format!("invalid plan table: {e}")))
}

/// Loads the plan table from `path`, or the built-in table when `None`.
pub fn load_plan_table(path: Option<&Path>) -> Result<PlanTable> {
    match path {
        Some(path) => {
            let source = fs::read_to_string(path)?;
            let table = parse_plan_table(&source)?;
            tracing::info!("Loaded plan table from {}", path.display());
            Ok(table)
        }
        None => Ok(PlanTable::default()),
    }
}
