//! Plan-based ceilings on how many records a user may create.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanLimits {
    pub max_projects: u32,
    pub max_files_per_project: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordKind {
    Project,
    File,
}

impl RecordKind {
    fn ceiling(self, limits: PlanLimits) -> u32 {
        match self {
            RecordKind::Project => limits.max_projects,
            RecordKind::File => limits.max_files_per_project,
        }
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordKind::Project => f.write_str("project"),
            RecordKind::File => f.write_str("file"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum QuotaError {
    #[error("{}", exceeded_message(.kind, .limit))]
    QuotaExceeded { kind: RecordKind, limit: u32 },

    #[error("A project_id is required to create a file.")]
    MissingParent,
}

fn exceeded_message(kind: &RecordKind, limit: &u32) -> String {
    match kind {
        RecordKind::Project => format!(
            "You have reached the maximum of {limit} projects for your plan. \
             Upgrade your plan to create more projects."
        ),
        RecordKind::File => format!(
            "You have reached the maximum of {limit} files for this project on your plan. \
             Upgrade your plan to add more files."
        ),
    }
}

/// Maps plan identifiers to their ceilings. Unknown or absent plans get
/// the `default` entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanTable {
    default: PlanLimits,
    #[serde(default)]
    plans: HashMap<String, PlanLimits>,
}

impl Default for PlanTable {
    fn default() -> Self {
        let plans = [
            ("tier-a", 1, 3),
            ("tier-b", 2, 4),
            ("tier-c", 3, 5),
        ]
        .into_iter()
        .map(|(id, max_projects, max_files_per_project)| {
            (
                id.to_string(),
                PlanLimits {
                    max_projects,
                    max_files_per_project,
                },
            )
        })
        .collect();

        Self {
            default: PlanLimits {
                max_projects: 1,
                max_files_per_project: 1,
            },
            plans,
        }
    }
}

impl PlanTable {
    #[must_use]
    pub fn new(default: PlanLimits, plans: HashMap<String, PlanLimits>) -> Self {
        Self { default, plans }
    }

    #[must_use]
    pub fn limits_for(&self, plan_id: Option<&str>) -> PlanLimits {
        plan_id
            .and_then(|id| self.plans.get(id))
            .copied()
            .unwrap_or(self.default)
    }

    /// Admits one more record of `kind` when `current_count` is below the
    /// plan's ceiling. Returns the ceiling so the insert can re-check it
    /// atomically.
    pub fn check_and_admit(
        &self,
        kind: RecordKind,
        plan_id: Option<&str>,
        current_count: u32,
    ) -> Result<u32, QuotaError> {
        let limit = kind.ceiling(self.limits_for(plan_id));
        if current_count >= limit {
            return Err(QuotaError::QuotaExceeded { kind, limit });
        }
        Ok(limit)
    }
}

/// Files always hang off a project; this runs before any quota lookup.
pub fn require_parent(project_id: Option<&str>) -> Result<&str, QuotaError> {
    project_id
        .filter(|id| !id.trim().is_empty())
        .ok_or(QuotaError::MissingParent)
}
