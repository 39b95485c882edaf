use serde::Serialize;
use std::collections::BTreeMap;

use crate::domain::resource::datacenter::Location;
use crate::domain::resource::frequency_level::LevelRef;
use crate::domain::utils::id::{TaskId, TaskName};

/// A file read or written by a task.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DataFile {
    pub name: String,
    pub size: f64,
    /// Host holding the file. Only meaningful for locally-resident input files;
    /// `None` means the file has not been placed yet.
    pub location: Option<Location>,
}

impl DataFile {
    pub fn new(name: impl Into<String>, size: f64) -> Self {
        Self { name: name.into(), size, location: None }
    }

    pub fn located(name: impl Into<String>, size: f64, location: Location) -> Self {
        Self { name: name.into(), size, location: Some(location) }
    }
}

/// A node of the workflow DAG.
///
/// Parents and children are arena keys into the owning workflow, so a task
/// never owns another task.
#[derive(Debug, Clone)]
pub struct Task {
    pub id: TaskId,
    pub name: TaskName,
    /// Work to execute in million instructions.
    pub length: f64,
    /// Longest path (in edges) from a root task. Roots have depth 0.
    pub depth: u32,
    pub parents: Vec<TaskId>,
    pub children: Vec<TaskId>,
    /// Files this task consumes from each parent's outputs.
    pub pred_input_files: BTreeMap<TaskId, Vec<DataFile>>,
    /// Input files not produced by any parent.
    pub local_input_files: Vec<DataFile>,
    pub output_files: Vec<DataFile>,
    pub retry_count: u32,
    pub elec_cost: f64,
    /// VM and frequency level bound by the planner.
    pub assignment: Option<LevelRef>,
}

impl Task {
    pub(crate) fn new(id: TaskId, name: TaskName, length: f64, output_files: Vec<DataFile>) -> Self {
        Self {
            id,
            name,
            length,
            depth: 0,
            parents: Vec::new(),
            children: Vec::new(),
            pred_input_files: BTreeMap::new(),
            local_input_files: Vec::new(),
            output_files,
            retry_count: 0,
            elec_cost: 0.0,
            assignment: None,
        }
    }

    pub fn is_root(&self) -> bool {
        self.parents.is_empty()
    }

    /// Total size of the files this task reads from `parent`.
    pub fn pred_input_size(&self, parent: TaskId) -> f64 {
        self.pred_input_files.get(&parent).map(|files| files.iter().map(|f| f.size).sum()).unwrap_or(0.0)
    }

    pub fn produces(&self, file_name: &str) -> bool {
        self.output_files.iter().any(|f| f.name == file_name)
    }
}
