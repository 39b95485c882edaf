use serde::Serialize;

/// One row per executed task.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TaskRecord {
    pub workflow: String,
    pub task: String,
    pub vm: usize,
    pub planned_level: usize,
    /// Level the task finished at.
    pub level: usize,
    pub planned_start: f64,
    pub planned_finish: f64,
    pub start: f64,
    pub finish: f64,
    pub retry_count: u32,
    pub elec_cost: f64,
}

/// Outcome of replaying a plan with fault injection.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExecutionReport {
    /// Sorted by VM, then by start time.
    pub records: Vec<TaskRecord>,
    pub elec_cost: f64,
    pub makespan: f64,
    pub total_retries: u64,
    pub workflow_count: usize,
    /// Workflows with at least one task finishing after the workflow deadline.
    pub overdue_workflows: usize,
}

impl ExecutionReport {
    pub fn record(&self, workflow: &str, task: &str) -> Option<&TaskRecord> {
        self.records.iter().find(|r| r.workflow == workflow && r.task == task)
    }
}
