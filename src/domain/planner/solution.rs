use slotmap::SecondaryMap;
use std::fmt;
use std::time::Duration;

use crate::domain::calculator::reliability::log_reliability;
use crate::domain::planner::planner_type::PlannerType;
use crate::domain::resource::frequency_level::LevelRef;
use crate::domain::schedule::exec_window_store::ExecWindowTable;
use crate::domain::utils::id::{TaskId, TaskRef, WorkflowId};

/// Output of planning one workflow: where every task runs, in which order, and the aggregates.
///
/// Only the planner mutates a solution. Once returned it is read-only.
#[derive(Debug, Clone)]
pub struct Solution {
    workflow: WorkflowId,
    bindings: SecondaryMap<TaskId, LevelRef>,
    finish_times: SecondaryMap<TaskId, f64>,
    sequence: Vec<TaskId>,
    elec_cost: f64,
    log_reliability: f64,
    finish_time: f64,
}

impl Solution {
    pub(crate) fn new(workflow: WorkflowId) -> Self {
        Self {
            workflow,
            bindings: SecondaryMap::new(),
            finish_times: SecondaryMap::new(),
            sequence: Vec::new(),
            elec_cost: 0.0,
            log_reliability: 0.0,
            finish_time: 0.0,
        }
    }

    pub(crate) fn bind(&mut self, task: TaskId, level: LevelRef, finish_time: f64, elec_cost: f64, reliability: f64) {
        self.bindings.insert(task, level);
        self.finish_times.insert(task, finish_time);
        self.sequence.push(task);
        self.elec_cost += elec_cost;
        self.log_reliability += log_reliability(reliability);
        self.finish_time = self.finish_time.max(finish_time);
    }

    pub fn workflow(&self) -> WorkflowId {
        self.workflow
    }

    /// Task to frequency level bindings.
    pub fn result(&self) -> &SecondaryMap<TaskId, LevelRef> {
        &self.bindings
    }

    pub fn binding(&self, task: TaskId) -> Option<LevelRef> {
        self.bindings.get(task).copied()
    }

    pub fn is_scheduled(&self, task: TaskId) -> bool {
        self.bindings.contains_key(task)
    }

    /// Planned finish time of a scheduled task.
    pub fn finish_time_of(&self, task: TaskId) -> Option<f64> {
        self.finish_times.get(task).copied()
    }

    /// Dispatch order, a topological order of the workflow.
    pub fn sequence(&self) -> &[TaskId] {
        &self.sequence
    }

    pub fn len(&self) -> usize {
        self.sequence.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequence.is_empty()
    }

    pub fn elec_cost(&self) -> f64 {
        self.elec_cost
    }

    /// Product of the planned task reliabilities.
    pub fn reliability(&self) -> f64 {
        self.log_reliability.exp()
    }

    pub fn finish_time(&self) -> f64 {
        self.finish_time
    }
}

impl fmt::Display for Solution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Solution{{workflow = {}, elecCost = {:.4}, reliability = {:.4}, finishTime = {:.2}, tasks = {}}}",
            self.workflow,
            self.elec_cost,
            self.reliability(),
            self.finish_time,
            self.sequence.len()
        )
    }
}

/// Result of one planning run over all workflows.
#[derive(Debug, Clone)]
pub struct Plan {
    pub planner: PlannerType,
    /// One solution per workflow, in planning order.
    pub solutions: Vec<Solution>,
    /// Global dispatch order across workflows.
    pub sequence: Vec<TaskRef>,
    pub elec_cost: f64,
    pub finish_time: f64,
    /// Wall clock time spent planning.
    pub runtime: Duration,
    pub windows: ExecWindowTable,
}

impl Plan {
    pub fn solution_for(&self, workflow: WorkflowId) -> Option<&Solution> {
        self.solutions.iter().find(|s| s.workflow == workflow)
    }

    pub fn binding(&self, task: TaskRef) -> Option<LevelRef> {
        self.solution_for(task.workflow).and_then(|s| s.binding(task.task))
    }

    /// Product of all workflow reliabilities.
    pub fn reliability(&self) -> f64 {
        self.solutions.iter().map(|s| s.log_reliability).sum::<f64>().exp()
    }
}
