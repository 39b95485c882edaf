use slotmap::SecondaryMap;

use crate::domain::utils::id::TaskId;

/// Per-workflow lookup tables filled before allocation.
///
/// Execution time and reliability only depend on the VM type and the level, so
/// they are stored per `[type index][level]` instead of per VM.
#[derive(Debug, Clone, Default)]
pub struct PlanningTables {
    pub upward_rank: SecondaryMap<TaskId, f64>,
    /// Local input transfer time of a task to every VM, indexed by VM id.
    pub local_transfer: SecondaryMap<TaskId, Vec<f64>>,
    pub exec_time: SecondaryMap<TaskId, Vec<Vec<f64>>>,
    pub reliability: SecondaryMap<TaskId, Vec<Vec<f64>>>,
}

impl PlanningTables {
    pub fn clear(&mut self) {
        self.upward_rank.clear();
        self.local_transfer.clear();
        self.exec_time.clear();
        self.reliability.clear();
    }

    pub fn rank(&self, task: TaskId) -> f64 {
        self.upward_rank.get(task).copied().unwrap_or(0.0)
    }

    pub fn local_transfer(&self, task: TaskId, vm: usize) -> f64 {
        self.local_transfer.get(task).and_then(|times| times.get(vm)).copied().unwrap_or(0.0)
    }

    pub fn exec_time(&self, task: TaskId, type_index: usize, level: usize) -> Option<f64> {
        self.exec_time.get(task)?.get(type_index)?.get(level).copied()
    }

    pub fn reliability(&self, task: TaskId, type_index: usize, level: usize) -> Option<f64> {
        self.reliability.get(task)?.get(type_index)?.get(level).copied()
    }
}
