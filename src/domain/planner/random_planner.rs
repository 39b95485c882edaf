use crate::domain::planner::planner_base::PlannerBase;
use crate::domain::planner::planner_trait::WorkflowPlanner;
use crate::domain::planner::planner_type::PlannerType;
use crate::domain::planner::solution::Solution;
use crate::domain::schedule::exec_window::WindowCandidate;
use crate::domain::simulator::sampler::UniformSampler;
use crate::domain::utils::id::{TaskId, VmId};
use crate::domain::workflow::workflow::Workflow;
use crate::error::Result;

/// Baseline planner: a uniformly random VM, then a uniformly random level of that VM.
///
/// Placement still goes through the window search, so the resulting
/// schedule is as valid as a HEFT one.
#[derive(Debug)]
pub struct RandomPlanner {
    pub base: PlannerBase,
}

impl RandomPlanner {
    pub fn new(base: PlannerBase) -> Self {
        Self { base }
    }
}

impl WorkflowPlanner for RandomPlanner {
    fn planner_type(&self) -> PlannerType {
        PlannerType::Random
    }

    fn base(&self) -> &PlannerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PlannerBase {
        &mut self.base
    }

    fn select_window(&self, workflow: &Workflow, task: TaskId, solution: &Solution, sampler: &mut dyn UniformSampler) -> Result<WindowCandidate> {
        let vm = self.base.pool.vm(VmId(sampler.index(self.base.pool.vm_count())));
        let level = vm.levels[sampler.index(vm.levels.len())].level_ref();

        let ready_time = self.base.ready_time(workflow, task, vm.id, solution);
        let exec_time = self.base.exec_time(workflow, task, level);
        Ok(self.base.windows[vm.id].find_window(level, ready_time, exec_time))
    }
}
