use crate::domain::planner::planner_base::PlannerBase;
use crate::domain::planner::planner_trait::WorkflowPlanner;
use crate::domain::planner::planner_type::PlannerType;
use crate::domain::planner::solution::Solution;
use crate::domain::schedule::exec_window::WindowCandidate;
use crate::domain::simulator::sampler::UniformSampler;
use crate::domain::utils::id::TaskId;
use crate::domain::workflow::workflow::Workflow;
use crate::error::{Error, Result};

/// Planner using the HEFT list scheduling algorithm.
///
/// Tasks are visited by decreasing upward rank (the critical path length
/// assuming average resources). Each one is placed on the VM providing the
/// earliest finish time at its highest frequency level.
#[derive(Debug)]
pub struct HeftPlanner {
    pub base: PlannerBase,
}

impl HeftPlanner {
    pub fn new(base: PlannerBase) -> Self {
        Self { base }
    }
}

impl WorkflowPlanner for HeftPlanner {
    fn planner_type(&self) -> PlannerType {
        PlannerType::Heft
    }

    fn base(&self) -> &PlannerBase {
        &self.base
    }

    fn base_mut(&mut self) -> &mut PlannerBase {
        &mut self.base
    }

    fn select_window(&self, workflow: &Workflow, task: TaskId, solution: &Solution, _sampler: &mut dyn UniformSampler) -> Result<WindowCandidate> {
        let mut best: Option<WindowCandidate> = None;

        for vm in self.base.pool.vms() {
            let level = vm.top_level().level_ref();
            let ready_time = self.base.ready_time(workflow, task, vm.id, solution);
            let exec_time = self.base.exec_time(workflow, task, level);
            let candidate = self.base.windows[vm.id].find_window(level, ready_time, exec_time);

            // Strictly earlier finish wins, so ties keep the lower VM id.
            if best.is_none_or(|b| candidate.finish_time < b.finish_time) {
                best = Some(candidate);
            }
        }

        best.ok_or(Error::EmptyResourcePool)
    }
}
