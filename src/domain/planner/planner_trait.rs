use std::time::Instant;

use crate::domain::planner::planner_base::{PlannerBase, PlannerPhase};
use crate::domain::planner::planner_type::PlannerType;
use crate::domain::planner::solution::{Plan, Solution};
use crate::domain::schedule::exec_window::WindowCandidate;
use crate::domain::simulator::sampler::UniformSampler;
use crate::domain::utils::id::TaskId;
use crate::domain::workflow::workflow::Workflow;
use crate::error::{Error, Result};

/// A list scheduling planner.
///
/// Implementations only decide where a ready task goes ([`WorkflowPlanner::select_window`]).
/// Ranking, the allocation sweep, bookkeeping and validation are shared.
pub trait WorkflowPlanner: std::fmt::Debug {
    fn planner_type(&self) -> PlannerType;

    fn base(&self) -> &PlannerBase;

    fn base_mut(&mut self) -> &mut PlannerBase;

    /// Picks the window for `task`. All parents of `task` are already placed in `solution`.
    fn select_window(
        &self,
        workflow: &Workflow,
        task: TaskId,
        solution: &Solution,
        sampler: &mut dyn UniformSampler,
    ) -> Result<WindowCandidate>;

    /// Plans all workflows, one after another, onto the planner's resource pool.
    ///
    /// A previous run of the same planner is discarded first. Any invariant
    /// violation aborts the run and no partial plan is returned.
    fn plan(&mut self, workflows: &mut [Workflow], sampler: &mut dyn UniformSampler) -> Result<Plan> {
        let started = Instant::now();
        log::info!("{}: Starting planning of {} workflows {}.", self.planner_type(), workflows.len(), self.base().parameter);

        self.base_mut().reset();
        self.base_mut().rank_workflows(workflows);

        let mut solutions = Vec::with_capacity(workflows.len());
        for workflow in workflows.iter_mut() {
            self.base_mut().compute_upward_rank(workflow)?;
            self.base_mut().compute_exec_time_and_reliability(workflow);
            solutions.push(self.allocate_jobs(workflow, sampler)?);
        }
        self.base_mut().enter(PlannerPhase::Done);

        let base = self.base();
        let plan = Plan {
            planner: self.planner_type(),
            solutions,
            sequence: base.sequence.clone(),
            elec_cost: base.elec_cost,
            finish_time: base.finish_time,
            runtime: started.elapsed(),
            windows: base.windows.clone(),
        };
        log::info!(
            "{}: Planned {} tasks in {:.3}s: elec cost {:.4}, finish time {:.2}.",
            plan.planner,
            plan.sequence.len(),
            plan.runtime.as_secs_f64(),
            plan.elec_cost,
            plan.finish_time
        );
        Ok(plan)
    }

    /// **Phase 4: Allocate Jobs**
    ///
    /// Repeatedly sweeps the tasks in rank order and places every task whose
    /// parents are all placed, until the whole workflow is placed.
    fn allocate_jobs(&mut self, workflow: &mut Workflow, sampler: &mut dyn UniformSampler) -> Result<Solution> {
        self.base_mut().enter(PlannerPhase::AllocateJobs);
        log::info!(
            "{}: Starting planning workflow {} {}, a total of {} tasks...",
            self.planner_type(),
            workflow.id(),
            workflow.name(),
            workflow.job_num()
        );

        let order = self.base().rank_order(workflow);
        let mut solution = Solution::new(workflow.id());

        while solution.len() < order.len() {
            let placed_before = solution.len();

            for &task in &order {
                if solution.is_scheduled(task) || !workflow[task].parents.iter().all(|p| solution.is_scheduled(*p)) {
                    continue;
                }
                let candidate = self.select_window(workflow, task, &solution, sampler)?;
                self.base_mut().commit_placement(workflow, task, candidate, &mut solution)?;
            }

            if solution.len() == placed_before {
                let blocked = order.iter().find(|t| !solution.is_scheduled(**t)).copied();
                let (task, dependency) = blocked
                    .and_then(|t| workflow[t].parents.iter().find(|p| !solution.is_scheduled(**p)).map(|p| (t, *p)))
                    .map(|(t, p)| (workflow[t].name.to_string(), workflow[p].name.to_string()))
                    .unwrap_or_default();
                return Err(Error::UnresolvedDependency { workflow: workflow.name().to_string(), task, dependency });
            }
        }

        workflow.verify_topological_order(solution.sequence())?;
        PlannerBase::bind_tasks(workflow, &solution);
        self.base_mut().absorb(&solution);

        log::debug!("{}: {}: Best {}", self.planner_type(), workflow.name(), solution);
        Ok(solution)
    }
}
