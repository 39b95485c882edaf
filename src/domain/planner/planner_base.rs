use std::fmt;

use crate::domain::calculator::electricity::electricity_cost;
use crate::domain::calculator::reliability::{log_reliability, reliability};
use crate::domain::calculator::transfer::{TransferConfig, local_data_transfer_time, predecessor_data_transfer_time};
use crate::domain::planner::parameter::Parameter;
use crate::domain::planner::planning_tables::PlanningTables;
use crate::domain::planner::solution::Solution;
use crate::domain::resource::frequency_level::LevelRef;
use crate::domain::resource::resource_pool::ResourcePool;
use crate::domain::schedule::exec_window::WindowCandidate;
use crate::domain::schedule::exec_window_store::ExecWindowTable;
use crate::domain::utils::id::{TaskId, TaskRef, VmId};
use crate::domain::workflow::workflow::Workflow;
use crate::error::{Error, Result};

/// Steps a planner walks through for every planning run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlannerPhase {
    Init,
    RankWorkflows,
    ComputeUpwardRank,
    ComputeExecTimeAndReliability,
    AllocateJobs,
    Done,
}

impl fmt::Display for PlannerPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// State and helpers shared by every planner.
///
/// Owns its own copy of the resource pool and window table, so independent
/// planning runs never share mutable state.
#[derive(Debug, Clone)]
pub struct PlannerBase {
    pub pool: ResourcePool,
    pub parameter: Parameter,
    pub transfer: TransferConfig,
    pub windows: ExecWindowTable,
    /// Global dispatch order across all planned workflows.
    pub sequence: Vec<TaskRef>,
    pub elec_cost: f64,
    /// Latest planned finish time over all planned workflows.
    pub finish_time: f64,
    pub tables: PlanningTables,
    phase: PlannerPhase,
}

impl PlannerBase {
    pub fn new(pool: ResourcePool, parameter: Parameter, transfer: TransferConfig) -> Self {
        let windows = ExecWindowTable::new(pool.vm_count());
        Self {
            pool,
            parameter,
            transfer,
            windows,
            sequence: Vec::new(),
            elec_cost: 0.0,
            finish_time: 0.0,
            tables: PlanningTables::default(),
            phase: PlannerPhase::Init,
        }
    }

    pub fn phase(&self) -> PlannerPhase {
        self.phase
    }

    pub(crate) fn enter(&mut self, phase: PlannerPhase) {
        log::debug!("Planner phase {} -> {}.", self.phase, phase);
        self.phase = phase;
    }

    /// Drops everything a previous run left behind.
    pub(crate) fn reset(&mut self) {
        self.windows = ExecWindowTable::new(self.pool.vm_count());
        self.sequence.clear();
        self.elec_cost = 0.0;
        self.finish_time = 0.0;
        self.tables.clear();
        self.phase = PlannerPhase::Init;
    }

    /// **Phase 1: Rank Workflows**
    pub fn rank_workflows(&mut self, workflows: &mut [Workflow]) {
        self.enter(PlannerPhase::RankWorkflows);
        self.parameter.comparator.sort(workflows, self.parameter.ascending);
        log::debug!(
            "Workflow planning order ({} {}): {:?}",
            self.parameter.comparator,
            if self.parameter.ascending { "asc" } else { "desc" },
            workflows.iter().map(|w| w.name().as_str()).collect::<Vec<_>>()
        );
    }

    /// **Phase 2: Upward Rank**
    ///
    /// `rank(t) = avg local transfer + length / avg MIPS + max over children (rank(c) + avg predecessor transfer(c, t))`.
    /// Tasks are visited deepest first, so the ranks of all children already exist.
    /// Sets the workflow deadline and returns the maximal rank.
    pub fn compute_upward_rank(&mut self, workflow: &mut Workflow) -> Result<f64> {
        self.enter(PlannerPhase::ComputeUpwardRank);
        self.tables.upward_rank.clear();
        self.tables.local_transfer.clear();

        let avg_mips = self.pool.average_mips();
        let vm_count = self.pool.vm_count() as f64;
        let locations = self.pool.location_counts();

        for task in workflow.tasks() {
            let times: Vec<f64> =
                self.pool.vms().iter().map(|vm| local_data_transfer_time(task, &vm.location, &self.transfer)).collect();
            self.tables.local_transfer.insert(task.id, times);
        }

        let mut by_depth = workflow.task_ids();
        by_depth.sort_by(|a, b| workflow[*b].depth.cmp(&workflow[*a].depth));

        let mut max_rank: f64 = 0.0;
        for id in by_depth {
            let task = &workflow[id];
            let mut max_child: f64 = 0.0;

            for child_id in &task.children {
                let child_rank = self.tables.upward_rank.get(*child_id).copied().ok_or_else(|| Error::UnresolvedDependency {
                    workflow: workflow.name().to_string(),
                    task: task.name.to_string(),
                    dependency: workflow[*child_id].name.to_string(),
                })?;

                // Mean over all (VM, parent VM) pairs, grouped by host.
                let child = &workflow[*child_id];
                let mut total = 0.0;
                for (host, host_vms) in &locations {
                    for (parent_host, parent_vms) in &locations {
                        let time = predecessor_data_transfer_time(child, host, id, parent_host, &self.transfer);
                        total += (*host_vms * *parent_vms) as f64 * time;
                    }
                }
                let avg_transfer = total / (vm_count * vm_count);

                max_child = max_child.max(child_rank + avg_transfer);
            }

            let local = &self.tables.local_transfer[id];
            let avg_local = local.iter().sum::<f64>() / vm_count;
            let rank = max_child + avg_local + task.length / avg_mips;

            max_rank = max_rank.max(rank);
            self.tables.upward_rank.insert(id, rank);
        }

        let deadline = self.finish_time + max_rank * (1.0 + self.parameter.deadline_factor);
        workflow.set_deadline(deadline);
        log::debug!("Workflow {} has a critical path of {:.4}s and deadline {:.4}s.", workflow.name(), max_rank, deadline);

        Ok(max_rank)
    }

    /// **Phase 3: Execution Time and Reliability**
    ///
    /// Fills the `[type][level]` tables for every task and sets the workflow
    /// reliability goal `rf^n * prod(best task reliability)`, computed in log space.
    pub fn compute_exec_time_and_reliability(&mut self, workflow: &mut Workflow) {
        self.enter(PlannerPhase::ComputeExecTimeAndReliability);
        self.tables.exec_time.clear();
        self.tables.reliability.clear();

        let representatives = self.pool.type_representatives();
        let type_count = self.pool.vm_types().len();
        let mut log_goal = workflow.job_num() as f64 * log_reliability(self.parameter.reliability_factor);

        for task in workflow.tasks() {
            let mut exec_times = vec![Vec::new(); type_count];
            let mut reliabilities = vec![Vec::new(); type_count];
            let mut best: f64 = 0.0;

            for vm_id in &representatives {
                let vm = self.pool.vm(*vm_id);
                for level in &vm.levels {
                    let exec_time = level.exec_time(task.length);
                    let task_reliability = reliability(level.lambda, exec_time);
                    best = best.max(task_reliability);
                    exec_times[vm.type_index].push(exec_time);
                    reliabilities[vm.type_index].push(task_reliability);
                }
            }

            log_goal += log_reliability(best);
            self.tables.exec_time.insert(task.id, exec_times);
            self.tables.reliability.insert(task.id, reliabilities);
        }

        workflow.set_reli_goal(log_goal.exp());
        log::debug!("Workflow {} has reliability goal {:.6}.", workflow.name(), workflow.reli_goal());
    }

    pub fn exec_time(&self, workflow: &Workflow, task: TaskId, level: LevelRef) -> f64 {
        let vm = self.pool.vm(level.vm);
        self.tables
            .exec_time(task, vm.type_index, level.level)
            .unwrap_or_else(|| self.pool.level(level).exec_time(workflow[task].length))
    }

    fn planned_reliability(&self, workflow: &Workflow, task: TaskId, level: LevelRef) -> f64 {
        let vm = self.pool.vm(level.vm);
        self.tables.reliability(task, vm.type_index, level.level).unwrap_or_else(|| {
            let frequency_level = self.pool.level(level);
            reliability(frequency_level.lambda, frequency_level.exec_time(workflow[task].length))
        })
    }

    /// Tasks of the workflow sorted by upward rank, highest first. Equal ranks keep insertion order.
    pub fn rank_order(&self, workflow: &Workflow) -> Vec<TaskId> {
        let mut order = workflow.task_ids();
        order.sort_by(|a, b| self.tables.rank(*b).total_cmp(&self.tables.rank(*a)));
        order
    }

    /// Earliest time `task` could start on `vm`: all parent outputs and the local input files have arrived.
    pub fn ready_time(&self, workflow: &Workflow, task: TaskId, vm: VmId, solution: &Solution) -> f64 {
        let target = &self.pool.vm(vm).location;
        let mut ready: f64 = 0.0;

        for parent in &workflow[task].parents {
            let (Some(parent_finish), Some(parent_level)) = (solution.finish_time_of(*parent), solution.binding(*parent)) else {
                continue;
            };
            let parent_host = &self.pool.vm(parent_level.vm).location;
            let transfer = predecessor_data_transfer_time(&workflow[task], target, *parent, parent_host, &self.transfer);
            ready = ready.max(parent_finish + transfer);
        }

        ready + self.tables.local_transfer(task, vm.0)
    }

    /// Commits the chosen window and records the placement in `solution`.
    ///
    /// The planned cost covers the idle transfer period (earliest parent finish
    /// to ready time) plus the execution window, both at the level's power draw.
    pub fn commit_placement(&mut self, workflow: &Workflow, task: TaskId, candidate: WindowCandidate, solution: &mut Solution) -> Result<()> {
        let transfer_start = workflow[task]
            .parents
            .iter()
            .filter_map(|p| solution.finish_time_of(*p))
            .min_by(f64::total_cmp)
            .unwrap_or(0.0)
            .min(candidate.ready_time);

        let level = self.pool.level(candidate.level);
        let tariff = self.pool.tariff_for(candidate.level.vm);
        let elec_cost = electricity_cost(tariff, transfer_start, candidate.ready_time, level.power)?
            + electricity_cost(tariff, candidate.start_time, candidate.finish_time, level.power)?;
        let task_reliability = self.planned_reliability(workflow, task, candidate.level);

        self.windows.store_mut(candidate.level.vm).commit(
            candidate,
            TaskRef::new(workflow.id(), task),
            workflow[task].name.clone(),
            Some(elec_cost),
        )?;
        solution.bind(task, candidate.level, candidate.finish_time, elec_cost, task_reliability);
        Ok(())
    }

    /// Folds a finished workflow solution into the run aggregates.
    pub(crate) fn absorb(&mut self, solution: &Solution) {
        self.sequence.extend(solution.sequence().iter().map(|t| TaskRef::new(solution.workflow(), *t)));
        self.elec_cost += solution.elec_cost();
        self.finish_time = self.finish_time.max(solution.finish_time());
    }

    /// Writes the bindings of `solution` onto the workflow's tasks.
    pub(crate) fn bind_tasks(workflow: &mut Workflow, solution: &Solution) {
        for (task, level) in solution.result() {
            workflow[task].assignment = Some(*level);
        }
    }
}
