use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};

use crate::domain::calculator::transfer::{TransferConfig, local_data_transfer_time, predecessor_data_transfer_time};
use crate::domain::execution::report::{ExecutionReport, TaskRecord};
use crate::domain::execution::retry::RetryPolicy;
use crate::domain::execution::task_execution::TaskExecution;
use crate::domain::planner::solution::Plan;
use crate::domain::resource::resource_pool::ResourcePool;
use crate::domain::simulator::clock::SimulationClock;
use crate::domain::simulator::sampler::UniformSampler;
use crate::domain::utils::id::{TaskRef, VmId, WorkflowId};
use crate::domain::workflow::workflow::Workflow;
use crate::error::{Error, Result};

/// Event stepping of the execution run.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExecutionConfig {
    /// Lower bound on the distance between two progress events.
    pub min_time_between_events: f64,
    /// Upper bound on one progress tick. `None` steps straight to the next predicted finish.
    pub max_step: Option<f64>,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self { min_time_between_events: 1e-4, max_step: None }
    }
}

/// Replays a [`Plan`] on its VMs with transient fault injection.
///
/// Every VM works through its tasks in committed window order and runs at most
/// `pes` of them at once. A task is dispatched once all its parents completed.
#[derive(Debug)]
pub struct ExecutionSimulator<'a> {
    pool: &'a ResourcePool,
    transfer: TransferConfig,
    retry: RetryPolicy,
    config: ExecutionConfig,
}

impl<'a> ExecutionSimulator<'a> {
    pub fn new(pool: &'a ResourcePool, transfer: TransferConfig, retry: RetryPolicy, config: ExecutionConfig) -> Self {
        Self { pool, transfer, retry, config }
    }

    pub fn run(
        &self,
        workflows: &mut [Workflow],
        plan: &Plan,
        sampler: &mut dyn UniformSampler,
        clock: &mut dyn SimulationClock,
    ) -> Result<ExecutionReport> {
        let positions: HashMap<WorkflowId, usize> = workflows.iter().enumerate().map(|(i, w)| (w.id(), i)).collect();
        let mut executions: HashMap<TaskRef, TaskExecution> = HashMap::new();
        let mut planned: HashMap<TaskRef, (f64, f64)> = HashMap::new();
        let mut queues: Vec<VecDeque<TaskRef>> = Vec::with_capacity(self.pool.vm_count());

        for store in plan.windows.stores() {
            let mut queue = VecDeque::with_capacity(store.windows().len());
            for window in store.windows() {
                let workflow = Self::workflow_of(workflows, &positions, window.task.workflow)?;
                let task = workflow.get(window.task.task).ok_or_else(|| {
                    Error::ModelConstructionError(format!("plan references a task missing from workflow {}", workflow.name()))
                })?;
                executions.insert(window.task, TaskExecution::new(window.task, task.name.clone(), window.level, task.length));
                planned.insert(window.task, (window.start_time, window.finish_time));
                queue.push_back(window.task);
            }
            queues.push(queue);
        }

        log::info!("Starting execution of {} tasks on {} VMs.", executions.len(), queues.len());

        let mut running: Vec<TaskRef> = Vec::new();
        let mut busy_pes: Vec<u32> = vec![0; queues.len()];
        let mut pending = executions.len();

        loop {
            self.dispatch_ready(workflows, &positions, &mut queues, &mut busy_pes, &mut running, &mut executions, clock.now())?;

            if pending == 0 {
                break;
            }
            if running.is_empty() {
                return Err(Error::ExecutionStalled { time: clock.now(), pending });
            }

            let now = clock.now();
            let next = self.next_event_time(now, &running, &executions);
            clock.advance_to(next)?;
            let elapsed = next - now;

            // Resolve every due task (retries included) before the next event is predicted.
            for task_ref in &running {
                let draw = sampler.sample();
                let Some(execution) = executions.get_mut(task_ref) else {
                    continue;
                };
                let outcome = execution.progress(next, elapsed, self.pool, &self.retry, draw)?;
                if outcome.completed {
                    busy_pes[execution.level.vm.0] -= 1;
                    pending -= 1;
                    log::debug!("{:.4}: Task {} completed on VM {} after {} retries.", next, execution.name, execution.level.vm, execution.retry_count);
                }
            }
            running.retain(|t| executions.get(t).is_some_and(|e| !e.is_completed()));
        }

        let report = Self::build_report(workflows, &positions, &executions, &planned);
        log::info!(
            "Execution finished at {:.2}: elec cost {:.4}, {} retries, {} of {} workflows overdue.",
            report.makespan,
            report.elec_cost,
            report.total_retries,
            report.overdue_workflows,
            report.workflow_count
        );
        Ok(report)
    }

    fn workflow_of<'w>(workflows: &'w [Workflow], positions: &HashMap<WorkflowId, usize>, id: WorkflowId) -> Result<&'w Workflow> {
        positions
            .get(&id)
            .map(|i| &workflows[*i])
            .ok_or_else(|| Error::ModelConstructionError(format!("plan references unknown workflow {}", id)))
    }

    /// Starts queue heads whose parents completed, while their VM has a free PE.
    #[allow(clippy::too_many_arguments)]
    fn dispatch_ready(
        &self,
        workflows: &[Workflow],
        positions: &HashMap<WorkflowId, usize>,
        queues: &mut [VecDeque<TaskRef>],
        busy_pes: &mut [u32],
        running: &mut Vec<TaskRef>,
        executions: &mut HashMap<TaskRef, TaskExecution>,
        now: f64,
    ) -> Result<()> {
        for (vm_index, queue) in queues.iter_mut().enumerate() {
            let vm = self.pool.vm(VmId(vm_index));

            while busy_pes[vm_index] < vm.pes {
                let Some(&head) = queue.front() else {
                    break;
                };
                let workflow = Self::workflow_of(workflows, positions, head.workflow)?;
                let task = &workflow[head.task];

                let parents_done = task
                    .parents
                    .iter()
                    .all(|p| executions.get(&TaskRef::new(head.workflow, *p)).is_some_and(TaskExecution::is_completed));
                if !parents_done {
                    break;
                }

                // Largest predecessor transfer from where the parents actually ran, plus local inputs.
                let host = &vm.location;
                let predecessor_transfer = task
                    .parents
                    .iter()
                    .filter_map(|p| executions.get(&TaskRef::new(head.workflow, *p)).map(|e| (*p, e.level.vm)))
                    .map(|(p, parent_vm)| predecessor_data_transfer_time(task, host, p, &self.pool.vm(parent_vm).location, &self.transfer))
                    .fold(0.0, f64::max);
                let transfer_time = predecessor_transfer + local_data_transfer_time(task, host, &self.transfer);

                if let Some(execution) = executions.get_mut(&head) {
                    let mips = self.pool.level(execution.level).mips;
                    execution.dispatch(now, transfer_time, mips);
                    log::debug!("{:.4}: Dispatched task {} to VM {} (transfer {:.4}s).", now, execution.name, vm.id, transfer_time);
                }

                queue.pop_front();
                busy_pes[vm_index] += 1;
                running.push(head);
            }
        }
        Ok(())
    }

    fn next_event_time(&self, now: f64, running: &[TaskRef], executions: &HashMap<TaskRef, TaskExecution>) -> f64 {
        let min_step = now + self.config.min_time_between_events;
        let mut next = running
            .iter()
            .filter_map(|t| executions.get(t))
            .map(|e| e.estimated_finish_time(now, self.pool.level(e.level).mips).max(min_step))
            .fold(f64::MAX, f64::min);

        if let Some(max_step) = self.config.max_step {
            next = next.min(now + max_step.max(self.config.min_time_between_events));
        }
        next
    }

    fn build_report(
        workflows: &mut [Workflow],
        positions: &HashMap<WorkflowId, usize>,
        executions: &HashMap<TaskRef, TaskExecution>,
        planned: &HashMap<TaskRef, (f64, f64)>,
    ) -> ExecutionReport {
        let mut report = ExecutionReport { workflow_count: workflows.len(), ..ExecutionReport::default() };

        for execution in executions.values() {
            let Some(position) = positions.get(&execution.task.workflow) else {
                continue;
            };
            let workflow = &mut workflows[*position];
            let start = execution.start_time.unwrap_or_default();
            let finish = execution.finish_time.unwrap_or_default();
            let (planned_start, planned_finish) = planned.get(&execution.task).copied().unwrap_or_default();

            let task = &mut workflow[execution.task.task];
            task.retry_count = execution.retry_count;
            task.elec_cost = execution.elec_cost;

            report.records.push(TaskRecord {
                workflow: workflow.name().to_string(),
                task: execution.name.to_string(),
                vm: execution.level.vm.0,
                planned_level: execution.planned_level.level,
                level: execution.level.level,
                planned_start,
                planned_finish,
                start,
                finish,
                retry_count: execution.retry_count,
                elec_cost: execution.elec_cost,
            });
        }

        report.records.sort_by(|a, b| a.vm.cmp(&b.vm).then(a.start.total_cmp(&b.start)).then_with(|| a.task.cmp(&b.task)));
        report.elec_cost = report.records.iter().map(|r| r.elec_cost).sum();
        report.makespan = report.records.iter().map(|r| r.finish).fold(0.0, f64::max);
        report.total_retries = report.records.iter().map(|r| u64::from(r.retry_count)).sum();

        report.overdue_workflows = workflows
            .iter()
            .filter(|workflow| {
                workflow.is_overdue(|task| executions.get(&TaskRef::new(workflow.id(), task)).and_then(|e| e.finish_time))
            })
            .count();

        report
    }
}
