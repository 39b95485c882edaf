use std::fmt;

use crate::domain::calculator::electricity::electricity_cost;
use crate::domain::execution::retry::{RetryPolicy, is_fault};
use crate::domain::resource::frequency_level::LevelRef;
use crate::domain::resource::resource_pool::ResourcePool;
use crate::domain::utils::id::{TaskName, TaskRef};
use crate::error::Result;

/// Work below this many million instructions counts as done.
pub const LENGTH_EPSILON: f64 = 1e-6;

/// Life cycle of a task during the execution run.
///
/// `Scheduled -> Running -> (Faulted -> Rescheduled -> ...) -> Completed`.
/// A fault sends the task through `Faulted` to `Rescheduled` within the same
/// tick: the task keeps its VM and continues with extended length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionState {
    Scheduled,
    Running,
    Faulted,
    Rescheduled,
    Completed,
}

impl fmt::Display for ExecutionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// What one progress tick did to a task.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProgressOutcome {
    pub fault: bool,
    pub remaining_length: f64,
    /// Level the task continues at. Differs from the previous one after a DVFS step.
    pub level: LevelRef,
    pub completed: bool,
}

/// Execution state of one planned task.
#[derive(Debug, Clone)]
pub struct TaskExecution {
    pub task: TaskRef,
    pub name: TaskName,
    pub planned_level: LevelRef,
    pub level: LevelRef,
    /// Length of the task itself, without input transfer.
    pub base_length: f64,
    /// Length still to be processed in total, including transfer and redone work.
    pub total_length: f64,
    pub finished_length: f64,
    pub transfer_time: f64,
    pub state: ExecutionState,
    pub retry_count: u32,
    pub elec_cost: f64,
    pub start_time: Option<f64>,
    pub finish_time: Option<f64>,
}

impl TaskExecution {
    pub fn new(task: TaskRef, name: TaskName, level: LevelRef, base_length: f64) -> Self {
        Self {
            task,
            name,
            planned_level: level,
            level,
            base_length,
            total_length: base_length,
            finished_length: 0.0,
            transfer_time: 0.0,
            state: ExecutionState::Scheduled,
            retry_count: 0,
            elec_cost: 0.0,
            start_time: None,
            finish_time: None,
        }
    }

    pub fn remaining_length(&self) -> f64 {
        (self.total_length - self.finished_length).max(0.0)
    }

    pub fn is_completed(&self) -> bool {
        self.state == ExecutionState::Completed
    }

    /// Starts the task at `now`. Input transfer is modelled as extra length at the current speed.
    pub fn dispatch(&mut self, now: f64, transfer_time: f64, mips: f64) {
        self.transfer_time = transfer_time;
        self.total_length = self.base_length + mips * transfer_time;
        self.start_time = Some(now);
        self.state = ExecutionState::Running;
    }

    /// Predicted completion time at the current speed.
    pub fn estimated_finish_time(&self, now: f64, mips: f64) -> f64 {
        now + self.remaining_length() / mips
    }

    /// Advances the task over the tick `[now - elapsed, now]`.
    ///
    /// Charges electricity for the tick, credits the processed work and samples
    /// a transient fault over the part of the tick not spent on input transfer.
    /// On a fault within the retry budget, the completed work is added back to
    /// the remaining length and the level may step up. `draw` is consumed in any case.
    pub fn progress(&mut self, now: f64, elapsed: f64, pool: &ResourcePool, policy: &RetryPolicy, draw: f64) -> Result<ProgressOutcome> {
        let level = pool.level(self.level);
        let capacity = level.mips;

        self.elec_cost += electricity_cost(pool.tariff_for(self.level.vm), now - elapsed, now, level.power)?;

        let previous_finished = self.finished_length;
        self.finished_length += elapsed * capacity;

        // Input transfer is assumed fault-free.
        let transfer_length = self.transfer_time * capacity;
        let mut exec_span = elapsed;
        if previous_finished < transfer_length {
            exec_span = (elapsed - (transfer_length - previous_finished) / capacity).max(0.0);
        }

        let fault = is_fault(exec_span, level.lambda, draw) && policy.can_retry(self.retry_count);
        if fault {
            self.state = ExecutionState::Faulted;
            self.total_length = self.finished_length + self.base_length;
            self.retry_count += 1;
            log::warn!("{:.4}: Retrying {} for task {} ({}).", now, self.retry_count, self.name, self.task.workflow);

            if policy.dvfs_adaptive {
                let stepped = self.level.step_up();
                if stepped != self.level {
                    log::warn!(
                        "{:.4}: Adjusting level of VM {} from L{} to L{} for task {}.",
                        now,
                        self.level.vm,
                        self.level.level,
                        stepped.level,
                        self.name
                    );
                    self.level = stepped;
                }
            }
            self.state = ExecutionState::Rescheduled;
        }

        let completed = self.remaining_length() <= LENGTH_EPSILON;
        if completed {
            self.state = ExecutionState::Completed;
            self.finish_time = Some(now);
        }

        Ok(ProgressOutcome { fault, remaining_length: self.remaining_length(), level: self.level, completed })
    }
}
