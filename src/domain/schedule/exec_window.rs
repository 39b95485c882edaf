use serde::Serialize;

use crate::domain::resource::frequency_level::LevelRef;
use crate::domain::utils::id::{TaskName, TaskRef};

/// A committed busy interval `[start_time, finish_time)` on one VM's timeline.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExecWindow {
    pub start_time: f64,
    pub finish_time: f64,
    /// Frequency level the task runs at. Also names the VM.
    pub level: LevelRef,
    #[serde(skip)]
    pub task: TaskRef,
    pub task_name: TaskName,
    /// Position the window was inserted at when it was committed.
    pub insert_pos: usize,
    pub ready_time: f64,
    /// Planned electricity cost attributed to this window, if already known.
    pub elec_cost: Option<f64>,
}

impl ExecWindow {
    pub fn duration(&self) -> f64 {
        self.finish_time - self.start_time
    }
}

/// A not yet committed placement proposed by the window search.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WindowCandidate {
    pub start_time: f64,
    pub finish_time: f64,
    pub level: LevelRef,
    pub insert_pos: usize,
    pub ready_time: f64,
}
