use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    #[error("File not found or could not be read: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse scenario JSON: {0}")]
    DeserializationError(#[from] serde_json::Error),

    #[error("Failed to write CSV report: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Failed to build internal domain model: {0}")]
    ModelConstructionError(String),

    #[error("Unknown planner type: '{0}' (valid: heft, random)")]
    UnknownPlannerType(String),

    #[error("Unknown workflow comparator: '{0}' (valid: Default, Depth, JobNum, Length)")]
    UnknownComparator(String),

    #[error("Unknown job sequence strategy: '{0}'")]
    UnknownJobSequenceStrategy(String),

    #[error("The resource pool contains no virtual machine")]
    EmptyResourcePool,

    /// `start > end` was handed to the electricity cost integration.
    #[error("Invalid interval: start time {start} is after end time {end}")]
    InvalidInterval { start: f64, end: f64 },

    /// A committed window would overlap the window preceding it on the same VM.
    #[error(
        "Exec window overlap on VM #{vm} when inserting [{start}, {finish}) for task '{task}': previous window [{prev_start}, {prev_finish}) belongs to '{prev_task}'"
    )]
    ExecWindowOverlap {
        vm: usize,
        task: String,
        start: f64,
        finish: f64,
        prev_task: String,
        prev_start: f64,
        prev_finish: f64,
    },

    /// A committed window would start before its task is ready.
    #[error("Task '{task}' (insert position {insert_pos}) starts at {start} on VM #{vm}, before its ready time {ready_time}")]
    ReadyTimeViolation { vm: usize, task: String, insert_pos: usize, start: f64, ready_time: f64 },

    #[error("Schedule of workflow '{workflow}' is not in topological order: parent '{parent}' is not placed before child '{child}'")]
    NonTopologicalSchedule { workflow: String, parent: String, child: String },

    /// `task` needed `dependency` to be processed first, but it never was.
    #[error("Unresolved dependency in workflow '{workflow}': '{task}' requires '{dependency}', which was not processed before it")]
    UnresolvedDependency { workflow: String, task: String, dependency: String },

    #[error("Simulation clock cannot move backwards from {now} to {requested}")]
    ClockMovedBackwards { now: f64, requested: f64 },

    /// Unfinished tasks remain but none of them can make progress.
    #[error("Execution stalled at time {time}: {pending} tasks can never be dispatched")]
    ExecutionStalled { time: f64, pending: usize },
}

pub type Result<T> = std::result::Result<T, Error>;
