pub mod execution_simulator;
pub mod report;
pub mod retry;
pub mod task_execution;
