pub mod comparator;
pub mod job_sequence;
pub mod task;
#[allow(clippy::module_inception)]
pub mod workflow;
