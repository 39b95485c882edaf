use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::utils::id::TaskId;
use crate::domain::workflow::workflow::Workflow;
use crate::error::Error;

/// Strategy for the initial intra-workflow job order handed to sequence-based heuristics.
///
/// HEFT and Random derive their own order from the upward rank and never read it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JobSequenceStrategy {
    #[default]
    Deadline,
    UpwardRank,
    DownwardRank,
    Depth,
    LengthAsc,
    LengthDesc,
}

impl JobSequenceStrategy {
    /// Initial job order of `workflow`. Rank based strategies keep insertion order, since
    /// the ranks only exist once a planner computed them.
    pub fn initial_job_sequence(&self, workflow: &Workflow) -> Vec<TaskId> {
        let mut sequence = workflow.task_ids();
        match self {
            JobSequenceStrategy::Deadline | JobSequenceStrategy::UpwardRank | JobSequenceStrategy::DownwardRank => {}
            JobSequenceStrategy::Depth => sequence.sort_by_key(|id| workflow[*id].depth),
            JobSequenceStrategy::LengthAsc => sequence.sort_by(|a, b| workflow[*a].length.total_cmp(&workflow[*b].length)),
            JobSequenceStrategy::LengthDesc => sequence.sort_by(|a, b| workflow[*b].length.total_cmp(&workflow[*a].length)),
        }
        sequence
    }
}

impl fmt::Display for JobSequenceStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JobSequenceStrategy::Deadline => "DEADLINE",
            JobSequenceStrategy::UpwardRank => "UPWARD_RANK",
            JobSequenceStrategy::DownwardRank => "DOWNWARD_RANK",
            JobSequenceStrategy::Depth => "DEPTH",
            JobSequenceStrategy::LengthAsc => "LENGTH_ASC",
            JobSequenceStrategy::LengthDesc => "LENGTH_DESC",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for JobSequenceStrategy {
    type Err = Error;

    fn from_str(value: &str) -> Result<JobSequenceStrategy, Self::Err> {
        match value {
            "Deadline" | "DEADLINE" => Ok(JobSequenceStrategy::Deadline),
            "UpwardRank" | "UPWARD_RANK" => Ok(JobSequenceStrategy::UpwardRank),
            "DownwardRank" | "DOWNWARD_RANK" => Ok(JobSequenceStrategy::DownwardRank),
            "Depth" | "DEPTH" => Ok(JobSequenceStrategy::Depth),
            "LengthAsc" | "LENGTH_ASC" => Ok(JobSequenceStrategy::LengthAsc),
            "LengthDesc" | "LENGTH_DESC" => Ok(JobSequenceStrategy::LengthDesc),
            _ => Err(Error::UnknownJobSequenceStrategy(value.to_string())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::utils::id::WorkflowId;
    use crate::domain::workflow::workflow::WorkflowBuilder;

    #[test]
    fn length_strategies_sort_by_task_length() {
        let mut builder = WorkflowBuilder::new(WorkflowId(0), "fork");
        let root = builder.add_task("root", 20.0, Vec::new(), Vec::new());
        let long = builder.add_task("long", 90.0, Vec::new(), Vec::new());
        let short = builder.add_task("short", 5.0, Vec::new(), Vec::new());
        builder.add_dependency(root, long).unwrap();
        builder.add_dependency(root, short).unwrap();
        let workflow = builder.build().unwrap();

        assert_eq!(JobSequenceStrategy::LengthAsc.initial_job_sequence(&workflow), vec![short, root, long]);
        assert_eq!(JobSequenceStrategy::LengthDesc.initial_job_sequence(&workflow), vec![long, root, short]);
        assert_eq!(JobSequenceStrategy::Depth.initial_job_sequence(&workflow)[0], root);
        assert_eq!(JobSequenceStrategy::UpwardRank.initial_job_sequence(&workflow), vec![root, long, short]);
    }

    #[test]
    fn parses_both_spellings() {
        assert_eq!("LENGTH_ASC".parse::<JobSequenceStrategy>().unwrap(), JobSequenceStrategy::LengthAsc);
        assert_eq!("UpwardRank".parse::<JobSequenceStrategy>().unwrap(), JobSequenceStrategy::UpwardRank);
        assert!("Random".parse::<JobSequenceStrategy>().is_err());
    }
}
