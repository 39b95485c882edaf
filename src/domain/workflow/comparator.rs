use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::domain::workflow::workflow::Workflow;
use crate::error::Error;

/// Criteria used to order workflows before they are planned one after another.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum WorkflowComparator {
    /// Submission order, i.e. the workflow id.
    #[default]
    Default,
    Depth,
    JobNum,
    Length,
}

impl WorkflowComparator {
    /// Compares two workflows by the selected criterion only.
    ///
    /// Returns `Ordering::Less` if `w1` has the smaller key.
    pub fn compare(&self, w1: &Workflow, w2: &Workflow) -> Ordering {
        match self {
            WorkflowComparator::Default => w1.id().cmp(&w2.id()),
            WorkflowComparator::Depth => w1.depth().cmp(&w2.depth()),
            WorkflowComparator::JobNum => w1.job_num().cmp(&w2.job_num()),
            WorkflowComparator::Length => w1.length().total_cmp(&w2.length()),
        }
    }

    /// Sorts `workflows` in place. Equal keys stay in id order in both directions.
    pub fn sort(&self, workflows: &mut [Workflow], ascending: bool) {
        workflows.sort_by(|a, b| {
            let ordering = if ascending { self.compare(a, b) } else { self.compare(b, a) };
            ordering.then_with(|| a.id().cmp(&b.id()))
        });
    }
}

impl fmt::Display for WorkflowComparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            WorkflowComparator::Default => "Default",
            WorkflowComparator::Depth => "Depth",
            WorkflowComparator::JobNum => "JobNum",
            WorkflowComparator::Length => "Length",
        };
        write!(f, "{}", name)
    }
}

impl FromStr for WorkflowComparator {
    type Err = Error;

    fn from_str(value: &str) -> Result<WorkflowComparator, Self::Err> {
        match value {
            "Default" | "default" => Ok(WorkflowComparator::Default),
            "Depth" | "depth" => Ok(WorkflowComparator::Depth),
            "JobNum" | "jobnum" | "job_num" => Ok(WorkflowComparator::JobNum),
            "Length" | "length" => Ok(WorkflowComparator::Length),
            _ => Err(Error::UnknownComparator(value.to_string())),
        }
    }
}
