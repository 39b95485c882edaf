use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::workflow::comparator::WorkflowComparator;
use crate::domain::workflow::job_sequence::JobSequenceStrategy;

/// Tunable knobs of a planning run. Built once and never changed while planning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Parameter {
    /// Order in which workflows are planned.
    pub comparator: WorkflowComparator,
    pub ascending: bool,
    /// Slack added to the critical path when deriving a workflow deadline.
    pub deadline_factor: f64,
    /// Per-task reliability target used to derive a workflow reliability goal.
    pub reliability_factor: f64,
    pub job_sequence_strategy: JobSequenceStrategy,
    // Only read by neighbourhood search heuristics.
    pub neighborhood_factor: f64,
    pub slack_time_factor: f64,
}

impl Default for Parameter {
    fn default() -> Self {
        Self {
            comparator: WorkflowComparator::Default,
            ascending: true,
            deadline_factor: 0.2,
            reliability_factor: 0.98,
            job_sequence_strategy: JobSequenceStrategy::Deadline,
            neighborhood_factor: 0.2,
            slack_time_factor: 1.0,
        }
    }
}

impl fmt::Display for Parameter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "(cmp:{},asc:{},df:{:.2},rf:{:.3},seq:{},nf:{:.2},stf:{:.2})",
            self.comparator,
            self.ascending,
            self.deadline_factor,
            self.reliability_factor,
            self.job_sequence_strategy,
            self.neighborhood_factor,
            self.slack_time_factor
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let parameter: Parameter = serde_json::from_str(r#"{ "comparator": "Depth", "deadlineFactor": 0.5 }"#).unwrap();
        assert_eq!(parameter.comparator, WorkflowComparator::Depth);
        assert_eq!(parameter.deadline_factor, 0.5);
        assert_eq!(parameter.reliability_factor, 0.98);
        assert!(parameter.ascending);
    }

    #[test]
    fn display_is_compact() {
        assert_eq!(Parameter::default().to_string(), "(cmp:Default,asc:true,df:0.20,rf:0.980,seq:DEADLINE,nf:0.20,stf:1.00)");
    }
}
