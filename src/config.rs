use serde::{Deserialize, Serialize};

use crate::domain::calculator::transfer::TransferConfig;
use crate::domain::execution::execution_simulator::ExecutionConfig;
use crate::domain::execution::retry::RetryPolicy;
use crate::domain::planner::parameter::Parameter;
use crate::domain::resource::virtual_machine::FaultConfig;

/// Every tunable of a run. Read from the scenario file and passed down explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SimulationConfig {
    pub transfer: TransferConfig,
    pub fault: FaultConfig,
    pub retry: RetryPolicy,
    pub execution: ExecutionConfig,
    pub parameter: Parameter,
    /// Seed of the uniform sampler.
    pub seed: u64,
}
