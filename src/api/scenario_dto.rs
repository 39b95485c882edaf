use serde::{Deserialize, Serialize};

use crate::api::resource_dto::{DatacenterDto, VmDto, VmTypeDto};
use crate::api::workflow_dto::WorkflowDto;
use crate::config::SimulationConfig;

/// Root of a scenario file.
#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ScenarioDto {
    pub datacenters: Vec<DatacenterDto>,
    pub vm_types: Vec<VmTypeDto>,
    pub vms: Vec<VmDto>,
    pub workflows: Vec<WorkflowDto>,

    #[serde(default)]
    pub config: SimulationConfig,
}
