use std::collections::HashMap;

use crate::api::scenario_dto::ScenarioDto;
use crate::config::SimulationConfig;
use crate::domain::calculator::electricity::TariffTable;
use crate::domain::resource::datacenter::{Datacenter, Location};
use crate::domain::resource::resource_pool::ResourcePool;
use crate::domain::resource::virtual_machine::{LevelSpec, VirtualMachine, VmType};
use crate::domain::utils::id::{DatacenterName, VmId, VmTypeName, WorkflowId};
use crate::domain::workflow::workflow::Workflow;
use crate::error::{Error, Result};

/// Everything one run needs: the resource pool, the workflows and the configuration.
#[derive(Debug, Clone)]
pub struct Scenario {
    pub pool: ResourcePool,
    pub workflows: Vec<Workflow>,
    pub config: SimulationConfig,
}

impl Scenario {
    pub fn from_dto(dto: ScenarioDto) -> Result<Self> {
        let config = dto.config;

        let datacenters = dto
            .datacenters
            .into_iter()
            .enumerate()
            .map(|(index, dc)| {
                let tariff = TariffTable::new(dc.tariff)
                    .map_err(|e| Error::ModelConstructionError(format!("datacenter '{}': {}", dc.name, e)))?;
                Ok(Datacenter::new(index, DatacenterName::new(dc.name), tariff))
            })
            .collect::<Result<Vec<_>>>()?;

        let mut type_index: HashMap<String, usize> = HashMap::with_capacity(dto.vm_types.len());
        let mut vm_types = Vec::with_capacity(dto.vm_types.len());
        for (index, vm_type) in dto.vm_types.into_iter().enumerate() {
            if type_index.insert(vm_type.name.clone(), index).is_some() {
                return Err(Error::ModelConstructionError(format!("VM type '{}' is defined twice", vm_type.name)));
            }
            let levels = vm_type.levels.iter().map(|l| LevelSpec { frequency: l.frequency, power: l.power }).collect();
            vm_types.push(VmType::new(VmTypeName::new(vm_type.name), index, vm_type.mips, vm_type.pes, vm_type.frequency, levels)?);
        }

        let mut vms = Vec::new();
        for vm in &dto.vms {
            let index = type_index
                .get(&vm.vm_type)
                .copied()
                .ok_or_else(|| Error::ModelConstructionError(format!("VM references unknown VM type '{}'", vm.vm_type)))?;
            if vm.datacenter >= datacenters.len() {
                return Err(Error::ModelConstructionError(format!("VM of type '{}' references unknown datacenter {}", vm.vm_type, vm.datacenter)));
            }
            for _ in 0..vm.count {
                let id = VmId(vms.len());
                vms.push(VirtualMachine::new(id, &vm_types[index], Location::new(vm.datacenter, vm.host), &config.fault));
            }
        }

        let pool = ResourcePool::new(datacenters, vm_types, vms)?;

        let workflows = dto
            .workflows
            .iter()
            .enumerate()
            .map(|(index, workflow)| Workflow::from_dto(WorkflowId(index as u32), workflow))
            .collect::<Result<Vec<_>>>()?;

        log::info!(
            "Scenario built: {} datacenters, {} VM types, {} VMs, {} workflows.",
            pool.datacenters().len(),
            pool.vm_types().len(),
            pool.vm_count(),
            workflows.len()
        );

        Ok(Self { pool, workflows, config })
    }
}
