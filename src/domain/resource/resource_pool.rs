use std::collections::BTreeMap;

use crate::domain::calculator::electricity::TariffTable;
use crate::domain::resource::datacenter::{Datacenter, Location};
use crate::domain::resource::frequency_level::{FrequencyLevel, LevelRef};
use crate::domain::resource::virtual_machine::{VirtualMachine, VmType};
use crate::domain::simulator::sampler::UniformSampler;
use crate::domain::utils::id::VmId;
use crate::domain::workflow::workflow::Workflow;
use crate::error::{Error, Result};

/// The VM roster a planning run works on, together with the datacenters hosting it.
///
/// Every run owns its own pool, so two runs never share a window store or a VM.
#[derive(Debug, Clone)]
pub struct ResourcePool {
    datacenters: Vec<Datacenter>,
    vm_types: Vec<VmType>,
    vms: Vec<VirtualMachine>,
}

impl ResourcePool {
    pub fn new(datacenters: Vec<Datacenter>, vm_types: Vec<VmType>, vms: Vec<VirtualMachine>) -> Result<Self> {
        if vms.is_empty() {
            return Err(Error::EmptyResourcePool);
        }

        for (index, vm) in vms.iter().enumerate() {
            if vm.id != VmId(index) {
                return Err(Error::ModelConstructionError(format!("VM {} is stored at position {}", vm.id, index)));
            }
            if vm.location.datacenter >= datacenters.len() {
                return Err(Error::ModelConstructionError(format!("VM {} is placed in unknown datacenter {}", vm.id, vm.location.datacenter)));
            }
            if vm.type_index >= vm_types.len() {
                return Err(Error::ModelConstructionError(format!("VM {} has unknown type index {}", vm.id, vm.type_index)));
            }
        }

        Ok(Self { datacenters, vm_types, vms })
    }

    pub fn datacenters(&self) -> &[Datacenter] {
        &self.datacenters
    }

    pub fn vm_types(&self) -> &[VmType] {
        &self.vm_types
    }

    pub fn vms(&self) -> &[VirtualMachine] {
        &self.vms
    }

    pub fn vm_count(&self) -> usize {
        self.vms.len()
    }

    pub fn vm(&self, id: VmId) -> &VirtualMachine {
        &self.vms[id.0]
    }

    pub fn level(&self, level: LevelRef) -> &FrequencyLevel {
        &self.vms[level.vm.0].levels[level.level]
    }

    /// Tariff of the datacenter hosting `vm`.
    pub fn tariff_for(&self, vm: VmId) -> &TariffTable {
        &self.datacenters[self.vm(vm).location.datacenter].tariff
    }

    /// Mean base MIPS over all VMs.
    pub fn average_mips(&self) -> f64 {
        self.vms.iter().map(|vm| vm.mips).sum::<f64>() / self.vms.len() as f64
    }

    /// First VM of every VM type, ordered by type index. Types without a VM are skipped.
    pub fn type_representatives(&self) -> Vec<VmId> {
        let mut representatives: BTreeMap<usize, VmId> = BTreeMap::new();
        for vm in &self.vms {
            representatives.entry(vm.type_index).or_insert(vm.id);
        }
        representatives.into_values().collect()
    }

    /// Number of VMs on each distinct host.
    pub fn location_counts(&self) -> Vec<(Location, usize)> {
        let mut counts: BTreeMap<Location, usize> = BTreeMap::new();
        for vm in &self.vms {
            *counts.entry(vm.location).or_default() += 1;
        }
        counts.into_iter().collect()
    }

    /// Places every unplaced local input file of `workflow` on the host of a uniformly random VM.
    pub fn place_local_files(&self, workflow: &mut Workflow, sampler: &mut dyn UniformSampler) {
        let mut placed = 0;
        for task in workflow.tasks_mut() {
            for file in task.local_input_files.iter_mut().filter(|f| f.location.is_none()) {
                let vm = &self.vms[sampler.index(self.vms.len())];
                file.location = Some(vm.location);
                placed += 1;
            }
        }
        log::debug!("Placed {} local input files of workflow {}.", placed, workflow.name());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::calculator::electricity::TariffTable;
    use crate::domain::resource::virtual_machine::{FaultConfig, LevelSpec};
    use crate::domain::simulator::sampler::ReplaySampler;
    use crate::domain::utils::id::{DatacenterName, VmTypeName, WorkflowId};
    use crate::domain::workflow::task::DataFile;
    use crate::domain::workflow::workflow::WorkflowBuilder;

    fn pool() -> ResourcePool {
        let datacenters = vec![
            Datacenter::new(0, DatacenterName::new("dc0"), TariffTable::new(vec![0.1]).unwrap()),
            Datacenter::new(1, DatacenterName::new("dc1"), TariffTable::new(vec![0.2, 0.3]).unwrap()),
        ];
        let small = VmType::new(VmTypeName::new("small"), 0, 1000.0, 1, 1.0, vec![LevelSpec { frequency: 1.0, power: 50.0 }]).unwrap();
        let large = VmType::new(VmTypeName::new("large"), 1, 3000.0, 2, 1.0, vec![LevelSpec { frequency: 1.0, power: 150.0 }]).unwrap();
        let fault = FaultConfig::default();
        let vms = vec![
            VirtualMachine::new(VmId(0), &small, Location::new(0, 0), &fault),
            VirtualMachine::new(VmId(1), &large, Location::new(0, 0), &fault),
            VirtualMachine::new(VmId(2), &small, Location::new(1, 4), &fault),
        ];
        ResourcePool::new(datacenters, vec![small, large], vms).unwrap()
    }

    #[test]
    fn empty_pool_is_rejected() {
        assert!(matches!(ResourcePool::new(Vec::new(), Vec::new(), Vec::new()), Err(Error::EmptyResourcePool)));
    }

    #[test]
    fn aggregates() {
        let pool = pool();
        assert!((pool.average_mips() - 5000.0 / 3.0).abs() < 1e-9);
        assert_eq!(pool.type_representatives(), vec![VmId(0), VmId(1)]);
        assert_eq!(pool.location_counts(), vec![(Location::new(0, 0), 2), (Location::new(1, 4), 1)]);
        assert_eq!(pool.tariff_for(VmId(2)).prices(), &[0.2, 0.3]);
    }

    #[test]
    fn unplaced_local_files_land_on_a_vm_host() {
        let pool = pool();
        let mut builder = WorkflowBuilder::new(WorkflowId(0), "files");
        let task = builder.add_task(
            "t",
            10.0,
            vec![DataFile::new("in", 5.0), DataFile::located("fixed", 5.0, Location::new(0, 9))],
            Vec::new(),
        );
        let mut workflow = builder.build().unwrap();

        // 0.9 * 3 VMs -> VM #2
        pool.place_local_files(&mut workflow, &mut ReplaySampler::new(vec![0.9]));

        let files = &workflow[task].local_input_files;
        assert_eq!(files[0].location, Some(Location::new(1, 4)));
        assert_eq!(files[1].location, Some(Location::new(0, 9)));
    }
}
