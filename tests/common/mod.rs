#![allow(dead_code)]

use dvfs_workflow_planner::domain::calculator::electricity::TariffTable;
use dvfs_workflow_planner::domain::calculator::transfer::TransferConfig;
use dvfs_workflow_planner::domain::planner::parameter::Parameter;
use dvfs_workflow_planner::domain::planner::planner_base::PlannerBase;
use dvfs_workflow_planner::domain::planner::planner_trait::WorkflowPlanner;
use dvfs_workflow_planner::domain::planner::planner_type::PlannerType;
use dvfs_workflow_planner::domain::resource::datacenter::{Datacenter, Location};
use dvfs_workflow_planner::domain::resource::resource_pool::ResourcePool;
use dvfs_workflow_planner::domain::resource::virtual_machine::{FaultConfig, LevelSpec, VirtualMachine, VmType};
use dvfs_workflow_planner::domain::utils::id::{DatacenterName, TaskId, VmId, VmTypeName, WorkflowId};
use dvfs_workflow_planner::domain::workflow::task::DataFile;
use dvfs_workflow_planner::domain::workflow::workflow::{Workflow, WorkflowBuilder};

pub const NO_FAULTS: FaultConfig = FaultConfig { base_lambda: 0.0, sensitivity: 2.0 };

/// Pool of `vm_count` identical single PE VMs on one host. `levels` are `(frequency, power)` pairs,
/// the first one is the base frequency `mips` refers to.
pub fn uniform_pool(vm_count: usize, mips: f64, levels: &[(f64, f64)], fault: FaultConfig) -> ResourcePool {
    let specs: Vec<LevelSpec> = levels.iter().map(|&(frequency, power)| LevelSpec { frequency, power }).collect();
    let vm_type = VmType::new(VmTypeName::new("standard"), 0, mips, 1, levels[0].0, specs).unwrap();
    let datacenter = Datacenter::new(0, DatacenterName::new("dc-0"), TariffTable::new(vec![0.10, 0.20]).unwrap());
    let vms = (0..vm_count).map(|i| VirtualMachine::new(VmId(i), &vm_type, Location::new(0, 0), &fault)).collect();

    ResourcePool::new(vec![datacenter], vec![vm_type], vms).unwrap()
}

/// One VM with a single 1 GHz / 100 W level.
pub fn single_vm_pool(mips: f64, fault: FaultConfig) -> ResourcePool {
    uniform_pool(1, mips, &[(1.0, 100.0)], fault)
}

/// Two VM types on two hosts: a fast one with two levels and a slow one with a single level.
pub fn mixed_pool(fault: FaultConfig) -> ResourcePool {
    let fast = VmType::new(
        VmTypeName::new("fast"),
        0,
        2000.0,
        1,
        2.0,
        vec![LevelSpec { frequency: 2.0, power: 200.0 }, LevelSpec { frequency: 1.0, power: 80.0 }],
    )
    .unwrap();
    let slow = VmType::new(VmTypeName::new("slow"), 1, 500.0, 2, 1.0, vec![LevelSpec { frequency: 1.0, power: 40.0 }]).unwrap();
    let datacenters = vec![
        Datacenter::new(0, DatacenterName::new("dc-0"), TariffTable::new(vec![0.10]).unwrap()),
        Datacenter::new(1, DatacenterName::new("dc-1"), TariffTable::new(vec![0.05, 0.30]).unwrap()),
    ];
    let vms = vec![
        VirtualMachine::new(VmId(0), &fast, Location::new(0, 0), &fault),
        VirtualMachine::new(VmId(1), &fast, Location::new(0, 1), &fault),
        VirtualMachine::new(VmId(2), &slow, Location::new(1, 0), &fault),
    ];

    ResourcePool::new(datacenters, vec![fast, slow], vms).unwrap()
}

/// `t0 -> t1 -> ...` without any data files.
pub fn chain(id: u32, lengths: &[f64]) -> Workflow {
    let mut builder = WorkflowBuilder::new(WorkflowId(id), format!("chain-{}", id));
    let ids: Vec<TaskId> =
        lengths.iter().enumerate().map(|(i, length)| builder.add_task(format!("t{}", i), *length, Vec::new(), Vec::new())).collect();
    for pair in ids.windows(2) {
        builder.add_dependency(pair[0], pair[1]).unwrap();
    }
    builder.build().unwrap()
}

/// `a -> {b, c} -> d`, with `b` and `c` consuming 10 MB files produced by `a`.
pub fn diamond(id: u32) -> Workflow {
    let mut builder = WorkflowBuilder::new(WorkflowId(id), format!("diamond-{}", id));
    let a = builder.add_task("a", 4000.0, Vec::new(), vec![DataFile::new("ab", 1e7), DataFile::new("ac", 1e7)]);
    let b = builder.add_task("b", 8000.0, vec![DataFile::new("ab", 1e7)], vec![DataFile::new("bd", 1e6)]);
    let c = builder.add_task("c", 2000.0, vec![DataFile::new("ac", 1e7)], vec![DataFile::new("cd", 1e6)]);
    let d = builder.add_task("d", 3000.0, vec![DataFile::new("bd", 1e6), DataFile::new("cd", 1e6)], Vec::new());
    builder.add_dependency(a, b).unwrap();
    builder.add_dependency(a, c).unwrap();
    builder.add_dependency(b, d).unwrap();
    builder.add_dependency(c, d).unwrap();
    builder.build().unwrap()
}

pub fn planner(planner_type: PlannerType, pool: &ResourcePool) -> Box<dyn WorkflowPlanner> {
    PlannerType::get_instance(planner_type, PlannerBase::new(pool.clone(), Parameter::default(), TransferConfig::default()))
}

pub const EPSILON: f64 = 1e-9;

pub fn assert_close(actual: f64, expected: f64) {
    assert!((actual - expected).abs() < EPSILON, "expected {} but got {}", expected, actual);
}
