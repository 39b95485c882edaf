mod common;

use common::{chain, planner, single_vm_pool};
use dvfs_workflow_planner::domain::calculator::transfer::TransferConfig;
use dvfs_workflow_planner::domain::execution::execution_simulator::{ExecutionConfig, ExecutionSimulator};
use dvfs_workflow_planner::domain::execution::retry::RetryPolicy;
use dvfs_workflow_planner::domain::planner::planner_type::PlannerType;
use dvfs_workflow_planner::domain::resource::virtual_machine::FaultConfig;
use dvfs_workflow_planner::domain::simulator::clock::EventClock;
use dvfs_workflow_planner::domain::simulator::sampler::{ReplaySampler, SeededSampler};
use log::Level;
use logtest::Logger;

#[test]
fn test_retries_are_logged_as_warnings() {
    let mut logger = Logger::start();

    let pool = single_vm_pool(1000.0, FaultConfig { base_lambda: 1.0, sensitivity: 2.0 });
    let mut workflows = vec![chain(0, &[1000.0])];
    let plan = planner(PlannerType::Heft, &pool).plan(&mut workflows, &mut SeededSampler::new(9)).unwrap();

    let retry = RetryPolicy { max_retry_count: 1, dvfs_adaptive: false };
    let simulator = ExecutionSimulator::new(&pool, TransferConfig::default(), retry, ExecutionConfig::default());
    simulator.run(&mut workflows, &plan, &mut ReplaySampler::new(vec![0.0]), &mut EventClock::new(0.0)).unwrap();

    let mut retry_warnings = Vec::new();
    let mut planner_infos = 0;
    while let Some(record) = logger.pop() {
        if record.level() == Level::Warn && record.args().contains("Retrying") {
            retry_warnings.push(record.args().to_string());
        }
        if record.level() == Level::Info && record.args().starts_with("HEFT:") {
            planner_infos += 1;
        }
    }

    assert_eq!(retry_warnings.len(), 1);
    assert!(retry_warnings[0].contains("Retrying 1 for task t0"));
    assert!(planner_infos >= 2);
}
