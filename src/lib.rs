use std::path::Path;

use crate::api::scenario_dto::ScenarioDto;
use crate::domain::execution::execution_simulator::ExecutionSimulator;
use crate::domain::execution::report::ExecutionReport;
use crate::domain::planner::planner_base::PlannerBase;
use crate::domain::planner::planner_type::PlannerType;
use crate::domain::planner::solution::Plan;
use crate::domain::scenario::Scenario;
use crate::domain::simulator::clock::EventClock;
use crate::domain::simulator::sampler::SeededSampler;
use crate::domain::workflow::workflow::Workflow;
use crate::error::Result;
use crate::loader::parser::parse_json_file;

pub mod api;
pub mod config;
pub mod domain;
pub mod error;
pub mod loader;
pub mod logger;

/// Result of [`run_scenario`]. `report` is `None` when execution was skipped.
///
/// `workflows` are the planned (and possibly executed) copies with placed input
/// files, assignments, retries and costs filled in.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub workflows: Vec<Workflow>,
    pub plan: Plan,
    pub report: Option<ExecutionReport>,
}

/// Reads a scenario file and builds the internal model.
pub fn load_scenario(file_path: impl AsRef<Path>) -> Result<Scenario> {
    let root_dto: ScenarioDto = parse_json_file::<ScenarioDto>(file_path.as_ref())?;
    log::info!("JSON file '{}' parsed successfully.", file_path.as_ref().display());

    Scenario::from_dto(root_dto)
}

/// Plans all workflows of `scenario` and, if `execute` is set, replays the plan with fault injection.
///
/// One sampler seeded from the scenario configuration drives input file
/// placement, random planning decisions and fault draws, in that order.
/// The scenario itself is left untouched, so the same seed always yields the same run.
pub fn run_scenario(scenario: &Scenario, planner_type: PlannerType, execute: bool) -> Result<RunOutcome> {
    let config = &scenario.config;
    let mut sampler = SeededSampler::new(config.seed);

    let mut workflows = scenario.workflows.clone();
    for workflow in workflows.iter_mut() {
        scenario.pool.place_local_files(workflow, &mut sampler);
    }

    let base = PlannerBase::new(scenario.pool.clone(), config.parameter.clone(), config.transfer);
    let mut planner = PlannerType::get_instance(planner_type, base);
    let plan = planner.plan(&mut workflows, &mut sampler)?;

    let report = if execute {
        let simulator = ExecutionSimulator::new(&scenario.pool, config.transfer, config.retry, config.execution);
        let mut clock = EventClock::new(0.0);
        Some(simulator.run(&mut workflows, &plan, &mut sampler, &mut clock)?)
    } else {
        None
    };

    Ok(RunOutcome { workflows, plan, report })
}

/// Entry point of the binary: initializes logging, loads the scenario and runs it.
pub fn run_scenario_file(file_path: impl AsRef<Path>, planner_type: PlannerType, execute: bool) -> Result<(Scenario, RunOutcome)> {
    logger::init();
    log::info!("Logger initialized. Starting scenario construction.");

    let scenario = load_scenario(file_path)?;
    log::info!("Internal scenario model constructed successfully.");

    let outcome = run_scenario(&scenario, planner_type, execute)?;
    Ok((scenario, outcome))
}
