use anyhow::Context;
use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use dvfs_workflow_planner::domain::planner::planner_type::PlannerType;
use dvfs_workflow_planner::domain::utils::statistics::{RunSummary, write_csv, write_json};
use dvfs_workflow_planner::domain::workflow::comparator::WorkflowComparator;
use dvfs_workflow_planner::domain::workflow::job_sequence::JobSequenceStrategy;
use dvfs_workflow_planner::{load_scenario, logger, run_scenario};

/// Plans DAG workflows onto DVFS capable VMs and replays the plan with transient faults.
#[derive(Parser, Debug)]
#[command(name = "dvfs-planner", version, about)]
struct Args {
    /// Scenario JSON file with datacenters, VMs, workflows and configuration.
    scenario: PathBuf,

    /// Planning algorithm: `heft` or `random`.
    #[arg(short, long, default_value = "heft")]
    planner: PlannerType,

    /// Overrides the sampler seed of the scenario.
    #[arg(short, long)]
    seed: Option<u64>,

    /// Overrides the order workflows are planned in: `Default`, `Depth`, `JobNum` or `Length`.
    #[arg(long)]
    comparator: Option<WorkflowComparator>,

    /// Plans workflows in descending comparator order.
    #[arg(long)]
    descending: bool,

    /// Overrides the initial job sequence strategy, e.g. `LENGTH_DESC`.
    #[arg(long)]
    job_sequence: Option<JobSequenceStrategy>,

    /// Only plan, skip the execution run.
    #[arg(long)]
    no_execute: bool,

    /// Writes one row per executed task to this file.
    #[arg(long)]
    csv: Option<PathBuf>,

    /// Writes the run summary to this file.
    #[arg(long)]
    json: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    logger::init();

    let mut scenario =
        load_scenario(&args.scenario).with_context(|| format!("failed to load scenario '{}'", args.scenario.display()))?;
    if let Some(seed) = args.seed {
        scenario.config.seed = seed;
    }
    let parameter = &mut scenario.config.parameter;
    if let Some(comparator) = args.comparator {
        parameter.comparator = comparator;
    }
    if args.descending {
        parameter.ascending = false;
    }
    if let Some(strategy) = args.job_sequence {
        parameter.job_sequence_strategy = strategy;
    }
    log::info!("Planner parameters: {}", scenario.config.parameter);

    let outcome = run_scenario(&scenario, args.planner, !args.no_execute)
        .with_context(|| format!("{} run failed", args.planner))?;
    let summary = RunSummary::new(&outcome.plan, outcome.report.as_ref(), scenario.config.seed);

    println!("{} {} (run {})", "Planner".bold(), summary.planner.cyan(), summary.run_id);
    println!("  tasks:              {}", summary.task_count);
    println!("  planned elec cost:  {:.4}", summary.planned_elec_cost);
    println!("  planned finish:     {:.2}", summary.planned_finish_time);
    println!("  planned reliability {:.6}", summary.planned_reliability);
    println!("  planning runtime:   {:.3} ms", summary.planning_runtime_ms);

    if let Some(report) = &outcome.report {
        let overdue = format!("{} / {}", report.overdue_workflows, report.workflow_count);
        let overdue = if report.overdue_workflows == 0 { overdue.green() } else { overdue.red() };
        println!("{}", "Execution".bold());
        println!("  elec cost:          {:.4}", report.elec_cost);
        println!("  makespan:           {:.2}", report.makespan);
        println!("  retries:            {}", report.total_retries);
        println!("  overdue workflows:  {}", overdue);

        if let Some(path) = &args.csv {
            write_csv(&report.records, path).with_context(|| format!("failed to write '{}'", path.display()))?;
        }
    } else if args.csv.is_some() {
        log::warn!("--csv ignored: execution was skipped.");
    }

    if let Some(path) = &args.json {
        write_json(&summary, path).with_context(|| format!("failed to write '{}'", path.display()))?;
    }

    Ok(())
}
