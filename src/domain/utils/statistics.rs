use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;
use uuid::Uuid;

use crate::domain::execution::report::{ExecutionReport, TaskRecord};
use crate::domain::planner::solution::Plan;
use crate::error::Result;

/// Aggregates of one planning (and optionally execution) run.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RunSummary {
    pub run_id: String,
    pub planner: String,
    pub seed: u64,
    pub planned_elec_cost: f64,
    pub planned_finish_time: f64,
    pub planned_reliability: f64,
    /// Planning wall clock time in milliseconds.
    pub planning_runtime_ms: f64,
    pub task_count: usize,
    pub executed: bool,
    pub elec_cost: Option<f64>,
    pub makespan: Option<f64>,
    pub total_retries: Option<u64>,
    pub workflow_count: usize,
    pub overdue_workflows: Option<usize>,
}

impl RunSummary {
    pub fn new(plan: &Plan, report: Option<&ExecutionReport>, seed: u64) -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            planner: plan.planner.to_string(),
            seed,
            planned_elec_cost: plan.elec_cost,
            planned_finish_time: plan.finish_time,
            planned_reliability: plan.reliability(),
            planning_runtime_ms: plan.runtime.as_secs_f64() * 1000.0,
            task_count: plan.sequence.len(),
            executed: report.is_some(),
            elec_cost: report.map(|r| r.elec_cost),
            makespan: report.map(|r| r.makespan),
            total_retries: report.map(|r| r.total_retries),
            workflow_count: plan.solutions.len(),
            overdue_workflows: report.map(|r| r.overdue_workflows),
        }
    }
}

/// Writes one `;` separated row per executed task, with a header line.
pub fn write_task_records<W: Write>(records: &[TaskRecord], writer: W) -> Result<()> {
    let mut csv_wtr = csv::WriterBuilder::new().delimiter(b';').from_writer(writer);
    for record in records {
        csv_wtr.serialize(record)?;
    }
    csv_wtr.flush()?;
    Ok(())
}

pub fn write_csv(records: &[TaskRecord], path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    write_task_records(records, BufWriter::new(File::create(path)?))?;
    log::info!("Wrote {} task records to '{}'.", records.len(), path.display());
    Ok(())
}

pub fn write_json(summary: &RunSummary, path: impl AsRef<Path>) -> Result<()> {
    let path = path.as_ref();
    let mut writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(&mut writer, summary)?;
    writer.flush()?;
    log::info!("Wrote run summary {} to '{}'.", summary.run_id, path.display());
    Ok(())
}
