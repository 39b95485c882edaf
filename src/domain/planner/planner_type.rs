use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::domain::planner::heft_planner::HeftPlanner;
use crate::domain::planner::planner_base::PlannerBase;
use crate::domain::planner::planner_trait::WorkflowPlanner;
use crate::domain::planner::random_planner::RandomPlanner;
use crate::error::Error;

/// The available planning algorithms.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlannerType {
    /// **Heterogeneous Earliest Finish Time**: rank tasks by upward rank and place
    /// each one on the VM where it finishes first, at the highest frequency.
    Heft,
    /// Uniformly random VM and frequency level for every task. Baseline for HEFT.
    Random,
}

impl PlannerType {
    /// Factory method to return a concrete instance of a [`WorkflowPlanner`] based on the enum variant.
    pub fn get_instance(planner_type: PlannerType, base: PlannerBase) -> Box<dyn WorkflowPlanner> {
        match planner_type {
            PlannerType::Heft => Box::new(HeftPlanner::new(base)),
            PlannerType::Random => Box::new(RandomPlanner::new(base)),
        }
    }
}

impl fmt::Display for PlannerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlannerType::Heft => write!(f, "HEFT"),
            PlannerType::Random => write!(f, "Random"),
        }
    }
}

impl FromStr for PlannerType {
    type Err = Error;

    fn from_str(value: &str) -> Result<PlannerType, Self::Err> {
        match value.to_ascii_lowercase().as_str() {
            "heft" => Ok(PlannerType::Heft),
            "random" => Ok(PlannerType::Random),
            _ => Err(Error::UnknownPlannerType(value.to_string())),
        }
    }
}
