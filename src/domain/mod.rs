pub mod calculator;
pub mod execution;
pub mod planner;
pub mod resource;
pub mod scenario;
pub mod schedule;
pub mod simulator;
pub mod utils;
pub mod workflow;
