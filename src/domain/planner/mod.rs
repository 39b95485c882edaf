pub mod heft_planner;
pub mod parameter;
pub mod planner_base;
pub mod planner_trait;
pub mod planner_type;
pub mod planning_tables;
pub mod random_planner;
pub mod solution;
