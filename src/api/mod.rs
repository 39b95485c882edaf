pub mod dependency_dto;
pub mod resource_dto;
pub mod scenario_dto;
pub mod workflow_dto;
