use serde::{Deserialize, Serialize};

use crate::api::dependency_dto::DependencyDto;

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct WorkflowDto {
    pub name: String,
    pub tasks: Vec<TaskDto>,

    #[serde(default)]
    pub dependencies: Vec<DependencyDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct TaskDto {
    pub id: String,
    /// Work in million instructions.
    pub length: f64,

    #[serde(default)]
    pub inputs: Vec<FileDto>,
    #[serde(default)]
    pub outputs: Vec<FileDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct FileDto {
    pub name: String,
    pub size: f64,

    /// Only read for input files that no parent produces.
    #[serde(default)]
    pub location: Option<LocationDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct LocationDto {
    pub datacenter: usize,
    pub host: usize,
}
