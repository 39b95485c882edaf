use serde::{Deserialize, Serialize};

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct DatacenterDto {
    pub name: String,
    /// Hourly electricity prices, repeated cyclically.
    pub tariff: Vec<f64>,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VmTypeDto {
    pub name: String,
    pub mips: f64,
    #[serde(default = "default_pes")]
    pub pes: u32,
    /// Frequency `mips` is measured at.
    pub frequency: f64,
    pub levels: Vec<LevelDto>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
#[serde(rename_all = "camelCase")]
pub struct LevelDto {
    pub frequency: f64,
    pub power: f64,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
#[serde(rename_all = "camelCase")]
pub struct VmDto {
    pub vm_type: String,
    pub datacenter: usize,
    #[serde(default)]
    pub host: usize,
    /// Number of identical VMs on this host.
    #[serde(default = "default_count")]
    pub count: usize,
}

fn default_pes() -> u32 {
    1
}

fn default_count() -> usize {
    1
}
