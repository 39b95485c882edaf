use serde::{Deserialize, Serialize};

use crate::domain::resource::datacenter::Location;
use crate::domain::utils::id::TaskId;
use crate::domain::workflow::task::{DataFile, Task};

/// Bandwidths used to turn file sizes into transfer times.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TransferConfig {
    /// Bandwidth between two hosts of the same datacenter.
    pub intra_bandwidth: f64,
    /// Bandwidth between datacenters, also used for files without a known location.
    pub inter_bandwidth: f64,
}

impl Default for TransferConfig {
    fn default() -> Self {
        Self { intra_bandwidth: 1e7, inter_bandwidth: 1e6 }
    }
}

impl TransferConfig {
    fn bandwidth_between(&self, from: &Location, to: &Location) -> f64 {
        if from.same_datacenter(to) { self.intra_bandwidth } else { self.inter_bandwidth }
    }
}

/// Time needed to pull all locally-resident input files of `task` to `host`.
///
/// Files already on `host` cost nothing.
pub fn local_data_transfer_time(task: &Task, host: &Location, config: &TransferConfig) -> f64 {
    task.local_input_files.iter().map(|file| file_transfer_time(file, host, config)).sum()
}

fn file_transfer_time(file: &DataFile, host: &Location, config: &TransferConfig) -> f64 {
    match &file.location {
        Some(file_host) if file_host.same_host(host) => 0.0,
        Some(file_host) => file.size / config.bandwidth_between(file_host, host),
        None => file.size / config.inter_bandwidth,
    }
}

/// Time needed to move the files `task` consumes from `parent` when the parent
/// ran on `parent_host` and the task runs on `host`.
pub fn predecessor_data_transfer_time(task: &Task, host: &Location, parent: TaskId, parent_host: &Location, config: &TransferConfig) -> f64 {
    if host.same_host(parent_host) {
        return 0.0;
    }

    let data_size = task.pred_input_size(parent);
    data_size / config.bandwidth_between(parent_host, host)
}
