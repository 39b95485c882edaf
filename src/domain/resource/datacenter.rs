use serde::{Deserialize, Serialize};

use crate::domain::calculator::electricity::TariffTable;
use crate::domain::utils::id::DatacenterName;

/// Physical placement of a VM or a file: a host inside a datacenter.
///
/// Two locations are on the same host only if both indices match. Data moves
/// at intra-datacenter bandwidth between hosts of the same datacenter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Location {
    pub datacenter: usize,
    pub host: usize,
}

impl Location {
    pub fn new(datacenter: usize, host: usize) -> Self {
        Self { datacenter, host }
    }

    pub fn same_host(&self, other: &Location) -> bool {
        self == other
    }

    pub fn same_datacenter(&self, other: &Location) -> bool {
        self.datacenter == other.datacenter
    }
}

#[derive(Debug, Clone)]
pub struct Datacenter {
    pub index: usize,
    pub name: DatacenterName,
    pub tariff: TariffTable,
}

impl Datacenter {
    pub fn new(index: usize, name: DatacenterName, tariff: TariffTable) -> Self {
        Self { index, name, tariff }
    }
}
