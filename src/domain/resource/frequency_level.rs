use serde::Serialize;
use std::fmt;

use crate::domain::utils::id::VmId;

/// One DVFS operating point of a virtual machine.
///
/// Lower frequencies draw less power but run slower and see transient faults
/// more often. Level 0 is always the highest frequency of its VM.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrequencyLevel {
    pub frequency: f64,
    /// Processing speed at this frequency.
    pub mips: f64,
    /// Power draw in watts.
    pub power: f64,
    /// Transient fault arrival rate.
    pub lambda: f64,
    pub level: usize,
    /// VM owning this level.
    pub vm: VmId,
}

impl FrequencyLevel {
    pub fn level_ref(&self) -> LevelRef {
        LevelRef { vm: self.vm, level: self.level }
    }

    pub fn exec_time(&self, length: f64) -> f64 {
        length / self.mips
    }
}

/// Non-owning handle to a [`FrequencyLevel`]: the VM plus the level index.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct LevelRef {
    pub vm: VmId,
    pub level: usize,
}

impl LevelRef {
    pub fn new(vm: VmId, level: usize) -> Self {
        Self { vm, level }
    }

    /// The next more reliable level (one step up in frequency), saturating at level 0.
    pub fn step_up(&self) -> Self {
        Self { vm: self.vm, level: self.level.saturating_sub(1) }
    }
}

impl fmt::Display for LevelRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "VM{} L{}", self.vm, self.level)
    }
}
