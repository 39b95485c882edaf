use serde::{Deserialize, Serialize};

use crate::domain::resource::datacenter::Location;
use crate::domain::resource::frequency_level::FrequencyLevel;
use crate::domain::utils::id::{VmId, VmTypeName};
use crate::error::{Error, Result};

/// Fault model used to derive the fault rate of every frequency level.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FaultConfig {
    /// Fault rate at the base frequency.
    pub base_lambda: f64,
    /// How many orders of magnitude the fault rate grows between the base and the lowest frequency.
    pub sensitivity: f64,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self { base_lambda: 1e-5, sensitivity: 2.0 }
    }
}

/// A (frequency, power) operating point as configured for a VM type.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelSpec {
    pub frequency: f64,
    pub power: f64,
}

/// Hardware class shared by several VMs.
#[derive(Debug, Clone)]
pub struct VmType {
    pub name: VmTypeName,
    /// Index of the type in the resource pool, used by the planning tables.
    pub index: usize,
    pub mips: f64,
    pub pes: u32,
    /// Base frequency `mips` refers to.
    pub frequency: f64,
    /// Operating points, sorted by frequency descending.
    pub levels: Vec<LevelSpec>,
}

impl VmType {
    pub fn new(name: VmTypeName, index: usize, mips: f64, pes: u32, frequency: f64, mut levels: Vec<LevelSpec>) -> Result<Self> {
        if levels.is_empty() {
            return Err(Error::ModelConstructionError(format!("VM type '{}' has no frequency level", name)));
        }
        if mips <= 0.0 || frequency <= 0.0 || pes == 0 {
            return Err(Error::ModelConstructionError(format!("VM type '{}' needs positive mips, frequency and pes", name)));
        }
        if let Some(bad) = levels.iter().find(|l| l.frequency <= 0.0 || l.power < 0.0) {
            return Err(Error::ModelConstructionError(format!("VM type '{}' has an invalid level {:?}", name, bad)));
        }

        levels.sort_by(|a, b| b.frequency.total_cmp(&a.frequency));
        if levels.windows(2).any(|pair| pair[0].frequency == pair[1].frequency) {
            return Err(Error::ModelConstructionError(format!("VM type '{}' defines the same frequency twice", name)));
        }

        Ok(Self { name, index, mips, pes, frequency, levels })
    }

    /// Derives the concrete frequency levels of a VM of this type.
    ///
    /// `mips = base_mips * f / f_base` and
    /// `lambda = base_lambda * 10^(SR * (f_base - f) / (f_base - f_min))`.
    pub fn derive_levels(&self, vm: VmId, fault: &FaultConfig) -> Vec<FrequencyLevel> {
        let min_frequency = self.levels.last().map(|l| l.frequency).unwrap_or(self.frequency);
        let span = self.frequency - min_frequency;

        self.levels
            .iter()
            .enumerate()
            .map(|(level, spec)| {
                let exponent = if span.abs() > f64::EPSILON { fault.sensitivity * (self.frequency - spec.frequency) / span } else { 0.0 };
                FrequencyLevel {
                    frequency: spec.frequency,
                    mips: self.mips * spec.frequency / self.frequency,
                    power: spec.power,
                    lambda: fault.base_lambda * 10f64.powf(exponent),
                    level,
                    vm,
                }
            })
            .collect()
    }
}

/// A frequency-scalable virtual machine placed on a host.
#[derive(Debug, Clone)]
pub struct VirtualMachine {
    pub id: VmId,
    pub vm_type: VmTypeName,
    pub type_index: usize,
    pub mips: f64,
    pub pes: u32,
    pub frequency: f64,
    pub location: Location,
    /// Sorted by frequency descending, `levels[i].level == i`.
    pub levels: Vec<FrequencyLevel>,
}

impl VirtualMachine {
    pub fn new(id: VmId, vm_type: &VmType, location: Location, fault: &FaultConfig) -> Self {
        Self {
            id,
            vm_type: vm_type.name.clone(),
            type_index: vm_type.index,
            mips: vm_type.mips,
            pes: vm_type.pes,
            frequency: vm_type.frequency,
            location,
            levels: vm_type.derive_levels(id, fault),
        }
    }

    /// Highest frequency level.
    pub fn top_level(&self) -> &FrequencyLevel {
        &self.levels[0]
    }

    pub fn level(&self, level: usize) -> Option<&FrequencyLevel> {
        self.levels.get(level)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn three_level_type() -> VmType {
        let levels = vec![
            LevelSpec { frequency: 1.2, power: 60.0 },
            LevelSpec { frequency: 2.0, power: 140.0 },
            LevelSpec { frequency: 1.6, power: 95.0 },
        ];
        VmType::new(VmTypeName::new("m5"), 0, 2000.0, 1, 2.0, levels).unwrap()
    }

    #[test]
    fn levels_are_sorted_by_frequency_descending() {
        let vm = VirtualMachine::new(VmId(3), &three_level_type(), Location::new(0, 0), &FaultConfig::default());
        let frequencies: Vec<f64> = vm.levels.iter().map(|l| l.frequency).collect();
        assert_eq!(frequencies, vec![2.0, 1.6, 1.2]);
        assert!(vm.levels.iter().enumerate().all(|(i, l)| l.level == i && l.vm == VmId(3)));
    }

    #[test]
    fn mips_scale_with_frequency_and_lambda_grows_when_slowing_down() {
        let fault = FaultConfig { base_lambda: 1e-5, sensitivity: 2.0 };
        let vm = VirtualMachine::new(VmId(0), &three_level_type(), Location::new(0, 0), &fault);

        assert!((vm.levels[0].mips - 2000.0).abs() < 1e-9);
        assert!((vm.levels[2].mips - 1200.0).abs() < 1e-9);

        assert!((vm.levels[0].lambda - 1e-5).abs() < 1e-18);
        assert!((vm.levels[1].lambda - 1e-4).abs() < 1e-15);
        assert!((vm.levels[2].lambda - 1e-3).abs() < 1e-15);
    }

    #[test]
    fn single_level_keeps_base_lambda() {
        let vm_type = VmType::new(VmTypeName::new("single"), 0, 1000.0, 1, 1.0, vec![LevelSpec { frequency: 1.0, power: 100.0 }]).unwrap();
        let vm = VirtualMachine::new(VmId(0), &vm_type, Location::new(0, 0), &FaultConfig::default());
        assert_eq!(vm.levels.len(), 1);
        assert_eq!(vm.levels[0].lambda, 1e-5);
    }

    #[test]
    fn type_without_levels_is_rejected() {
        assert!(VmType::new(VmTypeName::new("empty"), 0, 1000.0, 1, 1.0, Vec::new()).is_err());
    }
}
