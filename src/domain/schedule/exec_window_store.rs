use std::ops::Index;

use crate::domain::resource::frequency_level::LevelRef;
use crate::domain::schedule::exec_window::{ExecWindow, WindowCandidate};
use crate::domain::utils::id::{TaskName, TaskRef, VmId};
use crate::error::{Error, Result};

/// Numerical tolerance for window boundary checks.
pub const EPSILON: f64 = 1e-9;

/// The ordered, pairwise non-overlapping windows reserved on one VM.
#[derive(Debug, Clone)]
pub struct ExecWindowStore {
    vm: VmId,
    windows: Vec<ExecWindow>,
}

impl ExecWindowStore {
    pub fn new(vm: VmId) -> Self {
        Self { vm, windows: Vec::new() }
    }

    pub fn vm(&self) -> VmId {
        self.vm
    }

    /// Windows sorted by start time.
    pub fn windows(&self) -> &[ExecWindow] {
        &self.windows
    }

    /// Earliest-finish placement of a task needing `exec_time` seconds that may start at `ready_time`.
    ///
    /// First fit by time: before the first window, then the first gap wide enough
    /// (scanning left to right), then after the last window. Nothing is reserved.
    pub fn find_window(&self, level: LevelRef, ready_time: f64, exec_time: f64) -> WindowCandidate {
        let candidate = |start_time: f64, insert_pos: usize| WindowCandidate {
            start_time,
            finish_time: start_time + exec_time,
            level,
            insert_pos,
            ready_time,
        };

        // 1. Before the first window
        if let Some(first) = self.windows.first() {
            if ready_time + exec_time <= first.start_time {
                return candidate(ready_time, 0);
            }
        }

        // 2. First gap between two windows that fits
        for (k, pair) in self.windows.windows(2).enumerate() {
            let gap_start = ready_time.max(pair[0].finish_time);
            if gap_start + exec_time <= pair[1].start_time {
                return candidate(gap_start, k + 1);
            }
        }

        // 3. Append
        let start_time = match self.windows.last() {
            Some(last) => ready_time.max(last.finish_time),
            None => ready_time,
        };
        candidate(start_time, self.windows.len())
    }

    /// Reserves `candidate` for `task`.
    ///
    /// Re-checks the ready time and both neighbours. A violation means the
    /// planner produced an inconsistent placement and is never corrected here.
    pub fn commit(&mut self, candidate: WindowCandidate, task: TaskRef, task_name: TaskName, elec_cost: Option<f64>) -> Result<&ExecWindow> {
        if candidate.level.vm != self.vm {
            return Err(Error::ModelConstructionError(format!(
                "window for task '{}' targets VM {} but was committed to VM {}",
                task_name, candidate.level.vm, self.vm
            )));
        }

        let insert_pos = candidate.insert_pos.min(self.windows.len());
        let window = ExecWindow {
            start_time: candidate.start_time,
            finish_time: candidate.finish_time,
            level: candidate.level,
            task,
            task_name,
            insert_pos,
            ready_time: candidate.ready_time,
            elec_cost,
        };

        if window.ready_time - window.start_time > EPSILON {
            return Err(Error::ReadyTimeViolation {
                vm: self.vm.0,
                task: window.task_name.to_string(),
                insert_pos,
                start: window.start_time,
                ready_time: window.ready_time,
            });
        }
        if insert_pos > 0 {
            let previous = &self.windows[insert_pos - 1];
            if previous.finish_time - window.start_time > EPSILON {
                return Err(self.overlap(&window, previous));
            }
        }
        if let Some(next) = self.windows.get(insert_pos) {
            if window.finish_time - next.start_time > EPSILON {
                return Err(self.overlap(&window, next));
            }
        }

        log::debug!(
            "Committed window [{:.4}, {:.4}) for task {} on VM {} at level {} (insert position {}).",
            window.start_time,
            window.finish_time,
            window.task_name,
            self.vm,
            window.level.level,
            insert_pos
        );

        self.windows.insert(insert_pos, window);
        Ok(&self.windows[insert_pos])
    }

    fn overlap(&self, window: &ExecWindow, existing: &ExecWindow) -> Error {
        Error::ExecWindowOverlap {
            vm: self.vm.0,
            task: window.task_name.to_string(),
            start: window.start_time,
            finish: window.finish_time,
            prev_task: existing.task_name.to_string(),
            prev_start: existing.start_time,
            prev_finish: existing.finish_time,
        }
    }

    /// Checks the whole timeline for overlaps.
    pub fn validate(&self) -> Result<()> {
        for pair in self.windows.windows(2) {
            if pair[0].finish_time - pair[1].start_time > EPSILON {
                return Err(self.overlap(&pair[1], &pair[0]));
            }
        }
        Ok(())
    }
}

/// One [`ExecWindowStore`] per VM of the pool, indexed by [`VmId`].
#[derive(Debug, Clone, Default)]
pub struct ExecWindowTable {
    stores: Vec<ExecWindowStore>,
}

impl ExecWindowTable {
    pub fn new(vm_count: usize) -> Self {
        Self { stores: (0..vm_count).map(|i| ExecWindowStore::new(VmId(i))).collect() }
    }

    pub fn store_mut(&mut self, vm: VmId) -> &mut ExecWindowStore {
        &mut self.stores[vm.0]
    }

    pub fn stores(&self) -> &[ExecWindowStore] {
        &self.stores
    }

    pub fn window_count(&self) -> usize {
        self.stores.iter().map(|s| s.windows.len()).sum()
    }

    pub fn validate(&self) -> Result<()> {
        self.stores.iter().try_for_each(ExecWindowStore::validate)
    }
}

impl Index<VmId> for ExecWindowTable {
    type Output = ExecWindowStore;

    fn index(&self, vm: VmId) -> &ExecWindowStore {
        &self.stores[vm.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::utils::id::{TaskId, WorkflowId};

    const VM: VmId = VmId(0);

    fn level() -> LevelRef {
        LevelRef::new(VM, 0)
    }

    fn task_ref() -> TaskRef {
        TaskRef::new(WorkflowId(0), TaskId::default())
    }

    fn store_with(windows: &[(f64, f64)]) -> ExecWindowStore {
        let mut store = ExecWindowStore::new(VM);
        for (i, (start, finish)) in windows.iter().enumerate() {
            let candidate = store.find_window(level(), *start, finish - start);
            assert_eq!(candidate.start_time, *start);
            store.commit(candidate, task_ref(), TaskName::new(format!("w{}", i)), None).unwrap();
        }
        store
    }

    #[test]
    fn gap_is_filled_before_appending() {
        let store = store_with(&[(0.0, 5.0), (10.0, 15.0)]);
        let candidate = store.find_window(level(), 3.0, 4.0);
        assert_eq!((candidate.start_time, candidate.finish_time), (5.0, 9.0));
        assert_eq!(candidate.insert_pos, 1);
    }

    #[test]
    fn fits_before_first_window() {
        let store = store_with(&[(10.0, 15.0)]);
        let candidate = store.find_window(level(), 2.0, 8.0);
        assert_eq!((candidate.start_time, candidate.insert_pos), (2.0, 0));
    }

    #[test]
    fn too_small_gap_appends() {
        let store = store_with(&[(0.0, 5.0), (7.0, 15.0)]);
        let candidate = store.find_window(level(), 0.0, 4.0);
        assert_eq!((candidate.start_time, candidate.finish_time, candidate.insert_pos), (15.0, 19.0, 2));
    }

    #[test]
    fn empty_store_starts_at_ready_time() {
        let store = ExecWindowStore::new(VM);
        let candidate = store.find_window(level(), 4.5, 1.0);
        assert_eq!((candidate.start_time, candidate.insert_pos), (4.5, 0));
    }

    #[test]
    fn append_waits_for_ready_time() {
        let store = store_with(&[(0.0, 5.0)]);
        let candidate = store.find_window(level(), 8.0, 1.0);
        assert_eq!((candidate.start_time, candidate.insert_pos), (8.0, 1));
    }

    #[test]
    fn commit_keeps_windows_sorted() {
        let mut store = store_with(&[(0.0, 5.0), (10.0, 15.0)]);
        let candidate = store.find_window(level(), 3.0, 4.0);
        store.commit(candidate, task_ref(), TaskName::new("gap"), Some(1.0)).unwrap();

        let starts: Vec<f64> = store.windows().iter().map(|w| w.start_time).collect();
        assert_eq!(starts, vec![0.0, 5.0, 10.0]);
        assert!(store.validate().is_ok());
    }

    #[test]
    fn overlapping_commit_is_rejected() {
        let mut store = store_with(&[(0.0, 5.0)]);
        let forged = WindowCandidate { start_time: 4.0, finish_time: 6.0, level: level(), insert_pos: 1, ready_time: 0.0 };
        let err = store.commit(forged, task_ref(), TaskName::new("bad"), None).unwrap_err();
        assert!(matches!(err, Error::ExecWindowOverlap { prev_finish, .. } if prev_finish == 5.0));
        assert_eq!(store.windows().len(), 1);
    }

    #[test]
    fn commit_before_ready_time_is_rejected() {
        let mut store = ExecWindowStore::new(VM);
        let forged = WindowCandidate { start_time: 1.0, finish_time: 2.0, level: level(), insert_pos: 0, ready_time: 1.5 };
        let err = store.commit(forged, task_ref(), TaskName::new("early"), None).unwrap_err();
        assert!(matches!(err, Error::ReadyTimeViolation { ready_time, .. } if ready_time == 1.5));
    }

    #[test]
    fn tolerance_accepts_touching_windows() {
        let mut store = store_with(&[(0.0, 5.0)]);
        let touching = WindowCandidate { start_time: 5.0 - 1e-12, finish_time: 6.0, level: level(), insert_pos: 1, ready_time: 0.0 };
        assert!(store.commit(touching, task_ref(), TaskName::new("touch"), None).is_ok());
    }
}
