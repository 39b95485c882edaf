use slotmap::{SecondaryMap, SlotMap};
use std::collections::{HashMap, VecDeque};
use std::ops::{Index, IndexMut};

use crate::api::workflow_dto::{FileDto, WorkflowDto};
use crate::domain::resource::datacenter::Location;
use crate::domain::utils::id::{TaskId, TaskName, WorkflowId, WorkflowName};
use crate::domain::workflow::task::{DataFile, Task};
use crate::error::{Error, Result};

/// A workflow: an identified DAG of tasks plus the planning targets derived for it.
///
/// Built once through [`WorkflowBuilder`]. Afterwards only the planner touches it
/// (deadline, reliability goal and task assignments), and the execution run
/// records retries and costs on its tasks.
#[derive(Debug, Clone)]
pub struct Workflow {
    id: WorkflowId,
    name: WorkflowName,
    tasks: SlotMap<TaskId, Task>,
    job_num: usize,
    length: f64,
    depth: u32,
    deadline: f64,
    reli_goal: f64,
}

impl Workflow {
    pub fn id(&self) -> WorkflowId {
        self.id
    }

    pub fn name(&self) -> &WorkflowName {
        &self.name
    }

    pub fn job_num(&self) -> usize {
        self.job_num
    }

    /// Sum of all task lengths.
    pub fn length(&self) -> f64 {
        self.length
    }

    /// Maximum task depth.
    pub fn depth(&self) -> u32 {
        self.depth
    }

    pub fn deadline(&self) -> f64 {
        self.deadline
    }

    pub fn reli_goal(&self) -> f64 {
        self.reli_goal
    }

    pub(crate) fn set_deadline(&mut self, deadline: f64) {
        self.deadline = deadline;
    }

    pub(crate) fn set_reli_goal(&mut self, reli_goal: f64) {
        self.reli_goal = reli_goal;
    }

    pub fn get(&self, id: TaskId) -> Option<&Task> {
        self.tasks.get(id)
    }

    pub fn get_mut(&mut self, id: TaskId) -> Option<&mut Task> {
        self.tasks.get_mut(id)
    }

    /// Tasks in insertion order.
    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn tasks_mut(&mut self) -> impl Iterator<Item = &mut Task> {
        self.tasks.values_mut()
    }

    pub fn task_ids(&self) -> Vec<TaskId> {
        self.tasks.keys().collect()
    }

    pub fn find_by_name(&self, name: &str) -> Option<TaskId> {
        self.tasks.iter().find(|(_, task)| task.name.as_str() == name).map(|(id, _)| id)
    }

    /// Checks that every task of the workflow appears in `sequence` after all of its parents.
    pub fn verify_topological_order(&self, sequence: &[TaskId]) -> Result<()> {
        let mut position: SecondaryMap<TaskId, usize> = SecondaryMap::with_capacity(sequence.len());
        for (index, id) in sequence.iter().enumerate() {
            position.insert(*id, index);
        }

        for id in sequence {
            let task = &self[*id];
            for parent in &task.parents {
                let placed_before = matches!(position.get(*parent), Some(parent_pos) if *parent_pos < position[*id]);
                if !placed_before {
                    return Err(Error::NonTopologicalSchedule {
                        workflow: self.name.to_string(),
                        parent: self[*parent].name.to_string(),
                        child: task.name.to_string(),
                    });
                }
            }
        }

        if sequence.len() != self.tasks.len() {
            log::error!("Sequence of workflow {} covers {} of {} tasks.", self.name, sequence.len(), self.tasks.len());
            if let Some(missing) = self.tasks.values().find(|t| !position.contains_key(t.id)) {
                let child = missing.children.first().map(|c| self[*c].name.to_string()).unwrap_or_else(|| missing.name.to_string());
                return Err(Error::NonTopologicalSchedule { workflow: self.name.to_string(), parent: missing.name.to_string(), child });
            }
        }
        Ok(())
    }

    /// `true` if any task finished after the workflow deadline.
    pub fn is_overdue(&self, finish_time_of: impl Fn(TaskId) -> Option<f64>) -> bool {
        self.tasks.keys().any(|id| finish_time_of(id).is_some_and(|finish| finish > self.deadline))
    }

    /// Builds a workflow from its DTO, resolving task references by id.
    pub fn from_dto(id: WorkflowId, dto: &WorkflowDto) -> Result<Self> {
        let mut builder = WorkflowBuilder::new(id, dto.name.clone());
        let mut key_by_name: HashMap<&str, TaskId> = HashMap::with_capacity(dto.tasks.len());

        for task_dto in &dto.tasks {
            if key_by_name.contains_key(task_dto.id.as_str()) {
                return Err(Error::ModelConstructionError(format!("workflow '{}' defines task '{}' twice", dto.name, task_dto.id)));
            }
            let inputs = task_dto.inputs.iter().map(file_from_dto).collect();
            let outputs = task_dto.outputs.iter().map(file_from_dto).collect();
            let key = builder.add_task(task_dto.id.clone(), task_dto.length, inputs, outputs);
            key_by_name.insert(task_dto.id.as_str(), key);
        }

        for dependency in &dto.dependencies {
            let resolve = |name: &str| {
                key_by_name.get(name).copied().ok_or_else(|| {
                    Error::ModelConstructionError(format!("workflow '{}' references unknown task '{}'", dto.name, name))
                })
            };
            let parent = resolve(&dependency.parent)?;
            let child = resolve(&dependency.child)?;
            builder.add_dependency(parent, child)?;
        }

        builder.build()
    }
}

fn file_from_dto(dto: &FileDto) -> DataFile {
    DataFile { name: dto.name.clone(), size: dto.size, location: dto.location.map(|l| Location::new(l.datacenter, l.host)) }
}

impl Index<TaskId> for Workflow {
    type Output = Task;

    fn index(&self, id: TaskId) -> &Task {
        &self.tasks[id]
    }
}

impl IndexMut<TaskId> for Workflow {
    fn index_mut(&mut self, id: TaskId) -> &mut Task {
        &mut self.tasks[id]
    }
}

/// Incrementally assembles a [`Workflow`] and derives depth, local files and aggregates on `build`.
pub struct WorkflowBuilder {
    id: WorkflowId,
    name: WorkflowName,
    tasks: SlotMap<TaskId, Task>,
    inputs: SecondaryMap<TaskId, Vec<DataFile>>,
}

impl WorkflowBuilder {
    pub fn new(id: WorkflowId, name: impl Into<String>) -> Self {
        Self { id, name: WorkflowName::new(name), tasks: SlotMap::with_key(), inputs: SecondaryMap::new() }
    }

    pub fn add_task(&mut self, name: impl Into<String>, length: f64, inputs: Vec<DataFile>, outputs: Vec<DataFile>) -> TaskId {
        let name = TaskName::new(name);
        let key = self.tasks.insert_with_key(|key| Task::new(key, name, length, outputs));
        self.inputs.insert(key, inputs);
        key
    }

    /// Adds the edge `parent -> child`. Adding the same edge twice is a no-op.
    pub fn add_dependency(&mut self, parent: TaskId, child: TaskId) -> Result<()> {
        if !self.tasks.contains_key(parent) || !self.tasks.contains_key(child) {
            return Err(Error::ModelConstructionError(format!("dependency in workflow '{}' references a task of another workflow", self.name)));
        }
        if parent == child {
            return Err(Error::ModelConstructionError(format!("task '{}' cannot depend on itself", self.tasks[child].name)));
        }

        if !self.tasks[parent].children.contains(&child) {
            self.tasks[parent].children.push(child);
        }
        if !self.tasks[child].parents.contains(&parent) {
            self.tasks[child].parents.push(parent);
        }
        Ok(())
    }

    pub fn build(mut self) -> Result<Workflow> {
        if self.tasks.is_empty() {
            return Err(Error::ModelConstructionError(format!("workflow '{}' has no task", self.name)));
        }
        self.check_sizes()?;

        let topological_order = self.topological_order()?;
        self.assign_depths(&topological_order);
        self.identify_input_files();

        let job_num = self.tasks.len();
        let length = self.tasks.values().map(|t| t.length).sum();
        let depth = self.tasks.values().map(|t| t.depth).max().unwrap_or(0);

        log::debug!("Built workflow {} {} with {} tasks, depth {}, length {}.", self.id, self.name, job_num, depth, length);

        Ok(Workflow {
            id: self.id,
            name: self.name,
            tasks: self.tasks,
            job_num,
            length,
            depth,
            deadline: f64::MAX,
            reli_goal: 0.0,
        })
    }

    /// Task lengths and file sizes must be finite and non-negative.
    fn check_sizes(&self) -> Result<()> {
        for (id, task) in &self.tasks {
            if !task.length.is_finite() || task.length < 0.0 {
                return Err(Error::ModelConstructionError(format!(
                    "task '{}' of workflow '{}' has invalid length {}",
                    task.name, self.name, task.length
                )));
            }
            let inputs = self.inputs.get(id).map(Vec::as_slice).unwrap_or_default();
            if let Some(file) = inputs.iter().chain(&task.output_files).find(|f| !f.size.is_finite() || f.size < 0.0) {
                return Err(Error::ModelConstructionError(format!(
                    "file '{}' of task '{}' in workflow '{}' has invalid size {}",
                    file.name, task.name, self.name, file.size
                )));
            }
        }
        Ok(())
    }

    /// **Phase 1: Topological Order**
    ///
    /// Kahn's algorithm seeded in insertion order. Leftover tasks mean the graph has a cycle.
    fn topological_order(&self) -> Result<Vec<TaskId>> {
        let mut in_degree: SecondaryMap<TaskId, usize> = self.tasks.iter().map(|(id, t)| (id, t.parents.len())).collect();
        let mut queue: VecDeque<TaskId> = self.tasks.iter().filter(|(_, t)| t.parents.is_empty()).map(|(id, _)| id).collect();
        let mut order = Vec::with_capacity(self.tasks.len());

        while let Some(id) = queue.pop_front() {
            order.push(id);
            for child in &self.tasks[id].children {
                let degree = &mut in_degree[*child];
                *degree -= 1;
                if *degree == 0 {
                    queue.push_back(*child);
                }
            }
        }

        if order.len() != self.tasks.len() {
            let stuck = self.tasks.iter().find(|(id, _)| in_degree[*id] > 0).map(|(_, t)| t.name.to_string()).unwrap_or_default();
            return Err(Error::ModelConstructionError(format!("workflow '{}' contains a cycle through task '{}'", self.name, stuck)));
        }
        Ok(order)
    }

    /// **Phase 2: Depth**
    ///
    /// `depth = 1 + max(parent.depth)`, roots get 0.
    fn assign_depths(&mut self, topological_order: &[TaskId]) {
        for id in topological_order {
            let depth = self.tasks[*id].parents.iter().map(|p| self.tasks[*p].depth + 1).max().unwrap_or(0);
            self.tasks[*id].depth = depth;
        }
    }

    /// **Phase 3: Input Files**
    ///
    /// An input produced by a parent is recorded under that parent. Everything
    /// else is a locally-resident input file.
    fn identify_input_files(&mut self) {
        let ids: Vec<TaskId> = self.tasks.keys().collect();
        for id in ids {
            let inputs = self.inputs.remove(id).unwrap_or_default();
            let parents = self.tasks[id].parents.clone();

            for file in inputs {
                let producers: Vec<TaskId> = parents.iter().copied().filter(|p| self.tasks[*p].produces(&file.name)).collect();

                let task = &mut self.tasks[id];
                if producers.is_empty() {
                    task.local_input_files.push(file);
                } else {
                    for producer in producers {
                        task.pred_input_files.entry(producer).or_default().push(file.clone());
                    }
                }
            }
        }
    }
}
