use serde::{Serialize, Serializer};
use slotmap::new_key_type;
use std::fmt;
use std::marker::PhantomData;

/// Human readable, typed name of a domain object (workflow, task, VM type).
///
/// The tag parameter only exists at compile time and keeps e.g. a task name
/// from being passed where a workflow name is expected.
#[derive(PartialEq, Eq, PartialOrd, Ord, Clone, Hash)]
pub struct Id<T> {
    pub id: String,
    _marker: PhantomData<T>,
}

impl<T> Id<T> {
    pub fn new(id: impl Into<String>) -> Self {
        Id { id: id.into(), _marker: PhantomData }
    }

    pub fn as_str(&self) -> &str {
        &self.id
    }
}

impl<T> fmt::Display for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<T> From<Id<T>> for String {
    fn from(id_wrapper: Id<T>) -> Self {
        id_wrapper.id
    }
}

impl<T> fmt::Debug for Id<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let full_name = std::any::type_name::<T>();
        let clean_name = full_name.split("::").last().unwrap_or(full_name);
        let display_name = clean_name.replace("Tag", "Name");

        write!(f, "{}: {:?}", display_name, self.id)
    }
}

impl<T> Serialize for Id<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.id)
    }
}

#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct WorkflowTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct TaskTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct VmTypeTag;
#[derive(Debug, PartialEq, Eq, PartialOrd, Ord, Clone, Hash, Copy)]
pub struct DatacenterTag;

pub type WorkflowName = Id<WorkflowTag>;
pub type TaskName = Id<TaskTag>;
pub type VmTypeName = Id<VmTypeTag>;
pub type DatacenterName = Id<DatacenterTag>;

new_key_type! {
    /// Arena key of a task inside its workflow's task map.
    pub struct TaskId;
}

/// Stable small integer identity of a workflow, assigned when the workflow is built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct WorkflowId(pub u32);

/// Index of a virtual machine inside the resource pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct VmId(pub usize);

impl fmt::Display for WorkflowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for VmId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Globally unique reference to a task: its workflow plus its arena key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TaskRef {
    pub workflow: WorkflowId,
    pub task: TaskId,
}

impl TaskRef {
    pub fn new(workflow: WorkflowId, task: TaskId) -> Self {
        Self { workflow, task }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_names_the_tag() {
        let name = TaskName::new("mProject_3");
        assert_eq!(format!("{:?}", name), "TaskName: \"mProject_3\"");
        assert_eq!(name.to_string(), "mProject_3");
    }

    #[test]
    fn serializes_as_plain_string() {
        let name = WorkflowName::new("Montage_50");
        assert_eq!(serde_json::to_string(&name).unwrap(), "\"Montage_50\"");
    }
}
