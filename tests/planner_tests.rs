mod common;

use common::{NO_FAULTS, assert_close, chain, diamond, mixed_pool, planner, single_vm_pool, uniform_pool};
use dvfs_workflow_planner::domain::planner::planner_type::PlannerType;
use dvfs_workflow_planner::domain::planner::solution::Plan;
use dvfs_workflow_planner::domain::resource::frequency_level::LevelRef;
use dvfs_workflow_planner::domain::schedule::exec_window::ExecWindow;
use dvfs_workflow_planner::domain::simulator::sampler::{ReplaySampler, SeededSampler};
use dvfs_workflow_planner::domain::utils::id::{TaskRef, VmId, WorkflowId};
use dvfs_workflow_planner::domain::workflow::task::DataFile;
use dvfs_workflow_planner::domain::workflow::workflow::{Workflow, WorkflowBuilder};

fn window_of(plan: &Plan, task: TaskRef) -> &ExecWindow {
    plan.windows.stores().iter().flat_map(|s| s.windows()).find(|w| w.task == task).unwrap()
}

/// Every task starts after all its parents finished, on whatever VM they ran.
fn assert_dependencies_respected(plan: &Plan, workflows: &[Workflow]) {
    for workflow in workflows {
        for task in workflow.tasks() {
            let window = window_of(plan, TaskRef::new(workflow.id(), task.id));
            assert!(window.start_time + 1e-9 >= window.ready_time);
            for parent in &task.parents {
                let parent_window = window_of(plan, TaskRef::new(workflow.id(), *parent));
                assert!(window.start_time + 1e-9 >= parent_window.finish_time, "{} starts before its parent finished", task.name);
            }
        }
    }
}

#[test]
fn test_two_task_chain_on_single_vm() {
    let pool = single_vm_pool(1000.0, NO_FAULTS);
    let mut workflows = vec![chain(0, &[1000.0, 2000.0])];
    let mut heft = planner(PlannerType::Heft, &pool);

    let plan = heft.plan(&mut workflows, &mut SeededSampler::new(1)).unwrap();

    let windows = plan.windows[VmId(0)].windows();
    assert_eq!(windows.len(), 2);
    assert_close(windows[0].start_time, 0.0);
    assert_close(windows[0].finish_time, 1.0);
    assert_close(windows[1].start_time, 1.0);
    assert_close(windows[1].finish_time, 3.0);
    assert_close(plan.finish_time, 3.0);
    assert!(plan.elec_cost > 0.0);

    let workflow = &workflows[0];
    let solution = plan.solution_for(workflow.id()).unwrap();
    let t1 = workflow.find_by_name("t1").unwrap();
    assert_close(solution.finish_time_of(t1).unwrap(), 3.0);
    assert_eq!(workflow[t1].assignment, Some(LevelRef::new(VmId(0), 0)));

    // Critical path of 3s stretched by the default deadline factor.
    assert_close(workflow.deadline(), 3.6);
    // No faults: the goal is the reliability factor per task.
    assert_close(workflow.reli_goal(), 0.98 * 0.98);
    assert_close(solution.reliability(), 1.0);
}

#[test]
fn test_heft_picks_fastest_vm_at_top_level() {
    let pool = mixed_pool(NO_FAULTS);
    let mut workflows = vec![chain(0, &[2000.0])];
    let mut heft = planner(PlannerType::Heft, &pool);

    let plan = heft.plan(&mut workflows, &mut SeededSampler::new(1)).unwrap();

    let t0 = workflows[0].find_by_name("t0").unwrap();
    // Both fast VMs finish at 1s, the first one wins the tie.
    assert_eq!(plan.binding(TaskRef::new(workflows[0].id(), t0)), Some(LevelRef::new(VmId(0), 0)));
    assert_close(plan.finish_time, 1.0);
}

#[test]
fn test_heft_diamond_is_valid_and_topological() {
    let pool = mixed_pool(NO_FAULTS);
    let mut workflows = vec![diamond(0)];
    let mut heft = planner(PlannerType::Heft, &pool);

    let plan = heft.plan(&mut workflows, &mut SeededSampler::new(1)).unwrap();

    plan.windows.validate().unwrap();
    assert_eq!(plan.windows.window_count(), 4);
    let solution = &plan.solutions[0];
    workflows[0].verify_topological_order(solution.sequence()).unwrap();
    assert_eq!(solution.sequence()[0], workflows[0].find_by_name("a").unwrap());
    assert_eq!(*solution.sequence().last().unwrap(), workflows[0].find_by_name("d").unwrap());
    assert_dependencies_respected(&plan, &workflows);
}

fn assert_same_plan(first: &Plan, second: &Plan) {
    assert_eq!(first.sequence, second.sequence);
    assert_close(first.finish_time, second.finish_time);
    assert_close(first.elec_cost, second.elec_cost);
    assert_eq!(first.windows.window_count(), second.windows.window_count());
    assert_eq!(first.solutions.len(), second.solutions.len());
    for (a, b) in first.solutions.iter().zip(&second.solutions) {
        assert_eq!(a.result().iter().collect::<Vec<_>>(), b.result().iter().collect::<Vec<_>>());
    }
}

#[test]
fn test_replanning_is_idempotent() {
    let pool = mixed_pool(NO_FAULTS);
    let mut first_input = vec![diamond(0), chain(1, &[1000.0, 500.0, 3000.0])];
    let mut second_input = first_input.clone();
    let mut heft = planner(PlannerType::Heft, &pool);

    let first = heft.plan(&mut first_input, &mut SeededSampler::new(1)).unwrap();
    let second = heft.plan(&mut second_input, &mut SeededSampler::new(1)).unwrap();

    assert_same_plan(&first, &second);
}

#[test]
fn test_random_replanning_with_same_seed_is_idempotent() {
    let pool = mixed_pool(NO_FAULTS);
    let mut first_input = vec![diamond(0), chain(1, &[1000.0, 500.0, 3000.0])];
    let mut second_input = first_input.clone();
    let mut random = planner(PlannerType::Random, &pool);

    let first = random.plan(&mut first_input, &mut SeededSampler::new(7)).unwrap();
    let second = random.plan(&mut second_input, &mut SeededSampler::new(7)).unwrap();

    assert_same_plan(&first, &second);
}

/// `a -> b` on two hosts of the same datacenter, `b` reading a 1 MB file written by `a`.
#[test]
fn test_cross_host_child_waits_for_transfer_and_pays_for_it() {
    let pool = mixed_pool(NO_FAULTS);
    let mut builder = WorkflowBuilder::new(WorkflowId(0), "split");
    let a = builder.add_task("a", 2000.0, Vec::new(), vec![DataFile::new("ab", 1e6)]);
    let b = builder.add_task("b", 2000.0, vec![DataFile::new("ab", 1e6)], Vec::new());
    builder.add_dependency(a, b).unwrap();
    let mut workflows = vec![builder.build().unwrap()];

    // a -> VM 0, b -> VM 1, both at the top level.
    let mut random = planner(PlannerType::Random, &pool);
    let plan = random.plan(&mut workflows, &mut ReplaySampler::new(vec![0.0, 0.0, 0.5, 0.0])).unwrap();

    let parent = window_of(&plan, TaskRef::new(WorkflowId(0), a));
    assert_eq!(parent.level, LevelRef::new(VmId(0), 0));
    assert_close(parent.finish_time, 1.0);

    // 1e6 bytes at the intra datacenter bandwidth of 1e7 take 0.1s.
    let child = window_of(&plan, TaskRef::new(WorkflowId(0), b));
    assert_eq!(child.level, LevelRef::new(VmId(1), 0));
    assert_close(child.ready_time, 1.1);
    assert_close(child.start_time, 1.1);
    assert_close(child.finish_time, 2.1);

    // 200 W at 0.10 per kWh from the parent's finish (transfer) to the end of the window.
    let per_second = 200.0 / 3600.0 / 1000.0 * 0.10;
    assert_close(parent.elec_cost.unwrap(), per_second * 1.0);
    assert_close(child.elec_cost.unwrap(), per_second * 1.1);
    assert_close(plan.elec_cost, per_second * 2.1);
}

#[test]
fn test_workflows_are_planned_one_after_another() {
    let pool = single_vm_pool(1000.0, NO_FAULTS);
    let mut workflows = vec![chain(0, &[1000.0]), chain(1, &[1000.0])];
    let mut heft = planner(PlannerType::Heft, &pool);

    let plan = heft.plan(&mut workflows, &mut SeededSampler::new(1)).unwrap();

    assert_close(plan.finish_time, 2.0);
    assert_eq!(plan.sequence.len(), 2);
    // The second deadline counts from the finish time of the first workflow.
    assert_close(workflows[0].deadline(), 1.2);
    assert_close(workflows[1].deadline(), 2.2);
}

#[test]
fn test_random_planner_produces_valid_schedule() {
    let pool = mixed_pool(NO_FAULTS);
    let mut workflows = vec![diamond(0), diamond(1), chain(2, &[1500.0, 700.0, 2500.0, 100.0])];
    let mut random = planner(PlannerType::Random, &pool);

    let plan = random.plan(&mut workflows, &mut SeededSampler::new(42)).unwrap();

    plan.windows.validate().unwrap();
    assert_eq!(plan.sequence.len(), 12);
    for workflow in &workflows {
        assert!(workflow.tasks().all(|t| t.assignment.is_some()));
        workflow.verify_topological_order(plan.solution_for(workflow.id()).unwrap().sequence()).unwrap();
    }
    assert_dependencies_respected(&plan, &workflows);
}

#[test]
fn test_random_planner_uses_drawn_level() {
    let pool = uniform_pool(1, 1000.0, &[(2.0, 100.0), (1.0, 40.0)], NO_FAULTS);
    let mut workflows = vec![chain(0, &[1000.0])];
    let mut random = planner(PlannerType::Random, &pool);

    // First draw picks the VM, the second one the level.
    let mut sampler = ReplaySampler::new(vec![0.9]);
    let plan = random.plan(&mut workflows, &mut sampler).unwrap();

    assert_eq!(sampler.consumed(), 2);
    let window = &plan.windows[VmId(0)].windows()[0];
    assert_eq!(window.level, LevelRef::new(VmId(0), 1));
    // Half the frequency, half the MIPS.
    assert_close(window.finish_time, 2.0);
}
