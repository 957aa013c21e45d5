use super::types::{RuntimeTask, RuntimeWork, TaskId, TaskOutline, TaskSpec, TaskWork};

/// Materialize a runtime tree from `spec`.
///
/// Every node gets a fresh id; children keep their list order and point back
/// at their parent through `parent_id`. All nodes start `PENDING`.
pub fn build(spec: &TaskSpec, parent_id: Option<TaskId>) -> RuntimeTask {
    let id = TaskId::new();

    let work = match &spec.work {
        TaskWork::Leaf(action) => RuntimeWork::Leaf(action.clone()),
        TaskWork::Group(children) => RuntimeWork::Group {
            children: children.iter().map(|child| build(child, Some(id))).collect(),
            concurrent: spec.concurrent,
        },
    };

    RuntimeTask::new(id, parent_id, spec.title.clone(), work)
}

/// Build every top-level spec as a root.
pub fn build_forest(specs: &[TaskSpec]) -> Vec<RuntimeTask> {
    specs.iter().map(|spec| build(spec, None)).collect()
}

/// Pre-order outline of `forest`, with depth for indentation.
pub fn outline(forest: &[RuntimeTask]) -> Vec<TaskOutline> {
    let mut out = Vec::new();
    for root in forest {
        push_outline(root, 0, &mut out);
    }
    out
}

fn push_outline(task: &RuntimeTask, depth: usize, out: &mut Vec<TaskOutline>) {
    out.push(TaskOutline {
        id: task.id,
        parent_id: task.parent_id,
        title: task.title.clone(),
        depth,
        is_group: task.is_group(),
        concurrent: task.is_concurrent(),
    });
    for child in task.children() {
        push_outline(child, depth + 1, out);
    }
}
