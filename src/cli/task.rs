//! taskman task command implementations.

use crate::error::Result;
use crate::filter::TaskFilter;
use crate::output::{emit_success, HumanOutput};
use crate::task::{Effect, TaskId, TaskRecord, Transition};

use super::Context;

pub struct AddOptions {
    pub title: String,
}

pub struct EditOptions {
    pub id: TaskId,
    pub title: String,
}

pub struct IdOptions {
    pub id: TaskId,
}

pub struct ListOptions {
    pub filter: Option<TaskFilter>,
}

#[derive(serde::Serialize)]
struct MutationReport {
    id: TaskId,
    effect: Effect,
    #[serde(skip_serializing_if = "Option::is_none")]
    task: Option<TaskRecord>,
}

#[derive(serde::Serialize)]
struct ListReport<'a> {
    user: &'a str,
    filter: TaskFilter,
    total: usize,
    tasks: Vec<&'a TaskRecord>,
}

pub fn run_add(ctx: &Context, options: AddOptions) -> Result<()> {
    let mut tracker = ctx.tracker()?;
    let result = tracker.add(&options.title)?;
    let id = result.id.unwrap_or_default();
    let task = result.state.get(id).cloned();

    let mut human = HumanOutput::new(format!(
        "taskman add: {}",
        task.as_ref().map(|t| t.title.as_str()).unwrap_or_default()
    ));
    human.push_summary("id", id.to_string());
    human.push_summary("tasks", result.state.len().to_string());

    let report = MutationReport {
        id,
        effect: result.effect,
        task,
    };
    emit_success(ctx.output, "add", &report, Some(&human))
}

pub fn run_done(ctx: &Context, options: IdOptions) -> Result<()> {
    let mut tracker = ctx.tracker()?;
    let result = tracker.complete(options.id)?;
    report_mutation(ctx, "done", options.id, result, |task| {
        if task.completed {
            format!("taskman done: {} marked completed", task.title)
        } else {
            format!("taskman done: {} marked incomplete", task.title)
        }
    })
}

pub fn run_edit(ctx: &Context, options: EditOptions) -> Result<()> {
    let mut tracker = ctx.tracker()?;
    let result = tracker.edit(options.id, &options.title)?;
    report_mutation(ctx, "edit", options.id, result, |task| {
        format!("taskman edit: renamed to {}", task.title)
    })
}

pub fn run_rm(ctx: &Context, options: IdOptions) -> Result<()> {
    let mut tracker = ctx.tracker()?;
    let removed = tracker.task(options.id).cloned();
    let result = tracker.delete(options.id)?;

    let mut human = match &removed {
        Some(task) => HumanOutput::new(format!("taskman rm: deleted {}", task.title)),
        None => HumanOutput::new("taskman rm: nothing deleted"),
    };
    human.push_summary("tasks", result.state.len().to_string());
    if result.effect == Effect::Missing {
        human.push_warning(missing_warning(options.id));
    }

    let report = MutationReport {
        id: options.id,
        effect: result.effect,
        task: removed,
    };
    emit_success(ctx.output, "rm", &report, Some(&human))
}

pub fn run_list(ctx: &Context, options: ListOptions) -> Result<()> {
    let tracker = ctx.tracker()?;
    let user = tracker.user().ok_or(crate::error::Error::NotLoggedIn)?;
    let filter = options.filter.unwrap_or(ctx.config.ui.default_filter);
    let visible = tracker.visible(filter);

    let mut human = HumanOutput::new(format!("taskman list: {} ({})", user, filter.label()));
    human.push_summary("showing", format!("{} of {}", visible.len(), tracker.tasks().len()));
    for task in &visible {
        human.push_detail(format_row(task));
    }
    if tracker.tasks().is_empty() {
        human.push_next_step("taskman add <title>");
    }

    let report = ListReport {
        user,
        filter,
        total: tracker.tasks().len(),
        tasks: visible,
    };
    emit_success(ctx.output, "list", &report, Some(&human))
}

fn report_mutation<F>(
    ctx: &Context,
    command: &str,
    id: TaskId,
    result: Transition,
    header: F,
) -> Result<()>
where
    F: FnOnce(&TaskRecord) -> String,
{
    let task = result.state.get(id).cloned();
    let mut human = match &task {
        Some(task) => HumanOutput::new(header(task)),
        None => HumanOutput::new(format!("taskman {command}: nothing changed")),
    };
    if result.effect == Effect::Missing {
        human.push_warning(missing_warning(id));
        human.push_next_step("taskman list");
    }

    let report = MutationReport {
        id,
        effect: result.effect,
        task,
    };
    emit_success(ctx.output, command, &report, Some(&human))
}

fn missing_warning(id: TaskId) -> String {
    format!("no task with id {id}")
}

pub(crate) fn format_row(task: &TaskRecord) -> String {
    let mark = if task.completed { "x" } else { " " };
    let status = if task.completed { "Completed" } else { "Incomplete" };
    format!("[{mark}] {} {} ({status})", task.id, task.title)
}
