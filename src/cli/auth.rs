//! taskman login / logout / whoami

use crate::auth::LoginOutcome;
use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

use super::Context;

/// Options for `taskman login`
pub struct LoginOptions {
    pub username: String,
    pub password: String,
}

#[derive(serde::Serialize)]
struct LoginReport {
    user: String,
    outcome: LoginOutcome,
    tasks: usize,
}

#[derive(serde::Serialize)]
struct SessionReport {
    #[serde(skip_serializing_if = "Option::is_none")]
    user: Option<String>,
    logged_in: bool,
}

pub fn run_login(ctx: &Context, options: LoginOptions) -> Result<()> {
    let mut tracker = ctx.session()?;
    let outcome = tracker.login(&options.username, &options.password)?;
    let user = tracker.user().unwrap_or_default().to_string();

    let report = LoginReport {
        user: user.clone(),
        outcome,
        tasks: tracker.tasks().len(),
    };

    let verb = match outcome {
        LoginOutcome::Registered => "registered and logged in",
        LoginOutcome::LoggedIn => "logged in",
    };
    let mut human = HumanOutput::new(format!("taskman login: {user} {verb}"));
    human.push_summary("tasks", report.tasks.to_string());
    human.push_next_step("taskman list");
    if report.tasks == 0 {
        human.push_next_step("taskman add <title>");
    }

    emit_success(ctx.output, "login", &report, Some(&human))
}

pub fn run_logout(ctx: &Context) -> Result<()> {
    let mut tracker = ctx.session()?;
    let previous = tracker.user().map(str::to_string);
    tracker.logout()?;

    let report = SessionReport {
        user: previous.clone(),
        logged_in: false,
    };

    let header = match &previous {
        Some(user) => format!("taskman logout: {user} logged out"),
        None => "taskman logout: no active session".to_string(),
    };
    let human = HumanOutput::new(header);

    emit_success(ctx.output, "logout", &report, Some(&human))
}

pub fn run_whoami(ctx: &Context) -> Result<()> {
    let tracker = ctx.session()?;
    let user = tracker.user().map(str::to_string);

    let report = SessionReport {
        logged_in: user.is_some(),
        user: user.clone(),
    };

    let mut human = HumanOutput::new(match &user {
        Some(user) => user.clone(),
        None => "not logged in".to_string(),
    });
    if user.is_none() {
        human.push_next_step("taskman login <username> --password <password>");
    }

    emit_success(ctx.output, "whoami", &report, Some(&human))
}
