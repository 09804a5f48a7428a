mod support;

use predicates::str::contains;

#[test]
fn taskman_help_works() {
    support::taskman_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(contains("Task Manager"));
}

#[test]
fn subcommand_help_works() {
    let subcommands = ["login", "logout", "whoami", "add", "done", "edit", "rm", "list", "ui"];

    for cmd in subcommands {
        support::taskman_cmd().arg(cmd).arg("--help").assert().success();
    }
}

#[test]
fn unknown_filter_is_rejected() {
    let env = support::TestEnv::new();
    env.cmd()
        .args(["list", "--filter", "someday"])
        .assert()
        .failure()
        .stderr(contains("someday"));
}
