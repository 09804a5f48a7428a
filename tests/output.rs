use taskman::output::{format_human, render_success_json, HumanOutput};

#[test]
fn format_human_includes_sections() {
    let mut human = HumanOutput::new("taskman list: alice (All Tasks)");
    human.push_summary("showing", "1 of 1");
    human.push_detail("[ ] 1 buy milk (Incomplete)");
    human.push_warning("no task with id 7");
    human.push_next_step("taskman add <title>");

    let rendered = format_human(&human);
    assert!(rendered.contains("taskman list: alice (All Tasks)"));
    assert!(rendered.contains("Summary:"));
    assert!(rendered.contains("- showing: 1 of 1"));
    assert!(rendered.contains("Tasks:"));
    assert!(rendered.contains("- [ ] 1 buy milk (Incomplete)"));
    assert!(rendered.contains("Warnings:"));
    assert!(rendered.contains("Next steps:"));
}

#[test]
fn format_human_omits_empty_sections() {
    let human = HumanOutput::new("taskman logout: no active session");
    assert_eq!(format_human(&human), "taskman logout: no active session");
}

#[test]
fn success_json_carries_warnings() -> Result<(), Box<dyn std::error::Error>> {
    let mut human = HumanOutput::new("taskman done: nothing changed");
    human.push_warning("no task with id 7");

    let rendered = render_success_json("done", &serde_json::json!({ "id": 7 }), Some(&human))?;
    let value: serde_json::Value = serde_json::from_str(&rendered)?;
    assert_eq!(value["status"], "success");
    assert_eq!(value["data"]["id"], 7);
    assert_eq!(value["warnings"][0], "no task with id 7");

    Ok(())
}
