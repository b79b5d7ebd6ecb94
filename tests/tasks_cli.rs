mod support;

use predicates::str::contains;
use support::TestWorkspace;

#[test]
fn board_partitions_seeded_tasks() {
    let ws = TestWorkspace::seeded();
    let output = ws
        .command()
        .args(["--org", "acme", "--json", "tasks", "board"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let payload: serde_json::Value = serde_json::from_slice(&output).expect("json output");
    assert_eq!(payload["command"], "tasks board");
    assert_eq!(payload["data"]["total"], 4);
    assert_eq!(payload["data"]["todo"].as_array().unwrap().len(), 1);
    assert_eq!(payload["data"]["in_progress"].as_array().unwrap().len(), 2);
    assert_eq!(payload["data"]["done"].as_array().unwrap().len(), 1);
}

#[test]
fn board_human_output_names_columns() {
    let ws = TestWorkspace::seeded();
    ws.command()
        .args(["--org", "acme", "tasks", "board"])
        .assert()
        .success()
        .stdout(contains("Board for acme"))
        .stdout(contains("To Do: 1"))
        .stdout(contains("In Progress: 2"))
        .stdout(contains("Done: 1"));
}

#[test]
fn list_includes_comment_counts() {
    let ws = TestWorkspace::seeded();
    ws.command()
        .args(["--org", "acme", "tasks", "list"])
        .assert()
        .success()
        .stdout(contains("Wire up invoice export"))
        .stdout(contains("[2 comments]"));
}

#[test]
fn project_filter_narrows_the_set() {
    let ws = TestWorkspace::seeded();
    let output = ws
        .command()
        .args([
            "--org", "acme", "--json", "tasks", "list", "--project", "p-9",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let payload: serde_json::Value = serde_json::from_slice(&output).expect("json output");
    assert_eq!(payload["data"]["total"], 0);
}

#[test]
fn missing_organization_blocks_with_exit_code_3() {
    let ws = TestWorkspace::seeded();
    ws.command()
        .args(["tasks", "board"])
        .assert()
        .code(3)
        .stderr(contains("No organization selected"))
        .stderr(contains("taskboard org list"));
}

#[test]
fn unknown_organization_is_a_precondition_failure() {
    let ws = TestWorkspace::seeded();
    ws.command()
        .args(["--org", "globex", "tasks", "board"])
        .assert()
        .code(3)
        .stderr(contains("Organization not found: globex"));
}

#[test]
fn organization_can_come_from_the_config_file() {
    let ws = TestWorkspace::seeded();
    ws.write_config(
        r#"
        [organization]
        slug = "acme"
        "#,
    );

    ws.command()
        .args(["tasks", "board"])
        .assert()
        .success()
        .stdout(contains("Board for acme"));
}
