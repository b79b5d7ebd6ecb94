mod support;

use predicates::str::contains;
use support::TestWorkspace;

#[test]
fn list_renders_thread_with_derived_authors() {
    let ws = TestWorkspace::seeded();
    ws.command()
        .args(["--org", "acme", "comments", "list", "t-2"])
        .assert()
        .success()
        .stdout(contains("Comments (2)"))
        .stdout(contains("Jane Smith"))
        .stdout(contains("Bob O Neil"))
        .stdout(contains("CSV first, PDF can wait."));
}

#[test]
fn empty_thread_renders_zero_count_and_call_to_action() {
    let ws = TestWorkspace::seeded();
    ws.command()
        .args(["--org", "acme", "comments", "list", "t-1"])
        .assert()
        .success()
        .stdout(contains("Comments (0)"))
        .stdout(contains("no comments yet"))
        .stdout(contains("taskboard comments add t-1"));
}

#[test]
fn add_then_list_round_trips() {
    let ws = TestWorkspace::seeded();
    ws.command()
        .args([
            "--org",
            "acme",
            "comments",
            "add",
            "t-2",
            "--message",
            "shipping friday",
            "--author",
            "carol@example.com",
        ])
        .assert()
        .success()
        .stdout(contains("Comment added"));

    // Exactly one record was appended.
    assert_eq!(ws.read_comments().len(), 3);

    ws.command()
        .args(["--org", "acme", "comments", "list", "t-2"])
        .assert()
        .success()
        .stdout(contains("Comments (3)"))
        .stdout(contains("shipping friday"));
}

#[test]
fn add_trims_submitted_fields() {
    let ws = TestWorkspace::seeded();
    let output = ws
        .command()
        .args([
            "--org",
            "acme",
            "--json",
            "comments",
            "add",
            "t-1",
            "--message",
            "  kickoff notes  ",
            "--author",
            " carol@example.com ",
        ])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let payload: serde_json::Value = serde_json::from_slice(&output).expect("json output");
    assert_eq!(payload["data"]["comment"]["content"], "kickoff notes");
    assert_eq!(payload["data"]["comment"]["authorEmail"], "carol@example.com");
}

#[test]
fn blank_message_is_blocked_locally() {
    let ws = TestWorkspace::seeded();
    ws.command()
        .args([
            "--org",
            "acme",
            "comments",
            "add",
            "t-2",
            "--message",
            "   ",
            "--author",
            "carol@example.com",
        ])
        .assert()
        .code(2)
        .stderr(contains("content cannot be empty"));

    // Nothing reached the data files.
    assert_eq!(ws.read_comments().len(), 2);
}

#[test]
fn missing_author_is_blocked_locally() {
    let ws = TestWorkspace::seeded();
    ws.command()
        .args([
            "--org", "acme", "comments", "add", "t-2", "--message", "hello",
        ])
        .assert()
        .code(2)
        .stderr(contains("author email cannot be empty"));
}

#[test]
fn author_defaults_to_config_identity() {
    let ws = TestWorkspace::seeded();
    ws.write_config(
        r#"
        [organization]
        slug = "acme"

        [author]
        email = "carol@example.com"
        "#,
    );

    ws.command()
        .args(["comments", "add", "t-2", "--message", "from config"])
        .assert()
        .success()
        .stdout(contains("Carol"));
}

#[test]
fn no_organization_skips_the_fetch() {
    let ws = TestWorkspace::seeded();
    ws.command()
        .args(["comments", "list", "t-2"])
        .assert()
        .code(3)
        .stderr(contains("No organization selected"))
        .stderr(contains("taskboard org list"));
}

#[test]
fn list_json_envelope_reports_the_thread() {
    let ws = TestWorkspace::seeded();
    let output = ws
        .command()
        .args(["--org", "acme", "--json", "comments", "list", "t-2"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let payload: serde_json::Value = serde_json::from_slice(&output).expect("json output");
    assert_eq!(payload["schema_version"], "taskboard.v1");
    assert_eq!(payload["command"], "comments list");
    assert_eq!(payload["data"]["task"], "t-2");
    assert_eq!(payload["data"]["total"], 2);
    // Newest first.
    assert_eq!(payload["data"]["comments"][0]["id"], "c-2");
}

#[test]
fn board_counts_reflect_added_comments() {
    let ws = TestWorkspace::seeded();
    ws.command()
        .args([
            "--org",
            "acme",
            "comments",
            "add",
            "t-1",
            "--message",
            "first",
            "--author",
            "carol@example.com",
        ])
        .assert()
        .success();

    let output = ws
        .command()
        .args(["--org", "acme", "--json", "tasks", "board"])
        .assert()
        .success()
        .get_output()
        .stdout
        .clone();

    let payload: serde_json::Value = serde_json::from_slice(&output).expect("json output");
    assert_eq!(payload["data"]["todo"][0]["id"], "t-1");
    assert_eq!(payload["data"]["todo"][0]["commentCount"], 1);
}
