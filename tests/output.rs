use taskboard::output::{format_human, HumanOutput};

#[test]
fn format_human_includes_sections() {
    let mut human = HumanOutput::new("Comment added");
    human.push_summary("task", "t-2");
    human.push_detail("Jane Smith, just now: ship it");
    human.push_warning("no organization selected");
    human.push_next_step("taskboard comments list t-2");

    let rendered = format_human(&human);
    assert!(rendered.contains("Comment added"));
    assert!(rendered.contains("Summary:"));
    assert!(rendered.contains("- task: t-2"));
    assert!(rendered.contains("Details:"));
    assert!(rendered.contains("- Jane Smith, just now: ship it"));
    assert!(rendered.contains("Warnings:"));
    assert!(rendered.contains("- no organization selected"));
    assert!(rendered.contains("Next steps:"));
    assert!(rendered.contains("- taskboard comments list t-2"));
}

#[test]
fn format_human_omits_empty_sections() {
    let human = HumanOutput::new("Seeded /tmp/demo");
    let rendered = format_human(&human);
    assert_eq!(rendered, "Seeded /tmp/demo");
}
