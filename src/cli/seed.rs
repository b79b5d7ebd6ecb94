//! taskboard seed subcommand implementation

use std::path::PathBuf;

use crate::error::Result;
use crate::local::seed_demo_data;
use crate::output::{emit_success, HumanOutput, OutputOptions};

/// Run the seed command
pub fn run(dir: PathBuf, json: bool, quiet: bool) -> Result<()> {
    let summary = seed_demo_data(&dir)?;

    let mut human = HumanOutput::new(format!("Seeded {}", dir.display()));
    human.push_summary("organization", summary.organization_slug.clone());
    human.push_summary("tasks", summary.tasks.to_string());
    human.push_summary("comments", summary.comments.to_string());
    human.push_next_step(format!(
        "taskboard --data-dir {} --org {} tasks board",
        dir.display(),
        summary.organization_slug
    ));

    emit_success(
        OutputOptions { json, quiet },
        "seed",
        &summary,
        Some(&human),
    )
}
