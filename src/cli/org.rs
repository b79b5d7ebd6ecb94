//! taskboard org subcommand implementations

use crate::error::Result;
use crate::output::{emit_success, HumanOutput};

use super::CommandContext;

#[derive(serde::Serialize)]
struct OrgEntry {
    id: String,
    slug: String,
    name: String,
    contact_email: String,
    current: bool,
}

#[derive(serde::Serialize)]
struct ListReport {
    organizations: Vec<OrgEntry>,
    total: usize,
    current: Option<String>,
}

/// Run the org list command
pub fn run_list(context: CommandContext) -> Result<()> {
    let organizations = context.gateway.organizations()?;
    let current = context.organization_slug.trim();

    let entries: Vec<OrgEntry> = organizations
        .into_iter()
        .map(|org| OrgEntry {
            current: org.slug == current,
            id: org.id,
            slug: org.slug,
            name: org.name,
            contact_email: org.contact_email,
        })
        .collect();

    let report = ListReport {
        total: entries.len(),
        current: (!current.is_empty()).then(|| current.to_string()),
        organizations: entries,
    };

    let mut human = HumanOutput::new("Organizations");
    human.push_summary("total", report.total.to_string());
    for entry in &report.organizations {
        let marker = if entry.current { " (current)" } else { "" };
        human.push_detail(format!("{} [{}]{marker}", entry.name, entry.slug));
    }
    if report.current.is_none() {
        human.push_warning("no organization selected".to_string());
        human.push_next_step("set organization.slug in .taskboard.toml or pass --org".to_string());
    }

    emit_success(context.output, "org list", &report, Some(&human))
}
