//! Organization context.
//!
//! All task and comment operations are scoped to the currently selected
//! organization. The context carries an explicit loading/error/unset
//! lifecycle so callers can distinguish "still loading" from "nothing
//! selected".

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// An organization (tenant) as returned by the backend.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct OrganizationRecord {
    pub id: String,
    pub slug: String,
    pub name: String,
    #[serde(default)]
    pub contact_email: String,
}

/// Lifecycle of the organization selection.
#[derive(Debug, Clone, Default)]
pub enum OrgContext {
    #[default]
    Loading,
    Failed(String),
    Ready {
        organizations: Vec<OrganizationRecord>,
        current: Option<String>,
    },
}

impl OrgContext {
    /// Context loaded with `slug` preselected when it names a known
    /// organization.
    pub fn ready(organizations: Vec<OrganizationRecord>, slug: Option<&str>) -> Self {
        let current = slug
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .filter(|value| organizations.iter().any(|org| org.slug == *value))
            .map(str::to_string);
        OrgContext::Ready {
            organizations,
            current,
        }
    }

    pub fn failed(message: impl Into<String>) -> Self {
        OrgContext::Failed(message.into())
    }

    pub fn is_loading(&self) -> bool {
        matches!(self, OrgContext::Loading)
    }

    pub fn error(&self) -> Option<&str> {
        match self {
            OrgContext::Failed(message) => Some(message),
            _ => None,
        }
    }

    pub fn organizations(&self) -> &[OrganizationRecord] {
        match self {
            OrgContext::Ready { organizations, .. } => organizations,
            _ => &[],
        }
    }

    pub fn current_organization(&self) -> Option<&OrganizationRecord> {
        match self {
            OrgContext::Ready {
                organizations,
                current: Some(slug),
            } => organizations.iter().find(|org| org.slug == *slug),
            _ => None,
        }
    }

    /// Slug of the current selection, if any.
    pub fn current_slug(&self) -> Option<&str> {
        self.current_organization().map(|org| org.slug.as_str())
    }

    /// Select an organization by slug.
    pub fn select(&mut self, slug: &str) -> Result<()> {
        let slug = slug.trim();
        match self {
            OrgContext::Ready {
                organizations,
                current,
            } => {
                if organizations.iter().any(|org| org.slug == slug) {
                    *current = Some(slug.to_string());
                    Ok(())
                } else {
                    Err(Error::OrganizationNotFound(slug.to_string()))
                }
            }
            _ => Err(Error::OrganizationNotFound(slug.to_string())),
        }
    }
}
