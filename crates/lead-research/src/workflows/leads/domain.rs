use std::cmp::Ordering;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Identifier wrapper for imported leads (`lead_1`, `lead_2`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LeadId(pub String);

impl LeadId {
    /// Identifier assigned to the lead at `position` (zero based) of an import.
    pub fn positional(position: usize) -> Self {
        Self(format!("lead_{}", position + 1))
    }

    /// Sort key: text before the last `_`, then the numeric suffix (absent
    /// sorts first), then the full id.
    fn sort_key(&self) -> (&str, Option<u64>, &str) {
        match self.0.rsplit_once('_') {
            Some((prefix, tail)) => (prefix, tail.parse().ok(), &self.0),
            None => (&self.0, None, &self.0),
        }
    }
}

impl fmt::Display for LeadId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Ord for LeadId {
    /// `lead_2` sorts before `lead_10`.
    fn cmp(&self, other: &Self) -> Ordering {
        self.sort_key().cmp(&other.sort_key())
    }
}

impl PartialOrd for LeadId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// Business lead as delivered by the importer. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "LeadInput")]
pub struct Lead {
    id: LeadId,
    company_name: String,
    website: Option<String>,
    linkedin_url: Option<String>,
    industry: Option<String>,
    contact_name: Option<String>,
    contact_title: Option<String>,
    contact_linkedin: Option<String>,
    notes: Option<String>,
}

impl Lead {
    pub fn new(id: LeadId, company_name: impl Into<String>) -> Result<Self, ValidationError> {
        let company_name = company_name.into().trim().to_string();
        if company_name.is_empty() {
            return Err(ValidationError::MissingCompanyName { lead_id: id });
        }

        Ok(Self {
            id,
            company_name,
            website: None,
            linkedin_url: None,
            industry: None,
            contact_name: None,
            contact_title: None,
            contact_linkedin: None,
            notes: None,
        })
    }

    pub fn with_website(mut self, value: impl Into<String>) -> Self {
        self.website = present(value.into());
        self
    }

    pub fn with_linkedin_url(mut self, value: impl Into<String>) -> Self {
        self.linkedin_url = present(value.into());
        self
    }

    pub fn with_industry(mut self, value: impl Into<String>) -> Self {
        self.industry = present(value.into());
        self
    }

    pub fn with_contact_name(mut self, value: impl Into<String>) -> Self {
        self.contact_name = present(value.into());
        self
    }

    pub fn with_contact_title(mut self, value: impl Into<String>) -> Self {
        self.contact_title = present(value.into());
        self
    }

    pub fn with_contact_linkedin(mut self, value: impl Into<String>) -> Self {
        self.contact_linkedin = present(value.into());
        self
    }

    pub fn with_notes(mut self, value: impl Into<String>) -> Self {
        self.notes = present(value.into());
        self
    }

    pub fn id(&self) -> &LeadId {
        &self.id
    }

    pub fn company_name(&self) -> &str {
        &self.company_name
    }

    pub fn website(&self) -> Option<&str> {
        self.website.as_deref()
    }

    pub fn linkedin_url(&self) -> Option<&str> {
        self.linkedin_url.as_deref()
    }

    pub fn industry(&self) -> Option<&str> {
        self.industry.as_deref()
    }

    pub fn contact_name(&self) -> Option<&str> {
        self.contact_name.as_deref()
    }

    pub fn contact_title(&self) -> Option<&str> {
        self.contact_title.as_deref()
    }

    pub fn contact_linkedin(&self) -> Option<&str> {
        self.contact_linkedin.as_deref()
    }

    pub fn notes(&self) -> Option<&str> {
        self.notes.as_deref()
    }

    pub fn has_contact_info(&self) -> bool {
        self.contact_name.is_some() || self.contact_title.is_some()
    }
}

fn present(value: String) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

/// Loosely-typed lead payload accepted from JSON callers and checkpoint files.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeadInput {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub company_name: String,
    #[serde(default)]
    pub website: Option<String>,
    #[serde(default)]
    pub linkedin_url: Option<String>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub contact_name: Option<String>,
    #[serde(default)]
    pub contact_title: Option<String>,
    #[serde(default)]
    pub contact_linkedin: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl LeadInput {
    /// Builds a lead, assigning the positional id when the payload carries none.
    pub fn into_lead(self, position: usize) -> Result<Lead, ValidationError> {
        let id = self
            .id
            .clone()
            .and_then(present)
            .map(LeadId)
            .unwrap_or_else(|| LeadId::positional(position));
        self.build(id)
    }

    fn build(self, id: LeadId) -> Result<Lead, ValidationError> {
        let mut lead = Lead::new(id, self.company_name)?;
        lead.website = self.website.and_then(present);
        lead.linkedin_url = self.linkedin_url.and_then(present);
        lead.industry = self.industry.and_then(present);
        lead.contact_name = self.contact_name.and_then(present);
        lead.contact_title = self.contact_title.and_then(present);
        lead.contact_linkedin = self.contact_linkedin.and_then(present);
        lead.notes = self.notes.and_then(present);
        Ok(lead)
    }
}

impl TryFrom<LeadInput> for Lead {
    type Error = ValidationError;

    fn try_from(input: LeadInput) -> Result<Self, Self::Error> {
        let id = input
            .id
            .clone()
            .and_then(present)
            .map(LeadId)
            .ok_or(ValidationError::MissingLeadId)?;
        input.build(id)
    }
}

/// Input problems detected before any batch work starts.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("lead {lead_id}: missing company name")]
    MissingCompanyName { lead_id: LeadId },
    #[error("lead record is missing its id")]
    MissingLeadId,
    #[error("malformed lead document: {0}")]
    MalformedDocument(String),
}
