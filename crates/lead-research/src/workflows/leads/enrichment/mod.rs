//! Enrichment planning: decides which external lookups would best fill in a
//! sparse lead and how much confidence to place in the result. Plans are
//! advisory; they never gate scoring.

use serde::{Deserialize, Serialize};

use super::domain::{Lead, LeadId};

const TECH_SECTOR_KEYWORDS: [&str; 6] = ["tech", "software", "saas", "startup", "ai", "data"];

/// Research source a lookup draws on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    LinkedinCompanyProfile,
    LinkedinPersonProfile,
    LinkedinPeopleSearch,
    GoogleSearch,
}

/// External research tool a plan recommends.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LookupTool {
    #[serde(rename = "web_data_linkedin_company_profile")]
    LinkedinCompanyProfile,
    #[serde(rename = "web_data_linkedin_person_profile")]
    LinkedinPersonProfile,
    #[serde(rename = "web_data_linkedin_people_search")]
    LinkedinPeopleSearch,
    #[serde(rename = "search_engine")]
    SearchEngine,
    #[serde(rename = "web_data_crunchbase_company")]
    CrunchbaseCompany,
    #[serde(rename = "web_data_zoominfo_company_profile")]
    ZoominfoCompanyProfile,
    #[serde(rename = "web_data_reuter_news")]
    ReutersNews,
    #[serde(rename = "web_data_x_posts")]
    XPosts,
}

impl LookupTool {
    pub const fn name(self) -> &'static str {
        match self {
            Self::LinkedinCompanyProfile => "web_data_linkedin_company_profile",
            Self::LinkedinPersonProfile => "web_data_linkedin_person_profile",
            Self::LinkedinPeopleSearch => "web_data_linkedin_people_search",
            Self::SearchEngine => "search_engine",
            Self::CrunchbaseCompany => "web_data_crunchbase_company",
            Self::ZoominfoCompanyProfile => "web_data_zoominfo_company_profile",
            Self::ReutersNews => "web_data_reuter_news",
            Self::XPosts => "web_data_x_posts",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlanPriority {
    High,
    Standard,
    Low,
}

impl PlanPriority {
    fn from_confidence(average: f64) -> Self {
        if average >= 70.0 {
            Self::High
        } else if average >= 40.0 {
            Self::Standard
        } else {
            Self::Low
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::High => "high",
            Self::Standard => "standard",
            Self::Low => "low",
        }
    }
}

/// Lookup strategy for the company behind a lead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompanyLookup {
    pub company_name: String,
    pub data_sources: Vec<DataSource>,
    pub primary_tool: LookupTool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    pub secondary_tools: Vec<LookupTool>,
    pub confidence: u8,
}

/// Parameters for a people-search lookup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeopleSearchParams {
    pub first_name: String,
    pub last_name: String,
    pub company: String,
}

/// Lookup strategy for the named contact, when one is known.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContactLookup {
    pub data_sources: Vec<DataSource>,
    pub primary_tool: LookupTool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_query: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub search_params: Option<PeopleSearchParams>,
    pub secondary_tools: Vec<LookupTool>,
    pub confidence: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrichmentPlan {
    pub lead_id: LeadId,
    pub company: CompanyLookup,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub contact: Option<ContactLookup>,
    pub estimated_lookups: usize,
    pub priority: PlanPriority,
}

impl EnrichmentPlan {
    pub fn average_confidence(&self) -> f64 {
        let mut confidences = vec![f64::from(self.company.confidence)];
        if let Some(contact) = &self.contact {
            confidences.push(f64::from(contact.confidence));
        }
        confidences.iter().sum::<f64>() / confidences.len() as f64
    }
}

/// Builds enrichment plans from whichever identifying fields a lead carries.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnrichmentPlanner;

impl EnrichmentPlanner {
    pub fn plan(&self, lead: &Lead) -> EnrichmentPlan {
        plan(lead)
    }
}

pub fn plan(lead: &Lead) -> EnrichmentPlan {
    let company = plan_company(
        lead.company_name(),
        lead.website(),
        lead.linkedin_url(),
        lead.industry(),
    );
    let contact = plan_contact(
        lead.contact_name(),
        lead.contact_title(),
        Some(lead.company_name()),
        lead.contact_linkedin(),
    );

    let mut estimated_lookups = company.data_sources.len() + company.secondary_tools.len();
    if let Some(contact) = &contact {
        estimated_lookups += contact.data_sources.len() + contact.secondary_tools.len();
    }

    let mut plan = EnrichmentPlan {
        lead_id: lead.id().clone(),
        company,
        contact,
        estimated_lookups,
        priority: PlanPriority::Standard,
    };
    plan.priority = PlanPriority::from_confidence(plan.average_confidence());
    plan
}

pub(crate) fn plan_company(
    company_name: &str,
    website: Option<&str>,
    linkedin_url: Option<&str>,
    industry: Option<&str>,
) -> CompanyLookup {
    let (data_source, primary_tool, search_query, confidence) = if linkedin_url.is_some() {
        (
            DataSource::LinkedinCompanyProfile,
            LookupTool::LinkedinCompanyProfile,
            None,
            30,
        )
    } else if website.is_some() {
        (
            DataSource::GoogleSearch,
            LookupTool::SearchEngine,
            Some(format!("site:linkedin.com/company \"{company_name}\"")),
            20,
        )
    } else {
        let query = match industry {
            Some(industry) => format!("\"{company_name}\" {industry} company linkedin"),
            None => format!("\"{company_name}\" company linkedin"),
        };
        (
            DataSource::GoogleSearch,
            LookupTool::SearchEngine,
            Some(query),
            10,
        )
    };

    let mut secondary_tools = Vec::new();
    if industry.map(is_tech_sector).unwrap_or(false) {
        secondary_tools.push(LookupTool::CrunchbaseCompany);
    }
    secondary_tools.push(LookupTool::ZoominfoCompanyProfile);
    secondary_tools.push(LookupTool::ReutersNews);

    CompanyLookup {
        company_name: company_name.to_string(),
        data_sources: vec![data_source],
        primary_tool,
        search_query,
        secondary_tools,
        confidence,
    }
}

pub(crate) fn plan_contact(
    contact_name: Option<&str>,
    contact_title: Option<&str>,
    company_name: Option<&str>,
    linkedin_url: Option<&str>,
) -> Option<ContactLookup> {
    let company_name = company_name.filter(|name| !name.trim().is_empty());

    let mut lookup = if linkedin_url.is_some() {
        ContactLookup {
            data_sources: vec![DataSource::LinkedinPersonProfile],
            primary_tool: LookupTool::LinkedinPersonProfile,
            search_query: None,
            search_params: None,
            secondary_tools: Vec::new(),
            confidence: 90,
        }
    } else if let (Some(name), Some(company)) = (contact_name, company_name) {
        let mut parts = name.split_whitespace();
        let first_name = parts.next().unwrap_or_default().to_string();
        let last_name = parts.collect::<Vec<_>>().join(" ");
        ContactLookup {
            data_sources: vec![DataSource::LinkedinPeopleSearch],
            primary_tool: LookupTool::LinkedinPeopleSearch,
            search_query: None,
            search_params: Some(PeopleSearchParams {
                first_name,
                last_name,
                company: company.to_string(),
            }),
            secondary_tools: Vec::new(),
            confidence: 70,
        }
    } else if let (Some(title), Some(company)) = (contact_title, company_name) {
        ContactLookup {
            data_sources: vec![DataSource::GoogleSearch],
            primary_tool: LookupTool::SearchEngine,
            search_query: Some(format!("site:linkedin.com/in \"{title}\" \"{company}\"")),
            search_params: None,
            secondary_tools: Vec::new(),
            confidence: 50,
        }
    } else if let Some(title) = contact_title {
        ContactLookup {
            data_sources: vec![DataSource::GoogleSearch],
            primary_tool: LookupTool::SearchEngine,
            search_query: Some(format!("\"{title}\" linkedin")),
            search_params: None,
            secondary_tools: Vec::new(),
            confidence: 30,
        }
    } else {
        return None;
    };

    if contact_name.is_some() {
        lookup.secondary_tools.push(LookupTool::XPosts);
    }

    Some(lookup)
}

fn is_tech_sector(industry: &str) -> bool {
    let industry = industry.to_lowercase();
    TECH_SECTOR_KEYWORDS
        .iter()
        .any(|keyword| industry.contains(keyword))
}
