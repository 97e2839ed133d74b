use serde::{Deserialize, Serialize};

use crate::workflows::leads::domain::LeadInput;

/// Share of records carrying each optional field, formatted as `"42.5%"`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQuality {
    pub has_website: String,
    pub has_linkedin: String,
    pub has_industry: String,
    pub has_contact_info: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataQualityReport {
    pub total_leads: usize,
    pub valid_leads: usize,
    pub issues: Vec<String>,
    pub data_quality: DataQuality,
}

impl DataQualityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }
}

pub fn validate_leads(records: &[LeadInput]) -> DataQualityReport {
    let mut issues = Vec::new();
    let mut valid_leads = 0;
    let (mut website, mut linkedin, mut industry, mut contact) = (0, 0, 0, 0);

    for (position, record) in records.iter().enumerate() {
        if record.company_name.trim().is_empty() {
            let id = record
                .id
                .clone()
                .unwrap_or_else(|| format!("lead_{}", position + 1));
            issues.push(format!("Lead {id}: Missing company name"));
        } else {
            valid_leads += 1;
        }

        website += usize::from(filled(&record.website));
        linkedin += usize::from(filled(&record.linkedin_url));
        industry += usize::from(filled(&record.industry));
        contact += usize::from(filled(&record.contact_name) || filled(&record.contact_title));
    }

    let total = records.len();
    DataQualityReport {
        total_leads: total,
        valid_leads,
        issues,
        data_quality: DataQuality {
            has_website: percentage(website, total),
            has_linkedin: percentage(linkedin, total),
            has_industry: percentage(industry, total),
            has_contact_info: percentage(contact, total),
        },
    }
}

fn filled(value: &Option<String>) -> bool {
    value
        .as_deref()
        .map(|value| !value.trim().is_empty())
        .unwrap_or(false)
}

fn percentage(count: usize, total: usize) -> String {
    if total == 0 {
        return "0.0%".to_string();
    }
    format!("{:.1}%", count as f64 / total as f64 * 100.0)
}
