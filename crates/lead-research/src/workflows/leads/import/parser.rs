use serde::{Deserialize, Deserializer};
use std::io::Read;

use crate::workflows::leads::domain::{LeadId, LeadInput};

/// Reads spreadsheet rows into loosely-typed lead records. Ids follow row
/// position, so a skipped row still consumes its number.
pub(crate) fn parse_records<R: Read>(reader: R) -> Result<Vec<LeadInput>, csv::Error> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut records = Vec::new();

    for (position, record) in csv_reader.deserialize::<LeadRow>().enumerate() {
        let row = record?;
        records.push(row.into_input(LeadId::positional(position)));
    }

    Ok(records)
}

#[derive(Debug, Deserialize)]
struct LeadRow {
    #[serde(
        alias = "Company Name",
        alias = "Company",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    company_name: Option<String>,
    #[serde(
        alias = "Website",
        alias = "URL",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    website: Option<String>,
    #[serde(
        alias = "LinkedIn",
        alias = "LinkedIn URL",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    linkedin_url: Option<String>,
    #[serde(
        alias = "Industry",
        alias = "Vertical",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    industry: Option<String>,
    #[serde(
        alias = "Contact Name",
        alias = "Name",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    contact_name: Option<String>,
    #[serde(
        alias = "Contact Title",
        alias = "Title",
        alias = "Job Title",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    contact_title: Option<String>,
    #[serde(
        alias = "Contact LinkedIn",
        default,
        deserialize_with = "empty_string_as_none"
    )]
    contact_linkedin: Option<String>,
    #[serde(alias = "Notes", default, deserialize_with = "empty_string_as_none")]
    notes: Option<String>,
}

impl LeadRow {
    fn into_input(self, id: LeadId) -> LeadInput {
        LeadInput {
            id: Some(id.0),
            company_name: self.company_name.unwrap_or_default(),
            website: self.website,
            linkedin_url: self.linkedin_url,
            industry: self.industry,
            contact_name: self.contact_name,
            contact_title: self.contact_title,
            contact_linkedin: self.contact_linkedin,
            notes: self.notes,
        }
    }
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty() && value != "nan"))
}
