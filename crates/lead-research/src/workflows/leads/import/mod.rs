mod parser;
mod quality;

pub use quality::{validate_leads, DataQuality, DataQualityReport};

use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use super::domain::{Lead, LeadId, LeadInput, ValidationError};

#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("failed to read lead file: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid lead CSV data: {0}")]
    Csv(#[from] csv::Error),
    #[error("unsupported lead file format: {0} (expected .csv)")]
    UnsupportedFormat(String),
    #[error("invalid lead record: {0}")]
    Validation(#[from] ValidationError),
}

/// Leads accepted from one import, plus the rows that were dropped.
#[derive(Debug, Clone)]
pub struct LeadImport {
    pub leads: Vec<Lead>,
    pub skipped: Vec<LeadId>,
    pub quality: DataQualityReport,
}

pub struct LeadImporter;

impl LeadImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<LeadImport, IngestError> {
        let path = path.as_ref();
        let is_csv = path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);
        if !is_csv {
            return Err(IngestError::UnsupportedFormat(path.display().to_string()));
        }

        let file = std::fs::File::open(path)?;
        Self::from_reader(file)
    }

    pub fn from_reader<R: Read>(reader: R) -> Result<LeadImport, IngestError> {
        let records = parser::parse_records(reader)?;
        let quality = validate_leads(&records);
        let (leads, skipped) = accept_records(records)?;

        if !skipped.is_empty() {
            warn!(skipped = skipped.len(), "dropped lead rows without a company name");
        }
        info!(
            imported = leads.len(),
            valid = quality.valid_leads,
            "lead import complete"
        );

        Ok(LeadImport {
            leads,
            skipped,
            quality,
        })
    }
}

pub fn import_csv<R: Read>(reader: R) -> Result<LeadImport, IngestError> {
    LeadImporter::from_reader(reader)
}

pub fn import_csv_path<P: AsRef<Path>>(path: P) -> Result<LeadImport, IngestError> {
    LeadImporter::from_path(path)
}

/// Converts loosely-typed records into leads, assigning positional ids where
/// none are given. Records without a company name are reported as skipped.
pub fn accept_records(records: Vec<LeadInput>) -> Result<(Vec<Lead>, Vec<LeadId>), IngestError> {
    let mut leads = Vec::with_capacity(records.len());
    let mut skipped = Vec::new();

    for (position, record) in records.into_iter().enumerate() {
        match record.into_lead(position) {
            Ok(lead) => leads.push(lead),
            Err(ValidationError::MissingCompanyName { lead_id }) => skipped.push(lead_id),
            Err(other) => return Err(other.into()),
        }
    }

    Ok((leads, skipped))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn importer_skips_rows_without_a_company() {
        let csv = "company_name,industry\nAcme,SaaS\n,Retail\nGlobex,\n";
        let import = LeadImporter::from_reader(Cursor::new(csv)).expect("import succeeds");

        let ids: Vec<&str> = import.leads.iter().map(|lead| lead.id().0.as_str()).collect();
        assert_eq!(ids, vec!["lead_1", "lead_3"]);
        assert_eq!(import.skipped, vec![LeadId("lead_2".to_string())]);
        assert_eq!(import.quality.valid_leads, 2);
        assert_eq!(import.quality.issues.len(), 1);
    }

    #[test]
    fn importer_rejects_non_csv_paths() {
        let error = LeadImporter::from_path("./leads.xlsx").expect_err("unsupported");
        match error {
            IngestError::UnsupportedFormat(path) => assert!(path.ends_with("leads.xlsx")),
            other => panic!("expected unsupported format, got {other:?}"),
        }
    }

    #[test]
    fn importer_from_path_propagates_io_errors() {
        let error = LeadImporter::from_path("./does-not-exist.csv").expect_err("io error");
        assert!(matches!(error, IngestError::Io(_)));
    }
}
