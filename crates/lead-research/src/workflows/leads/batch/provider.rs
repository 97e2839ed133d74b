use std::collections::BTreeMap;

use crate::workflows::leads::domain::{Lead, LeadId};
use crate::workflows::leads::enrichment::EnrichmentPlan;
use crate::workflows::leads::qualification::{SignalError, SignalFlags, SignalRecord};

/// Source of the signal record a lead is scored against.
///
/// Real research integrations plug in here; the batch pipeline only needs a
/// record back (or a per-lead error).
pub trait SignalProvider: Send + Sync {
    fn signals(&self, lead: &Lead, plan: &EnrichmentPlan) -> Result<SignalRecord, SignalError>;
}

/// Deterministic stand-in used until a research integration is wired up.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlaceholderSignals;

impl SignalProvider for PlaceholderSignals {
    fn signals(&self, lead: &Lead, _plan: &EnrichmentPlan) -> Result<SignalRecord, SignalError> {
        Ok(SignalRecord {
            company_name: Some(lead.company_name().to_string()),
            employee_count: Some(150),
            revenue: Some(5_000_000.0),
            industry: Some(lead.industry().unwrap_or("Technology").to_string()),
            location: Some("North America".to_string()),
            technologies: vec!["AWS".to_string(), "React".to_string(), "Python".to_string()],
            digital_maturity: flags(&[("has_api", true), ("cloud_infrastructure", true)]),
            growth_signals: flags(&[("hiring_actively", true), ("recent_funding", false)]),
            buying_intent: flags(&[("job_postings_relevant", true)]),
            engagement: flags(&[("active_social_media", true)]),
            deal_factors: flags(&[("authority_access", true)]),
            competitive: flags(&[("weak_incumbent", true)]),
        })
    }
}

fn flags(entries: &[(&str, bool)]) -> SignalFlags {
    entries
        .iter()
        .map(|(name, value)| (name.to_string(), *value))
        .collect()
}

/// Provider backed by pre-fetched records keyed by lead id. Leads without a
/// record are scored against an empty record.
#[derive(Debug, Clone, Default)]
pub struct StaticSignals {
    records: BTreeMap<LeadId, SignalRecord>,
}

impl StaticSignals {
    pub fn new(records: BTreeMap<LeadId, SignalRecord>) -> Self {
        Self { records }
    }

    pub fn insert(&mut self, id: LeadId, record: SignalRecord) {
        self.records.insert(id, record);
    }
}

impl SignalProvider for StaticSignals {
    fn signals(&self, lead: &Lead, _plan: &EnrichmentPlan) -> Result<SignalRecord, SignalError> {
        Ok(self.records.get(lead.id()).cloned().unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::leads::enrichment;
    use crate::workflows::leads::qualification::{QualificationEngine, Tier};

    #[test]
    fn placeholder_defaults_industry_to_technology() {
        let lead = Lead::new(LeadId::positional(0), "Acme").expect("lead");
        let plan = enrichment::plan(&lead);
        let record = PlaceholderSignals.signals(&lead, &plan).expect("signals");

        assert_eq!(record.industry.as_deref(), Some("Technology"));
        let breakdown = QualificationEngine::standard()
            .score(&record)
            .expect("scores");
        assert!((breakdown.weighted_total - 49.74).abs() < 0.011);
        assert_eq!(breakdown.tier, Tier::C);
    }

    #[test]
    fn placeholder_keeps_the_lead_industry() {
        let lead = Lead::new(LeadId::positional(0), "Acme")
            .expect("lead")
            .with_industry("Healthcare");
        let plan = enrichment::plan(&lead);
        let record = PlaceholderSignals.signals(&lead, &plan).expect("signals");

        assert_eq!(record.industry.as_deref(), Some("Healthcare"));
    }

    #[test]
    fn static_signals_fall_back_to_an_empty_record() {
        let lead = Lead::new(LeadId::positional(4), "Acme").expect("lead");
        let plan = enrichment::plan(&lead);
        let record = StaticSignals::default()
            .signals(&lead, &plan)
            .expect("signals");
        assert_eq!(record, SignalRecord::default());
    }
}
