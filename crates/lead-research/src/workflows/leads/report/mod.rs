//! Batch roll-ups: tier histogram, average score, and the ranked shortlist.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::batch::BatchResult;
use super::domain::LeadId;
use super::qualification::Tier;

pub const DEFAULT_TOP_LEADS: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopLead {
    pub lead_id: LeadId,
    pub company_name: String,
    pub tier: Tier,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub total_processed: usize,
    pub successful: usize,
    pub errors: usize,
    pub tier_distribution: BTreeMap<Tier, usize>,
    pub avg_score: f64,
    pub top_leads: Vec<TopLead>,
}

impl Summary {
    pub fn tier_count(&self, tier: Tier) -> usize {
        self.tier_distribution.get(&tier).copied().unwrap_or(0)
    }
}

pub fn summarize(results: &[BatchResult]) -> Summary {
    summarize_top(results, DEFAULT_TOP_LEADS)
}

/// Successful results only feed the histogram, the average, and the ranking.
/// Ties on score are broken by lead id so the shortlist is stable across runs.
pub fn summarize_top(results: &[BatchResult], top: usize) -> Summary {
    let successes: Vec<&BatchResult> = results.iter().filter(|r| r.is_success()).collect();

    let mut tier_distribution: BTreeMap<Tier, usize> =
        Tier::ordered().into_iter().map(|tier| (tier, 0)).collect();
    for result in &successes {
        *tier_distribution.entry(tier_of(result)).or_insert(0) += 1;
    }

    let avg_score = if successes.is_empty() {
        0.0
    } else {
        let total: f64 = successes.iter().map(|r| score_of(r)).sum();
        round2(total / successes.len() as f64)
    };

    let mut ranked = successes.clone();
    ranked.sort_by(|left, right| {
        score_of(right)
            .partial_cmp(&score_of(left))
            .unwrap_or(Ordering::Equal)
            .then_with(|| left.lead.id().cmp(right.lead.id()))
    });

    let top_leads = ranked
        .into_iter()
        .take(top)
        .map(|result| TopLead {
            lead_id: result.lead.id().clone(),
            company_name: result.lead.company_name().to_string(),
            tier: tier_of(result),
            score: score_of(result),
        })
        .collect();

    Summary {
        total_processed: results.len(),
        successful: successes.len(),
        errors: results.len() - successes.len(),
        tier_distribution,
        avg_score,
        top_leads,
    }
}

// A success without a breakdown should not happen; count it as D / 0.
fn tier_of(result: &BatchResult) -> Tier {
    result
        .qualification
        .as_ref()
        .map(|breakdown| breakdown.tier)
        .unwrap_or(Tier::D)
}

fn score_of(result: &BatchResult) -> f64 {
    result.weighted_total().unwrap_or(0.0)
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchMetadata {
    pub input_file: Option<String>,
    pub processed_at: DateTime<Utc>,
    pub total_leads: usize,
    pub parallel_workers: usize,
}

/// Output document written by the batch command and returned by the API.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BatchReport {
    pub summary: Summary,
    pub leads: Vec<BatchResult>,
    pub metadata: BatchMetadata,
}

impl BatchReport {
    pub fn new(leads: Vec<BatchResult>, input_file: Option<String>, parallel_workers: usize) -> Self {
        Self {
            summary: summarize(&leads),
            metadata: BatchMetadata {
                input_file,
                processed_at: Utc::now(),
                total_leads: leads.len(),
                parallel_workers,
            },
            leads,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::leads::domain::Lead;
    use crate::workflows::leads::enrichment;
    use crate::workflows::leads::qualification::{QualificationEngine, SignalRecord};

    fn scored(position: usize, employees: u64) -> BatchResult {
        scored_as(LeadId::positional(position), employees)
    }

    fn scored_as(id: LeadId, employees: u64) -> BatchResult {
        let lead = Lead::new(id, "Tied Co").expect("lead");
        let plan = enrichment::plan(&lead);
        let signals = SignalRecord {
            employee_count: Some(employees),
            ..SignalRecord::default()
        };
        let breakdown = QualificationEngine::standard()
            .score(&signals)
            .expect("scores");
        BatchResult::succeeded(lead, plan, breakdown)
    }

    fn failed(position: usize) -> BatchResult {
        let lead = Lead::new(LeadId::positional(position), "Broken Co").expect("lead");
        BatchResult::failed(lead, None, "configuration error".to_string())
    }

    #[test]
    fn empty_success_set_has_zero_average_and_no_shortlist() {
        let summary = summarize(&[failed(0), failed(1)]);
        assert_eq!(summary.total_processed, 2);
        assert_eq!(summary.successful, 0);
        assert_eq!(summary.errors, 2);
        assert_eq!(summary.avg_score, 0.0);
        assert!(summary.top_leads.is_empty());
        assert!(Tier::ordered()
            .into_iter()
            .all(|tier| summary.tier_count(tier) == 0));

        let nothing = summarize(&[]);
        assert_eq!(nothing.avg_score, 0.0);
    }

    #[test]
    fn ranks_by_score_then_lead_id() {
        // lead_11 and lead_2 tie; lead_2 wins on id order.
        let results = vec![scored(10, 10), scored(0, 0), scored(1, 10), scored(2, 1000)];
        let summary = summarize_top(&results, 3);

        let ids: Vec<&str> = summary
            .top_leads
            .iter()
            .map(|lead| lead.lead_id.0.as_str())
            .collect();
        assert_eq!(ids, vec!["lead_3", "lead_2", "lead_11"]);
        assert_eq!(summary.tier_count(Tier::D), 4);
    }

    #[test]
    fn tied_shortlist_is_stable_for_caller_supplied_ids() {
        let ids = ["x_10", "x_2", "x_1a", "crm_7"];
        let expected = vec!["crm_7", "x_1a", "x_2", "x_10"];

        for rotation in 0..ids.len() {
            let mut order = ids.to_vec();
            order.rotate_left(rotation);
            let results: Vec<BatchResult> = order
                .iter()
                .map(|raw| scored_as(LeadId(raw.to_string()), 500))
                .collect();

            let summary = summarize(&results);
            let ranked: Vec<&str> = summary
                .top_leads
                .iter()
                .map(|lead| lead.lead_id.0.as_str())
                .collect();
            assert_eq!(ranked, expected);
        }
    }

    #[test]
    fn average_excludes_failures() {
        let results = vec![scored(0, 1000), scored(1, 0), failed(2)];
        let summary = summarize(&results);

        // 100 * 0.30 * 0.35 = 10.5 and 20 * 0.30 * 0.35 = 2.1
        assert_eq!(summary.successful, 2);
        assert_eq!(summary.errors, 1);
        assert_eq!(summary.avg_score, 6.3);
    }

    #[test]
    fn report_serializes_the_output_document_shape() {
        let report = BatchReport::new(vec![scored(0, 1000), failed(1)], None, 3);
        let value = serde_json::to_value(&report).expect("serialize");

        assert_eq!(value["metadata"]["total_leads"], 2);
        assert_eq!(value["metadata"]["parallel_workers"], 3);
        assert_eq!(value["summary"]["tier_distribution"]["D"], 1);
        assert_eq!(value["summary"]["tier_distribution"]["A"], 0);
        assert_eq!(value["leads"].as_array().map(Vec::len), Some(2));
    }
}
