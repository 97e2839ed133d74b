//! Hierarchical ICP scoring: sub-criterion rules roll up into weighted
//! category totals, which roll up into a weighted total, tier, and
//! recommendation.

mod criteria;
mod rules;
mod signals;
mod tier;

pub use criteria::{
    Bucket, Category, CategoryKind, CriteriaError, IcpCriteria, KeywordMode, Rule, SubCriterion,
    WeightWarning,
};
pub use signals::{SignalError, SignalFlags, SignalRecord};
pub use tier::Tier;

use serde::{Deserialize, Serialize};
use signals::SignalField;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Sub-criteria every profile must define, and the signal each one reads.
fn bindings(kind: CategoryKind) -> &'static [(&'static str, SignalField)] {
    match kind {
        CategoryKind::Firmographic => &[
            ("company_size", SignalField::EmployeeCount),
            ("revenue", SignalField::Revenue),
            ("industry_match", SignalField::Industry),
            ("geographic_match", SignalField::Location),
        ],
        CategoryKind::Technographic => &[
            ("tech_stack_compatibility", SignalField::Technologies),
            ("digital_maturity", SignalField::DigitalMaturity),
        ],
        CategoryKind::Behavioral => &[
            ("growth_signals", SignalField::GrowthSignals),
            ("buying_intent", SignalField::BuyingIntent),
            ("engagement_potential", SignalField::Engagement),
        ],
        CategoryKind::Strategic => &[
            ("deal_potential", SignalField::DealFactors),
            ("competitive_position", SignalField::Competitive),
        ],
    }
}

/// Stateless scorer that applies an ICP profile to signal records.
#[derive(Debug, Clone)]
pub struct QualificationEngine {
    criteria: Arc<IcpCriteria>,
}

impl QualificationEngine {
    pub fn new(criteria: IcpCriteria) -> Self {
        Self {
            criteria: Arc::new(criteria),
        }
    }

    pub fn standard() -> Self {
        Self::new(IcpCriteria::standard())
    }

    pub fn criteria(&self) -> &IcpCriteria {
        &self.criteria
    }

    pub fn score(&self, signals: &SignalRecord) -> Result<ScoreBreakdown, ConfigurationError> {
        score(signals, &self.criteria)
    }
}

/// Scores one signal record. Pure; the only failure is a profile that lacks
/// (or mis-types) a sub-criterion the engine needs.
pub fn score(
    signals: &SignalRecord,
    criteria: &IcpCriteria,
) -> Result<ScoreBreakdown, ConfigurationError> {
    let firmographic = score_category(CategoryKind::Firmographic, signals, criteria)?;
    let technographic = score_category(CategoryKind::Technographic, signals, criteria)?;
    let behavioral = score_category(CategoryKind::Behavioral, signals, criteria)?;
    let strategic = score_category(CategoryKind::Strategic, signals, criteria)?;

    let weighted_total = round2(
        firmographic.weighted + technographic.weighted + behavioral.weighted + strategic.weighted,
    );
    let tier = Tier::from_score(weighted_total);

    Ok(ScoreBreakdown {
        firmographic,
        technographic,
        behavioral,
        strategic,
        weighted_total,
        tier,
        recommendation: tier.recommendation().to_string(),
    })
}

fn score_category(
    kind: CategoryKind,
    signals: &SignalRecord,
    criteria: &IcpCriteria,
) -> Result<CategoryScore, ConfigurationError> {
    let category = criteria.category(kind);
    let mut scores = BTreeMap::new();
    let mut total = 0.0;

    for (key, field) in bindings(kind) {
        let path = format!("{}.{}", kind.key(), key);
        let criterion = category
            .criterion(key)
            .ok_or_else(|| ConfigurationError::MissingCriterion { path: path.clone() })?;
        let score = rules::evaluate(&criterion.rule, signals.input(*field), &path)?;
        total += score * criterion.weight;
        scores.insert((*key).to_string(), score);
    }

    Ok(CategoryScore {
        scores,
        total,
        weighted: total * category.weight,
    })
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Raw sub-criterion scores plus the category's weighted roll-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryScore {
    pub scores: BTreeMap<String, f64>,
    pub total: f64,
    pub weighted: f64,
}

impl CategoryScore {
    pub fn sub_score(&self, key: &str) -> Option<f64> {
        self.scores.get(key).copied()
    }
}

/// Full qualification result for one lead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub firmographic: CategoryScore,
    pub technographic: CategoryScore,
    pub behavioral: CategoryScore,
    pub strategic: CategoryScore,
    pub weighted_total: f64,
    pub tier: Tier,
    pub recommendation: String,
}

impl ScoreBreakdown {
    pub fn category(&self, kind: CategoryKind) -> &CategoryScore {
        match kind {
            CategoryKind::Firmographic => &self.firmographic,
            CategoryKind::Technographic => &self.technographic,
            CategoryKind::Behavioral => &self.behavioral,
            CategoryKind::Strategic => &self.strategic,
        }
    }
}

/// Raised when the ICP profile cannot drive scoring.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ConfigurationError {
    #[error("ICP criteria missing '{path}'")]
    MissingCriterion { path: String },
    #[error("ICP criterion '{path}' uses a {rule} rule, which cannot score {input} signals")]
    RuleMismatch {
        path: String,
        rule: &'static str,
        input: &'static str,
    },
}
