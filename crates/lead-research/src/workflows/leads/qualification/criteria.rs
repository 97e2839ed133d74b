use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

const WEIGHT_TOLERANCE: f64 = 0.001;

/// The four scoring categories of an ideal customer profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryKind {
    Firmographic,
    Technographic,
    Behavioral,
    Strategic,
}

impl CategoryKind {
    pub const fn ordered() -> [Self; 4] {
        [
            Self::Firmographic,
            Self::Technographic,
            Self::Behavioral,
            Self::Strategic,
        ]
    }

    pub const fn key(self) -> &'static str {
        match self {
            Self::Firmographic => "firmographic",
            Self::Technographic => "technographic",
            Self::Behavioral => "behavioral",
            Self::Strategic => "strategic",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Firmographic => "Firmographic",
            Self::Technographic => "Technographic",
            Self::Behavioral => "Behavioral",
            Self::Strategic => "Strategic",
        }
    }
}

/// Ideal customer profile: weighted categories of weighted sub-criteria.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IcpCriteria {
    pub firmographic: Category,
    pub technographic: Category,
    pub behavioral: Category,
    pub strategic: Category,
}

/// One scoring category; `weight` is its fraction of the overall score.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Category {
    pub weight: f64,
    pub criteria: BTreeMap<String, SubCriterion>,
}

/// Named sub-criterion; `weight` is relative to its category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubCriterion {
    pub weight: f64,
    #[serde(flatten)]
    pub rule: Rule,
}

/// Scoring rule attached to a sub-criterion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", rename_all = "snake_case")]
pub enum Rule {
    /// Ordered buckets matched by containment; first match wins.
    Ranged { buckets: Vec<Bucket> },
    /// Case-insensitive comparison against a target list.
    Keyword {
        targets: Vec<String>,
        #[serde(default)]
        mode: KeywordMode,
        score_match: f64,
        #[serde(default)]
        score_adjacent: Option<f64>,
        score_other: f64,
    },
    /// Fixed points per value found in the target list, capped.
    TargetCount {
        targets: Vec<String>,
        score_per_match: f64,
        max_score: f64,
    },
    /// Sum of the points of every truthy indicator, capped at 100.
    IndicatorSum { indicators: BTreeMap<String, f64> },
}

impl Rule {
    pub const fn kind(&self) -> &'static str {
        match self {
            Rule::Ranged { .. } => "ranged",
            Rule::Keyword { .. } => "keyword",
            Rule::TargetCount { .. } => "target_count",
            Rule::IndicatorSum { .. } => "indicator_sum",
        }
    }
}

/// `[min, max]` bucket; a missing `max` leaves the bucket unbounded above.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bucket {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    pub min: f64,
    #[serde(default)]
    pub max: Option<f64>,
    pub score: f64,
}

impl Bucket {
    fn new(label: &str, min: f64, max: Option<f64>, score: f64) -> Self {
        Self {
            label: Some(label.to_string()),
            min,
            max,
            score,
        }
    }

    pub fn contains(&self, value: f64) -> bool {
        match self.max {
            None => value >= self.min,
            Some(max) => self.min <= value && value <= max,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeywordMode {
    /// Exact target match scores `score_match`; a substring relationship in
    /// either direction scores `score_adjacent`.
    #[default]
    Exact,
    /// Any target contained in the value scores `score_match`.
    Containment,
}

impl IcpCriteria {
    /// Built-in profile used whenever the caller supplies no criteria.
    pub fn standard() -> Self {
        Self {
            firmographic: Category {
                weight: 0.35,
                criteria: criteria_map([
                    (
                        "company_size",
                        0.30,
                        Rule::Ranged {
                            buckets: vec![
                                Bucket::new("enterprise", 1000.0, None, 100.0),
                                Bucket::new("mid_market", 200.0, Some(999.0), 80.0),
                                Bucket::new("smb", 50.0, Some(199.0), 60.0),
                                Bucket::new("startup", 10.0, Some(49.0), 40.0),
                                Bucket::new("micro", 0.0, Some(9.0), 20.0),
                            ],
                        },
                    ),
                    (
                        "revenue",
                        0.25,
                        Rule::Ranged {
                            buckets: vec![
                                Bucket::new("large", 100_000_000.0, None, 100.0),
                                Bucket::new("medium", 10_000_000.0, Some(99_999_999.0), 80.0),
                                Bucket::new("small", 1_000_000.0, Some(9_999_999.0), 60.0),
                                Bucket::new("micro", 0.0, Some(999_999.0), 30.0),
                            ],
                        },
                    ),
                    (
                        "industry_match",
                        0.25,
                        Rule::Keyword {
                            targets: strings(&[
                                "Technology",
                                "SaaS",
                                "Software",
                                "Fintech",
                                "E-commerce",
                            ]),
                            mode: KeywordMode::Exact,
                            score_match: 100.0,
                            score_adjacent: Some(60.0),
                            score_other: 20.0,
                        },
                    ),
                    (
                        "geographic_match",
                        0.20,
                        Rule::Keyword {
                            targets: strings(&["North America", "Europe", "APAC"]),
                            mode: KeywordMode::Containment,
                            score_match: 100.0,
                            score_adjacent: None,
                            score_other: 50.0,
                        },
                    ),
                ]),
            },
            technographic: Category {
                weight: 0.25,
                criteria: criteria_map([
                    (
                        "tech_stack_compatibility",
                        0.50,
                        Rule::TargetCount {
                            targets: strings(&[
                                "AWS", "Azure", "GCP", "Kubernetes", "Docker", "React", "Python",
                                "Node.js",
                            ]),
                            score_per_match: 15.0,
                            max_score: 100.0,
                        },
                    ),
                    (
                        "digital_maturity",
                        0.50,
                        indicators(&[
                            ("has_api", 25.0),
                            ("has_mobile_app", 20.0),
                            ("cloud_infrastructure", 25.0),
                            ("modern_tech_stack", 30.0),
                        ]),
                    ),
                ]),
            },
            behavioral: Category {
                weight: 0.25,
                criteria: criteria_map([
                    (
                        "growth_signals",
                        0.40,
                        indicators(&[
                            ("recent_funding", 30.0),
                            ("hiring_actively", 25.0),
                            ("product_launch", 20.0),
                            ("market_expansion", 25.0),
                        ]),
                    ),
                    (
                        "buying_intent",
                        0.35,
                        indicators(&[
                            ("job_postings_relevant", 35.0),
                            ("technology_investment", 30.0),
                            ("competitive_switch", 20.0),
                            ("pain_point_mentioned", 15.0),
                        ]),
                    ),
                    (
                        "engagement_potential",
                        0.25,
                        indicators(&[
                            ("active_social_media", 20.0),
                            ("content_publishing", 30.0),
                            ("event_participation", 25.0),
                            ("thought_leadership", 25.0),
                        ]),
                    ),
                ]),
            },
            strategic: Category {
                weight: 0.15,
                criteria: criteria_map([
                    (
                        "deal_potential",
                        0.50,
                        indicators(&[
                            ("budget_signals", 30.0),
                            ("decision_timeline", 25.0),
                            ("authority_access", 25.0),
                            ("economic_buyer_identified", 20.0),
                        ]),
                    ),
                    (
                        "competitive_position",
                        0.50,
                        indicators(&[
                            ("no_incumbent", 35.0),
                            ("weak_incumbent", 25.0),
                            ("switching_cost_low", 20.0),
                            ("competitive_advantage", 20.0),
                        ]),
                    ),
                ]),
            },
        }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, CriteriaError> {
        serde_json::from_str(raw).map_err(CriteriaError::Parse)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, CriteriaError> {
        let raw = fs::read_to_string(path.as_ref()).map_err(|source| CriteriaError::Io {
            path: path.as_ref().display().to_string(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn category(&self, kind: CategoryKind) -> &Category {
        match kind {
            CategoryKind::Firmographic => &self.firmographic,
            CategoryKind::Technographic => &self.technographic,
            CategoryKind::Behavioral => &self.behavioral,
            CategoryKind::Strategic => &self.strategic,
        }
    }

    pub fn category_mut(&mut self, kind: CategoryKind) -> &mut Category {
        match kind {
            CategoryKind::Firmographic => &mut self.firmographic,
            CategoryKind::Technographic => &mut self.technographic,
            CategoryKind::Behavioral => &mut self.behavioral,
            CategoryKind::Strategic => &mut self.strategic,
        }
    }

    /// Lists weight sums that drift from 1.0. Scoring still accepts such a
    /// profile; callers decide whether to surface the warnings.
    pub fn validate_weights(&self) -> Vec<WeightWarning> {
        let mut warnings = Vec::new();

        let category_sum: f64 = CategoryKind::ordered()
            .into_iter()
            .map(|kind| self.category(kind).weight)
            .sum();
        if (category_sum - 1.0).abs() > WEIGHT_TOLERANCE {
            warnings.push(WeightWarning {
                scope: "categories".to_string(),
                sum: category_sum,
            });
        }

        for kind in CategoryKind::ordered() {
            let sum: f64 = self
                .category(kind)
                .criteria
                .values()
                .map(|criterion| criterion.weight)
                .sum();
            if (sum - 1.0).abs() > WEIGHT_TOLERANCE {
                warnings.push(WeightWarning {
                    scope: kind.key().to_string(),
                    sum,
                });
            }
        }

        warnings
    }
}

impl Default for IcpCriteria {
    fn default() -> Self {
        Self::standard()
    }
}

impl Category {
    pub fn criterion(&self, key: &str) -> Option<&SubCriterion> {
        self.criteria.get(key)
    }
}

fn criteria_map<const N: usize>(
    entries: [(&str, f64, Rule); N],
) -> BTreeMap<String, SubCriterion> {
    entries
        .into_iter()
        .map(|(key, weight, rule)| (key.to_string(), SubCriterion { weight, rule }))
        .collect()
}

fn indicators(points: &[(&str, f64)]) -> Rule {
    Rule::IndicatorSum {
        indicators: points
            .iter()
            .map(|(name, value)| (name.to_string(), *value))
            .collect(),
    }
}

fn strings(values: &[&str]) -> Vec<String> {
    values.iter().map(|value| value.to_string()).collect()
}

/// Weight group whose members do not sum to 1.0.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeightWarning {
    pub scope: String,
    pub sum: f64,
}

impl std::fmt::Display for WeightWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} weights sum to {:.3}, expected 1.000", self.scope, self.sum)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum CriteriaError {
    #[error("failed to read ICP criteria from {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid ICP criteria document: {0}")]
    Parse(#[source] serde_json::Error),
}
