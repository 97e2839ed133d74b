use super::criteria::{KeywordMode, Rule};
use super::signals::SignalInput;
use super::ConfigurationError;

pub(crate) const MAX_SUB_SCORE: f64 = 100.0;

/// Scores one signal input against a rule. Absent inputs score zero; a rule
/// bound to the wrong kind of input is a configuration fault.
pub(crate) fn evaluate(
    rule: &Rule,
    input: SignalInput<'_>,
    path: &str,
) -> Result<f64, ConfigurationError> {
    let raw = match (rule, input) {
        (Rule::Ranged { buckets }, SignalInput::Number(value)) => match value {
            Some(value) => buckets
                .iter()
                .find(|bucket| bucket.contains(value))
                .map(|bucket| bucket.score)
                .unwrap_or(0.0),
            None => 0.0,
        },
        (
            Rule::Keyword {
                targets,
                mode,
                score_match,
                score_adjacent,
                score_other,
            },
            SignalInput::Text(value),
        ) => match value {
            Some(value) => {
                keyword_score(value, targets, *mode, *score_match, *score_adjacent, *score_other)
            }
            None => 0.0,
        },
        (
            Rule::TargetCount {
                targets,
                score_per_match,
                max_score,
            },
            SignalInput::List(values),
        ) => {
            let matches = values
                .iter()
                .filter(|value| {
                    targets
                        .iter()
                        .any(|target| target.eq_ignore_ascii_case(value.trim()))
                })
                .count();
            (matches as f64 * score_per_match).min(*max_score)
        }
        (Rule::IndicatorSum { indicators }, SignalInput::Flags(flags)) => indicators
            .iter()
            .filter(|(name, _)| flags.get(name.as_str()).copied().unwrap_or(false))
            .map(|(_, points)| *points)
            .sum(),
        (rule, input) => {
            return Err(ConfigurationError::RuleMismatch {
                path: path.to_string(),
                rule: rule.kind(),
                input: input.kind(),
            })
        }
    };

    Ok(raw.clamp(0.0, MAX_SUB_SCORE))
}

fn keyword_score(
    value: &str,
    targets: &[String],
    mode: KeywordMode,
    score_match: f64,
    score_adjacent: Option<f64>,
    score_other: f64,
) -> f64 {
    let value = value.to_lowercase();
    let targets: Vec<String> = targets.iter().map(|target| target.to_lowercase()).collect();

    match mode {
        KeywordMode::Exact => {
            if targets.iter().any(|target| *target == value) {
                return score_match;
            }
            if let Some(adjacent) = score_adjacent {
                let related = targets
                    .iter()
                    .any(|target| target.contains(&value) || value.contains(target.as_str()));
                if related {
                    return adjacent;
                }
            }
            score_other
        }
        KeywordMode::Containment => {
            if targets.iter().any(|target| value.contains(target.as_str())) {
                score_match
            } else {
                score_other
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::leads::qualification::criteria::Bucket;
    use crate::workflows::leads::qualification::signals::SignalFlags;

    fn industry_rule() -> Rule {
        Rule::Keyword {
            targets: vec!["Technology".to_string(), "SaaS".to_string()],
            mode: KeywordMode::Exact,
            score_match: 100.0,
            score_adjacent: Some(60.0),
            score_other: 20.0,
        }
    }

    #[test]
    fn ranged_rule_takes_first_structural_match() {
        let rule = Rule::Ranged {
            buckets: vec![
                Bucket {
                    label: None,
                    min: 10.0,
                    max: Some(100.0),
                    score: 70.0,
                },
                Bucket {
                    label: None,
                    min: 50.0,
                    max: None,
                    score: 90.0,
                },
            ],
        };

        let overlap = evaluate(&rule, SignalInput::Number(Some(60.0)), "x").expect("score");
        assert_eq!(overlap, 70.0);
        let above = evaluate(&rule, SignalInput::Number(Some(500.0)), "x").expect("score");
        assert_eq!(above, 90.0);
        let below = evaluate(&rule, SignalInput::Number(Some(5.0)), "x").expect("score");
        assert_eq!(below, 0.0);
        let absent = evaluate(&rule, SignalInput::Number(None), "x").expect("score");
        assert_eq!(absent, 0.0);
    }

    #[test]
    fn keyword_rule_distinguishes_exact_adjacent_and_other() {
        let rule = industry_rule();
        let score = |value| evaluate(&rule, SignalInput::Text(Some(value)), "x").expect("score");

        assert_eq!(score("technology"), 100.0);
        assert_eq!(score("B2B SaaS"), 60.0);
        assert_eq!(score("Tech"), 60.0);
        assert_eq!(score("Healthcare"), 20.0);
        assert_eq!(
            evaluate(&rule, SignalInput::Text(None), "x").expect("score"),
            0.0
        );
    }

    #[test]
    fn containment_rule_matches_regions_inside_locations() {
        let rule = Rule::Keyword {
            targets: vec!["North America".to_string(), "APAC".to_string()],
            mode: KeywordMode::Containment,
            score_match: 100.0,
            score_adjacent: None,
            score_other: 50.0,
        };

        let inside = evaluate(&rule, SignalInput::Text(Some("Austin, North America")), "x");
        assert_eq!(inside.expect("score"), 100.0);
        let outside = evaluate(&rule, SignalInput::Text(Some("LATAM")), "x");
        assert_eq!(outside.expect("score"), 50.0);
    }

    #[test]
    fn target_count_is_capped() {
        let rule = Rule::TargetCount {
            targets: vec!["aws".to_string(), "gcp".to_string(), "react".to_string()],
            score_per_match: 40.0,
            max_score: 100.0,
        };
        let stack = vec!["AWS".to_string(), "GCP".to_string(), "React".to_string()];
        let score = evaluate(&rule, SignalInput::List(&stack), "x").expect("score");
        assert_eq!(score, 100.0);

        let empty: Vec<String> = Vec::new();
        let score = evaluate(&rule, SignalInput::List(&empty), "x").expect("score");
        assert_eq!(score, 0.0);
    }

    #[test]
    fn indicator_sum_counts_truthy_flags_and_caps_at_100() {
        let rule = Rule::IndicatorSum {
            indicators: [("a", 60.0), ("b", 50.0), ("c", 10.0)]
                .into_iter()
                .map(|(name, points)| (name.to_string(), points))
                .collect(),
        };
        let mut flags = SignalFlags::new();
        flags.insert("a".to_string(), true);
        flags.insert("c".to_string(), false);
        flags.insert("unrelated".to_string(), true);

        let partial = evaluate(&rule, SignalInput::Flags(&flags), "x").expect("score");
        assert_eq!(partial, 60.0);

        flags.insert("b".to_string(), true);
        flags.insert("c".to_string(), true);
        let capped = evaluate(&rule, SignalInput::Flags(&flags), "x").expect("score");
        assert_eq!(capped, 100.0);
    }

    #[test]
    fn mismatched_rule_and_input_is_a_configuration_error() {
        let error = evaluate(
            &industry_rule(),
            SignalInput::Number(Some(1.0)),
            "firmographic.company_size",
        )
        .expect_err("keyword rule cannot read numbers");

        assert_eq!(
            error,
            ConfigurationError::RuleMismatch {
                path: "firmographic.company_size".to_string(),
                rule: "keyword",
                input: "numeric",
            }
        );
    }
}
