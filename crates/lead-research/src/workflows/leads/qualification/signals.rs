use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Named boolean indicators (`recent_funding`, `has_api`, ...).
pub type SignalFlags = BTreeMap<String, bool>;

/// Enrichment snapshot a lead is scored against.
///
/// Every field is optional: anything the research step could not establish
/// simply scores zero for the sub-criterion that reads it.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SignalRecord {
    #[serde(default)]
    pub company_name: Option<String>,
    #[serde(default)]
    pub employee_count: Option<u64>,
    #[serde(default)]
    pub revenue: Option<f64>,
    #[serde(default)]
    pub industry: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub technologies: Vec<String>,
    #[serde(default)]
    pub digital_maturity: SignalFlags,
    #[serde(default)]
    pub growth_signals: SignalFlags,
    #[serde(default)]
    pub buying_intent: SignalFlags,
    #[serde(default)]
    pub engagement: SignalFlags,
    #[serde(default)]
    pub deal_factors: SignalFlags,
    #[serde(default)]
    pub competitive: SignalFlags,
}

impl SignalRecord {
    /// Rejects numeric fields no research source could legitimately produce.
    pub fn validate(&self) -> Result<(), SignalError> {
        if let Some(revenue) = self.revenue {
            if !revenue.is_finite() || revenue < 0.0 {
                return Err(SignalError::MalformedNumber {
                    field: "revenue",
                    value: revenue.to_string(),
                });
            }
        }
        Ok(())
    }

    pub(crate) fn input(&self, field: SignalField) -> SignalInput<'_> {
        match field {
            SignalField::EmployeeCount => {
                SignalInput::Number(self.employee_count.map(|count| count as f64))
            }
            SignalField::Revenue => SignalInput::Number(self.revenue),
            SignalField::Industry => SignalInput::Text(non_blank(self.industry.as_deref())),
            SignalField::Location => SignalInput::Text(non_blank(self.location.as_deref())),
            SignalField::Technologies => SignalInput::List(&self.technologies),
            SignalField::DigitalMaturity => SignalInput::Flags(&self.digital_maturity),
            SignalField::GrowthSignals => SignalInput::Flags(&self.growth_signals),
            SignalField::BuyingIntent => SignalInput::Flags(&self.buying_intent),
            SignalField::Engagement => SignalInput::Flags(&self.engagement),
            SignalField::DealFactors => SignalInput::Flags(&self.deal_factors),
            SignalField::Competitive => SignalInput::Flags(&self.competitive),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|text| !text.is_empty())
}

/// Signal record fields a sub-criterion can be bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SignalField {
    EmployeeCount,
    Revenue,
    Industry,
    Location,
    Technologies,
    DigitalMaturity,
    GrowthSignals,
    BuyingIntent,
    Engagement,
    DealFactors,
    Competitive,
}

/// Borrowed view of one signal field, shaped for rule evaluation.
#[derive(Debug, Clone, Copy)]
pub(crate) enum SignalInput<'a> {
    Number(Option<f64>),
    Text(Option<&'a str>),
    List(&'a [String]),
    Flags(&'a SignalFlags),
}

impl SignalInput<'_> {
    pub(crate) const fn kind(&self) -> &'static str {
        match self {
            SignalInput::Number(_) => "numeric",
            SignalInput::Text(_) => "text",
            SignalInput::List(_) => "list",
            SignalInput::Flags(_) => "flag map",
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SignalError {
    #[error("malformed {field} value '{value}'")]
    MalformedNumber { field: &'static str, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_rejects_negative_and_non_finite_revenue() {
        let mut record = SignalRecord {
            revenue: Some(-1.0),
            ..SignalRecord::default()
        };
        assert!(record.validate().is_err());

        record.revenue = Some(f64::NAN);
        assert!(matches!(
            record.validate(),
            Err(SignalError::MalformedNumber {
                field: "revenue",
                ..
            })
        ));

        record.revenue = Some(0.0);
        assert!(record.validate().is_ok());
    }

    #[test]
    fn blank_text_reads_as_absent() {
        let record = SignalRecord {
            industry: Some("   ".to_string()),
            location: Some("Europe".to_string()),
            ..SignalRecord::default()
        };

        assert!(matches!(
            record.input(SignalField::Industry),
            SignalInput::Text(None)
        ));
        assert!(matches!(
            record.input(SignalField::Location),
            SignalInput::Text(Some("Europe"))
        ));
    }
}
