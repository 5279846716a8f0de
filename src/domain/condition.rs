use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Comparison applied between a raw stat value and a threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    #[default]
    #[serde(rename = ">")]
    GreaterThan,
    #[serde(rename = "<")]
    LessThan,
    #[serde(rename = ">=")]
    GreaterOrEqual,
    #[serde(rename = "<=")]
    LessOrEqual,
    #[serde(rename = "==")]
    Equal,
}

impl ComparisonOperator {
    /// Missing values never satisfy a comparison.
    pub fn evaluate(self, value: Option<f64>, threshold: f64) -> bool {
        let Some(value) = value else {
            return false;
        };
        match self {
            Self::GreaterThan => value > threshold,
            Self::LessThan => value < threshold,
            Self::GreaterOrEqual => value >= threshold,
            Self::LessOrEqual => value <= threshold,
            Self::Equal => value == threshold,
        }
    }

    pub fn symbol(self) -> &'static str {
        match self {
            Self::GreaterThan => ">",
            Self::LessThan => "<",
            Self::GreaterOrEqual => ">=",
            Self::LessOrEqual => "<=",
            Self::Equal => "==",
        }
    }

    /// Short token used in target identifiers (`pts_gt_20`).
    pub fn token(self) -> &'static str {
        match self {
            Self::GreaterThan => "gt",
            Self::LessThan => "lt",
            Self::GreaterOrEqual => "ge",
            Self::LessOrEqual => "le",
            Self::Equal => "eq",
        }
    }
}

impl fmt::Display for ComparisonOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

impl FromStr for ComparisonOperator {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            ">" => Ok(Self::GreaterThan),
            "<" => Ok(Self::LessThan),
            ">=" => Ok(Self::GreaterOrEqual),
            "<=" => Ok(Self::LessOrEqual),
            "==" => Ok(Self::Equal),
            other => Err(other.to_string()),
        }
    }
}

/// Caller-supplied threshold as it arrives over the wire. The operator is
/// kept as text so an unsupported symbol can be reported against its stat.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatThreshold {
    pub key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub op: Option<String>,
    pub value: f64,
}

impl StatThreshold {
    pub fn new(key: &str, op: &str, value: f64) -> Self {
        Self {
            key: key.to_string(),
            op: Some(op.to_string()),
            value,
        }
    }
}

/// Compact text form used on the command line: `pts>20`, `ast>=5.5`, or
/// `trb:10` for the default operator. Operator symbols are kept verbatim.
impl FromStr for StatThreshold {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let Some(start) = s.find(|c| matches!(c, '<' | '>' | '=' | '!' | ':')) else {
            anyhow::bail!("Invalid threshold '{}': expected <stat><op><value>", s);
        };
        let key = s[..start].trim();
        let rest = &s[start..];
        let value_start = rest
            .find(|c: char| !matches!(c, '<' | '>' | '=' | '!' | ':'))
            .unwrap_or(rest.len());
        let op = &rest[..value_start];
        if key.is_empty() {
            anyhow::bail!("Invalid threshold '{}': missing stat name", s);
        }
        let value: f64 = rest[value_start..]
            .trim()
            .parse()
            .map_err(|_| anyhow::anyhow!("Invalid threshold '{}': value is not a number", s))?;

        Ok(Self {
            key: key.to_string(),
            op: (op != ":").then(|| op.to_string()),
            value,
        })
    }
}

/// Validated (stat, operator, threshold) triple.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdCondition {
    pub stat: String,
    pub operator: ComparisonOperator,
    pub threshold: f64,
}

impl ThresholdCondition {
    pub fn identifier(&self) -> String {
        format!("{}_{}_{}", self.stat, self.operator.token(), self.threshold)
    }
}

impl fmt::Display for ThresholdCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {} {}", self.stat, self.operator, self.threshold)
    }
}

/// Human-readable description: conditions joined with " AND ".
pub fn describe_conditions(conditions: &[ThresholdCondition]) -> String {
    conditions
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" AND ")
}

/// Internal bookkeeping name of the label column.
pub fn target_identifier(conditions: &[ThresholdCondition]) -> String {
    let suffix = conditions
        .iter()
        .map(ThresholdCondition::identifier)
        .collect::<Vec<_>>()
        .join("_and_");
    format!("target_{suffix}")
}
