use crate::env::{DDB_TABLE_NAME, SNS_ARN, THRESHOLD_HOURS};
use crate::CheckOutcome;
use std::fmt::{Display, Formatter};

/// Settings read from the environment on every invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonitorConfig {
    pub table_name: String,
    pub topic_arn: String,
    pub threshold_hours: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    // At least one required variable is absent or empty
    Missing(Vec<&'static str>),
    InvalidThreshold(String),
}

impl MonitorConfig {
    /// Read the config through `lookup`, which maps a variable name to its value.
    /// All variables are checked before the threshold is parsed.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &'static str| lookup(name).filter(|value| !value.is_empty());

        let (table_name, topic_arn, threshold) =
            match (read(DDB_TABLE_NAME), read(SNS_ARN), read(THRESHOLD_HOURS)) {
                (Some(table_name), Some(topic_arn), Some(threshold)) => {
                    (table_name, topic_arn, threshold)
                }
                (table_name, topic_arn, threshold) => {
                    let missing: Vec<&'static str> = [
                        (DDB_TABLE_NAME, table_name.is_none()),
                        (SNS_ARN, topic_arn.is_none()),
                        (THRESHOLD_HOURS, threshold.is_none()),
                    ]
                    .into_iter()
                    .filter_map(|(name, is_missing)| is_missing.then_some(name))
                    .collect();

                    return Err(ConfigError::Missing(missing));
                }
            };

        let threshold_hours: u32 = parse_threshold(&threshold)?;

        Ok(MonitorConfig {
            table_name,
            topic_arn,
            threshold_hours,
        })
    }
}

fn parse_threshold(value: &str) -> Result<u32, ConfigError> {
    match value.trim().parse::<u32>() {
        Ok(hours) if hours > 0 => Ok(hours),
        _ => Err(ConfigError::InvalidThreshold(value.to_string())),
    }
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(names) => {
                write!(f, "Missing environment variables: {}", names.join(", "))
            }
            ConfigError::InvalidThreshold(value) => {
                write!(f, "Invalid {THRESHOLD_HOURS} value '{value}'")
            }
        }
    }
}

impl std::error::Error for ConfigError {}

impl From<ConfigError> for CheckOutcome {
    fn from(value: ConfigError) -> Self {
        match value {
            ConfigError::Missing(_) => CheckOutcome::MissingConfig,
            ConfigError::InvalidThreshold(raw) => CheckOutcome::InvalidThreshold(raw),
        }
    }
}
