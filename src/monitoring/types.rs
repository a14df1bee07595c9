use crate::cloudwatch::{Alarm, HorizontalAnnotation, TreatMissingData};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

/// Severity level that disambiguates alarms of the same kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Warning,
    Critical,
}

impl Severity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Warning => "Warning",
            Severity::Critical => "Critical",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Thresholds of one alarm kind, keyed by severity. A missing key means no alarm.
pub type AlarmThresholds<T> = BTreeMap<Severity, T>;

/// Overrides shared by every threshold type
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomAlarmThreshold {
    pub datapoints_to_alarm: Option<u32>,
    pub evaluation_periods: Option<u32>,
    pub treat_missing_data_override: Option<TreatMissingData>,
    pub alarm_description_override: Option<String>,
    pub actions_enabled: Option<bool>,
}

/// An alarm together with the annotation that visualizes it
#[derive(Debug, Clone)]
pub struct AlarmWithAnnotation {
    pub alarm: Arc<Alarm>,
    pub annotation: HorizontalAnnotation,
    pub alarm_name_suffix: String,
    pub disambiguator: Severity,
    pub alarm_description: String,
}

impl AlarmWithAnnotation {
    pub fn alarm_name(&self) -> &str {
        self.alarm.alarm_name()
    }
}

/// Receives the alarms a monitoring builder created, once, after all of them exist
pub trait AlarmConsumer {
    fn consume(&self, alarms: &[AlarmWithAnnotation]);
}

impl<F> AlarmConsumer for F
where
    F: Fn(&[AlarmWithAnnotation]),
{
    fn consume(&self, alarms: &[AlarmWithAnnotation]) {
        self(alarms)
    }
}

pub(crate) mod optional_duration_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Option::<u64>::deserialize(deserializer)?.map(Duration::from_secs))
    }
}

pub(crate) mod duration_millis {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_millis(u64::deserialize(deserializer)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_keys_deserialize() {
        let parsed: AlarmThresholds<u32> =
            serde_json::from_str(r#"{ "Critical": 60, "Warning": 30 }"#).unwrap();
        let order: Vec<_> = parsed.keys().copied().collect();
        assert_eq!(order, vec![Severity::Warning, Severity::Critical]);
    }

    #[test]
    fn test_unknown_severity_is_rejected() {
        let parsed = serde_json::from_str::<AlarmThresholds<u32>>(r#"{ "Info": 1 }"#);
        assert!(parsed.is_err());
    }

    #[test]
    fn test_custom_threshold_defaults() {
        let parsed: CustomAlarmThreshold = serde_json::from_str("{}").unwrap();
        assert_eq!(parsed, CustomAlarmThreshold::default());

        let parsed: CustomAlarmThreshold =
            serde_json::from_str(r#"{ "datapointsToAlarm": 2, "treatMissingDataOverride": "ignore" }"#)
                .unwrap();
        assert_eq!(parsed.datapoints_to_alarm, Some(2));
        assert_eq!(parsed.treat_missing_data_override, Some(TreatMissingData::Ignore));
    }
}
