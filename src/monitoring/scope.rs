use super::alarm_factory::AlarmFactory;
use crate::stack::Construct;
use serde::Deserialize;

/// Defaults applied to every alarm created within a scope
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitoringScopeConfig {
    /// Prepended to every alarm name
    pub alarm_name_prefix: String,
    /// Whether alarm actions are enabled
    pub actions_enabled: bool,
    /// Datapoints that must breach before alarming, unless a builder or threshold says otherwise
    pub datapoints_to_alarm: u32,
}

impl Default for MonitoringScopeConfig {
    fn default() -> Self {
        Self {
            alarm_name_prefix: "Monitoring".to_string(),
            actions_enabled: true,
            datapoints_to_alarm: 3,
        }
    }
}

/// Composition root that monitoring builders create their alarms in
pub trait MonitoringScope {
    /// Construct that owns the created alarms
    fn node(&self) -> &Construct;

    fn config(&self) -> &MonitoringScopeConfig;

    /// Alarm factory naming alarms `{prefix}-{alarm_friendly_name}-...`
    fn create_alarm_factory(&self, alarm_friendly_name: &str) -> AlarmFactory {
        AlarmFactory::new(self.node().clone(), self.config().clone(), alarm_friendly_name)
    }
}
