use super::scope::MonitoringScopeConfig;
use super::types::{AlarmWithAnnotation, CustomAlarmThreshold, Severity};
use crate::cloudwatch::{
    number, Alarm, AlarmProps, ComparisonOperator, HorizontalAnnotation, MetricExpr,
    TreatMissingData,
};
use crate::error::{MonitoringError, Result};
use crate::stack::{CfnResource, Construct, PendingResource};
use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, trace};

/// One alarm request from a monitoring builder
#[derive(Debug, Clone)]
pub struct AddAlarmProps {
    pub metric: MetricExpr,
    pub threshold: f64,
    pub comparison_operator: ComparisonOperator,
    pub treat_missing_data: TreatMissingData,
    pub alarm_name_suffix: String,
    pub alarm_description: String,
    pub disambiguator: Severity,
    /// Overrides the metric period
    pub period: Option<Duration>,
    /// Builder default, used when the threshold does not set datapoints
    pub datapoints_to_alarm: Option<u32>,
    pub custom: CustomAlarmThreshold,
}

/// Builds alarms for one monitored resource.
///
/// Alarms are validated as they are added but only attached to the stack by
/// [`AlarmFactory::into_pending`] and a subsequent commit, so a resource either
/// gets all of its alarms or none.
pub struct AlarmFactory {
    node: Construct,
    config: MonitoringScopeConfig,
    alarm_friendly_name: String,
    pending: Vec<PendingResource>,
    names: BTreeSet<String>,
}

impl AlarmFactory {
    pub fn new(node: Construct, config: MonitoringScopeConfig, alarm_friendly_name: &str) -> Self {
        Self {
            node,
            config,
            alarm_friendly_name: alarm_friendly_name.to_string(),
            pending: Vec::new(),
            names: BTreeSet::new(),
        }
    }

    pub fn alarm_name(&self, suffix: &str, disambiguator: Severity) -> String {
        let mut parts: Vec<&str> = Vec::with_capacity(4);
        if !self.config.alarm_name_prefix.is_empty() {
            parts.push(&self.config.alarm_name_prefix);
        }
        parts.push(&self.alarm_friendly_name);
        parts.push(suffix);
        parts.push(disambiguator.as_str());
        parts.join("-")
    }

    pub fn add_alarm(&mut self, props: AddAlarmProps) -> Result<AlarmWithAnnotation> {
        let alarm_name = self.alarm_name(&props.alarm_name_suffix, props.disambiguator);
        if !self.names.insert(alarm_name.clone()) {
            return Err(MonitoringError::DuplicateConstruct {
                id: alarm_name,
                path: self.node.path(),
            });
        }

        let datapoints_to_alarm = props
            .custom
            .datapoints_to_alarm
            .or(props.datapoints_to_alarm)
            .unwrap_or(self.config.datapoints_to_alarm);
        let evaluation_periods = props.custom.evaluation_periods.unwrap_or(datapoints_to_alarm);
        let metric = match props.period {
            Some(period) => props.metric.with_period(period),
            None => props.metric,
        };
        let alarm_description = props
            .custom
            .alarm_description_override
            .unwrap_or(props.alarm_description);

        let construct = self.node.child(&alarm_name)?;
        let label = annotation_label(
            props.comparison_operator,
            props.threshold,
            datapoints_to_alarm,
            metric.period() * evaluation_periods,
        );
        let alarm = Arc::new(Alarm::new(
            construct.logical_id(),
            AlarmProps {
                alarm_name: alarm_name.clone(),
                alarm_description: alarm_description.clone(),
                metric,
                threshold: props.threshold,
                comparison_operator: props.comparison_operator,
                evaluation_periods,
                datapoints_to_alarm,
                treat_missing_data: props
                    .custom
                    .treat_missing_data_override
                    .unwrap_or(props.treat_missing_data),
                actions_enabled: props
                    .custom
                    .actions_enabled
                    .unwrap_or(self.config.actions_enabled),
            },
        )?);

        trace!(alarm = %alarm_name, logical_id = %alarm.logical_id(), "Prepared alarm");
        self.pending.push(PendingResource::new(
            construct,
            Arc::clone(&alarm) as Arc<dyn CfnResource>,
        ));

        Ok(AlarmWithAnnotation {
            alarm,
            annotation: HorizontalAnnotation {
                label,
                value: props.threshold,
            },
            alarm_name_suffix: props.alarm_name_suffix,
            disambiguator: props.disambiguator,
            alarm_description,
        })
    }

    /// Adds one alarm per configured severity, in severity order
    pub fn add_alarms<T>(
        &mut self,
        thresholds: Option<&super::AlarmThresholds<T>>,
        mut to_props: impl FnMut(Severity, &T) -> AddAlarmProps,
    ) -> Result<Vec<AlarmWithAnnotation>> {
        let mut created = Vec::new();
        for (severity, threshold) in thresholds.into_iter().flatten() {
            created.push(self.add_alarm(to_props(*severity, threshold))?);
        }
        Ok(created)
    }

    /// Resources of every alarm added so far, ready to be committed
    pub fn into_pending(self) -> Vec<PendingResource> {
        debug!(
            scope = %self.node.path(),
            alarms = self.pending.len(),
            "Alarm factory finished"
        );
        self.pending
    }
}

fn annotation_label(
    comparison: ComparisonOperator,
    threshold: f64,
    datapoints: u32,
    window: Duration,
) -> String {
    format!(
        "{} {} for {} datapoints within {} minutes",
        comparison.symbol(),
        number(threshold),
        datapoints,
        window.as_secs() / 60
    )
}
