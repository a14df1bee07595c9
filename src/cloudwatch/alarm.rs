use super::{number, MetricExpr};
use crate::error::{MonitoringError, Result};
use crate::stack::{token, CfnResource};
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// How the metric value is compared against the threshold
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ComparisonOperator {
    GreaterThanThreshold,
    GreaterThanOrEqualToThreshold,
    LessThanThreshold,
    LessThanOrEqualToThreshold,
}

impl ComparisonOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ComparisonOperator::GreaterThanThreshold => "GreaterThanThreshold",
            ComparisonOperator::GreaterThanOrEqualToThreshold => "GreaterThanOrEqualToThreshold",
            ComparisonOperator::LessThanThreshold => "LessThanThreshold",
            ComparisonOperator::LessThanOrEqualToThreshold => "LessThanOrEqualToThreshold",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ComparisonOperator::GreaterThanThreshold => ">",
            ComparisonOperator::GreaterThanOrEqualToThreshold => ">=",
            ComparisonOperator::LessThanThreshold => "<",
            ComparisonOperator::LessThanOrEqualToThreshold => "<=",
        }
    }
}

/// How the alarm evaluates periods without data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TreatMissingData {
    Breaching,
    NotBreaching,
    Ignore,
    Missing,
}

impl TreatMissingData {
    pub fn as_str(&self) -> &'static str {
        match self {
            TreatMissingData::Breaching => "breaching",
            TreatMissingData::NotBreaching => "notBreaching",
            TreatMissingData::Ignore => "ignore",
            TreatMissingData::Missing => "missing",
        }
    }
}

/// Fully resolved alarm definition
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmProps {
    pub alarm_name: String,
    pub alarm_description: String,
    pub metric: MetricExpr,
    pub threshold: f64,
    pub comparison_operator: ComparisonOperator,
    pub evaluation_periods: u32,
    pub datapoints_to_alarm: u32,
    pub treat_missing_data: TreatMissingData,
    pub actions_enabled: bool,
}

/// A CloudWatch alarm resource
#[derive(Debug, Clone, PartialEq)]
pub struct Alarm {
    logical_id: String,
    props: AlarmProps,
}

impl Alarm {
    /// Validates the definition the way CloudWatch would reject it at deploy time
    pub fn new(logical_id: impl Into<String>, props: AlarmProps) -> Result<Self> {
        validate(&props)?;
        Ok(Self {
            logical_id: logical_id.into(),
            props,
        })
    }

    pub fn logical_id(&self) -> &str {
        &self.logical_id
    }

    pub fn alarm_name(&self) -> &str {
        &self.props.alarm_name
    }

    pub fn props(&self) -> &AlarmProps {
        &self.props
    }

    pub fn arn(&self) -> Value {
        token::get_att(&self.logical_id, "Arn")
    }
}

fn validate(props: &AlarmProps) -> Result<()> {
    let fail = |reason: String| Err(MonitoringError::invalid_alarm(&props.alarm_name, reason));

    if props.alarm_name.is_empty() || props.alarm_name.len() > 255 {
        return fail("alarm name must be between 1 and 255 characters".to_string());
    }
    if !props.threshold.is_finite() {
        return fail(format!("threshold must be a finite number, got {}", props.threshold));
    }
    if props.evaluation_periods == 0 {
        return fail("evaluation periods must be at least 1".to_string());
    }
    if props.datapoints_to_alarm == 0 || props.datapoints_to_alarm > props.evaluation_periods {
        return fail(format!(
            "datapoints to alarm ({}) must be between 1 and evaluation periods ({})",
            props.datapoints_to_alarm, props.evaluation_periods
        ));
    }
    let secs = props.metric.period().as_secs();
    if !(secs == 10 || secs == 30 || (secs > 0 && secs % 60 == 0)) {
        return fail(format!(
            "period must be 10, 30 or a multiple of 60 seconds, got {}s",
            secs
        ));
    }
    Ok(())
}

impl CfnResource for Alarm {
    fn resource_type(&self) -> &str {
        "AWS::CloudWatch::Alarm"
    }

    fn properties(&self) -> Result<Value> {
        let p = &self.props;
        let mut props = p.metric.alarm_properties();
        props.insert("ActionsEnabled".to_string(), json!(p.actions_enabled));
        props.insert("AlarmDescription".to_string(), json!(p.alarm_description));
        props.insert("AlarmName".to_string(), json!(p.alarm_name));
        props.insert(
            "ComparisonOperator".to_string(),
            json!(p.comparison_operator.as_str()),
        );
        props.insert("DatapointsToAlarm".to_string(), json!(p.datapoints_to_alarm));
        props.insert("EvaluationPeriods".to_string(), json!(p.evaluation_periods));
        props.insert("Threshold".to_string(), number(p.threshold));
        props.insert(
            "TreatMissingData".to_string(),
            json!(p.treat_missing_data.as_str()),
        );
        Ok(Value::Object(props))
    }
}
