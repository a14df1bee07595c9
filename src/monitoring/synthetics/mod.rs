//! Monitoring for CloudWatch Synthetics canaries

mod metrics;

pub use metrics::{SyntheticsCanaryMetricFactory, SYNTHETICS_NAMESPACE};

use super::alarm_factory::AddAlarmProps;
use super::types::{
    duration_millis, AlarmConsumer, AlarmThresholds, AlarmWithAnnotation, CustomAlarmThreshold,
};
use super::{MonitoringScope, Severity};
use crate::cloudwatch::{
    AlarmStatusWidget, ComparisonOperator, GraphWidget, HorizontalAnnotation, MetricExpr,
    TextWidget, TreatMissingData, Widget, YAxis,
};
use crate::dashboard::DashboardSegment;
use crate::error::Result;
use crate::resources::Canary;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LatencyThreshold {
    #[serde(rename = "maxLatencyMillis", with = "duration_millis")]
    pub max_latency: Duration,
    #[serde(flatten)]
    pub custom: CustomAlarmThreshold,
}

impl LatencyThreshold {
    pub fn new(max_latency: Duration) -> Self {
        Self {
            max_latency,
            custom: CustomAlarmThreshold::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorCountThreshold {
    pub max_error_count: f64,
    #[serde(flatten)]
    pub custom: CustomAlarmThreshold,
}

impl ErrorCountThreshold {
    pub fn new(max_error_count: f64) -> Self {
        Self {
            max_error_count,
            custom: CustomAlarmThreshold::default(),
        }
    }
}

/// Error rate threshold in percent
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorRateThreshold {
    pub max_error_rate: f64,
    #[serde(flatten)]
    pub custom: CustomAlarmThreshold,
}

impl ErrorRateThreshold {
    pub fn new(max_error_rate: f64) -> Self {
        Self {
            max_error_rate,
            custom: CustomAlarmThreshold::default(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SyntheticsCanaryMonitoringOptions {
    pub alarm_friendly_name: Option<String>,
    pub human_readable_name: Option<String>,
    pub add_average_latency_alarm: Option<AlarmThresholds<LatencyThreshold>>,
    #[serde(rename = "add4xxErrorCountAlarm")]
    pub add_4xx_error_count_alarm: Option<AlarmThresholds<ErrorCountThreshold>>,
    #[serde(rename = "add5xxFaultCountAlarm")]
    pub add_5xx_fault_count_alarm: Option<AlarmThresholds<ErrorCountThreshold>>,
    #[serde(rename = "add4xxErrorRateAlarm")]
    pub add_4xx_error_rate_alarm: Option<AlarmThresholds<ErrorRateThreshold>>,
    #[serde(rename = "add5xxFaultRateAlarm")]
    pub add_5xx_fault_rate_alarm: Option<AlarmThresholds<ErrorRateThreshold>>,
}

pub struct SyntheticsCanaryMonitoringProps {
    pub canary: Canary,
    pub options: SyntheticsCanaryMonitoringOptions,
    pub use_created_alarms: Option<Arc<dyn AlarmConsumer>>,
}

impl SyntheticsCanaryMonitoringProps {
    pub fn new(canary: Canary) -> Self {
        Self {
            canary,
            options: SyntheticsCanaryMonitoringOptions::default(),
            use_created_alarms: None,
        }
    }

    pub fn with_options(mut self, options: SyntheticsCanaryMonitoringOptions) -> Self {
        self.options = options;
        self
    }

    pub fn use_created_alarms(mut self, consumer: impl AlarmConsumer + 'static) -> Self {
        self.use_created_alarms = Some(Arc::new(consumer));
        self
    }
}

/// Alarms and widgets for one canary
pub struct SyntheticsCanaryMonitoring {
    title: String,
    latency: MetricExpr,
    error_counts: Vec<MetricExpr>,
    error_rates: Vec<MetricExpr>,
    latency_annotations: Vec<HorizontalAnnotation>,
    error_count_annotations: Vec<HorizontalAnnotation>,
    error_rate_annotations: Vec<HorizontalAnnotation>,
    created_alarms: Vec<AlarmWithAnnotation>,
}

impl SyntheticsCanaryMonitoring {
    pub fn new(scope: &dyn MonitoringScope, props: SyntheticsCanaryMonitoringProps) -> Result<Self> {
        let canary = &props.canary;
        let options = &props.options;
        let metrics = SyntheticsCanaryMetricFactory::new(canary);

        let latency: MetricExpr = metrics.metric_latency_average_in_millis().into();
        let count_4xx: MetricExpr = metrics.metric_4xx_error_count().into();
        let count_5xx: MetricExpr = metrics.metric_5xx_fault_count().into();
        let rate_4xx: MetricExpr = metrics.metric_4xx_error_rate().into();
        let rate_5xx: MetricExpr = metrics.metric_5xx_fault_rate().into();

        let friendly_name = options
            .alarm_friendly_name
            .as_deref()
            .unwrap_or_else(|| canary.canary_name());
        let mut alarm_factory = scope.create_alarm_factory(friendly_name);

        let latency_alarms = alarm_factory.add_alarms(
            options.add_average_latency_alarm.as_ref(),
            |severity, t| {
                greater_than(
                    &latency,
                    t.max_latency.as_millis() as f64,
                    severity,
                    "LatencyAverage",
                    format!("Average latency is too high (above {} ms).", t.max_latency.as_millis()),
                    &t.custom,
                )
            },
        )?;
        let mut count_alarms = alarm_factory.add_alarms(
            options.add_4xx_error_count_alarm.as_ref(),
            |severity, t| {
                greater_than(
                    &count_4xx,
                    t.max_error_count,
                    severity,
                    "4xxErrorCount",
                    format!("4xx error count is too high (above {}).", t.max_error_count),
                    &t.custom,
                )
            },
        )?;
        count_alarms.extend(alarm_factory.add_alarms(
            options.add_5xx_fault_count_alarm.as_ref(),
            |severity, t| {
                greater_than(
                    &count_5xx,
                    t.max_error_count,
                    severity,
                    "5xxFaultCount",
                    format!("5xx fault count is too high (above {}).", t.max_error_count),
                    &t.custom,
                )
            },
        )?);
        let mut rate_alarms = alarm_factory.add_alarms(
            options.add_4xx_error_rate_alarm.as_ref(),
            |severity, t| {
                greater_than(
                    &rate_4xx,
                    t.max_error_rate,
                    severity,
                    "4xxErrorRate",
                    format!("4xx error rate is too high (above {}%).", t.max_error_rate),
                    &t.custom,
                )
            },
        )?;
        rate_alarms.extend(alarm_factory.add_alarms(
            options.add_5xx_fault_rate_alarm.as_ref(),
            |severity, t| {
                greater_than(
                    &rate_5xx,
                    t.max_error_rate,
                    severity,
                    "5xxFaultRate",
                    format!("5xx fault rate is too high (above {}%).", t.max_error_rate),
                    &t.custom,
                )
            },
        )?);

        scope.node().stack().add_resources(alarm_factory.into_pending())?;

        let latency_annotations = annotations_of(&latency_alarms);
        let error_count_annotations = annotations_of(&count_alarms);
        let error_rate_annotations = annotations_of(&rate_alarms);

        let mut created_alarms = latency_alarms;
        created_alarms.extend(count_alarms);
        created_alarms.extend(rate_alarms);

        info!(
            canary = %canary.canary_name(),
            alarms = created_alarms.len(),
            "Created canary monitoring"
        );
        if let Some(consumer) = &props.use_created_alarms {
            debug!(alarms = created_alarms.len(), "Passing created alarms to consumer");
            consumer.consume(&created_alarms);
        }

        Ok(Self {
            title: options
                .human_readable_name
                .clone()
                .unwrap_or_else(|| canary.canary_name().to_string()),
            latency,
            error_counts: vec![count_4xx, count_5xx],
            error_rates: vec![rate_4xx, rate_5xx],
            latency_annotations,
            error_count_annotations,
            error_rate_annotations,
            created_alarms,
        })
    }

    pub fn created_alarms(&self) -> &[AlarmWithAnnotation] {
        &self.created_alarms
    }

    fn header(&self) -> Widget {
        TextWidget::header(format!("### Synthetics Canary **{}**", self.title)).into()
    }

    fn latency_widget(&self, width: u32) -> Widget {
        GraphWidget::new("Latency", vec![self.latency.clone()])
            .with_y_axis(YAxis {
                label: Some("ms".to_string()),
                min: Some(0.0),
                show_units: Some(false),
                ..Default::default()
            })
            .with_annotations(self.latency_annotations.clone())
            .with_size(width, 6)
            .into()
    }

    fn error_count_widget(&self, width: u32) -> Widget {
        GraphWidget::new("Errors", self.error_counts.clone())
            .with_y_axis(YAxis {
                label: Some("Count".to_string()),
                min: Some(0.0),
                show_units: Some(false),
                ..Default::default()
            })
            .with_annotations(self.error_count_annotations.clone())
            .with_size(width, 6)
            .into()
    }

    fn error_rate_widget(&self, width: u32) -> Widget {
        GraphWidget::new("Errors (rate)", self.error_rates.clone())
            .with_y_axis(YAxis {
                label: Some("%".to_string()),
                min: Some(0.0),
                max: Some(100.0),
                show_units: Some(false),
            })
            .with_annotations(self.error_rate_annotations.clone())
            .with_size(width, 6)
            .into()
    }
}

fn annotations_of(alarms: &[AlarmWithAnnotation]) -> Vec<HorizontalAnnotation> {
    alarms.iter().map(|a| a.annotation.clone()).collect()
}

fn greater_than(
    metric: &MetricExpr,
    threshold: f64,
    severity: Severity,
    suffix: &str,
    description: String,
    custom: &CustomAlarmThreshold,
) -> AddAlarmProps {
    AddAlarmProps {
        metric: metric.clone(),
        threshold,
        comparison_operator: ComparisonOperator::GreaterThanThreshold,
        treat_missing_data: TreatMissingData::Missing,
        alarm_name_suffix: suffix.to_string(),
        alarm_description: description,
        disambiguator: severity,
        period: None,
        datapoints_to_alarm: None,
        custom: custom.clone(),
    }
}

impl DashboardSegment for SyntheticsCanaryMonitoring {
    fn widgets(&self) -> Vec<Widget> {
        vec![
            self.header(),
            self.latency_widget(8),
            self.error_count_widget(8),
            self.error_rate_widget(8),
        ]
    }

    fn summary_widgets(&self) -> Vec<Widget> {
        vec![self.header(), self.latency_widget(12), self.error_rate_widget(12)]
    }

    fn alarm_widgets(&self) -> Vec<Widget> {
        if self.created_alarms.is_empty() {
            return Vec::new();
        }
        let arns = self.created_alarms.iter().map(|a| a.alarm.arn()).collect();
        vec![
            self.header(),
            AlarmStatusWidget::new(format!("{} alarms", self.title), arns).into(),
        ]
    }
}
