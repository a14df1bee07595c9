//! Monitoring for Secrets Manager secrets

mod metrics;
mod publisher;

pub use metrics::{
    SecretsManagerSecretMetricFactory, DAYS_SINCE_LAST_CHANGE, DAYS_SINCE_LAST_ROTATION,
    SECRETS_MANAGER_NAMESPACE,
};
pub use publisher::SecretsManagerMetricsPublisher;

use super::alarm_factory::AddAlarmProps;
use super::types::{
    optional_duration_secs, AlarmConsumer, AlarmThresholds, AlarmWithAnnotation,
    CustomAlarmThreshold,
};
use super::MonitoringScope;
use crate::cloudwatch::{
    AlarmStatusWidget, ComparisonOperator, GraphWidget, HorizontalAnnotation, Metric, TextWidget,
    TreatMissingData, Widget, YAxis,
};
use crate::dashboard::DashboardSegment;
use crate::error::{MonitoringError, Result};
use crate::resources::Secret;
use crate::stack::SECRETS_MANAGER_PARSE_OWNED_SECRET_NAME;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

const DEFAULT_PERIOD: Duration = Duration::from_secs(86_400);

/// Alarm when the secret has not been updated for too long
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DaysSinceUpdateThreshold {
    pub max_days_since_update: u32,
    /// Evaluation period, one day when unset
    #[serde(default, rename = "periodSeconds", with = "optional_duration_secs")]
    pub period: Option<Duration>,
    #[serde(flatten)]
    pub custom: CustomAlarmThreshold,
}

impl DaysSinceUpdateThreshold {
    pub fn new(max_days_since_update: u32, period: Duration) -> Self {
        Self {
            max_days_since_update,
            period: Some(period),
            custom: CustomAlarmThreshold::default(),
        }
    }
}

/// Declarative part of secret monitoring
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SecretsManagerSecretMonitoringOptions {
    /// Used in alarm names; defaults to the secret's display name
    pub alarm_friendly_name: Option<String>,
    /// Used in dashboard titles; defaults to the secret's display name
    pub human_readable_name: Option<String>,
    pub add_days_since_last_change_alarm: Option<AlarmThresholds<DaysSinceUpdateThreshold>>,
    pub add_days_since_last_rotation_alarm: Option<AlarmThresholds<DaysSinceUpdateThreshold>>,
    pub show_last_rotation_widget: bool,
}

pub struct SecretsManagerSecretMonitoringProps {
    pub secret: Secret,
    pub options: SecretsManagerSecretMonitoringOptions,
    pub use_created_alarms: Option<Arc<dyn AlarmConsumer>>,
}

impl SecretsManagerSecretMonitoringProps {
    pub fn new(secret: Secret) -> Self {
        Self {
            secret,
            options: SecretsManagerSecretMonitoringOptions::default(),
            use_created_alarms: None,
        }
    }

    pub fn with_options(mut self, options: SecretsManagerSecretMonitoringOptions) -> Self {
        self.options = options;
        self
    }

    pub fn use_created_alarms(mut self, consumer: impl AlarmConsumer + 'static) -> Self {
        self.use_created_alarms = Some(Arc::new(consumer));
        self
    }
}

/// Alarms and widgets for one secret
pub struct SecretsManagerSecretMonitoring {
    title: String,
    days_since_last_change: Metric,
    days_since_last_rotation: Metric,
    change_annotations: Vec<HorizontalAnnotation>,
    rotation_annotations: Vec<HorizontalAnnotation>,
    show_last_rotation_widget: bool,
    created_alarms: Vec<AlarmWithAnnotation>,
}

impl SecretsManagerSecretMonitoring {
    pub fn new(scope: &dyn MonitoringScope, props: SecretsManagerSecretMonitoringProps) -> Result<Self> {
        let stack = scope.node().stack();
        if !stack.feature_flag_enabled(SECRETS_MANAGER_PARSE_OWNED_SECRET_NAME) {
            return Err(MonitoringError::MissingFeatureFlag {
                flag: SECRETS_MANAGER_PARSE_OWNED_SECRET_NAME.to_string(),
                stack: stack.name().to_string(),
                resource: format!("secret '{}'", props.secret.node().path()),
            });
        }

        let secret = &props.secret;
        if secret.node().stack().addr() != stack.addr() {
            return Err(MonitoringError::ConfigError(format!(
                "secret '{}' belongs to stack '{}', not to the monitoring stack '{}'",
                secret.node().path(),
                secret.node().stack().name(),
                stack.name()
            )));
        }
        let options = &props.options;
        let metric_factory = SecretsManagerSecretMetricFactory::new(secret);
        let days_since_last_change = metric_factory.metric_days_since_last_change();
        let days_since_last_rotation = metric_factory.metric_days_since_last_rotation();

        let friendly_name = options
            .alarm_friendly_name
            .as_deref()
            .unwrap_or_else(|| secret.display_name());
        let mut alarm_factory = scope.create_alarm_factory(friendly_name);

        let change_alarms = alarm_factory.add_alarms(
            options.add_days_since_last_change_alarm.as_ref(),
            |severity, threshold| {
                days_since_update_alarm(
                    &days_since_last_change,
                    threshold,
                    severity,
                    "DaysSinceLastChange",
                    "days since last change",
                )
            },
        )?;
        let rotation_alarms = alarm_factory.add_alarms(
            options.add_days_since_last_rotation_alarm.as_ref(),
            |severity, threshold| {
                days_since_update_alarm(
                    &days_since_last_rotation,
                    threshold,
                    severity,
                    "DaysSinceLastRotation",
                    "days since last rotation",
                )
            },
        )?;

        let publisher = SecretsManagerMetricsPublisher::get_instance(scope.node())?;
        let mut batch = alarm_factory.into_pending();
        batch.extend(publisher.prepare_secret(secret)?);
        stack.add_resources(batch)?;
        publisher.track_secret(secret);

        let change_annotations = change_alarms.iter().map(|a| a.annotation.clone()).collect();
        let rotation_annotations = rotation_alarms.iter().map(|a| a.annotation.clone()).collect();
        let mut created_alarms = change_alarms;
        created_alarms.extend(rotation_alarms);

        info!(
            secret = %secret.node().path(),
            alarms = created_alarms.len(),
            "Created secret monitoring"
        );
        if let Some(consumer) = &props.use_created_alarms {
            debug!(alarms = created_alarms.len(), "Passing created alarms to consumer");
            consumer.consume(&created_alarms);
        }

        Ok(Self {
            title: options
                .human_readable_name
                .clone()
                .unwrap_or_else(|| secret.display_name().to_string()),
            days_since_last_change,
            days_since_last_rotation,
            change_annotations,
            rotation_annotations,
            show_last_rotation_widget: options.show_last_rotation_widget,
            created_alarms,
        })
    }

    pub fn created_alarms(&self) -> &[AlarmWithAnnotation] {
        &self.created_alarms
    }

    fn header(&self) -> Widget {
        TextWidget::header(format!("### Secrets Manager Secret **{}**", self.title)).into()
    }

    fn days_graph(&self, title: &str, metric: &Metric, annotations: &[HorizontalAnnotation], width: u32) -> Widget {
        GraphWidget::new(title, vec![metric.clone().into()])
            .with_y_axis(YAxis {
                label: Some("Days".to_string()),
                min: Some(0.0),
                show_units: Some(false),
                ..Default::default()
            })
            .with_annotations(annotations.to_vec())
            .with_size(width, 6)
            .into()
    }
}

fn days_since_update_alarm(
    metric: &Metric,
    threshold: &DaysSinceUpdateThreshold,
    severity: super::Severity,
    suffix: &str,
    what: &str,
) -> AddAlarmProps {
    AddAlarmProps {
        metric: metric.clone().into(),
        threshold: f64::from(threshold.max_days_since_update),
        comparison_operator: ComparisonOperator::GreaterThanThreshold,
        treat_missing_data: TreatMissingData::Breaching,
        alarm_name_suffix: suffix.to_string(),
        alarm_description: format!(
            "The number of {} is above {}.",
            what, threshold.max_days_since_update
        ),
        disambiguator: severity,
        period: Some(threshold.period.unwrap_or(DEFAULT_PERIOD)),
        datapoints_to_alarm: Some(1),
        custom: threshold.custom.clone(),
    }
}

impl DashboardSegment for SecretsManagerSecretMonitoring {
    fn widgets(&self) -> Vec<Widget> {
        let mut widgets = vec![self.header()];
        if self.show_last_rotation_widget {
            widgets.push(self.days_graph(
                "Days since last change",
                &self.days_since_last_change,
                &self.change_annotations,
                12,
            ));
            widgets.push(self.days_graph(
                "Days since last rotation",
                &self.days_since_last_rotation,
                &self.rotation_annotations,
                12,
            ));
        } else {
            widgets.push(self.days_graph(
                "Days since last change",
                &self.days_since_last_change,
                &self.change_annotations,
                24,
            ));
        }
        widgets
    }

    fn summary_widgets(&self) -> Vec<Widget> {
        vec![
            self.header(),
            self.days_graph(
                "Days since last change",
                &self.days_since_last_change,
                &self.change_annotations,
                24,
            ),
        ]
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
