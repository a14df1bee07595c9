use super::scope::{MonitoringScope, MonitoringScopeConfig};
use super::secretsmanager::{SecretsManagerSecretMonitoring, SecretsManagerSecretMonitoringProps};
use super::synthetics::{SyntheticsCanaryMonitoring, SyntheticsCanaryMonitoringProps};
use super::types::AlarmWithAnnotation;
use crate::cloudwatch::AlarmStatusWidget;
use crate::dashboard::{
    AddSegmentProps, DashboardFactoryProps, DefaultDashboardFactory, SingleWidgetDashboardSegment,
};
use crate::error::Result;
use crate::stack::Construct;
use serde::Deserialize;
use tracing::debug;

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitoringFacadeProps {
    #[serde(flatten)]
    pub scope: MonitoringScopeConfig,
    pub dashboards: DashboardFactoryProps,
}

/// Entry point that monitors resources, collects their alarms and lays their
/// widgets out on the default dashboards.
///
/// ```rust
/// use cloudwatch_monitoring_constructs::monitoring::{MonitoringFacade, MonitoringFacadeProps};
/// use cloudwatch_monitoring_constructs::dashboard::DashboardFactoryProps;
/// use cloudwatch_monitoring_constructs::monitoring::synthetics::SyntheticsCanaryMonitoringProps;
/// use cloudwatch_monitoring_constructs::resources::{Canary, CanaryProps};
/// use cloudwatch_monitoring_constructs::Stack;
///
/// # fn main() -> cloudwatch_monitoring_constructs::Result<()> {
/// let stack = Stack::new();
/// let canary = Canary::new(&stack.root(), "Canary", CanaryProps::default())?;
///
/// let mut facade = MonitoringFacade::new(
///     &stack.root(),
///     "Monitoring",
///     MonitoringFacadeProps {
///         dashboards: DashboardFactoryProps {
///             dashboard_name_prefix: "Service".to_string(),
///             ..Default::default()
///         },
///         ..Default::default()
///     },
/// )?;
/// facade.monitor_synthetics_canary(SyntheticsCanaryMonitoringProps::new(canary))?;
///
/// let template = stack.synthesize()?;
/// assert_eq!(template.resource_count_is("AWS::CloudWatch::Dashboard"), 1);
/// # Ok(())
/// # }
/// ```
pub struct MonitoringFacade {
    node: Construct,
    config: MonitoringScopeConfig,
    dashboards: DefaultDashboardFactory,
    created_alarms: Vec<AlarmWithAnnotation>,
}

impl MonitoringFacade {
    pub fn new(scope: &Construct, id: &str, props: MonitoringFacadeProps) -> Result<Self> {
        let node = scope.add_child(id)?;
        let dashboards = DefaultDashboardFactory::new(&node, "Dashboards", props.dashboards)?;
        Ok(Self {
            node,
            config: props.scope,
            dashboards,
            created_alarms: Vec::new(),
        })
    }

    pub fn monitor_secrets_manager_secret(
        &mut self,
        props: SecretsManagerSecretMonitoringProps,
    ) -> Result<&mut Self> {
        let monitoring = SecretsManagerSecretMonitoring::new(&*self, props)?;
        self.created_alarms.extend_from_slice(monitoring.created_alarms());
        self.add_segment(AddSegmentProps::new(monitoring))
    }

    pub fn monitor_synthetics_canary(
        &mut self,
        props: SyntheticsCanaryMonitoringProps,
    ) -> Result<&mut Self> {
        let monitoring = SyntheticsCanaryMonitoring::new(&*self, props)?;
        self.created_alarms.extend_from_slice(monitoring.created_alarms());
        self.add_segment(AddSegmentProps::new(monitoring))
    }

    pub fn add_segment(&mut self, props: AddSegmentProps) -> Result<&mut Self> {
        self.dashboards.add_segment(&props)?;
        Ok(self)
    }

    /// Every alarm created through this facade, in creation order
    pub fn created_alarms(&self) -> &[AlarmWithAnnotation] {
        &self.created_alarms
    }

    /// Segment with one alarm status widget covering every collected alarm
    pub fn create_alarm_summary_segment(&self, title: &str) -> SingleWidgetDashboardSegment {
        let arns = self.created_alarms.iter().map(|a| a.alarm.arn()).collect();
        debug!(alarms = self.created_alarms.len(), "Creating alarm summary segment");
        SingleWidgetDashboardSegment::new(AlarmStatusWidget::new(title, arns)).with_placement(true, true)
    }

    pub fn dashboards(&self) -> &DefaultDashboardFactory {
        &self.dashboards
    }
}

impl MonitoringScope for MonitoringFacade {
    fn node(&self) -> &Construct {
        &self.node
    }

    fn config(&self) -> &MonitoringScopeConfig {
        &self.config
    }
}
