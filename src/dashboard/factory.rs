use super::segment::AddSegmentProps;
use crate::cloudwatch::{Dashboard, RenderingPreference};
use crate::error::{MonitoringError, Result};
use crate::stack::{CfnResource, Construct, PendingResource};
use parking_lot::Mutex;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info};

/// Configuration for the default set of dashboards
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardFactoryProps {
    /// Dashboards are named `{prefix}`, `{prefix}-Summary` and `{prefix}-Alarms`
    pub dashboard_name_prefix: String,
    pub create_dashboard: bool,
    pub create_summary_dashboard: bool,
    pub create_alarm_dashboard: bool,
    pub rendering_preference: RenderingPreference,
    /// Time range shown by the detail and alarm dashboards
    #[serde(rename = "detailDashboardRangeSeconds", with = "range_secs")]
    pub detail_dashboard_range: Duration,
    /// Time range shown by the summary dashboard
    #[serde(rename = "summaryDashboardRangeSeconds", with = "range_secs")]
    pub summary_dashboard_range: Duration,
}

impl Default for DashboardFactoryProps {
    fn default() -> Self {
        Self {
            dashboard_name_prefix: String::new(),
            create_dashboard: true,
            create_summary_dashboard: false,
            create_alarm_dashboard: false,
            rendering_preference: RenderingPreference::InteractiveOnly,
            detail_dashboard_range: Duration::from_secs(8 * 3600),
            summary_dashboard_range: Duration::from_secs(14 * 86_400),
        }
    }
}

/// Creates the dashboards selected by [`DashboardFactoryProps`] and routes
/// segments onto them.
///
/// When every flag is off, the detail dashboard is created on the first
/// segment with widgets, so those widgets still end up rendered. Otherwise
/// only the requested dashboards exist.
pub struct DefaultDashboardFactory {
    node: Construct,
    props: DashboardFactoryProps,
    dashboard: Mutex<Option<Arc<Dashboard>>>,
    summary_dashboard: Option<Arc<Dashboard>>,
    alarm_dashboard: Option<Arc<Dashboard>>,
}

impl DefaultDashboardFactory {
    pub fn new(scope: &Construct, id: &str, props: DashboardFactoryProps) -> Result<Self> {
        if props.dashboard_name_prefix.is_empty() {
            return Err(MonitoringError::ConfigError(
                "dashboard name prefix must not be empty".to_string(),
            ));
        }

        let node = scope.add_child(id)?;
        let mut batch = Vec::new();

        let dashboard = if props.create_dashboard {
            Some(Self::prepare(
                &node,
                "Dashboard",
                props.dashboard_name_prefix.clone(),
                props.detail_dashboard_range,
                &props,
                &mut batch,
            )?)
        } else {
            None
        };
        let summary_dashboard = if props.create_summary_dashboard {
            Some(Self::prepare(
                &node,
                "SummaryDashboard",
                format!("{}-Summary", props.dashboard_name_prefix),
                props.summary_dashboard_range,
                &props,
                &mut batch,
            )?)
        } else {
            None
        };
        let alarm_dashboard = if props.create_alarm_dashboard {
            Some(Self::prepare(
                &node,
                "AlarmDashboard",
                format!("{}-Alarms", props.dashboard_name_prefix),
                props.detail_dashboard_range,
                &props,
                &mut batch,
            )?)
        } else {
            None
        };

        node.stack().add_resources(batch)?;
        info!(
            prefix = %props.dashboard_name_prefix,
            dashboard = props.create_dashboard,
            summary = props.create_summary_dashboard,
            alarms = props.create_alarm_dashboard,
            "Created dashboard factory"
        );

        Ok(Self {
            node,
            props,
            dashboard: Mutex::new(dashboard),
            summary_dashboard,
            alarm_dashboard,
        })
    }

    fn prepare(
        node: &Construct,
        id: &str,
        name: String,
        range: Duration,
        props: &DashboardFactoryProps,
        batch: &mut Vec<PendingResource>,
    ) -> Result<Arc<Dashboard>> {
        let dashboard = Arc::new(Dashboard::new(
            name,
            Some(iso_range(range)),
            props.rendering_preference,
        ));
        batch.push(PendingResource::new(
            node.child(id)?,
            Arc::clone(&dashboard) as Arc<dyn CfnResource>,
        ));
        Ok(dashboard)
    }

    /// Routes the segment's widgets onto the dashboards it belongs to
    pub fn add_segment(&self, props: &AddSegmentProps) -> Result<()> {
        if props.adds_to_detail() {
            let widgets = props.segment.widgets();
            if !widgets.is_empty() {
                if let Some(detail) = self.detail_dashboard()? {
                    detail.add_widgets(widgets);
                }
            }
        }
        if props.adds_to_summary() {
            if let Some(summary) = &self.summary_dashboard {
                summary.add_widgets(props.segment.summary_widgets());
            }
        }
        if props.adds_to_alarm() {
            if let Some(alarm) = &self.alarm_dashboard {
                alarm.add_widgets(props.segment.alarm_widgets());
            }
        }
        Ok(())
    }

    fn detail_dashboard(&self) -> Result<Option<Arc<Dashboard>>> {
        let mut slot = self.dashboard.lock();
        if let Some(dashboard) = slot.as_ref() {
            return Ok(Some(Arc::clone(dashboard)));
        }
        if self.summary_dashboard.is_some() || self.alarm_dashboard.is_some() {
            return Ok(None);
        }

        let mut batch = Vec::new();
        let dashboard = Self::prepare(
            &self.node,
            "Dashboard",
            self.props.dashboard_name_prefix.clone(),
            self.props.detail_dashboard_range,
            &self.props,
            &mut batch,
        )?;
        self.node.stack().add_resources(batch)?;
        debug!(dashboard = %dashboard.name(), "Materialized detail dashboard for segment");
        *slot = Some(Arc::clone(&dashboard));
        Ok(Some(dashboard))
    }

    pub fn dashboard(&self) -> Option<Arc<Dashboard>> {
        self.dashboard.lock().clone()
    }

    pub fn summary_dashboard(&self) -> Option<Arc<Dashboard>> {
        self.summary_dashboard.clone()
    }

    pub fn alarm_dashboard(&self) -> Option<Arc<Dashboard>> {
        self.alarm_dashboard.clone()
    }

    pub fn rendering_preference(&self) -> RenderingPreference {
        self.props.rendering_preference
    }
}

/// ISO 8601 relative start, e.g. `-PT8H` or `-P14D`
fn iso_range(range: Duration) -> String {
    let secs = range.as_secs();
    if secs > 0 && secs % 86_400 == 0 {
        format!("-P{}D", secs / 86_400)
    } else if secs % 3600 == 0 {
        format!("-PT{}H", secs / 3600)
    } else if secs % 60 == 0 {
        format!("-PT{}M", secs / 60)
    } else {
        format!("-PT{}S", secs)
    }
}

mod range_secs {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        Ok(Duration::from_secs(u64::deserialize(deserializer)?))
    }
}
