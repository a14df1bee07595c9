use crate::cloudwatch::Widget;
use serde::Deserialize;
use std::sync::Arc;

/// A reusable group of widgets that dashboards are assembled from
pub trait DashboardSegment {
    /// Widgets for the detail dashboard
    fn widgets(&self) -> Vec<Widget>;

    /// Widgets for the summary dashboard
    fn summary_widgets(&self) -> Vec<Widget> {
        Vec::new()
    }

    /// Widgets for the alarm dashboard
    fn alarm_widgets(&self) -> Vec<Widget> {
        Vec::new()
    }
}

/// Segment made of a single widget
#[derive(Debug, Clone)]
pub struct SingleWidgetDashboardSegment {
    widget: Widget,
    add_to_summary: bool,
    add_to_alarm: bool,
}

impl SingleWidgetDashboardSegment {
    /// Shown on the detail and summary dashboards
    pub fn new(widget: impl Into<Widget>) -> Self {
        Self {
            widget: widget.into(),
            add_to_summary: true,
            add_to_alarm: false,
        }
    }

    pub fn with_placement(mut self, add_to_summary: bool, add_to_alarm: bool) -> Self {
        self.add_to_summary = add_to_summary;
        self.add_to_alarm = add_to_alarm;
        self
    }
}

impl DashboardSegment for SingleWidgetDashboardSegment {
    fn widgets(&self) -> Vec<Widget> {
        vec![self.widget.clone()]
    }

    fn summary_widgets(&self) -> Vec<Widget> {
        if self.add_to_summary {
            vec![self.widget.clone()]
        } else {
            Vec::new()
        }
    }

    fn alarm_widgets(&self) -> Vec<Widget> {
        if self.add_to_alarm {
            vec![self.widget.clone()]
        } else {
            Vec::new()
        }
    }
}

/// Per-segment opt-outs; unset fields keep the segment on that dashboard
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct MonitoringDashboardsOverrideProps {
    pub add_to_detail_dashboard: Option<bool>,
    pub add_to_summary_dashboard: Option<bool>,
    pub add_to_alarm_dashboard: Option<bool>,
}

#[derive(Clone)]
pub struct AddSegmentProps {
    pub segment: Arc<dyn DashboardSegment>,
    pub override_props: Option<MonitoringDashboardsOverrideProps>,
}

impl AddSegmentProps {
    pub fn new(segment: impl DashboardSegment + 'static) -> Self {
        Self {
            segment: Arc::new(segment),
            override_props: None,
        }
    }

    pub fn with_overrides(mut self, overrides: MonitoringDashboardsOverrideProps) -> Self {
        self.override_props = Some(overrides);
        self
    }

    pub(crate) fn adds_to_detail(&self) -> bool {
        self.override_props
            .and_then(|o| o.add_to_detail_dashboard)
            .unwrap_or(true)
    }

    pub(crate) fn adds_to_summary(&self) -> bool {
        self.override_props
            .and_then(|o| o.add_to_summary_dashboard)
            .unwrap_or(true)
    }

    pub(crate) fn adds_to_alarm(&self) -> bool {
        self.override_props
            .and_then(|o| o.add_to_alarm_dashboard)
            .unwrap_or(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloudwatch::TextWidget;

    #[test]
    fn test_single_widget_placement() {
        let segment = SingleWidgetDashboardSegment::new(TextWidget::new("Hello world!"));
        assert_eq!(segment.widgets().len(), 1);
        assert_eq!(segment.summary_widgets().len(), 1);
        assert!(segment.alarm_widgets().is_empty());

        let segment = segment.with_placement(false, true);
        assert!(segment.summary_widgets().is_empty());
        assert_eq!(segment.alarm_widgets().len(), 1);
    }

    #[test]
    fn test_override_defaults() {
        let props = AddSegmentProps::new(SingleWidgetDashboardSegment::new(TextWidget::new("x")));
        assert!(props.adds_to_detail() && props.adds_to_summary() && props.adds_to_alarm());

        let props = props.with_overrides(MonitoringDashboardsOverrideProps {
            add_to_summary_dashboard: Some(false),
            ..Default::default()
        });
        assert!(props.adds_to_detail());
        assert!(!props.adds_to_summary());
    }
}
