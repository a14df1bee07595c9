//! CloudWatch building blocks: metrics, alarms, widgets and dashboards

mod alarm;
mod dashboard;
mod metric;
mod widget;

pub use alarm::{Alarm, AlarmProps, ComparisonOperator, TreatMissingData};
pub use dashboard::{Dashboard, GRID_WIDTH};
pub use metric::{MathExpression, Metric, MetricExpr, Statistic, DEFAULT_METRIC_PERIOD};
pub use widget::{
    AlarmStatusWidget, GraphWidget, HorizontalAnnotation, RenderingPreference,
    SingleValueWidget, TextWidget, Widget, YAxis,
};

use serde_json::{json, Value};

/// Renders whole numbers as JSON integers so thresholds read `30`, not `30.0`
pub(crate) fn number(value: f64) -> Value {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        json!(value as i64)
    } else {
        json!(value)
    }
}
