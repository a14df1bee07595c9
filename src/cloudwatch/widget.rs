use super::{number, MetricExpr};
use crate::stack::token;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};

/// Whether metric widgets render as interactive graphs or static numbers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RenderingPreference {
    /// Time-series graphs
    #[default]
    InteractiveOnly,
    /// Single-value numbers, no annotations or axes
    StaticOnly,
}

/// Horizontal line drawn on a graph, typically an alarm threshold
#[derive(Debug, Clone, PartialEq)]
pub struct HorizontalAnnotation {
    pub label: String,
    pub value: f64,
}

impl HorizontalAnnotation {
    fn to_json(&self) -> Value {
        json!({ "label": self.label, "value": number(self.value), "yAxis": "left" })
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct YAxis {
    pub label: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
    pub show_units: Option<bool>,
}

impl YAxis {
    fn to_json(&self) -> Value {
        let mut axis = Map::new();
        if let Some(label) = &self.label {
            axis.insert("label".to_string(), json!(label));
        }
        if let Some(min) = self.min {
            axis.insert("min".to_string(), number(min));
        }
        if let Some(max) = self.max {
            axis.insert("max".to_string(), number(max));
        }
        if let Some(show_units) = self.show_units {
            axis.insert("showUnits".to_string(), json!(show_units));
        }
        Value::Object(axis)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextWidget {
    pub markdown: String,
    pub width: u32,
    pub height: u32,
}

impl TextWidget {
    pub fn new(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            width: 6,
            height: 2,
        }
    }

    /// Full-width, single-line section header
    pub fn header(markdown: impl Into<String>) -> Self {
        Self {
            markdown: markdown.into(),
            width: 24,
            height: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GraphWidget {
    pub title: String,
    pub left: Vec<MetricExpr>,
    pub left_y_axis: YAxis,
    pub left_annotations: Vec<HorizontalAnnotation>,
    pub width: u32,
    pub height: u32,
}

impl GraphWidget {
    pub fn new(title: impl Into<String>, left: Vec<MetricExpr>) -> Self {
        Self {
            title: title.into(),
            left,
            left_y_axis: YAxis::default(),
            left_annotations: Vec::new(),
            width: 6,
            height: 5,
        }
    }

    pub fn with_y_axis(mut self, axis: YAxis) -> Self {
        self.left_y_axis = axis;
        self
    }

    pub fn with_annotations(mut self, annotations: Vec<HorizontalAnnotation>) -> Self {
        self.left_annotations = annotations;
        self
    }

    pub fn with_size(mut self, width: u32, height: u32) -> Self {
        self.width = width;
        self.height = height;
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SingleValueWidget {
    pub title: String,
    pub metrics: Vec<MetricExpr>,
    pub width: u32,
    pub height: u32,
}

impl SingleValueWidget {
    pub fn new(title: impl Into<String>, metrics: Vec<MetricExpr>) -> Self {
        Self {
            title: title.into(),
            metrics,
            width: 6,
            height: 3,
        }
    }
}

/// Grid of alarm states
#[derive(Debug, Clone, PartialEq)]
pub struct AlarmStatusWidget {
    pub title: String,
    pub alarm_arns: Vec<Value>,
    pub width: u32,
    pub height: u32,
}

impl AlarmStatusWidget {
    pub fn new(title: impl Into<String>, alarm_arns: Vec<Value>) -> Self {
        let rows = alarm_arns.len().div_ceil(4).max(1) as u32;
        Self {
            title: title.into(),
            alarm_arns,
            width: 24,
            height: rows + 1,
        }
    }
}

/// A dashboard widget
#[derive(Debug, Clone, PartialEq)]
pub enum Widget {
    Text(TextWidget),
    Graph(GraphWidget),
    SingleValue(SingleValueWidget),
    AlarmStatus(AlarmStatusWidget),
}

impl Widget {
    pub fn width(&self) -> u32 {
        match self {
            Widget::Text(w) => w.width,
            Widget::Graph(w) => w.width,
            Widget::SingleValue(w) => w.width,
            Widget::AlarmStatus(w) => w.width,
        }
    }

    pub fn height(&self) -> u32 {
        match self {
            Widget::Text(w) => w.height,
            Widget::Graph(w) => w.height,
            Widget::SingleValue(w) => w.height,
            Widget::AlarmStatus(w) => w.height,
        }
    }

    /// Renders the widget at a grid position
    pub fn render(&self, preference: RenderingPreference, x: u32, y: u32) -> Value {
        let (widget_type, properties) = match self {
            Widget::Text(w) => ("text", json!({ "markdown": w.markdown })),
            Widget::Graph(w) => ("metric", render_graph(w, preference)),
            Widget::SingleValue(w) => (
                "metric",
                json!({
                    "view": "singleValue",
                    "title": w.title,
                    "region": token::region(),
                    "metrics": metric_entries(&w.metrics),
                }),
            ),
            Widget::AlarmStatus(w) => (
                "alarm",
                json!({ "title": w.title, "alarms": w.alarm_arns }),
            ),
        };

        json!({
            "type": widget_type,
            "width": self.width(),
            "height": self.height(),
            "x": x,
            "y": y,
            "properties": properties,
        })
    }
}

fn render_graph(widget: &GraphWidget, preference: RenderingPreference) -> Value {
    let mut properties = Map::new();
    properties.insert("title".to_string(), json!(widget.title));
    properties.insert("region".to_string(), token::region());
    properties.insert("metrics".to_string(), metric_entries(&widget.left));

    match preference {
        RenderingPreference::InteractiveOnly => {
            properties.insert("view".to_string(), json!("timeSeries"));
            properties.insert(
                "yAxis".to_string(),
                json!({ "left": widget.left_y_axis.to_json() }),
            );
            if !widget.left_annotations.is_empty() {
                let horizontal: Vec<Value> =
                    widget.left_annotations.iter().map(|a| a.to_json()).collect();
                properties.insert("annotations".to_string(), json!({ "horizontal": horizontal }));
            }
        }
        RenderingPreference::StaticOnly => {
            properties.insert("view".to_string(), json!("singleValue"));
        }
    }
    Value::Object(properties)
}

fn metric_entries(metrics: &[MetricExpr]) -> Value {
    let mut counter = 0;
    Value::Array(
        metrics
            .iter()
            .flat_map(|m| m.widget_entries(&mut counter))
            .collect(),
    )
}

impl From<TextWidget> for Widget {
    fn from(w: TextWidget) -> Self {
        Widget::Text(w)
    }
}

impl From<GraphWidget> for Widget {
    fn from(w: GraphWidget) -> Self {
        Widget::Graph(w)
    }
}

impl From<SingleValueWidget> for Widget {
    fn from(w: SingleValueWidget) -> Self {
        Widget::SingleValue(w)
    }
}

impl From<AlarmStatusWidget> for Widget {
    fn from(w: AlarmStatusWidget) -> Self {
        Widget::AlarmStatus(w)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cloudwatch::{Metric, Statistic};
    use pretty_assertions::assert_eq;

    fn graph() -> Widget {
        GraphWidget::new(
            "Days since last change",
            vec![Metric::new("SecretsManager", "DaysSinceLastChange", Statistic::Maximum).into()],
        )
        .with_y_axis(YAxis {
            label: Some("Days".to_string()),
            min: Some(0.0),
            ..Default::default()
        })
        .with_annotations(vec![HorizontalAnnotation {
            label: "> 30".to_string(),
            value: 30.0,
        }])
        .into()
    }

    #[test]
    fn test_interactive_graph() {
        let rendered = graph().render(RenderingPreference::InteractiveOnly, 6, 1);
        assert_eq!(rendered["type"], json!("metric"));
        assert_eq!(rendered["x"], json!(6));
        assert_eq!(rendered["y"], json!(1));
        assert_eq!(rendered["properties"]["view"], json!("timeSeries"));
        assert_eq!(
            rendered["properties"]["yAxis"],
            json!({ "left": { "label": "Days", "min": 0 } })
        );
        assert_eq!(
            rendered["properties"]["annotations"]["horizontal"][0],
            json!({ "label": "> 30", "value": 30, "yAxis": "left" })
        );
    }

    #[test]
    fn test_static_graph_drops_axes_and_annotations() {
        let rendered = graph().render(RenderingPreference::StaticOnly, 0, 0);
        assert_eq!(rendered["properties"]["view"], json!("singleValue"));
        assert!(rendered["properties"].get("annotations").is_none());
        assert!(rendered["properties"].get("yAxis").is_none());
    }

    #[test]
    fn test_text_widget_ignores_preference() {
        let widget: Widget = TextWidget::new("Hello world!").into();
        assert_eq!(
            widget.render(RenderingPreference::InteractiveOnly, 0, 0),
            widget.render(RenderingPreference::StaticOnly, 0, 0)
        );
    }

    #[test]
    fn test_alarm_status_height_grows_with_alarms() {
        let arns = (0..5).map(|i| json!(format!("arn-{}", i))).collect();
        let widget = AlarmStatusWidget::new("Alarms", arns);
        assert_eq!(widget.height, 3);
        assert_eq!(AlarmStatusWidget::new("Alarms", vec![]).height, 2);
    }

    #[test]
    fn test_rendering_preference_deserializes() {
        let parsed: RenderingPreference = serde_json::from_str("\"STATIC_ONLY\"").unwrap();
        assert_eq!(parsed, RenderingPreference::StaticOnly);
    }
}
