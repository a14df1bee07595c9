use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::time::Duration;

/// Period used when a metric does not specify one
pub const DEFAULT_METRIC_PERIOD: Duration = Duration::from_secs(300);

/// Aggregation applied to a metric over its period
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Statistic {
    Average,
    Sum,
    Minimum,
    Maximum,
    SampleCount,
}

impl Statistic {
    pub fn as_str(&self) -> &'static str {
        match self {
            Statistic::Average => "Average",
            Statistic::Sum => "Sum",
            Statistic::Minimum => "Minimum",
            Statistic::Maximum => "Maximum",
            Statistic::SampleCount => "SampleCount",
        }
    }
}

/// A single CloudWatch metric.
///
/// Dimension values are JSON so they can carry intrinsics such as a secret
/// name resolved from its ARN.
#[derive(Debug, Clone, PartialEq)]
pub struct Metric {
    pub namespace: String,
    pub metric_name: String,
    pub dimensions: BTreeMap<String, Value>,
    pub statistic: Statistic,
    pub period: Duration,
    pub label: Option<String>,
}

impl Metric {
    pub fn new(namespace: impl Into<String>, metric_name: impl Into<String>, statistic: Statistic) -> Self {
        Self {
            namespace: namespace.into(),
            metric_name: metric_name.into(),
            dimensions: BTreeMap::new(),
            statistic,
            period: DEFAULT_METRIC_PERIOD,
            label: None,
        }
    }

    pub fn with_dimension(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.dimensions.insert(name.into(), value.into());
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        self
    }

    fn dimensions_json(&self) -> Value {
        Value::Array(
            self.dimensions
                .iter()
                .map(|(name, value)| json!({ "Name": name, "Value": value }))
                .collect(),
        )
    }

    fn metric_stat(&self) -> Value {
        let mut metric = Map::new();
        if !self.dimensions.is_empty() {
            metric.insert("Dimensions".to_string(), self.dimensions_json());
        }
        metric.insert("MetricName".to_string(), json!(self.metric_name));
        metric.insert("Namespace".to_string(), json!(self.namespace));
        json!({
            "Metric": metric,
            "Period": self.period.as_secs(),
            "Stat": self.statistic.as_str(),
        })
    }

    /// Widget entry: `[namespace, name, dim, value, ..., {options}]`
    fn widget_entry(&self, mut options: Map<String, Value>) -> Value {
        let mut entry = vec![json!(self.namespace), json!(self.metric_name)];
        for (name, value) in &self.dimensions {
            entry.push(json!(name));
            entry.push(value.clone());
        }
        if let Some(label) = &self.label {
            options.insert("label".to_string(), json!(label));
        }
        options.insert("stat".to_string(), json!(self.statistic.as_str()));
        if self.period != DEFAULT_METRIC_PERIOD {
            options.insert("period".to_string(), json!(self.period.as_secs()));
        }
        entry.push(Value::Object(options));
        Value::Array(entry)
    }
}

/// A metric math expression over named metrics
#[derive(Debug, Clone, PartialEq)]
pub struct MathExpression {
    pub expression: String,
    pub using_metrics: BTreeMap<String, Metric>,
    pub label: Option<String>,
    pub period: Duration,
}

impl MathExpression {
    pub fn new(expression: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            using_metrics: BTreeMap::new(),
            label: None,
            period: DEFAULT_METRIC_PERIOD,
        }
    }

    pub fn using(mut self, id: impl Into<String>, metric: Metric) -> Self {
        self.using_metrics.insert(id.into(), metric);
        self
    }

    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    pub fn with_period(mut self, period: Duration) -> Self {
        self.period = period;
        for metric in self.using_metrics.values_mut() {
            metric.period = period;
        }
        self
    }
}

/// Anything that can be graphed or alarmed on
#[derive(Debug, Clone, PartialEq)]
pub enum MetricExpr {
    Metric(Metric),
    Math(MathExpression),
}

impl MetricExpr {
    pub fn label(&self) -> Option<&str> {
        match self {
            MetricExpr::Metric(m) => m.label.as_deref(),
            MetricExpr::Math(m) => m.label.as_deref(),
        }
    }

    pub fn period(&self) -> Duration {
        match self {
            MetricExpr::Metric(m) => m.period,
            MetricExpr::Math(m) => m.period,
        }
    }

    pub fn with_period(self, period: Duration) -> Self {
        match self {
            MetricExpr::Metric(m) => MetricExpr::Metric(m.with_period(period)),
            MetricExpr::Math(m) => MetricExpr::Math(m.with_period(period)),
        }
    }

    /// Alarm properties describing the metric side of an alarm
    pub(crate) fn alarm_properties(&self) -> Map<String, Value> {
        let mut props = Map::new();
        match self {
            MetricExpr::Metric(m) => {
                if !m.dimensions.is_empty() {
                    props.insert("Dimensions".to_string(), m.dimensions_json());
                }
                props.insert("MetricName".to_string(), json!(m.metric_name));
                props.insert("Namespace".to_string(), json!(m.namespace));
                props.insert("Period".to_string(), json!(m.period.as_secs()));
                props.insert("Statistic".to_string(), json!(m.statistic.as_str()));
            }
            MetricExpr::Math(math) => {
                let mut expression = Map::new();
                expression.insert("Expression".to_string(), json!(math.expression));
                expression.insert("Id".to_string(), json!("expr_1"));
                if let Some(label) = &math.label {
                    expression.insert("Label".to_string(), json!(label));
                }
                expression.insert("ReturnData".to_string(), json!(true));

                let mut metrics = vec![Value::Object(expression)];
                for (id, metric) in &math.using_metrics {
                    metrics.push(json!({
                        "Id": id,
                        "MetricStat": metric.metric_stat(),
                        "ReturnData": false,
                    }));
                }
                props.insert("Metrics".to_string(), Value::Array(metrics));
            }
        }
        props
    }

    /// Widget `metrics` entries; math expressions get ids `e1`, `e2`, ...
    pub(crate) fn widget_entries(&self, expression_counter: &mut usize) -> Vec<Value> {
        match self {
            MetricExpr::Metric(m) => vec![m.widget_entry(Map::new())],
            MetricExpr::Math(math) => {
                *expression_counter += 1;
                let mut options = Map::new();
                options.insert("expression".to_string(), json!(math.expression));
                if let Some(label) = &math.label {
                    options.insert("label".to_string(), json!(label));
                }
                options.insert("id".to_string(), json!(format!("e{}", expression_counter)));
                if math.period != DEFAULT_METRIC_PERIOD {
                    options.insert("period".to_string(), json!(math.period.as_secs()));
                }

                let mut entries = vec![json!([Value::Object(options)])];
                for (id, metric) in &math.using_metrics {
                    let mut hidden = Map::new();
                    hidden.insert("id".to_string(), json!(id));
                    hidden.insert("visible".to_string(), json!(false));
                    entries.push(metric.widget_entry(hidden));
                }
                entries
            }
        }
    }
}

impl From<Metric> for MetricExpr {
    fn from(metric: Metric) -> Self {
        MetricExpr::Metric(metric)
    }
}

impl From<MathExpression> for MetricExpr {
    fn from(math: MathExpression) -> Self {
        MetricExpr::Math(math)
    }
}
