use crate::cloudwatch::{MathExpression, Metric, Statistic};
use crate::resources::Canary;

pub const SYNTHETICS_NAMESPACE: &str = "CloudWatchSynthetics";

/// Metrics emitted by a Synthetics canary
pub struct SyntheticsCanaryMetricFactory {
    canary_name: String,
}

impl SyntheticsCanaryMetricFactory {
    pub fn new(canary: &Canary) -> Self {
        Self {
            canary_name: canary.canary_name().to_string(),
        }
    }

    fn metric(&self, metric_name: &str, statistic: Statistic, label: &str) -> Metric {
        Metric::new(SYNTHETICS_NAMESPACE, metric_name, statistic)
            .with_dimension("CanaryName", self.canary_name.as_str())
            .with_label(label)
    }

    /// Run duration in milliseconds
    pub fn metric_latency_average_in_millis(&self) -> Metric {
        self.metric("Duration", Statistic::Average, "Average")
    }

    pub fn metric_4xx_error_count(&self) -> Metric {
        self.metric("4xx", Statistic::Sum, "4xx")
    }

    pub fn metric_5xx_fault_count(&self) -> Metric {
        self.metric("5xx", Statistic::Sum, "5xx")
    }

    /// Percentage of runs that saw a 4xx response
    pub fn metric_4xx_error_rate(&self) -> MathExpression {
        MathExpression::new("100 * errors4xx")
            .using("errors4xx", self.metric("4xx", Statistic::Average, "4xx (avg)"))
            .with_label("4xx (%)")
    }

    /// Percentage of runs that saw a 5xx response
    pub fn metric_5xx_fault_rate(&self) -> MathExpression {
        MathExpression::new("100 * faults5xx")
            .using("faults5xx", self.metric("5xx", Statistic::Average, "5xx (avg)"))
            .with_label("5xx (%)")
    }
}
