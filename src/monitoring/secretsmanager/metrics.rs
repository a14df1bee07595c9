use crate::cloudwatch::{Metric, Statistic};
use crate::resources::Secret;
use serde_json::Value;

pub const SECRETS_MANAGER_NAMESPACE: &str = "SecretsManager";
pub const DAYS_SINCE_LAST_CHANGE: &str = "DaysSinceLastChange";
pub const DAYS_SINCE_LAST_ROTATION: &str = "DaysSinceLastRotation";

/// Metrics published for a secret by the stack's metrics publisher
pub struct SecretsManagerSecretMetricFactory {
    secret_name: Value,
}

impl SecretsManagerSecretMetricFactory {
    pub fn new(secret: &Secret) -> Self {
        Self {
            secret_name: secret.secret_name(),
        }
    }

    fn metric(&self, metric_name: &str, label: &str) -> Metric {
        Metric::new(SECRETS_MANAGER_NAMESPACE, metric_name, Statistic::Maximum)
            .with_dimension("SecretName", self.secret_name.clone())
            .with_label(label)
    }

    pub fn metric_days_since_last_change(&self) -> Metric {
        self.metric(DAYS_SINCE_LAST_CHANGE, "Days since last change")
    }

    pub fn metric_days_since_last_rotation(&self) -> Metric {
        self.metric(DAYS_SINCE_LAST_ROTATION, "Days since last rotation")
    }
}
