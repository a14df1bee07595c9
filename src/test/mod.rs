//! Test utilities shared by the in-crate suites and downstream tests

use crate::error::Result;
use crate::monitoring::{MonitoringScope, MonitoringScopeConfig};
use crate::stack::{Construct, Stack, SECRETS_MANAGER_PARSE_OWNED_SECRET_NAME};
use serde_json::json;

#[cfg(test)]
static INIT: std::sync::Once = std::sync::Once::new();

/// Installs a test-writer subscriber once per process. `RUST_LOG` still applies.
#[cfg(test)]
pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("cloudwatch_monitoring_constructs=debug".parse().unwrap()),
            )
            .with_test_writer()
            .with_thread_ids(true)
            .with_file(true)
            .with_line_number(true)
            .try_init();
    });
}

/// Standalone stack with the secret-name feature flag enabled
pub fn flagged_stack() -> Stack {
    let stack = Stack::new();
    stack.set_context(SECRETS_MANAGER_PARSE_OWNED_SECRET_NAME, json!(true));
    stack
}

/// Monitoring scope without dashboards, for exercising builders directly
pub struct TestMonitoringScope {
    node: Construct,
    config: MonitoringScopeConfig,
}

impl TestMonitoringScope {
    pub fn new(scope: &Construct, id: &str) -> Result<Self> {
        Self::with_config(
            scope,
            id,
            MonitoringScopeConfig {
                alarm_name_prefix: "Test".to_string(),
                ..Default::default()
            },
        )
    }

    pub fn with_config(scope: &Construct, id: &str, config: MonitoringScopeConfig) -> Result<Self> {
        Ok(Self {
            node: scope.add_child(id)?,
            config,
        })
    }
}

impl MonitoringScope for TestMonitoringScope {
    fn node(&self) -> &Construct {
        &self.node
    }

    fn config(&self) -> &MonitoringScopeConfig {
        &self.config
    }
}
