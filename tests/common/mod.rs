// tests/common/mod.rs
use cloudwatch_monitoring_constructs::dashboard::DashboardFactoryProps;
use cloudwatch_monitoring_constructs::{
    MonitoringFacade, MonitoringFacadeProps, Result, Stack, SECRETS_MANAGER_PARSE_OWNED_SECRET_NAME,
};
use serde_json::json;
use std::sync::Once;

static INIT: Once = Once::new();

pub fn init_logging() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(
                tracing_subscriber::EnvFilter::from_default_env()
                    .add_directive("cloudwatch_monitoring_constructs=debug".parse().unwrap()),
            )
            .with_test_writer()
            .try_init();
    });
}

pub fn flagged_stack() -> Stack {
    let stack = Stack::new();
    stack.set_context(SECRETS_MANAGER_PARSE_OWNED_SECRET_NAME, json!(true));
    stack
}

#[allow(dead_code)]
pub fn facade(stack: &Stack, all_dashboards: bool) -> Result<MonitoringFacade> {
    MonitoringFacade::new(
        &stack.root(),
        "Monitoring",
        MonitoringFacadeProps {
            dashboards: DashboardFactoryProps {
                dashboard_name_prefix: "Service".to_string(),
                create_summary_dashboard: all_dashboards,
                create_alarm_dashboard: all_dashboards,
                ..Default::default()
            },
            ..Default::default()
        },
    )
}
