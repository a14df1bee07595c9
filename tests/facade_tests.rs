mod common;

use anyhow::Result;
use cloudwatch_monitoring_constructs::cloudwatch::TextWidget;
use cloudwatch_monitoring_constructs::dashboard::{AddSegmentProps, SingleWidgetDashboardSegment};
use cloudwatch_monitoring_constructs::monitoring::{
    DaysSinceUpdateThreshold, ErrorRateThreshold, SecretsManagerSecretMonitoringOptions,
    SecretsManagerSecretMonitoringProps, SyntheticsCanaryMonitoringOptions,
    SyntheticsCanaryMonitoringProps,
};
use cloudwatch_monitoring_constructs::resources::{Canary, CanaryProps, Secret};
use cloudwatch_monitoring_constructs::{MonitoringError, MonitoringFacadeProps, Severity, Stack};
use common::{facade, flagged_stack, init_logging};
use pretty_assertions::assert_eq;
use serde_json::json;
use std::collections::BTreeMap;
use std::time::Duration;

fn change_alarm(days: u32) -> SecretsManagerSecretMonitoringOptions {
    SecretsManagerSecretMonitoringOptions {
        add_days_since_last_change_alarm: Some(BTreeMap::from([(
            Severity::Warning,
            DaysSinceUpdateThreshold::new(days, Duration::from_secs(86_400)),
        )])),
        ..Default::default()
    }
}

#[test]
fn test_facade_collects_alarms_across_resources() -> Result<()> {
    init_logging();
    let stack = flagged_stack();
    let mut monitoring = facade(&stack, true)?;

    let secret = Secret::new(&stack.root(), "Secret1")?;
    let canary = Canary::new(&stack.root(), "Canary", CanaryProps::default())?;

    monitoring
        .monitor_secrets_manager_secret(
            SecretsManagerSecretMonitoringProps::new(secret).with_options(change_alarm(30)),
        )?
        .monitor_synthetics_canary(
            SyntheticsCanaryMonitoringProps::new(canary).with_options(
                SyntheticsCanaryMonitoringOptions {
                    add_5xx_fault_rate_alarm: Some(BTreeMap::from([(
                        Severity::Critical,
                        ErrorRateThreshold::new(1.0),
                    )])),
                    ..Default::default()
                },
            ),
        )?;

    assert_eq!(monitoring.created_alarms().len(), 2);
    let summary = monitoring.create_alarm_summary_segment("All alarms");
    monitoring.add_segment(AddSegmentProps::new(summary))?;

    let template = stack.synthesize()?;
    assert_eq!(template.resource_count_is("AWS::CloudWatch::Alarm"), 2);
    assert_eq!(template.resource_count_is("AWS::CloudWatch::Dashboard"), 3);

    let alarm_dashboard = monitoring.dashboards().alarm_dashboard().expect("alarm dashboard");
    // secret header + status, canary header + status, summary status
    assert_eq!(alarm_dashboard.widget_count(), 5);
    Ok(())
}

#[test]
fn test_facade_alarm_names_use_configured_prefix() -> Result<()> {
    init_logging();
    let stack = flagged_stack();
    let props: MonitoringFacadeProps = serde_json::from_value(json!({
        "alarmNamePrefix": "Payments",
        "datapointsToAlarm": 2,
        "dashboards": { "dashboardNamePrefix": "Payments" }
    }))?;
    let mut monitoring =
        cloudwatch_monitoring_constructs::MonitoringFacade::new(&stack.root(), "Monitoring", props)?;

    monitoring.monitor_secrets_manager_secret(
        SecretsManagerSecretMonitoringProps::new(Secret::new(&stack.root(), "Db")?)
            .with_options(change_alarm(7)),
    )?;
    let names: Vec<&str> = monitoring.created_alarms().iter().map(|a| a.alarm_name()).collect();
    assert_eq!(names, vec!["Payments-Db-DaysSinceLastChange-Warning"]);
    Ok(())
}

#[test]
fn test_facade_surfaces_missing_feature_flag() -> Result<()> {
    init_logging();
    let stack = Stack::new();
    let mut monitoring = facade(&stack, false)?;
    let secret = Secret::new(&stack.root(), "Secret1")?;

    let err = monitoring
        .monitor_secrets_manager_secret(SecretsManagerSecretMonitoringProps::new(secret))
        .err()
        .expect("flag is required");
    assert!(matches!(err, MonitoringError::MissingFeatureFlag { .. }));
    assert!(monitoring.created_alarms().is_empty());
    assert_eq!(stack.synthesize()?.resource_count_is("AWS::Lambda::Function"), 0);
    Ok(())
}

#[test]
fn test_custom_segment_rendered() -> Result<()> {
    init_logging();
    let stack = flagged_stack();
    let mut monitoring = facade(&stack, false)?;
    monitoring.add_segment(AddSegmentProps::new(SingleWidgetDashboardSegment::new(
        TextWidget::new("Hello world!"),
    )))?;

    let template = stack.synthesize()?;
    let dashboards = template.find_resources("AWS::CloudWatch::Dashboard");
    assert_eq!(dashboards.len(), 1);
    let dashboard = dashboards.values().next().expect("one dashboard");
    assert_eq!(dashboard["Properties"]["DashboardName"], json!("Service"));
    assert!(dashboard["Properties"]["DashboardBody"]
        .as_str()
        .expect("body without tokens is a plain string")
        .contains("Hello world!"));
    Ok(())
}

#[test]
fn test_synthesis_is_deterministic() -> Result<()> {
    let build = || -> Result<serde_json::Value> {
        let stack = flagged_stack();
        let mut monitoring = facade(&stack, true)?;
        monitoring.monitor_secrets_manager_secret(
            SecretsManagerSecretMonitoringProps::new(Secret::new(&stack.root(), "Secret1")?)
                .with_options(change_alarm(30)),
        )?;
        Ok(stack.synthesize()?.to_json())
    };
    // separate stacks with equal names synthesize to the same template
    assert_eq!(build()?, build()?);
    Ok(())
}

#[test]
fn test_facade_honors_disabled_detail_dashboard() -> Result<()> {
    init_logging();
    let stack = flagged_stack();
    let props: MonitoringFacadeProps = serde_json::from_value(json!({
        "dashboards": {
            "dashboardNamePrefix": "Service",
            "createDashboard": false,
            "createSummaryDashboard": true
        }
    }))?;
    let mut monitoring =
        cloudwatch_monitoring_constructs::MonitoringFacade::new(&stack.root(), "Monitoring", props)?;
    let canary = Canary::new(&stack.root(), "Canary", CanaryProps::default())?;
    monitoring.monitor_synthetics_canary(SyntheticsCanaryMonitoringProps::new(canary))?;

    assert!(monitoring.dashboards().dashboard().is_none());
    let names: Vec<serde_json::Value> = stack
        .synthesize()?
        .find_resources("AWS::CloudWatch::Dashboard")
        .values()
        .map(|d| d["Properties"]["DashboardName"].clone())
        .collect();
    assert_eq!(names, vec![json!("Service-Summary")]);
    Ok(())
}
