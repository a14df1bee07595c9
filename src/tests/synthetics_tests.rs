#[cfg(test)]
mod tests {
    use crate::dashboard::DashboardSegment;
    use crate::monitoring::{
        ErrorCountThreshold, ErrorRateThreshold, LatencyThreshold, Severity,
        SyntheticsCanaryMonitoring, SyntheticsCanaryMonitoringOptions,
        SyntheticsCanaryMonitoringProps,
    };
    use crate::resources::{Canary, CanaryProps};
    use crate::stack::Stack;
    use crate::test::{init_logging, TestMonitoringScope};
    use crate::tests::common::{alarm_by_name, thresholds, AlarmRecorder};
    use anyhow::Result;
    use serde_json::{json, Value};
    use std::time::Duration;

    fn canary(stack: &Stack) -> Result<Canary> {
        Ok(Canary::new(
            &stack.root(),
            "Canary",
            CanaryProps {
                canary_name: Some("checkout-canary".to_string()),
                ..Default::default()
            },
        )?)
    }

    fn all_alarms() -> SyntheticsCanaryMonitoringOptions {
        SyntheticsCanaryMonitoringOptions {
            add_average_latency_alarm: Some(thresholds(vec![(
                Severity::Warning,
                LatencyThreshold::new(Duration::from_millis(500)),
            )])),
            add_4xx_error_count_alarm: Some(thresholds(vec![(
                Severity::Warning,
                ErrorCountThreshold::new(10.0),
            )])),
            add_5xx_fault_count_alarm: Some(thresholds(vec![(
                Severity::Warning,
                ErrorCountThreshold::new(5.0),
            )])),
            add_4xx_error_rate_alarm: Some(thresholds(vec![(
                Severity::Warning,
                ErrorRateThreshold::new(2.5),
            )])),
            add_5xx_fault_rate_alarm: Some(thresholds(vec![(
                Severity::Warning,
                ErrorRateThreshold::new(1.0),
            )])),
            ..Default::default()
        }
    }

    #[test]
    fn test_no_alarms() -> Result<()> {
        init_logging();
        let stack = Stack::new();
        let scope = TestMonitoringScope::new(&stack.root(), "Scope")?;
        let recorder = AlarmRecorder::default();

        let monitoring = SyntheticsCanaryMonitoring::new(
            &scope,
            SyntheticsCanaryMonitoringProps::new(canary(&stack)?)
                .use_created_alarms(recorder.consumer()),
        )?;

        assert!(monitoring.created_alarms().is_empty());
        assert_eq!(recorder.calls(), vec![Vec::<String>::new()]);
        assert_eq!(stack.synthesize()?.resource_count_is("AWS::CloudWatch::Alarm"), 0);
        assert!(monitoring.alarm_widgets().is_empty());
        assert_eq!(monitoring.widgets().len(), 4);
        Ok(())
    }

    #[test]
    fn test_all_alarms() -> Result<()> {
        init_logging();
        let stack = Stack::new();
        let scope = TestMonitoringScope::new(&stack.root(), "Scope")?;
        let recorder = AlarmRecorder::default();

        let monitoring = SyntheticsCanaryMonitoring::new(
            &scope,
            SyntheticsCanaryMonitoringProps::new(canary(&stack)?)
                .with_options(all_alarms())
                .use_created_alarms(recorder.consumer()),
        )?;

        assert_eq!(recorder.calls().len(), 1);
        assert_eq!(recorder.total(), 5);
        assert_eq!(
            recorder.calls()[0],
            vec![
                "Test-checkout-canary-LatencyAverage-Warning",
                "Test-checkout-canary-4xxErrorCount-Warning",
                "Test-checkout-canary-5xxFaultCount-Warning",
                "Test-checkout-canary-4xxErrorRate-Warning",
                "Test-checkout-canary-5xxFaultRate-Warning",
            ]
        );
        assert_eq!(monitoring.alarm_widgets().len(), 2);

        let template = stack.synthesize()?;
        assert_eq!(template.resource_count_is("AWS::CloudWatch::Alarm"), 5);

        let latency = alarm_by_name(&template, "Test-checkout-canary-LatencyAverage-Warning")
            .expect("latency alarm");
        assert_eq!(latency["Namespace"], json!("CloudWatchSynthetics"));
        assert_eq!(latency["MetricName"], json!("Duration"));
        assert_eq!(latency["Statistic"], json!("Average"));
        assert_eq!(latency["Threshold"], json!(500));
        assert_eq!(latency["TreatMissingData"], json!("missing"));
        assert_eq!(latency["Dimensions"][0]["Value"], json!("checkout-canary"));

        let rate = alarm_by_name(&template, "Test-checkout-canary-4xxErrorRate-Warning")
            .expect("rate alarm");
        assert_eq!(rate["Threshold"], json!(2.5));
        assert!(rate.get("MetricName").is_none());
        assert_eq!(rate["Metrics"][0]["Expression"], json!("100 * errors4xx"));
        Ok(())
    }

    fn generated_name_canary(stack: &Stack) -> Result<Canary> {
        Ok(Canary::new(&stack.root(), "Canary", CanaryProps::default())?)
    }

    #[test]
    fn test_no_alarms_template_snapshot() -> Result<()> {
        init_logging();
        let stack = Stack::new();
        let scope = TestMonitoringScope::new(&stack.root(), "Scope")?;
        SyntheticsCanaryMonitoring::new(
            &scope,
            SyntheticsCanaryMonitoringProps::new(generated_name_canary(&stack)?),
        )?;

        let expected: Value = serde_json::from_str(include_str!("snapshots/synthetics_no_alarms.json"))?;
        pretty_assertions::assert_eq!(stack.synthesize()?.to_json(), expected);
        Ok(())
    }

    #[test]
    fn test_all_alarms_template_snapshot() -> Result<()> {
        init_logging();
        let stack = Stack::new();
        let scope = TestMonitoringScope::new(&stack.root(), "Scope")?;
        let options = SyntheticsCanaryMonitoringOptions {
            add_average_latency_alarm: Some(thresholds(vec![(
                Severity::Warning,
                LatencyThreshold::new(Duration::from_secs(10)),
            )])),
            add_4xx_error_count_alarm: Some(thresholds(vec![(
                Severity::Warning,
                ErrorCountThreshold::new(1.0),
            )])),
            add_5xx_fault_count_alarm: Some(thresholds(vec![(
                Severity::Warning,
                ErrorCountThreshold::new(2.0),
            )])),
            add_4xx_error_rate_alarm: Some(thresholds(vec![(
                Severity::Warning,
                ErrorRateThreshold::new(0.5),
            )])),
            add_5xx_fault_rate_alarm: Some(thresholds(vec![(
                Severity::Warning,
                ErrorRateThreshold::new(0.8),
            )])),
            ..Default::default()
        };
        SyntheticsCanaryMonitoring::new(
            &scope,
            SyntheticsCanaryMonitoringProps::new(generated_name_canary(&stack)?).with_options(options),
        )?;

        let expected: Value = serde_json::from_str(include_str!("snapshots/synthetics_all_alarms.json"))?;
        pretty_assertions::assert_eq!(stack.synthesize()?.to_json(), expected);
        Ok(())
    }

    #[test]
    fn test_alarm_defaults_come_from_scope() -> Result<()> {
        let stack = Stack::new();
        let scope = TestMonitoringScope::new(&stack.root(), "Scope")?;
        let monitoring = SyntheticsCanaryMonitoring::new(
            &scope,
            SyntheticsCanaryMonitoringProps::new(canary(&stack)?).with_options(
                SyntheticsCanaryMonitoringOptions {
                    add_5xx_fault_count_alarm: Some(thresholds(vec![(
                        Severity::Critical,
                        ErrorCountThreshold::new(1.0),
                    )])),
                    ..Default::default()
                },
            ),
        )?;

        let alarm = monitoring.created_alarms()[0].alarm.props();
        assert_eq!(alarm.datapoints_to_alarm, 3);
        assert_eq!(alarm.evaluation_periods, 3);
        assert!(alarm.actions_enabled);
        assert_eq!(
            monitoring.created_alarms()[0].annotation.label,
            "> 1 for 3 datapoints within 15 minutes"
        );
        Ok(())
    }

    #[test]
    fn test_options_from_json() -> Result<()> {
        let options: SyntheticsCanaryMonitoringOptions = serde_json::from_value(json!({
            "humanReadableName": "Checkout",
            "addAverageLatencyAlarm": { "Critical": { "maxLatencyMillis": 2000 } },
            "add5xxFaultRateAlarm": { "Warning": { "maxErrorRate": 5.0, "evaluationPeriods": 6 } }
        }))?;
        let latency = options.add_average_latency_alarm.as_ref().expect("latency");
        assert_eq!(latency[&Severity::Critical].max_latency, Duration::from_secs(2));
        let rate = options.add_5xx_fault_rate_alarm.as_ref().expect("rate");
        assert_eq!(rate[&Severity::Warning].custom.evaluation_periods, Some(6));
        assert!(options.add_4xx_error_count_alarm.is_none());
        assert_eq!(options.human_readable_name.as_deref(), Some("Checkout"));
        Ok(())
    }
}
