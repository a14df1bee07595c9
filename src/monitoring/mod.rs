//! Monitoring builders that turn threshold configuration into alarms and widgets
//!
//! Each builder checks its preconditions, builds and validates every configured
//! alarm, commits them to the stack in one batch and only then hands the list
//! to the caller's [`AlarmConsumer`].

mod alarm_factory;
mod facade;
mod scope;
pub mod secretsmanager;
pub mod synthetics;
mod types;

pub use alarm_factory::{AddAlarmProps, AlarmFactory};
pub use facade::{MonitoringFacade, MonitoringFacadeProps};
pub use scope::{MonitoringScope, MonitoringScopeConfig};
pub use types::{AlarmConsumer, AlarmThresholds, AlarmWithAnnotation, CustomAlarmThreshold, Severity};

pub use secretsmanager::{
    DaysSinceUpdateThreshold, SecretsManagerMetricsPublisher, SecretsManagerSecretMonitoring,
    SecretsManagerSecretMonitoringOptions, SecretsManagerSecretMonitoringProps,
};
pub use synthetics::{
    ErrorCountThreshold, ErrorRateThreshold, LatencyThreshold, SyntheticsCanaryMonitoring,
    SyntheticsCanaryMonitoringOptions, SyntheticsCanaryMonitoringProps,
};
