//! CloudWatch monitoring constructs
//!
//! This crate builds CloudWatch alarms and dashboards for Secrets Manager
//! secrets and Synthetics canaries into a deterministic, CloudFormation-shaped
//! template.

pub mod cloudwatch;
pub mod dashboard;
pub mod error;
pub mod monitoring;
pub mod resources;
pub mod stack;

// Make test utilities available for integration tests
#[cfg(any(test, feature = "test-utils"))]
pub mod test;
#[cfg(test)]
mod tests;

pub use error::{MonitoringError, Result};
pub use stack::{App, Construct, Stack, Template, SECRETS_MANAGER_PARSE_OWNED_SECRET_NAME};

// Re-export the main entry points
pub use crate::dashboard::{DashboardFactoryProps, DashboardSegment, DefaultDashboardFactory};
pub use crate::monitoring::{
    AlarmConsumer, AlarmWithAnnotation, MonitoringFacade, MonitoringFacadeProps, MonitoringScope,
    Severity,
};
