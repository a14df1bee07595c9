//! Resources that can be monitored
//!
//! These are the smallest definitions needed to put a monitored resource into a
//! stack and to expose the identifiers its metrics are keyed by.

mod canary;
mod secret;

pub use canary::{Canary, CanaryProps};
pub use secret::{Secret, SecretProps};

use crate::error::{MonitoringError, Result};
use std::time::Duration;

/// Schedule expression for a fixed rate, e.g. `rate(5 minutes)`
pub(crate) fn rate_expression(interval: Duration) -> Result<String> {
    let secs = interval.as_secs();
    if secs == 0 || secs % 60 != 0 || interval.subsec_nanos() != 0 {
        return Err(MonitoringError::ConfigError(format!(
            "schedule rate must be a whole number of minutes, got {:?}",
            interval
        )));
    }

    let minutes = secs / 60;
    let expression = if minutes % 1440 == 0 {
        plural(minutes / 1440, "day")
    } else if minutes % 60 == 0 {
        plural(minutes / 60, "hour")
    } else {
        plural(minutes, "minute")
    };
    Ok(format!("rate({})", expression))
}

fn plural(amount: u64, unit: &str) -> String {
    if amount == 1 {
        format!("1 {}", unit)
    } else {
        format!("{} {}s", amount, unit)
    }
}
