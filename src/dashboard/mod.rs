//! Dashboard segments and the factory that arranges them into dashboards

mod factory;
mod segment;

pub use crate::cloudwatch::RenderingPreference;
pub use factory::{DashboardFactoryProps, DefaultDashboardFactory};
pub use segment::{
    AddSegmentProps, DashboardSegment, MonitoringDashboardsOverrideProps,
    SingleWidgetDashboardSegment,
};
