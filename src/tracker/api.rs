//! Public API for service tracking

pub use crate::tracker::customizer::ServiceTrackerCustomizer;
pub use crate::tracker::service_tracker::ServiceTracker;
