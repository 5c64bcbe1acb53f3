// Collectors module
//
// Leaf services that each wrap one external telemetry source and expose a
// pull or subscribe interface. Nothing here aggregates across collectors;
// that is the calculators' and the coordinator's job.

pub mod health;
pub mod navigation;
pub mod page_views;
pub mod resources;
pub mod session;
pub mod web_vitals;

pub use health::{HealthCheckReport, SystemHealthChecker};
pub use navigation::NavigationTimingTracker;
pub use page_views::{PageViewEntry, PageViewInput, PageViewTracker, PageViewType};
pub use resources::ResourceTimingTracker;
pub use session::SessionManager;
pub use web_vitals::{VitalSnapshot, WebVitalsTracker};
