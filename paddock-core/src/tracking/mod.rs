//! Per-fix tracking collaborators of the navigation session.
//!
//! Each concern sits behind a trait so an application can swap in its own
//! snapping or step logic; the default implementations here are tuned for
//! walking speeds on venue-sized routes.

pub mod off_route;
pub mod progress;
pub mod snap;
pub mod steps;

pub use off_route::{HysteresisDetector, OffRouteDetector};
pub use progress::{remaining_distance, remaining_time};
pub use snap::{SnapResult, Snapper, WindowedSnapper};
pub use steps::{SequentialStepDetector, StepDetector, StepProgress};
