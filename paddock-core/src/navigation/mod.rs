//! Turn-by-turn walking guidance.
//!
//! A [`NavigationSession`] owns one walk: it asks a [`RouteProvider`] for a
//! route, follows location fixes along it, reroutes when the walker strays
//! and publishes every change as a [`NavigationState`] snapshot.

mod provider;
mod session;
mod state;

pub use crate::model::LocationFix;
pub use provider::{GraphRouteProvider, RouteProvider};
pub use session::NavigationSession;
pub use state::{ActiveNavigation, NavigationState};
