//! Walkable path network of a venue

pub mod components;
pub mod network;

pub use components::{Edge, Node, NodeId, SurfaceType};
pub use network::{IndexedPoint, WalkGraph};
