//! HeadMouse Tracking Model
//!
//! Defines the data contracts shared by the pointer pipeline and its
//! collaborators:
//! - **Geometry:** 2D points, vectors, and rectangular output bounds
//! - **Frames:** Timestamped landmark frames and the JSONL frame stream format
//! - **Actions:** Serializable records of pointer dispatcher calls
//!
//! Landmark coordinates are in the space declared by the frame stream header
//! (pixels or normalized `[0.0, 1.0]`); output coordinates are in screen
//! pixels of the configured output bounds.

pub mod action;
pub mod frame;
pub mod geometry;

pub use action::*;
pub use frame::*;
pub use geometry::*;
