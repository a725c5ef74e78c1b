//! Per-vertex smear delta baking for animated meshes.
//!
//! Given fully sampled vertex positions (and, for skinned meshes, bone joint positions and skin
//! weights) over a contiguous frame range, this crate computes one signed scalar per vertex per
//! frame describing how far the vertex trails or leads its controlling rigid body across the
//! direction of motion. The resulting [`DeltaField`] drives smear effects elsewhere; this crate
//! does not store it on a mesh or render anything.

#![forbid(unsafe_code)]

mod camera;
mod delta;
mod error;
mod geometry;
mod model;
mod samples;

#[cfg(feature = "json")]
pub mod json;

pub use camera::*;
pub use delta::*;
pub use error::*;
pub use model::*;
pub use samples::*;




#[cfg(all(test, feature = "json"))]
mod json_tests;
