mod bake;
mod prune;
mod ribbon;
mod rigid;
mod smooth;
mod warp;

pub use bake::*;
pub use prune::*;
pub use ribbon::*;
pub use rigid::*;
pub use smooth::*;
pub use warp::*;
