//! BVH acceleration core for a quad/sphere path tracer.
//!
//! Builds a binned-SAH bounding volume hierarchy over planar primitives
//! (quads, triangles, disks) and spheres, refits it cheaply for animated
//! scenes, serializes it into GPU-consumable buffers, and offers a CPU-side
//! nearest-hit traversal for verification and picking.

mod bvh;
pub mod gpu;
mod quad;
mod sphere;
mod utils;

pub use self::bvh::*;
pub use self::quad::*;
pub use self::sphere::*;
pub use self::utils::*;
