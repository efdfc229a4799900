mod bounds;
mod builder;
mod node;
mod refit;
mod serializer;
#[cfg(test)]
mod testing;
mod traversal;

use glam::Mat4;

pub use self::node::*;
pub use self::serializer::*;
pub use self::traversal::*;
use crate::{utils, Quad, Sphere};

/// Bounding volume hierarchy over a scene's quads and spheres.
///
/// The tree lives in a flat arena with implicit sibling indices; leaves own
/// contiguous slices of the two id permutations. One instance belongs to
/// one scene, and all operations run synchronously on the calling thread -
/// the caller must finish a build or refit before traversing or
/// serializing.
#[derive(Clone, Debug, Default)]
pub struct Bvh {
    nodes: Vec<BvhNode>,
    quad_ids: Vec<u32>,
    sphere_ids: Vec<u32>,
    nodes_used: u32,
    total_elements: u32,
}

impl Bvh {
    /// Rebuilds the tree from scratch; call once per scene load, or after
    /// primitives were added or removed.
    pub fn build(&mut self, quads: &[Quad], spheres: &[Sphere], transforms: &[Mat4]) {
        utils::measure("bvh.build", || {
            builder::run(self, quads, spheres, transforms);
        });
    }

    /// Recomputes bounds over the existing topology; the cheap per-frame
    /// alternative to [`Self::build`] when only transforms changed.
    pub fn refit(&mut self, quads: &[Quad], spheres: &[Sphere], transforms: &[Mat4]) {
        refit::run(self, quads, spheres, transforms);
    }

    pub fn serialize(&self) -> BvhBuffers {
        BvhSerializer::serialize(self)
    }

    pub fn nodes(&self) -> &[BvhNode] {
        &self.nodes
    }

    pub fn quad_ids(&self) -> &[u32] {
        &self.quad_ids
    }

    pub fn sphere_ids(&self) -> &[u32] {
        &self.sphere_ids
    }

    pub fn nodes_used(&self) -> u32 {
        self.nodes_used
    }

    pub fn total_elements(&self) -> u32 {
        self.total_elements
    }
}
