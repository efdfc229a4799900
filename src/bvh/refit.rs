use glam::Mat4;

use super::{bounds, Bvh};
use crate::{Quad, Sphere};

/// Refreshes node bounds bottom-up without touching the topology.
///
/// Children always sit at higher indices than their parent, so a single
/// reverse sweep sees both child bounds before the parent needs them. Only
/// valid while the primitive sets and the per-node partitioning from the
/// last build still stand.
pub fn run(bvh: &mut Bvh, quads: &[Quad], spheres: &[Sphere], transforms: &[Mat4]) {
    if bvh.total_elements == 0 {
        return;
    }

    for node_id in (0..bvh.nodes_used).rev() {
        // Reserved slot
        if node_id == 1 {
            continue;
        }

        let node = bvh.nodes[node_id as usize];

        let bounds = if node.is_leaf() {
            bounds::node_bounds(bvh, &node, quads, spheres, transforms)
        } else {
            let left = bvh.nodes[node.left_child as usize].bounds;
            let right = bvh.nodes[(node.left_child + 1) as usize].bounds;

            left + right
        };

        bvh.nodes[node_id as usize].bounds = bounds;
    }

    log::trace!("bvh refit: nodes={}", bvh.nodes_used);
}
