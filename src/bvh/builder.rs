use glam::Mat4;

use super::{bounds, Bvh, BvhNode};
use crate::{Axis, BoundingBox, Quad, Sphere};

const BINS: usize = 8;

/// Rebuilds the whole tree from scratch.
///
/// Special thanks to:
/// - https://jacco.ompf2.com/2022/04/13/how-to-build-a-bvh-part-1-basics/.
pub fn run(bvh: &mut Bvh, quads: &[Quad], spheres: &[Sphere], transforms: &[Mat4]) {
    bvh.total_elements = (quads.len() + spheres.len()) as u32;

    bvh.quad_ids.clear();
    bvh.quad_ids.extend(0..quads.len() as u32);
    bvh.sphere_ids.clear();
    bvh.sphere_ids.extend(0..spheres.len() as u32);

    bvh.nodes.clear();
    bvh.nodes
        .resize(2 * bvh.total_elements as usize + 2, BvhNode::default());

    // Node 0 is the root; index 1 stays reserved
    bvh.nodes_used = 2;

    if bvh.total_elements == 0 {
        return;
    }

    bvh.nodes[0] = BvhNode {
        bounds: BoundingBox::default(),
        left_child: 0,
        first_quad: 0,
        quad_count: quads.len() as u32,
        first_sphere: 0,
        sphere_count: spheres.len() as u32,
    };

    let root = bvh.nodes[0];

    bvh.nodes[0].bounds = bounds::node_bounds(bvh, &root, quads, spheres, transforms);

    subdivide(bvh, 0, quads, spheres, transforms);

    log::debug!(
        "bvh built: primitives={} ({} quads, {} spheres), nodes={}",
        bvh.total_elements,
        quads.len(),
        spheres.len(),
        bvh.nodes_used,
    );
}

#[derive(Clone, Copy, Debug)]
struct SplittingPlane {
    axis: Axis,
    pos: f32,
    cost: f32,
}

#[derive(Clone, Copy, Default)]
struct Bin {
    bounds: BoundingBox,
    quads: u32,
    spheres: u32,
}

impl Bin {
    fn count(&self) -> u32 {
        self.quads + self.spheres
    }
}

fn subdivide(
    bvh: &mut Bvh,
    node_id: u32,
    quads: &[Quad],
    spheres: &[Sphere],
    transforms: &[Mat4],
) {
    let node = bvh.nodes[node_id as usize];

    let Some(plane) = find_splitting_plane(bvh, &node, quads, spheres, transforms) else {
        return;
    };

    let parent_cost = (node.primitive_count() as f32) * node.bounds.area();

    if plane.cost >= parent_cost {
        return;
    }

    let SplittingPlane { axis, pos, .. } = plane;

    let quad_range = node.first_quad as usize..(node.first_quad + node.quad_count) as usize;
    let left_quads = partition(&mut bvh.quad_ids[quad_range], |id| {
        let quad = &quads[id as usize];

        bounds::quad_center(quad, &transforms[quad.transform_id as usize])[axis] < pos
    });

    let sphere_range =
        node.first_sphere as usize..(node.first_sphere + node.sphere_count) as usize;
    let left_spheres = partition(&mut bvh.sphere_ids[sphere_range], |id| {
        let sphere = &spheres[id as usize];

        bounds::sphere_center(sphere, &transforms[sphere.transform_id as usize])[axis] < pos
    });

    // Binning floors, the partition compares against the raw boundary, so
    // the two can disagree on stragglers; a child without primitives would
    // read as an internal node, so such a split must not happen.
    let left_count = left_quads + left_spheres;

    if left_count == 0 || left_count == node.primitive_count() as usize {
        return;
    }

    let left_id = bvh.nodes_used;
    let right_id = left_id + 1;

    bvh.nodes_used += 2;

    debug_assert!((right_id as usize) < bvh.nodes.len());

    bvh.nodes[left_id as usize] = BvhNode {
        bounds: BoundingBox::default(),
        left_child: 0,
        first_quad: node.first_quad,
        quad_count: left_quads as u32,
        first_sphere: node.first_sphere,
        sphere_count: left_spheres as u32,
    };

    bvh.nodes[right_id as usize] = BvhNode {
        bounds: BoundingBox::default(),
        left_child: 0,
        first_quad: node.first_quad + left_quads as u32,
        quad_count: node.quad_count - left_quads as u32,
        first_sphere: node.first_sphere + left_spheres as u32,
        sphere_count: node.sphere_count - left_spheres as u32,
    };

    {
        let parent = &mut bvh.nodes[node_id as usize];

        parent.left_child = left_id;
        parent.quad_count = 0;
        parent.sphere_count = 0;
    }

    for child_id in [left_id, right_id] {
        let child = bvh.nodes[child_id as usize];
        let child_bounds = bounds::node_bounds(bvh, &child, quads, spheres, transforms);

        bvh.nodes[child_id as usize].bounds = child_bounds;
    }

    subdivide(bvh, left_id, quads, spheres, transforms);
    subdivide(bvh, right_id, quads, spheres, transforms);
}

/// Scans 8 bins per axis for the cheapest split of the node's primitive
/// centers; `None` means the node cannot usefully be split.
fn find_splitting_plane(
    bvh: &Bvh,
    node: &BvhNode,
    quads: &[Quad],
    spheres: &[Sphere],
    transforms: &[Mat4],
) -> Option<SplittingPlane> {
    let mut best: Option<SplittingPlane> = None;

    for axis in Axis::all() {
        let mut center_min = f32::MAX;
        let mut center_max = f32::MIN;

        for_each_primitive(bvh, node, quads, spheres, transforms, |center, _| {
            center_min = center_min.min(center[axis]);
            center_max = center_max.max(center[axis]);
        });

        // Zero center spread; splitting along this axis cannot separate
        // anything and the bin scale would divide by zero
        if center_min == center_max {
            continue;
        }

        let mut bins = [Bin::default(); BINS];
        let scale = (BINS as f32) / (center_max - center_min);

        for_each_primitive(bvh, node, quads, spheres, transforms, |center, primitive| {
            let bin_id = ((center[axis] - center_min) * scale) as usize;
            let bin = &mut bins[bin_id.min(BINS - 1)];

            match primitive {
                PrimitiveRef::Quad(quad, xform) => {
                    bin.quads += 1;
                    bin.bounds += bounds::quad_bounds(quad, xform);
                }
                PrimitiveRef::Sphere(sphere, xform) => {
                    bin.spheres += 1;
                    bin.bounds += bounds::sphere_bounds(sphere, xform);
                }
            }
        });

        // ---

        let mut left_areas = [0.0; BINS - 1];
        let mut right_areas = [0.0; BINS - 1];
        let mut left_counts = [0; BINS - 1];
        let mut right_counts = [0; BINS - 1];
        let mut left_bb = BoundingBox::default();
        let mut right_bb = BoundingBox::default();
        let mut left_count = 0;
        let mut right_count = 0;

        for i in 0..(BINS - 1) {
            left_count += bins[i].count();
            left_counts[i] = left_count;

            left_bb += bins[i].bounds;
            left_areas[i] = left_bb.area();

            right_count += bins[BINS - 1 - i].count();
            right_counts[BINS - 2 - i] = right_count;

            right_bb += bins[BINS - 1 - i].bounds;
            right_areas[BINS - 2 - i] = right_bb.area();
        }

        // ---

        let scale = (center_max - center_min) / (BINS as f32);

        for i in 0..(BINS - 1) {
            let cost = (left_counts[i] as f32) * left_areas[i]
                + (right_counts[i] as f32) * right_areas[i];

            // A zero cost means every primitive collapsed onto the splitting
            // plane, not that the split is free
            if cost == 0.0 {
                continue;
            }

            let is_current_bin_better =
                best.map_or(true, |best| cost < best.cost);

            if is_current_bin_better {
                best = Some(SplittingPlane {
                    axis,
                    pos: center_min + scale * ((i + 1) as f32),
                    cost,
                });
            }
        }
    }

    best
}

enum PrimitiveRef<'a> {
    Quad(&'a Quad, &'a Mat4),
    Sphere(&'a Sphere, &'a Mat4),
}

fn for_each_primitive<'a>(
    bvh: &Bvh,
    node: &BvhNode,
    quads: &'a [Quad],
    spheres: &'a [Sphere],
    transforms: &'a [Mat4],
    mut f: impl FnMut(glam::Vec3, PrimitiveRef<'a>),
) {
    for i in 0..node.quad_count {
        let quad_id = bvh.quad_ids[(node.first_quad + i) as usize];
        let quad = &quads[quad_id as usize];
        let xform = &transforms[quad.transform_id as usize];

        f(bounds::quad_center(quad, xform), PrimitiveRef::Quad(quad, xform));
    }

    for i in 0..node.sphere_count {
        let sphere_id = bvh.sphere_ids[(node.first_sphere + i) as usize];
        let sphere = &spheres[sphere_id as usize];
        let xform = &transforms[sphere.transform_id as usize];

        f(
            bounds::sphere_center(sphere, xform),
            PrimitiveRef::Sphere(sphere, xform),
        );
    }
}

/// In-place two-pointer partition; returns how many ids ended up on the
/// left side.
fn partition(ids: &mut [u32], mut is_left: impl FnMut(u32) -> bool) -> usize {
    let mut i = 0;
    let mut j = ids.len();

    while i < j {
        if is_left(ids[i]) {
            i += 1;
        } else {
            j -= 1;
            ids.swap(i, j);
        }
    }

    i
}
