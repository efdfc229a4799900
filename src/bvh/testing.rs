//! Helpers shared by the builder, refit and traversal tests.

use glam::{vec3, Mat4, Vec3};
use rand::prelude::*;

use super::{bounds, traversal, Bvh};
use crate::{Hit, Interval, Quad, Ray, Shape, Sphere};

pub fn rand_vec3(rng: &mut StdRng, lo: f32, hi: f32) -> Vec3 {
    vec3(
        rng.gen_range(lo..hi),
        rng.gen_range(lo..hi),
        rng.gen_range(lo..hi),
    )
}

/// Deterministic scene mixing all three planar shapes with spheres.
pub fn random_scene(seed: u64, quads: usize, spheres: usize) -> (Vec<Quad>, Vec<Sphere>) {
    let mut rng = StdRng::seed_from_u64(seed);

    let quads = (0..quads)
        .map(|i| {
            let shape = match i % 3 {
                0 => Shape::Quad,
                1 => Shape::Triangle,
                _ => Shape::Disk,
            };

            Quad::new(
                shape,
                rand_vec3(&mut rng, -5.0, 5.0),
                rand_vec3(&mut rng, -1.0, 1.0),
                rand_vec3(&mut rng, -1.0, 1.0),
                i as u32,
                0,
            )
        })
        .collect();

    let spheres = (0..spheres)
        .map(|i| {
            let center = rand_vec3(&mut rng, -5.0, 5.0);

            Sphere::new(center, rng.gen_range(0.1..1.0), i as u32, 0)
        })
        .collect();

    (quads, spheres)
}

pub fn random_rays(seed: u64, count: usize) -> Vec<Ray> {
    let mut rng = StdRng::seed_from_u64(seed);

    (0..count)
        .map(|_| {
            let origin = rand_vec3(&mut rng, -8.0, 8.0);

            let direction = loop {
                let candidate = rand_vec3(&mut rng, -1.0, 1.0);

                if candidate.length_squared() > 1e-4 {
                    break candidate.normalize();
                }
            };

            Ray::new(origin, direction)
        })
        .collect()
}

/// Two unit quads forming an L plus a unit sphere at the origin.
pub fn l_scene() -> (Vec<Quad>, Vec<Sphere>, Vec<Mat4>) {
    let quads = vec![
        Quad::new(
            Shape::Quad,
            vec3(2.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 1.0, 0.0),
            0,
            0,
        ),
        Quad::new(
            Shape::Quad,
            vec3(3.0, 0.0, 0.0),
            vec3(1.0, 0.0, 0.0),
            vec3(0.0, 0.0, 1.0),
            1,
            0,
        ),
    ];

    let spheres = vec![Sphere::new(vec3(0.0, 0.0, 0.0), 1.0, 2, 0)];

    (quads, spheres, vec![Mat4::IDENTITY])
}

/// Linear scan over every primitive; the reference the traversal must match.
pub fn brute_force(
    ray: &Ray,
    interval: Interval,
    quads: &[Quad],
    spheres: &[Sphere],
    transforms: &[Mat4],
) -> Option<Hit> {
    let mut hit = None;
    let mut closest_so_far = interval.max;

    for sphere in spheres {
        let xform = &transforms[sphere.transform_id as usize];

        if let Some(rec) = traversal::hit_sphere(
            sphere,
            xform,
            ray,
            Interval::new(interval.min, closest_so_far),
        ) {
            closest_so_far = rec.t;
            hit = Some(rec);
        }
    }

    for quad in quads {
        let xform = &transforms[quad.transform_id as usize];

        if let Some(rec) = traversal::hit_quad(
            quad,
            xform,
            ray,
            Interval::new(interval.min, closest_so_far),
        ) {
            closest_so_far = rec.t;
            hit = Some(rec);
        }
    }

    hit
}

/// Checks the structural invariants of a built (or refit) tree: leaf ranges
/// partition both id arrays exactly, and every node bounds its contents.
pub fn assert_invariants(bvh: &Bvh, quads: &[Quad], spheres: &[Sphere], transforms: &[Mat4]) {
    let mut seen_quads = vec![0u32; quads.len()];
    let mut seen_spheres = vec![0u32; spheres.len()];
    let mut stack = vec![0u32];

    while let Some(node_id) = stack.pop() {
        let node = &bvh.nodes()[node_id as usize];

        if node.is_leaf() {
            for i in 0..node.quad_count {
                let quad_id = bvh.quad_ids()[(node.first_quad + i) as usize];
                let quad = &quads[quad_id as usize];

                seen_quads[quad_id as usize] += 1;

                let bb = bounds::quad_bounds(quad, &transforms[quad.transform_id as usize]);

                assert!(node.bounds.contains(&bb), "leaf must bound its quads");
            }

            for i in 0..node.sphere_count {
                let sphere_id = bvh.sphere_ids()[(node.first_sphere + i) as usize];
                let sphere = &spheres[sphere_id as usize];

                seen_spheres[sphere_id as usize] += 1;

                let bb =
                    bounds::sphere_bounds(sphere, &transforms[sphere.transform_id as usize]);

                assert!(node.bounds.contains(&bb), "leaf must bound its spheres");
            }
        } else {
            assert!(node.left_child >= 2, "children start past the reserved slot");
            assert!(node.left_child + 1 < bvh.nodes_used());

            let left = &bvh.nodes()[node.left_child as usize];
            let right = &bvh.nodes()[(node.left_child + 1) as usize];

            assert!(node.bounds.contains(&left.bounds));
            assert!(node.bounds.contains(&right.bounds));

            stack.push(node.left_child);
            stack.push(node.left_child + 1);
        }
    }

    // No overlap, no gaps: each id owned by exactly one leaf
    assert!(seen_quads.iter().all(|&n| n == 1));
    assert!(seen_spheres.iter().all(|&n| n == 1));
}
