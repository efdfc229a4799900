use glam::{Mat4, Vec3, Vec4Swizzles};

use super::node::BvhNode;
use super::Bvh;
use crate::{BoundingBox, Quad, Shape, Sphere};

/// World-space bound of one planar primitive.
///
/// Triangles must not include the parallelogram's far corner; disks get the
/// four mirrored corners so the inscribed circle stays covered whichever
/// way `U`/`V` point.
pub fn quad_bounds(quad: &Quad, xform: &Mat4) -> BoundingBox {
    let q = quad.q.xyz();
    let u = quad.u.xyz();
    let v = quad.v.xyz();

    let mut bounds = BoundingBox::default();
    let mut grow = |p: Vec3| bounds += xform.transform_point3(p);

    grow(q);
    grow(q + u);
    grow(q + v);

    if quad.shape != Shape::Triangle {
        grow(q + u + v);
    }

    if quad.shape == Shape::Disk {
        grow(q - u);
        grow(q - v);
        grow(q - (u + v));
        grow(q - (u - v));
    }

    bounds
}

pub fn sphere_bounds(sphere: &Sphere, xform: &Mat4) -> BoundingBox {
    let center = sphere.world_center(xform);
    let radius = Vec3::splat(sphere.radius);

    BoundingBox::default() + (center - radius) + (center + radius)
}

pub fn quad_center(quad: &Quad, xform: &Mat4) -> Vec3 {
    xform.transform_point3(quad.center())
}

pub fn sphere_center(sphere: &Sphere, xform: &Mat4) -> Vec3 {
    sphere.world_center(xform)
}

/// Recomputes a node's bound from its primitive ranges, with current
/// transforms.
pub fn node_bounds(
    bvh: &Bvh,
    node: &BvhNode,
    quads: &[Quad],
    spheres: &[Sphere],
    transforms: &[Mat4],
) -> BoundingBox {
    let mut bounds = BoundingBox::default();

    for i in 0..node.quad_count {
        let quad_id = bvh.quad_ids[(node.first_quad + i) as usize];
        let quad = &quads[quad_id as usize];

        bounds += quad_bounds(quad, &transforms[quad.transform_id as usize]);
    }

    for i in 0..node.sphere_count {
        let sphere_id = bvh.sphere_ids[(node.first_sphere + i) as usize];
        let sphere = &spheres[sphere_id as usize];

        bounds += sphere_bounds(sphere, &transforms[sphere.transform_id as usize]);
    }

    bounds
}
