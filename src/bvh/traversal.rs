use std::f32::consts::PI;

use glam::{Mat4, Vec3, Vec4Swizzles};

use super::Bvh;
use crate::{BoundingBox, Quad, Sphere};

const STACK_SIZE: usize = 64;

/// Plane/parallel and slab-denominator guard.
const EPSILON: f32 = 1e-8;

#[derive(Clone, Copy, Debug)]
pub struct Ray {
    pub origin: Vec3,
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self { origin, direction }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + t * self.direction
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Interval {
    pub min: f32,
    pub max: f32,
}

impl Interval {
    pub fn new(min: f32, max: f32) -> Self {
        Self { min, max }
    }

    pub fn contains(&self, x: f32) -> bool {
        self.min <= x && x <= self.max
    }

    pub fn surrounds(&self, x: f32) -> bool {
        self.min < x && x < self.max
    }
}

#[derive(Clone, Copy, Debug, Default)]
pub struct Hit {
    pub point: Vec3,
    pub normal: Vec3,
    pub t: f32,
    pub u: f32,
    pub v: f32,
    pub front_face: bool,
    pub material_id: u32,
}

impl Hit {
    /// Stores the geometric normal oriented against the ray and remembers
    /// which side was struck.
    fn set_face_normal(&mut self, ray: &Ray, outward_normal: Vec3) {
        self.front_face = ray.direction.dot(outward_normal) < 0.0;

        self.normal = if self.front_face {
            outward_normal
        } else {
            -outward_normal
        };
    }
}

/// Nearest-hit search over the tree; the CPU twin of the GPU shader's
/// traversal loop, used for verification and scene picking.
pub fn traverse(
    bvh: &Bvh,
    ray: &Ray,
    interval: Interval,
    quads: &[Quad],
    spheres: &[Sphere],
    transforms: &[Mat4],
) -> Option<Hit> {
    if bvh.total_elements == 0 {
        return None;
    }

    let mut hit = None;
    let mut closest_so_far = interval.max;
    let mut node_id = 0u32;
    let mut stack = [0u32; STACK_SIZE];
    let mut stack_ptr = 0usize;

    loop {
        let node = &bvh.nodes[node_id as usize];

        if node.is_leaf() {
            hit_leaf(
                bvh,
                node_id,
                ray,
                interval,
                quads,
                spheres,
                transforms,
                &mut hit,
                &mut closest_so_far,
            );

            if stack_ptr == 0 {
                return hit;
            }

            stack_ptr -= 1;
            node_id = stack[stack_ptr];
            continue;
        }

        let mut child1 = node.left_child;
        let mut child2 = child1 + 1;

        let child_interval = Interval::new(interval.min, closest_so_far);
        let mut dist1 = hit_aabb(ray, child_interval, &bvh.nodes[child1 as usize].bounds);
        let mut dist2 = hit_aabb(ray, child_interval, &bvh.nodes[child2 as usize].bounds);

        if let (Some(d1), Some(d2)) = (dist1, dist2) {
            if d1 > d2 {
                std::mem::swap(&mut dist1, &mut dist2);
                std::mem::swap(&mut child1, &mut child2);
            }
        }

        if dist1.is_some() {
            // Descend into the nearer child; queue the farther one
            node_id = child1;

            if dist2.is_some() {
                debug_assert!(stack_ptr < STACK_SIZE - 1, "traversal stack exhausted");

                if stack_ptr < STACK_SIZE - 1 {
                    stack[stack_ptr] = child2;
                    stack_ptr += 1;
                }
            }
        } else if dist2.is_some() {
            node_id = child2;
        } else {
            if stack_ptr == 0 {
                return hit;
            }

            stack_ptr -= 1;
            node_id = stack[stack_ptr];
        }
    }
}

#[allow(clippy::too_many_arguments)]
fn hit_leaf(
    bvh: &Bvh,
    node_id: u32,
    ray: &Ray,
    interval: Interval,
    quads: &[Quad],
    spheres: &[Sphere],
    transforms: &[Mat4],
    hit: &mut Option<Hit>,
    closest_so_far: &mut f32,
) {
    let node = &bvh.nodes[node_id as usize];

    for i in 0..node.sphere_count {
        let sphere_id = bvh.sphere_ids[(node.first_sphere + i) as usize];
        let sphere = &spheres[sphere_id as usize];
        let xform = &transforms[sphere.transform_id as usize];

        if let Some(rec) =
            hit_sphere(sphere, xform, ray, Interval::new(interval.min, *closest_so_far))
        {
            *closest_so_far = rec.t;
            *hit = Some(rec);
        }
    }

    for i in 0..node.quad_count {
        let quad_id = bvh.quad_ids[(node.first_quad + i) as usize];
        let quad = &quads[quad_id as usize];
        let xform = &transforms[quad.transform_id as usize];

        if let Some(rec) =
            hit_quad(quad, xform, ray, Interval::new(interval.min, *closest_so_far))
        {
            *closest_so_far = rec.t;
            *hit = Some(rec);
        }
    }
}

/// Ray/box slab test; returns the entry distance on a hit.
///
/// The epsilon on the direction keeps axis-parallel rays from producing
/// NaNs; the result only feeds an ordering decision, so the tiny bias is
/// acceptable.
pub(crate) fn hit_aabb(ray: &Ray, interval: Interval, bounds: &BoundingBox) -> Option<f32> {
    let min = bounds.min();
    let max = bounds.max();

    let tx1 = (min.x - ray.origin.x) / (ray.direction.x + EPSILON);
    let tx2 = (max.x - ray.origin.x) / (ray.direction.x + EPSILON);
    let mut tmin = tx1.min(tx2);
    let mut tmax = tx1.max(tx2);

    let ty1 = (min.y - ray.origin.y) / (ray.direction.y + EPSILON);
    let ty2 = (max.y - ray.origin.y) / (ray.direction.y + EPSILON);
    tmin = tmin.max(ty1.min(ty2));
    tmax = tmax.min(ty1.max(ty2));

    let tz1 = (min.z - ray.origin.z) / (ray.direction.z + EPSILON);
    let tz2 = (max.z - ray.origin.z) / (ray.direction.z + EPSILON);
    tmin = tmin.max(tz1.min(tz2));
    tmax = tmax.min(tz1.max(tz2));

    // A ray starting inside the box still counts as entering at zero
    tmin = tmin.max(0.0);

    let hit = tmax >= tmin && tmin < interval.max && tmax >= interval.min && tmax > 0.0;

    if hit {
        Some(if tmin > 0.0 { tmin } else { tmax })
    } else {
        None
    }
}

pub(crate) fn hit_sphere(
    sphere: &Sphere,
    xform: &Mat4,
    ray: &Ray,
    interval: Interval,
) -> Option<Hit> {
    let center = sphere.world_center(xform);
    let radius = sphere.radius;

    let oc = center - ray.origin;
    let a = ray.direction.length_squared();
    let h = ray.direction.dot(oc);
    let c = oc.length_squared() - radius * radius;

    let discriminant = h * h - a * c;

    if discriminant < 0.0 {
        return None;
    }

    let sqrtd = discriminant.sqrt();

    // Nearest root within the open interval
    let mut root = (h - sqrtd) / a;

    if !interval.surrounds(root) {
        root = (h + sqrtd) / a;

        if !interval.surrounds(root) {
            return None;
        }
    }

    let mut rec = Hit {
        t: root,
        point: ray.at(root),
        material_id: sphere.material_id,
        ..Hit::default()
    };

    let outward_normal = (rec.point - center) / radius;

    rec.set_face_normal(ray, outward_normal);
    (rec.u, rec.v) = sphere_uv(outward_normal);

    Some(rec)
}

fn sphere_uv(p: Vec3) -> (f32, f32) {
    let theta = (-p.y).acos();
    let phi = (-p.z).atan2(p.x) + PI;

    (phi / (2.0 * PI), theta / PI)
}

/// Plane intersection plus the planar-coordinate interior test.
///
/// The unit-square interior test is applied to quads, triangles and disks
/// alike; the GPU shader does the same, so the two stay in agreement.
pub(crate) fn hit_quad(
    quad: &Quad,
    xform: &Mat4,
    ray: &Ray,
    interval: Interval,
) -> Option<Hit> {
    let world = quad.transformed(xform);

    let q = world.q.xyz();
    let u = world.u.xyz();
    let v = world.v.xyz();

    let n = u.cross(v);
    let normal = n.normalize();
    let d = normal.dot(q);
    let w = n / n.dot(n);

    let denom = normal.dot(ray.direction);

    // Ray parallel to the plane
    if denom.abs() < EPSILON {
        return None;
    }

    let t = (d - normal.dot(ray.origin)) / denom;

    if !interval.contains(t) {
        return None;
    }

    let intersection = ray.at(t);
    let planar_hitpt = intersection - q;
    let alpha = w.dot(planar_hitpt.cross(v));
    let beta = w.dot(u.cross(planar_hitpt));

    let unit = Interval::new(0.0, 1.0);

    if !unit.contains(alpha) || !unit.contains(beta) {
        return None;
    }

    let mut rec = Hit {
        t,
        point: intersection,
        u: alpha,
        v: beta,
        material_id: quad.material_id,
        ..Hit::default()
    };

    rec.set_face_normal(ray, normal);

    Some(rec)
}
