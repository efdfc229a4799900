use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};

/// Planar shape carried by a [`Quad`].
///
/// All three variants share the `Q + U/V` parametrization; the tag decides
/// the centroid rule and how conservatively the primitive gets bounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Shape {
    Quad,
    Triangle,
    Disk,
}

/// A planar primitive: origin `Q` plus edge vectors `U` and `V`.
#[derive(Clone, Copy, Debug)]
pub struct Quad {
    pub q: Vec4,
    pub u: Vec4,
    pub v: Vec4,
    pub shape: Shape,
    pub material_id: u32,
    pub transform_id: u32,
}

impl Quad {
    pub fn new(
        shape: Shape,
        q: Vec3,
        u: Vec3,
        v: Vec3,
        material_id: u32,
        transform_id: u32,
    ) -> Self {
        Self {
            q: q.extend(1.0),
            u: u.extend(1.0),
            v: v.extend(1.0),
            shape,
            material_id,
            transform_id,
        }
    }

    /// Object-space centroid; quads and disks use the parallelogram center,
    /// triangles the vertex average.
    pub fn center(&self) -> Vec3 {
        let extent = self.u.xyz() + self.v.xyz();

        match self.shape {
            Shape::Triangle => self.q.xyz() + extent / 3.0,
            Shape::Quad | Shape::Disk => self.q.xyz() + extent * 0.5,
        }
    }

    /// Maps the primitive into world space by transforming its three
    /// defining vertices and re-deriving the edge vectors.
    pub fn transformed(&self, xform: &Mat4) -> Self {
        let q = self.q.xyz();
        let u = self.u.xyz();
        let v = self.v.xyz();

        let world_q = xform.transform_point3(q);
        let world_u = xform.transform_point3(q + u) - world_q;
        let world_v = xform.transform_point3(q + v) - world_q;

        Self {
            q: world_q.extend(1.0),
            u: world_u.extend(1.0),
            v: world_v.extend(1.0),
            ..*self
        }
    }
}
