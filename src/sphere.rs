use glam::{Mat4, Vec3, Vec4, Vec4Swizzles};

#[derive(Clone, Copy, Debug)]
pub struct Sphere {
    pub center: Vec4,
    pub radius: f32,
    pub material_id: u32,
    pub transform_id: u32,
}

impl Sphere {
    pub fn new(center: Vec3, radius: f32, material_id: u32, transform_id: u32) -> Self {
        Self {
            center: center.extend(1.0),
            radius,
            material_id,
            transform_id,
        }
    }

    /// World-space center; the radius is deliberately left untouched, so a
    /// scaling transform over-approximates (matching the bound extractor).
    pub fn world_center(&self, xform: &Mat4) -> Vec3 {
        xform.transform_point3(self.center.xyz())
    }
}
