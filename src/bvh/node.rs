use crate::BoundingBox;

/// One arena slot of the flat tree.
///
/// The right child is implicitly `left_child + 1`; a node is a leaf iff it
/// owns at least one primitive, and internal nodes own none.
#[derive(Clone, Copy, Debug, Default)]
pub struct BvhNode {
    pub bounds: BoundingBox,
    pub left_child: u32,
    pub first_quad: u32,
    pub quad_count: u32,
    pub first_sphere: u32,
    pub sphere_count: u32,
}

impl BvhNode {
    pub fn is_leaf(&self) -> bool {
        self.primitive_count() > 0
    }

    pub fn primitive_count(&self) -> u32 {
        self.quad_count + self.sphere_count
    }
}
