//! Types shared byte-for-byte with the GPU traversal shader.
//!
//! The shader re-implements the traversal over these exact layouts, so any
//! change here has to be mirrored there.

use bytemuck::{Pod, Zeroable};
use glam::Vec4;

/// Two counts prefixed to the serialized node buffer.
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
#[repr(C)]
pub struct BvhHeader {
    pub total_elements: u32,
    pub nodes_used: u32,
}

/// One serialized node: 16-byte-aligned bound corners followed by the
/// child/range words, padded to 64 bytes.
#[derive(Clone, Copy, Debug, Default, Pod, Zeroable)]
#[repr(C)]
pub struct BvhNode {
    pub min: Vec4,
    pub max: Vec4,
    pub left_child: u32,
    pub first_quad: u32,
    pub quad_count: u32,
    pub first_sphere: u32,
    pub sphere_count: u32,
    pub _pad: [u32; 3],
}

impl From<crate::BvhNode> for BvhNode {
    fn from(node: crate::BvhNode) -> Self {
        Self {
            min: node.bounds.min().extend(0.0),
            max: node.bounds.max().extend(0.0),
            left_child: node.left_child,
            first_quad: node.first_quad,
            quad_count: node.quad_count,
            first_sphere: node.first_sphere,
            sphere_count: node.sphere_count,
            _pad: [0; 3],
        }
    }
}
