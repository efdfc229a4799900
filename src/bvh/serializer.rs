use super::Bvh;
use crate::gpu;

/// The three linear buffers the GPU pipeline binds.
#[derive(Clone, Debug, Default)]
pub struct BvhBuffers {
    pub tree: Vec<u8>,
    pub sphere_ids: Vec<u8>,
    pub quad_ids: Vec<u8>,
}

pub struct BvhSerializer;

impl BvhSerializer {
    pub fn serialize(bvh: &Bvh) -> BvhBuffers {
        let mut out = BvhBuffers::default();

        Self::serialize_into(bvh, &mut out);

        out
    }

    /// Packs header + nodes, then both index permutations; the layout is a
    /// byte-exact contract with the GPU traversal shader.
    pub fn serialize_into(bvh: &Bvh, out: &mut BvhBuffers) {
        let header = gpu::BvhHeader {
            total_elements: bvh.total_elements,
            nodes_used: bvh.nodes_used,
        };

        out.tree.clear();
        out.tree.extend_from_slice(bytemuck::bytes_of(&header));

        // `nodes_used + 1` entries, so the buffer always covers the index
        // range the shader may touch even when the arena is shorter
        for node_id in 0..=bvh.nodes_used {
            let node = bvh
                .nodes
                .get(node_id as usize)
                .copied()
                .unwrap_or_default();

            out.tree
                .extend_from_slice(bytemuck::bytes_of(&gpu::BvhNode::from(node)));
        }

        out.sphere_ids.clear();
        out.sphere_ids
            .extend_from_slice(bytemuck::cast_slice(&bvh.sphere_ids));

        out.quad_ids.clear();
        out.quad_ids
            .extend_from_slice(bytemuck::cast_slice(&bvh.quad_ids));
    }
}
