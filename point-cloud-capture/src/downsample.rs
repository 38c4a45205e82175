/// Display subset of the accumulated cloud
use crate::store::Vertex;

/// Keeps every `stride`-th vertex by enumeration position (indices stride-1, 2*stride-1, ...).
/// A stride of 0 or 1 keeps everything.
pub fn downsample(vertices: &[Vertex], stride: usize) -> Vec<Vertex> {
    if stride <= 1 {
        return vertices.to_vec();
    }
    vertices
        .iter()
        .skip(stride - 1)
        .step_by(stride)
        .copied()
        .collect()
}
