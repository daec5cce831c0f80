//! Quantization into the tile-relative fixed-point vertex layout.

use super::rtin::GridMesh;
use super::MeshPayload;

/// Upper bound of the fixed-point range on every axis.
const QUANTIZED_MAX: f64 = 32767.0;

/// Relief below this many metres collapses the height channel to zero.
const MIN_RELIEF: f64 = 1.0;

/// Quantizes an extracted mesh against its source elevation grid.
///
/// The vertex buffer is laid out as all u values, then all v values, then
/// all heights. v runs south-to-north, so grid rows (which count from the
/// north) are flipped. Edge vertices are collected per tile edge and
/// ordered along it (west/east south-to-north, north/south west-to-east) so
/// neighbouring tiles at the same subdivision stitch vertex-for-vertex.
pub(crate) fn quantize_mesh(terrain: &[f32], mesh: GridMesh, tile_size: usize) -> MeshPayload {
    let grid_size = tile_size + 1;
    let vertex_count = mesh.vertex_count();
    let scalar = QUANTIZED_MAX / tile_size as f64;

    let mut heights = Vec::with_capacity(vertex_count);
    let mut us = Vec::with_capacity(vertex_count);
    let mut vs = Vec::with_capacity(vertex_count);
    let mut west: Vec<(u32, u16, u16)> = Vec::new();
    let mut south: Vec<(u32, u16, u16)> = Vec::new();
    let mut east: Vec<(u32, u16, u16)> = Vec::new();
    let mut north: Vec<(u32, u16, u16)> = Vec::new();

    for (ix, vertex) in mesh.vertices.chunks(2).enumerate() {
        let (px, py) = (vertex[0], vertex[1]);
        heights.push(f64::from(
            terrain[usize::from(py) * grid_size + usize::from(px)],
        ));

        let entry = (ix as u32, px, py);
        if py == 0 {
            north.push(entry);
        }
        if usize::from(py) == tile_size {
            south.push(entry);
        }
        if px == 0 {
            west.push(entry);
        }
        if usize::from(px) == tile_size {
            east.push(entry);
        }

        us.push((f64::from(px) * scalar).round() as u16);
        vs.push(((tile_size as f64 - f64::from(py)) * scalar).round() as u16);
    }

    let minimum_height = heights.iter().copied().fold(f64::INFINITY, f64::min);
    let maximum_height = heights.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let relief = maximum_height - minimum_height;

    let mut quantized_vertices = Vec::with_capacity(vertex_count * 3);
    quantized_vertices.extend(us);
    quantized_vertices.extend(vs);
    for height in &heights {
        let quantized = if relief < MIN_RELIEF {
            0.0
        } else {
            (height - minimum_height) * QUANTIZED_MAX / relief
        };
        quantized_vertices.push(quantized.round() as u16);
    }

    // grid rows count from the north, so south-to-north is descending py
    west.sort_by(|a, b| b.2.cmp(&a.2));
    east.sort_by(|a, b| b.2.cmp(&a.2));
    north.sort_by(|a, b| a.1.cmp(&b.1));
    south.sort_by(|a, b| a.1.cmp(&b.1));

    let indices_of =
        |edge: Vec<(u32, u16, u16)>| -> Vec<u32> { edge.into_iter().map(|e| e.0).collect() };
    MeshPayload {
        minimum_height,
        maximum_height,
        quantized_vertices,
        indices: mesh.triangles,
        west_indices: indices_of(west),
        south_indices: indices_of(south),
        east_indices: indices_of(east),
        north_indices: indices_of(north),
    }
}
