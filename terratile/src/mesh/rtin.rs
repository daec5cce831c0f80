//! Right-triangulated irregular network decimation.
//!
//! An RTIN tile is the implicit binary tree of right triangles produced by
//! recursively splitting a square along alternating diagonals. [`Rtin`]
//! precomputes the coordinates of every possible triangle for a grid once;
//! [`RtinTile`] then accumulates, bottom-up, the approximation error each
//! split vertex would fix. Folding child errors into parents is what keeps
//! extraction conforming: a triangle only stops subdividing when the whole
//! subtree under it fits the error bound, so an edge split always has its
//! matching split in the neighbour sharing that edge and no T-junctions
//! appear. Extraction walks the two root triangles top-down and keeps every
//! triangle whose recorded error is within the requested bound.

use super::MeshError;

/// Precomputed triangle hierarchy for a `2^k + 1` square grid.
pub struct Rtin {
    grid_size: usize,
    num_triangles: usize,
    num_parent_triangles: usize,
    coords: Vec<u16>,
}

impl Rtin {
    /// Builds the hierarchy for a `grid_size × grid_size` vertex grid.
    pub fn new(grid_size: usize) -> Result<Self, MeshError> {
        let tile_size = grid_size.saturating_sub(1);
        if tile_size == 0 || tile_size & (tile_size - 1) != 0 {
            return Err(MeshError::TileSize(tile_size as u32));
        }

        let num_triangles = tile_size * tile_size * 2 - 2;
        let num_parent_triangles = num_triangles - tile_size * tile_size;
        let mut coords = vec![0u16; num_triangles * 4];

        // walk each triangle id down the implicit tree to its coordinates
        let edge = tile_size as isize;
        for i in 0..num_triangles {
            let mut id = i + 2;
            let (mut ax, mut ay, mut bx, mut by, mut cx, mut cy) = (0isize, 0, 0, 0, 0, 0);
            if id & 1 == 1 {
                // bottom-left half of the square
                bx = edge;
                by = edge;
                cx = edge;
            } else {
                // top-right half of the square
                ax = edge;
                ay = edge;
                cy = edge;
            }
            loop {
                id >>= 1;
                if id <= 1 {
                    break;
                }
                let mx = (ax + bx) >> 1;
                let my = (ay + by) >> 1;
                if id & 1 == 1 {
                    // left child
                    bx = ax;
                    by = ay;
                    ax = cx;
                    ay = cy;
                } else {
                    // right child
                    ax = bx;
                    ay = by;
                    bx = cx;
                    by = cy;
                }
                cx = mx;
                cy = my;
            }
            let k = i * 4;
            coords[k] = ax as u16;
            coords[k + 1] = ay as u16;
            coords[k + 2] = bx as u16;
            coords[k + 3] = by as u16;
        }

        Ok(Self {
            grid_size,
            num_triangles,
            num_parent_triangles,
            coords,
        })
    }

    /// Vertex count along one grid edge.
    pub fn grid_size(&self) -> usize {
        self.grid_size
    }

    /// Accumulates the error map for `terrain` and returns a tile ready for
    /// mesh extraction.
    pub fn create_tile<'a>(&'a self, terrain: &'a [f32]) -> Result<RtinTile<'a>, MeshError> {
        let expected = self.grid_size * self.grid_size;
        if terrain.len() != expected {
            return Err(MeshError::GridSize {
                expected,
                actual: terrain.len(),
            });
        }
        let errors = self.accumulate_errors(terrain);
        Ok(RtinTile {
            rtin: self,
            terrain,
            errors,
        })
    }

    /// Computes, per grid vertex, the largest interpolation error its split
    /// would fix, with child errors folded into parents.
    fn accumulate_errors(&self, terrain: &[f32]) -> Vec<f32> {
        let size = self.grid_size;
        let mut errors = vec![0.0f32; terrain.len()];

        // smallest triangles first so parents see accumulated child errors
        for i in (0..self.num_triangles).rev() {
            let k = i * 4;
            let ax = self.coords[k] as isize;
            let ay = self.coords[k + 1] as isize;
            let bx = self.coords[k + 2] as isize;
            let by = self.coords[k + 3] as isize;
            let mx = (ax + bx) >> 1;
            let my = (ay + by) >> 1;
            let cx = mx + my - ay;
            let cy = my + ax - mx;

            // error at the midpoint of the long edge
            let interpolated = (terrain[(ay * size as isize + ax) as usize]
                + terrain[(by * size as isize + bx) as usize])
                / 2.0;
            let middle = (my * size as isize + mx) as usize;
            let middle_error = (interpolated - terrain[middle]).abs();
            errors[middle] = errors[middle].max(middle_error);

            if i < self.num_parent_triangles {
                let left = (((ay + cy) >> 1) * size as isize + ((ax + cx) >> 1)) as usize;
                let right = (((by + cy) >> 1) * size as isize + ((bx + cx) >> 1)) as usize;
                errors[middle] = errors[middle].max(errors[left]).max(errors[right]);
            }
        }
        errors
    }
}

/// A terrain grid with its accumulated error map.
pub struct RtinTile<'a> {
    rtin: &'a Rtin,
    terrain: &'a [f32],
    errors: Vec<f32>,
}

/// Vertices and triangles extracted from an [`RtinTile`].
///
/// Vertices are interleaved x/y grid coordinates, two entries per vertex;
/// every vertex is one of the source grid's vertices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridMesh {
    pub vertices: Vec<u16>,
    pub triangles: Vec<u32>,
}

impl GridMesh {
    /// Number of distinct vertices.
    pub fn vertex_count(&self) -> usize {
        self.vertices.len() / 2
    }

    /// Number of triangles.
    pub fn triangle_count(&self) -> usize {
        self.triangles.len() / 3
    }
}

struct Extraction {
    index_grid: Vec<u32>,
    vertices: Vec<u16>,
    triangles: Vec<u32>,
}

impl Extraction {
    /// Returns the mesh index for a grid vertex, assigning one on first use.
    fn vertex(&mut self, size: usize, x: isize, y: isize) -> u32 {
        let slot = &mut self.index_grid[(y as usize) * size + x as usize];
        if *slot == 0 {
            self.vertices.push(x as u16);
            self.vertices.push(y as u16);
            *slot = (self.vertices.len() / 2) as u32;
        }
        *slot - 1
    }
}

impl RtinTile<'_> {
    /// Extracts a mesh whose interpolation error stays within `max_error`.
    pub fn mesh(&self, max_error: f32) -> GridMesh {
        let size = self.rtin.grid_size;
        let edge = (size - 1) as isize;
        let mut extraction = Extraction {
            index_grid: vec![0u32; size * size],
            vertices: Vec::new(),
            triangles: Vec::new(),
        };
        self.emit_triangle(&mut extraction, max_error, 0, 0, edge, edge, edge, 0);
        self.emit_triangle(&mut extraction, max_error, edge, edge, 0, 0, 0, edge);
        GridMesh {
            vertices: extraction.vertices,
            triangles: extraction.triangles,
        }
    }

    /// Elevation of a grid vertex, in metres.
    pub fn height_at(&self, x: u16, y: u16) -> f32 {
        self.terrain[usize::from(y) * self.rtin.grid_size + usize::from(x)]
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_triangle(
        &self,
        extraction: &mut Extraction,
        max_error: f32,
        ax: isize,
        ay: isize,
        bx: isize,
        by: isize,
        cx: isize,
        cy: isize,
    ) {
        let size = self.rtin.grid_size;
        let mx = (ax + bx) >> 1;
        let my = (ay + by) >> 1;

        let splittable = (ax - cx).abs() + (ay - cy).abs() > 1;
        if splittable && self.errors[(my as usize) * size + mx as usize] > max_error {
            // not a good enough fit; split along the long edge
            self.emit_triangle(extraction, max_error, cx, cy, ax, ay, mx, my);
            self.emit_triangle(extraction, max_error, bx, by, cx, cy, mx, my);
        } else {
            let a = extraction.vertex(size, ax, ay);
            let b = extraction.vertex(size, bx, by);
            let c = extraction.vertex(size, cx, cy);
            extraction.triangles.push(a);
            extraction.triangles.push(b);
            extraction.triangles.push(c);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use rand::{Rng, SeedableRng};

    fn flat_terrain(grid_size: usize, height: f32) -> Vec<f32> {
        vec![height; grid_size * grid_size]
    }

    /// One raised vertex in the middle of an otherwise flat grid.
    fn spiked_terrain(grid_size: usize, spike: f32) -> Vec<f32> {
        let mut terrain = flat_terrain(grid_size, 0.0);
        let mid = grid_size / 2;
        terrain[mid * grid_size + mid] = spike;
        terrain
    }

    #[test]
    fn test_rejects_non_power_of_two_grid() {
        assert!(Rtin::new(6).is_err());
        assert!(Rtin::new(1).is_err());
        assert!(Rtin::new(0).is_err());
    }

    #[test]
    fn test_accepts_power_of_two_grids() {
        for grid_size in [3, 5, 9, 17, 33, 65] {
            assert!(Rtin::new(grid_size).is_ok(), "grid_size {}", grid_size);
        }
    }

    #[test]
    fn test_rejects_mismatched_terrain_length() {
        let rtin = Rtin::new(5).unwrap();
        let terrain = vec![0.0f32; 24];
        assert!(rtin.create_tile(&terrain).is_err());
    }

    #[test]
    fn test_flat_terrain_gives_two_triangles() {
        let rtin = Rtin::new(17).unwrap();
        let terrain = flat_terrain(17, 100.0);
        let mesh = rtin.create_tile(&terrain).unwrap().mesh(1.0);

        assert_eq!(mesh.triangle_count(), 2);
        assert_eq!(mesh.vertex_count(), 4);
        // the four corners of the grid, and nothing else
        let corners: Vec<(u16, u16)> = mesh
            .vertices
            .chunks(2)
            .map(|v| (v[0], v[1]))
            .collect();
        for corner in [(0, 0), (16, 16), (16, 0), (0, 16)] {
            assert!(corners.contains(&corner), "missing corner {:?}", corner);
        }
    }

    #[test]
    fn test_zero_error_keeps_full_resolution() {
        let mut rng = rand::rngs::StdRng::seed_from_u64(7);
        let grid_size = 9;
        let terrain: Vec<f32> = (0..grid_size * grid_size)
            .map(|_| rng.random_range(0.0..500.0))
            .collect();
        let rtin = Rtin::new(grid_size).unwrap();
        let mesh = rtin.create_tile(&terrain).unwrap().mesh(0.0);

        // every grid cell is split into its two smallest triangles
        let tile_size = grid_size - 1;
        assert_eq!(mesh.triangle_count(), tile_size * tile_size * 2);
        assert_eq!(mesh.vertex_count(), grid_size * grid_size);
    }

    #[test]
    fn test_spike_forces_subdivision() {
        let rtin = Rtin::new(17).unwrap();
        let terrain = spiked_terrain(17, 500.0);
        let tile = rtin.create_tile(&terrain).unwrap();

        let coarse = tile.mesh(1000.0);
        let fine = tile.mesh(1.0);
        assert_eq!(coarse.triangle_count(), 2);
        assert!(fine.triangle_count() > 2);
    }

    #[test]
    fn test_indices_reference_real_vertices() {
        let rtin = Rtin::new(17).unwrap();
        let terrain = spiked_terrain(17, 300.0);
        let mesh = rtin.create_tile(&terrain).unwrap().mesh(5.0);

        assert_eq!(mesh.triangles.len() % 3, 0);
        let vertex_count = mesh.vertex_count() as u32;
        assert!(mesh.triangles.iter().all(|&i| i < vertex_count));
    }

    #[test]
    fn test_vertices_are_subset_of_grid() {
        let rtin = Rtin::new(9).unwrap();
        let terrain = spiked_terrain(9, 300.0);
        let mesh = rtin.create_tile(&terrain).unwrap().mesh(2.0);

        for chunk in mesh.vertices.chunks(2) {
            assert!(chunk[0] < 9);
            assert!(chunk[1] < 9);
        }
    }

    /// Twice the signed area of a mesh triangle.
    fn doubled_area(mesh: &GridMesh, tri: &[u32]) -> i64 {
        let v = |i: u32| {
            (
                i64::from(mesh.vertices[i as usize * 2]),
                i64::from(mesh.vertices[i as usize * 2 + 1]),
            )
        };
        let (ax, ay) = v(tri[0]);
        let (bx, by) = v(tri[1]);
        let (cx, cy) = v(tri[2]);
        (bx - ax) * (cy - ay) - (cx - ax) * (by - ay)
    }

    /// True when `p` lies strictly inside the open segment `a`–`b`.
    fn strictly_between(a: (i64, i64), b: (i64, i64), p: (i64, i64)) -> bool {
        let (abx, aby) = (b.0 - a.0, b.1 - a.1);
        let (apx, apy) = (p.0 - a.0, p.1 - a.1);
        if abx * apy - aby * apx != 0 {
            return false;
        }
        let dot = apx * abx + apy * aby;
        dot > 0 && dot < abx * abx + aby * aby
    }

    proptest! {
        #[test]
        fn prop_triangle_count_monotone_in_error(seed in 0u64..200) {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let grid_size = 9;
            let terrain: Vec<f32> = (0..grid_size * grid_size)
                .map(|_| rng.random_range(0.0..300.0))
                .collect();
            let rtin = Rtin::new(grid_size).unwrap();
            let tile = rtin.create_tile(&terrain).unwrap();

            let mut previous = usize::MAX;
            for error in [0.0f32, 1.0, 5.0, 25.0, 125.0, 1000.0] {
                let count = tile.mesh(error).triangle_count();
                prop_assert!(count <= previous, "error {} grew to {} triangles", error, count);
                previous = count;
            }
        }

        #[test]
        fn prop_mesh_covers_tile_without_t_junctions(seed in 0u64..100, max_error in 0.0f32..200.0) {
            let mut rng = rand::rngs::StdRng::seed_from_u64(seed);
            let grid_size = 9;
            let terrain: Vec<f32> = (0..grid_size * grid_size)
                .map(|_| rng.random_range(0.0..300.0))
                .collect();
            let rtin = Rtin::new(grid_size).unwrap();
            let mesh = rtin.create_tile(&terrain).unwrap().mesh(max_error);

            // triangles tile the square exactly
            let covered: i64 = mesh
                .triangles
                .chunks(3)
                .map(|tri| doubled_area(&mesh, tri).abs())
                .sum();
            let tile_size = (grid_size - 1) as i64;
            prop_assert_eq!(covered, 2 * tile_size * tile_size);

            // conforming: no retained vertex sits in the middle of an edge
            let points: Vec<(i64, i64)> = mesh
                .vertices
                .chunks(2)
                .map(|v| (i64::from(v[0]), i64::from(v[1])))
                .collect();
            for tri in mesh.triangles.chunks(3) {
                for (s, e) in [(tri[0], tri[1]), (tri[1], tri[2]), (tri[2], tri[0])] {
                    let a = points[s as usize];
                    let b = points[e as usize];
                    for &p in &points {
                        prop_assert!(
                            !strictly_between(a, b, p),
                            "vertex {:?} splits edge {:?}-{:?}",
                            p,
                            a,
                            b
                        );
                    }
                }
            }
        }
    }
}
