//! Triangle meshes and the edge adjacency required by the damage integration.
use crate::Real;
use log::warn;
use nalgebra::{Point2, Scalar, Vector2};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::ops::Deref;

/// Connectivity of a linear triangle, counter-clockwise.
///
/// Edge `i` joins the local vertices `i` and `(i + 1) % 3`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Tri3Connectivity(pub [usize; 3]);

impl Tri3Connectivity {
    pub fn num_edges(&self) -> usize {
        3
    }

    pub fn edge(&self, index: usize) -> Option<[usize; 2]> {
        let idx = &self.0;
        if index < 3 {
            Some([idx[index], idx[(index + 1) % 3]])
        } else {
            None
        }
    }
}

impl Deref for Tri3Connectivity {
    type Target = [usize; 3];

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

/// Index-based triangle mesh in two dimensions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(bound(serialize = "T: Scalar + Serialize", deserialize = "T: Scalar + Deserialize<'de>"))]
pub struct TriangleMesh2d<T: Scalar> {
    vertices: Vec<Point2<T>>,
    connectivity: Vec<Tri3Connectivity>,
}

impl<T: Scalar> TriangleMesh2d<T> {
    /// Constructs a mesh from vertices and connectivity.
    ///
    /// Indices are not checked here. Consumers look cells up with [`TriangleMesh2d::cell`],
    /// which reports out-of-bounds indices.
    pub fn from_vertices_and_connectivity(vertices: Vec<Point2<T>>, connectivity: Vec<Tri3Connectivity>) -> Self {
        Self { vertices, connectivity }
    }

    pub fn vertices(&self) -> &[Point2<T>] {
        &self.vertices
    }

    pub fn connectivity(&self) -> &[Tri3Connectivity] {
        &self.connectivity
    }

    pub fn num_cells(&self) -> usize {
        self.connectivity.len()
    }

    pub fn cell(&self, index: usize) -> Option<[Point2<T>; 3]> {
        let conn = self.connectivity.get(index)?;
        Some([
            self.vertices.get(conn[0]).cloned()?,
            self.vertices.get(conn[1]).cloned()?,
            self.vertices.get(conn[2]).cloned()?,
        ])
    }

    /// For every cell, the cell across each of its edges, or `None` on the boundary.
    ///
    /// Edges shared by more than two cells are non-manifold. They are reported and treated
    /// as boundary edges.
    pub fn compute_edge_neighbours(&self) -> Vec<Vec<Option<usize>>> {
        // Key edges by their sorted vertex indices. A BTreeMap keeps the result (and the
        // order of any warnings) deterministic.
        let mut edge_cells: BTreeMap<[usize; 2], Vec<(usize, usize)>> = BTreeMap::new();
        for (cell_idx, conn) in self.connectivity.iter().enumerate() {
            for local_idx in 0..conn.num_edges() {
                if let Some(mut edge) = conn.edge(local_idx) {
                    edge.sort_unstable();
                    edge_cells.entry(edge).or_default().push((cell_idx, local_idx));
                }
            }
        }

        let mut neighbours: Vec<Vec<Option<usize>>> = self
            .connectivity
            .iter()
            .map(|conn| vec![None; conn.num_edges()])
            .collect();
        for (edge, cells) in edge_cells {
            match cells.as_slice() {
                &[(cell_a, local_a), (cell_b, local_b)] => {
                    neighbours[cell_a][local_a] = Some(cell_b);
                    neighbours[cell_b][local_b] = Some(cell_a);
                }
                &[_] => {}
                _ => warn!(
                    "Edge {:?} is shared by {} cells, treating it as a boundary edge",
                    edge,
                    cells.len()
                ),
            }
        }
        neighbours
    }
}

/// Creates a rectangular mesh of `cells_x` by `cells_y` squares, each split into two triangles.
///
/// The mesh spans `[origin, origin + cell_size * (cells_x, cells_y)]`.
pub fn create_rectangular_triangle_mesh_2d<T: Real>(
    cell_size: T,
    cells_x: usize,
    cells_y: usize,
    origin: &Vector2<T>,
) -> TriangleMesh2d<T> {
    if cells_x == 0 || cells_y == 0 {
        return TriangleMesh2d::from_vertices_and_connectivity(Vec::new(), Vec::new());
    }

    let to_global_vertex_index = |i, j| (cells_x + 1) * j + i;

    let mut vertices = Vec::with_capacity((cells_x + 1) * (cells_y + 1));
    for j in 0..=cells_y {
        for i in 0..=cells_x {
            let i_as_t = T::from_usize(i).expect("Must be able to fit usize in T");
            let j_as_t = T::from_usize(j).expect("Must be able to fit usize in T");
            vertices.push(Point2::from(origin + Vector2::new(i_as_t, j_as_t) * cell_size));
        }
    }

    let mut cells = Vec::with_capacity(2 * cells_x * cells_y);
    for j in 0..cells_y {
        for i in 0..cells_x {
            let a = to_global_vertex_index(i, j);
            let b = to_global_vertex_index(i + 1, j);
            let c = to_global_vertex_index(i + 1, j + 1);
            let d = to_global_vertex_index(i, j + 1);
            cells.push(Tri3Connectivity([a, b, c]));
            cells.push(Tri3Connectivity([a, c, d]));
        }
    }

    TriangleMesh2d::from_vertices_and_connectivity(vertices, cells)
}
