/// Closed-form buffer sizes for one grid side and LOD stride.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MeshLayout {
    pub vertices_per_line: usize,
    pub skip_increment: usize,
}

impl MeshLayout {
    #[inline]
    pub const fn new(vertices_per_line: usize, skip_increment: usize) -> Self {
        Self {
            vertices_per_line,
            skip_increment,
        }
    }

    pub fn mesh_edge_vertex_count(&self) -> usize {
        (self.vertices_per_line - 2) * 4 - 4
    }

    pub fn edge_connection_vertex_count(&self) -> usize {
        (self.skip_increment - 1) * (self.vertices_per_line - 5) / self.skip_increment * 4
    }

    pub fn main_vertices_per_line(&self) -> usize {
        (self.vertices_per_line - 5) / self.skip_increment + 1
    }

    pub fn main_vertex_count(&self) -> usize {
        let m = self.main_vertices_per_line();
        m * m
    }

    pub fn vertex_count(&self) -> usize {
        self.mesh_edge_vertex_count() + self.edge_connection_vertex_count() + self.main_vertex_count()
    }

    pub fn mesh_edge_triangle_count(&self) -> usize {
        8 * (self.vertices_per_line - 4)
    }

    pub fn main_triangle_count(&self) -> usize {
        let m = self.main_vertices_per_line();
        (m - 1) * (m - 1) * 2
    }

    pub fn triangle_count(&self) -> usize {
        self.mesh_edge_triangle_count() + self.main_triangle_count()
    }

    pub fn border_vertex_count(&self) -> usize {
        self.vertices_per_line * 4 - 4
    }

    pub fn border_triangle_count(&self) -> usize {
        8 * (self.vertices_per_line - 2)
    }
}
