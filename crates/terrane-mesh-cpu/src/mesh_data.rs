use terrane_geom::{Vec2, Vec3};

use crate::layout::MeshLayout;

/// Renderer-ready terrain mesh. Border geometry used for edge normals is not included.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<Vec3>,
    pub uvs: Vec<Vec2>,
    pub indices: Vec<u32>,
    /// Baked per-vertex normals; `None` for flat-shaded meshes.
    pub baked_normals: Option<Vec<Vec3>>,
}

impl MeshData {
    #[inline]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[inline]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[inline]
    pub fn is_flat_shaded(&self) -> bool {
        self.baked_normals.is_none()
    }

    /// Per-vertex normals: the baked set, or face normals of the duplicated flat geometry.
    pub fn normals(&self) -> Vec<Vec3> {
        if let Some(baked) = &self.baked_normals {
            return baked.clone();
        }
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let n = surface_normal(
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            );
            for &i in tri {
                normals[i as usize] = n;
            }
        }
        normals
    }
}

#[inline]
pub(crate) fn surface_normal(a: Vec3, b: Vec3, c: Vec3) -> Vec3 {
    (b - a).cross(c - a).normalized()
}

/// Index into either the emitted vertex buffer or the border side buffer.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum VertexRef {
    Mesh(u32),
    Border(u32),
}

/// Accumulates emitted and border geometry while walking the lattice.
pub(crate) struct MeshAccumulator {
    positions: Vec<Vec3>,
    uvs: Vec<Vec2>,
    indices: Vec<u32>,
    border_positions: Vec<Vec3>,
    border_triangles: Vec<[VertexRef; 3]>,
}

impl MeshAccumulator {
    pub(crate) fn with_layout(layout: &MeshLayout) -> Self {
        Self {
            positions: vec![Vec3::ZERO; layout.vertex_count()],
            uvs: vec![Vec2::ZERO; layout.vertex_count()],
            indices: Vec::with_capacity(layout.triangle_count() * 3),
            border_positions: vec![Vec3::ZERO; layout.border_vertex_count()],
            border_triangles: Vec::with_capacity(layout.border_triangle_count()),
        }
    }

    pub(crate) fn set_vertex(&mut self, at: VertexRef, position: Vec3, uv: Vec2) {
        match at {
            VertexRef::Mesh(i) => {
                self.positions[i as usize] = position;
                self.uvs[i as usize] = uv;
            }
            VertexRef::Border(i) => self.border_positions[i as usize] = position,
        }
    }

    pub(crate) fn add_triangle(&mut self, a: VertexRef, b: VertexRef, c: VertexRef) {
        match (a, b, c) {
            (VertexRef::Mesh(a), VertexRef::Mesh(b), VertexRef::Mesh(c)) => {
                self.indices.extend_from_slice(&[a, b, c]);
            }
            _ => self.border_triangles.push([a, b, c]),
        }
    }

    #[cfg(test)]
    pub(crate) fn border_counts(&self) -> (usize, usize) {
        (self.border_positions.len(), self.border_triangles.len())
    }

    fn point(&self, r: VertexRef) -> Vec3 {
        match r {
            VertexRef::Mesh(i) => self.positions[i as usize],
            VertexRef::Border(i) => self.border_positions[i as usize],
        }
    }

    fn smooth_normals(&self) -> Vec<Vec3> {
        let mut normals = vec![Vec3::ZERO; self.positions.len()];
        for tri in self.indices.chunks_exact(3) {
            let n = surface_normal(
                self.positions[tri[0] as usize],
                self.positions[tri[1] as usize],
                self.positions[tri[2] as usize],
            );
            for &i in tri {
                normals[i as usize] += n;
            }
        }
        for tri in &self.border_triangles {
            let n = surface_normal(self.point(tri[0]), self.point(tri[1]), self.point(tri[2]));
            for r in tri {
                if let VertexRef::Mesh(i) = *r {
                    normals[i as usize] += n;
                }
            }
        }
        for n in &mut normals {
            *n = n.normalized();
        }
        normals
    }

    pub(crate) fn finish(self, flat_shading: bool) -> MeshData {
        if flat_shading {
            let positions = self.indices.iter().map(|&i| self.positions[i as usize]).collect();
            let uvs = self.indices.iter().map(|&i| self.uvs[i as usize]).collect();
            let indices = (0..self.indices.len() as u32).collect();
            MeshData {
                positions,
                uvs,
                indices,
                baked_normals: None,
            }
        } else {
            let normals = self.smooth_normals();
            MeshData {
                positions: self.positions,
                uvs: self.uvs,
                indices: self.indices,
                baked_normals: Some(normals),
            }
        }
    }
}
