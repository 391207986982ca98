use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use image::{GrayImage, Luma};
use terrane_geom::Vec2;
use terrane_mesh_cpu::{MeshData, build_terrain_mesh};
use terrane_noise::{HeightMap, generate_falloff_map, generate_height_map};
use thiserror::Error;

use crate::cli::{PreviewArgs, PreviewMode};
use crate::config::TerrainConfig;

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("failed to write image: {0}")]
    Image(#[from] image::ImageError),
    #[error("failed to write mesh: {0}")]
    Io(#[from] io::Error),
    #[error("lod {lod} is not supported")]
    UnsupportedLod { lod: usize },
}

fn inverse_lerp(a: f32, b: f32, v: f32) -> f32 {
    if a == b { 0.0 } else { ((v - a) / (b - a)).clamp(0.0, 1.0) }
}

/// Grayscale image, black at the map minimum and white at its maximum.
pub fn height_map_to_image(map: &HeightMap) -> GrayImage {
    let (min, max) = (map.min_value(), map.max_value());
    GrayImage::from_fn(map.width() as u32, map.height() as u32, |x, y| {
        let t = inverse_lerp(min, max, map.get(x as usize, y as usize));
        Luma([(t * 255.0).round() as u8])
    })
}

pub fn write_height_map_png(map: &HeightMap, path: &Path) -> Result<(), PreviewError> {
    height_map_to_image(map).save(path)?;
    Ok(())
}

/// Wavefront OBJ with positions, UVs and normals; indices are 1-based.
pub fn write_obj(mesh: &MeshData, out: &mut impl Write) -> io::Result<()> {
    writeln!(out, "# terrane chunk mesh")?;
    for p in &mesh.positions {
        writeln!(out, "v {} {} {}", p.x, p.y, p.z)?;
    }
    for uv in &mesh.uvs {
        writeln!(out, "vt {} {}", uv.x, uv.y)?;
    }
    for n in mesh.normals() {
        writeln!(out, "vn {} {} {}", n.x, n.y, n.z)?;
    }
    for tri in mesh.indices.chunks_exact(3) {
        let [a, b, c] = [tri[0] + 1, tri[1] + 1, tri[2] + 1];
        writeln!(out, "f {a}/{a}/{a} {b}/{b}/{b} {c}/{c}/{c}")?;
    }
    Ok(())
}

pub fn write_mesh_obj(mesh: &MeshData, path: &Path) -> Result<(), PreviewError> {
    let mut out = BufWriter::new(File::create(path)?);
    write_obj(mesh, &mut out)?;
    out.flush()?;
    Ok(())
}

/// Synchronous preview on the calling thread. Returns the written path.
pub fn run_preview(args: &PreviewArgs, config: &TerrainConfig) -> Result<PathBuf, PreviewError> {
    let settings = config.terrain_settings();
    let n = settings.mesh.vertices_per_line();
    let chunk = Vec2::new(args.chunk_x as f32, args.chunk_y as f32);
    let sample_center = chunk * settings.chunk_world_size() / settings.mesh.mesh_scale;

    match args.mode {
        PreviewMode::Noise => {
            let map = generate_height_map(n, n, &settings.height, sample_center);
            write_height_map_png(&map, &args.out)?;
        }
        PreviewMode::Falloff => {
            write_height_map_png(&generate_falloff_map(n), &args.out)?;
        }
        PreviewMode::Mesh => {
            if args.lod >= terrane_mesh_cpu::SUPPORTED_LOD_COUNT {
                return Err(PreviewError::UnsupportedLod { lod: args.lod });
            }
            let map = generate_height_map(n, n, &settings.height, sample_center);
            let mesh = build_terrain_mesh(&map, &settings.mesh, args.lod);
            log::info!(
                "mesh lod {}: {} vertices, {} triangles",
                args.lod,
                mesh.vertex_count(),
                mesh.triangle_count()
            );
            write_mesh_obj(&mesh, &args.out)?;
        }
    }
    Ok(args.out.clone())
}
