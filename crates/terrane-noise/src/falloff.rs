use crate::height_map::HeightMap;

const FALLOFF_STEEPNESS: f32 = 3.0;
const FALLOFF_SHIFT: f32 = 2.2;

#[inline]
fn falloff_curve(v: f32) -> f32 {
    let a = FALLOFF_STEEPNESS;
    let b = FALLOFF_SHIFT;
    let p = v.powf(a);
    p / (p + (b - b * v).powf(a))
}

/// Square edge mask: ~0 in the middle rising to ~1 at the borders.
pub fn generate_falloff_map(size: usize) -> HeightMap {
    let mut values = vec![0.0f32; size * size];
    for j in 0..size {
        for i in 0..size {
            let x = i as f32 / size as f32 * 2.0 - 1.0;
            let y = j as f32 / size as f32 * 2.0 - 1.0;
            let v = x.abs().max(y.abs());
            values[j * size + i] = falloff_curve(v);
        }
    }
    HeightMap::new(size, size, values, 0.0, 1.0)
}
