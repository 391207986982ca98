use terrane_geom::Vec2;
use terrane_noise::{
    HeightCurve, HeightMapConfig, NoiseConfig, NormalizeMode, generate_height_map,
    generate_noise_map,
};

fn global_default(seed: i32) -> NoiseConfig {
    NoiseConfig {
        seed,
        normalize_mode: NormalizeMode::Global,
        ..NoiseConfig::default()
    }
}

#[test]
fn generation_is_deterministic() {
    let cfg = NoiseConfig {
        seed: 1234,
        ..NoiseConfig::default()
    };
    let a = generate_noise_map(29, 29, &cfg, Vec2::new(26.0, -52.0));
    let b = generate_noise_map(29, 29, &cfg, Vec2::new(26.0, -52.0));
    let bits = |m: &terrane_noise::HeightMap| m.values().iter().map(|v| v.to_bits()).collect::<Vec<_>>();
    assert_eq!(bits(&a), bits(&b));
}

#[test]
fn different_seeds_produce_different_grids() {
    let a = generate_noise_map(16, 16, &NoiseConfig::default(), Vec2::ZERO);
    let b = generate_noise_map(
        16,
        16,
        &NoiseConfig {
            seed: 99,
            ..NoiseConfig::default()
        },
        Vec2::ZERO,
    );
    assert_ne!(a.values(), b.values());
}

#[test]
fn local_normalization_hits_both_ends_at_extreme_cells() {
    let cfg = NoiseConfig {
        seed: 42,
        normalize_mode: NormalizeMode::Local,
        ..NoiseConfig::default()
    };
    let local = generate_noise_map(32, 24, &cfg, Vec2::ZERO);
    assert!(local.values().iter().all(|v| (0.0..=1.0).contains(v)));

    // The raw (global) run has the same argmin/argmax as the local remap.
    let raw = generate_noise_map(
        32,
        24,
        &NoiseConfig {
            normalize_mode: NormalizeMode::Global,
            ..cfg
        },
        Vec2::ZERO,
    );
    let argmin = raw
        .values()
        .iter()
        .enumerate()
        .min_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap();
    let argmax = raw
        .values()
        .iter()
        .enumerate()
        .max_by(|a, b| a.1.total_cmp(b.1))
        .map(|(i, _)| i)
        .unwrap();
    assert!(local.values()[argmin] < 1e-5);
    assert!(local.values()[argmax] > 1.0 - 1e-5);
    assert_eq!(local.min_value(), 0.0);
    assert_eq!(local.max_value(), 1.0);
}

// Default config (scale 50, 6 octaves, persistence 0.6, lacunarity 2):
// folded heights lie in [0, ~sum(amplitudes)], so normalized values lie in
// [1 / (2*S/1.725), (1.01*S + 1) / (2*S/1.725)] with S = 2.38336.
#[test]
fn global_normalization_stays_in_documented_band() {
    let map = generate_noise_map(64, 64, &global_default(0), Vec2::new(130.0, -65.0));
    for &v in map.values() {
        assert!(v >= 0.36, "{v} below band");
        assert!(v <= 1.3, "{v} above band");
    }
    assert!(map.min_value() >= 0.0);
    assert!(map.max_value() > map.min_value());
}

#[test]
fn default_config_is_seamless_between_chunks() {
    assert_eq!(NoiseConfig::default().normalize_mode, NormalizeMode::Global);
    let height = HeightMapConfig::default();
    let n = 29usize;
    let step = (n - 3) as f32;
    let here = generate_height_map(n, n, &height, Vec2::ZERO);
    let right = generate_height_map(n, n, &height, Vec2::new(step, 0.0));
    let above = generate_height_map(n, n, &height, Vec2::new(0.0, step));
    for i in 0..n {
        assert_eq!(here.get(n - 2, i), right.get(1, i), "column, row {i}");
        assert_eq!(here.get(i, 1), above.get(i, n - 2), "row, column {i}");
    }
}

#[test]
fn global_neighbours_agree_on_shared_columns() {
    // Two grids one chunk apart in sample space overlap in one column.
    let cfg = global_default(5);
    let n = 29usize;
    let step = (n - 3) as f32;
    let left = generate_noise_map(n, n, &cfg, Vec2::ZERO);
    let right = generate_noise_map(n, n, &cfg, Vec2::new(step, 0.0));
    for y in 0..n {
        let a = left.get(n - 2, y);
        let b = right.get(1, y);
        assert!((a - b).abs() < 1e-5, "row {y}: {a} vs {b}");
    }
}

#[test]
fn height_map_applies_curve_and_multiplier() {
    let cfg = HeightMapConfig {
        noise: NoiseConfig {
            seed: 3,
            normalize_mode: NormalizeMode::Local,
            ..NoiseConfig::default()
        },
        height_multiplier: 10.0,
        height_curve: HeightCurve::linear(),
    };
    let noise = generate_noise_map(12, 12, &cfg.noise, Vec2::ZERO);
    let heights = generate_height_map(12, 12, &cfg, Vec2::ZERO);
    for (n, h) in noise.values().iter().zip(heights.values()) {
        assert!((h - n * n * 10.0).abs() < 1e-4);
    }
    let lo = heights.values().iter().copied().fold(f32::MAX, f32::min);
    let hi = heights.values().iter().copied().fold(f32::MIN, f32::max);
    assert_eq!(heights.min_value(), lo);
    assert_eq!(heights.max_value(), hi);
    assert_eq!(cfg.min_height(), 0.0);
    assert_eq!(cfg.max_height(), 10.0);
}

#[test]
fn falloff_flattens_the_border() {
    let cfg = HeightMapConfig {
        noise: NoiseConfig {
            use_falloff: true,
            normalize_mode: NormalizeMode::Local,
            ..NoiseConfig::default()
        },
        ..HeightMapConfig::default()
    };
    let map = generate_height_map(40, 40, &cfg, Vec2::ZERO);
    // Corner falloff is ~1, so the clamped value and its height are ~0.
    assert!(map.get(0, 0) < 1e-2);
}

#[test]
fn config_parses_from_toml_with_defaults() {
    let cfg: HeightMapConfig = toml::from_str(
        r#"
        height_multiplier = 35.0
        height_curve = [[0.0, 0.0], [0.4, 0.05], [1.0, 1.0]]

        [noise]
        seed = 17
        normalize_mode = "global"
        offset = [4.0, -2.0]
        "#,
    )
    .unwrap();
    assert_eq!(cfg.height_multiplier, 35.0);
    assert_eq!(cfg.height_curve.keys().len(), 3);
    assert_eq!(cfg.noise.seed, 17);
    assert_eq!(cfg.noise.normalize_mode, NormalizeMode::Global);
    assert_eq!(cfg.noise.octaves, 6);
    assert_eq!(cfg.noise.scale, 50.0);
}
