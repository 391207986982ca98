//! Layered noise synthesis and height maps.
#![forbid(unsafe_code)]

pub mod curve;
pub mod falloff;
pub mod height_map;
pub mod noise;

pub use curve::HeightCurve;
pub use falloff::generate_falloff_map;
pub use height_map::{HeightMap, HeightMapConfig, generate_height_map};
pub use noise::{NoiseConfig, NormalizeMode, generate_noise_map};
