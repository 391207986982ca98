use serde::Deserialize;

#[derive(Clone, Debug, Deserialize, PartialEq)]
pub struct StreamingConfig {
    /// Viewer travel (world units) that triggers a window pass.
    #[serde(default = "default_viewer_move_threshold")]
    pub viewer_move_threshold: f32,
    /// Chebyshev radius (in chunks) beyond which chunks are dropped. `None` keeps everything.
    #[serde(default)]
    pub evict_radius_chunks: Option<i32>,
}

fn default_viewer_move_threshold() -> f32 {
    15.0
}

impl Default for StreamingConfig {
    fn default() -> Self {
        Self {
            viewer_move_threshold: default_viewer_move_threshold(),
            evict_radius_chunks: None,
        }
    }
}

impl StreamingConfig {
    #[inline]
    pub fn sqr_viewer_move_threshold(&self) -> f32 {
        self.viewer_move_threshold * self.viewer_move_threshold
    }
}
