use serde::Deserialize;

use crate::error::PlayerError;

/// Player settings. Every field has a default, so a config document only
/// needs to name what it overrides.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PlayerConfig {
    /// Directory under which album assets live (`./{band}/{i}/...`).
    pub band: String,
    pub album_count: usize,

    // Audio analysis
    pub fft_size: u32,
    pub output_volume: f32,

    // Bar layout
    pub visual_width: f32,
    pub initial_bar_height: f32,

    // Transitions
    pub fade_step: f32,
    pub fade_delay_ms: f64,
    pub settle_delay_ms: f64,
    pub ready_timeout_ms: f64,

    // Backdrop tint
    pub tint_base_alpha: f32,
    pub max_tint_alpha: f32,

    // Scene
    pub fov_y_deg: f32,
    pub near: f32,
    pub far: f32,
    pub camera_position: [f32; 3],
    pub camera_target: [f32; 3],
    pub grid_size: f32,
    pub grid_divisions: u32,

    /// Widest the per-frame video snapshot is allowed to be, in pixels.
    pub texture_width: u32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            band: "jyocho".to_owned(),
            album_count: 4,

            fft_size: 1024,
            output_volume: 0.2,

            visual_width: 4.0,
            initial_bar_height: 0.01,

            fade_step: 0.01,
            fade_delay_ms: 1000.0,
            settle_delay_ms: 100.0,
            ready_timeout_ms: 15_000.0,

            tint_base_alpha: 0.5,
            max_tint_alpha: 0.6,

            fov_y_deg: 75.0,
            near: 0.1,
            far: 1000.0,
            camera_position: [-1.194_309_5, 0.404_545_8, 1.746_450_5],
            camera_target: [-0.353_773_1, -0.104_303_06, -0.516_073_5],
            grid_size: 3.0,
            grid_divisions: 10,

            texture_width: 512,
        }
    }
}

impl PlayerConfig {
    /// Parse a JSON config document and validate it.
    pub fn from_json(text: &str) -> Result<Self, PlayerError> {
        let config: Self =
            serde_json::from_str(text).map_err(|e| PlayerError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), PlayerError> {
        if !self.fft_size.is_power_of_two() || !(32..=32768).contains(&self.fft_size) {
            return Err(PlayerError::InvalidConfig(format!(
                "fftSize must be a power of two in 32..=32768, got {}",
                self.fft_size
            )));
        }
        if self.album_count == 0 {
            return Err(PlayerError::InvalidConfig("albumCount must be at least 1".into()));
        }
        if self.visual_width <= 0.0 || self.texture_width == 0 {
            return Err(PlayerError::InvalidConfig(
                "visualWidth and textureWidth must be positive".into(),
            ));
        }
        if self.fade_step <= 0.0 {
            return Err(PlayerError::InvalidConfig("fadeStep must be positive".into()));
        }
        if self.fade_delay_ms < 0.0 || self.settle_delay_ms < 0.0 || self.ready_timeout_ms < 0.0 {
            return Err(PlayerError::InvalidConfig("delays cannot be negative".into()));
        }
        Ok(())
    }

    /// Number of frequency bins, which is also the number of bars.
    pub fn bin_count(&self) -> usize {
        (self.fft_size / 2) as usize
    }
}
